mod account;
mod product;

pub use account::*;
pub use product::*;
