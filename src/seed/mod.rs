use tracing::info;

use crate::error::AppResult;
use crate::models::CreateProduct;
use crate::store::ProductStore;

/// Starter catalog as (name, price, quantity).
static STARTER_CATALOG: &[(&str, i64, i32)] = &[
    ("Wireless Mouse", 799, 20),
    ("Keyboard", 1299, 15),
    ("Laptop Stand", 999, 10),
    ("USB-C Hub", 1499, 12),
    ("Notebook Cooler", 699, 25),
];

/// Load the starter catalog, but only into an empty store.
/// Returns how many products were inserted.
pub async fn seed_catalog(store: &dyn ProductStore) -> AppResult<usize> {
    let existing = store.count().await?;
    if existing > 0 {
        info!(existing, "Store already has products; skipping seed");
        return Ok(0);
    }

    for (name, price, quantity) in STARTER_CATALOG {
        store
            .insert(&CreateProduct {
                name: name.to_string(),
                price: *price,
                quantity: *quantity,
            })
            .await?;
    }

    info!("Seeded {} starter products", STARTER_CATALOG.len());
    Ok(STARTER_CATALOG.len())
}
