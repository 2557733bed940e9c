//! Cart commands.

use qkart_core::{Intent, ProductId};
use qkart_storefront::Storefront;
use qkart_storefront::error::Result;

use crate::console;

/// Make sure the catalog and the cart are loaded so cart lines can be
/// reconciled. An already loaded catalog is kept along with any search on
/// display.
async fn prepare(storefront: &mut Storefront) -> Result<()> {
    storefront.ensure_catalog().await?;
    storefront.load_cart().await
}

pub async fn show(storefront: &mut Storefront) -> Result<()> {
    prepare(storefront).await?;
    console::show(&console::cart(storefront.cart()));
    Ok(())
}

/// Add a product that isn't in the cart yet.
pub async fn add(storefront: &mut Storefront, product_id: &str, qty: u32) -> Result<()> {
    prepare(storefront).await?;
    storefront
        .add_or_update_cart_item(&ProductId::new(product_id), qty, Intent::None)
        .await?;
    console::show(&console::cart(storefront.cart()));
    Ok(())
}

/// Change a product's quantity by one in the direction of `intent`.
pub async fn step(storefront: &mut Storefront, product_id: &str, intent: Intent) -> Result<()> {
    prepare(storefront).await?;
    let product_id = ProductId::new(product_id);
    let qty = storefront.cart().quantity_of(&product_id).unwrap_or(0);
    storefront
        .add_or_update_cart_item(&product_id, qty, intent)
        .await?;
    console::show(&console::cart(storefront.cart()));
    Ok(())
}
