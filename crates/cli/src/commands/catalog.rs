//! Catalog browsing commands.

use qkart_storefront::Storefront;
use qkart_storefront::error::Result;

use crate::console;

/// Print the whole catalog, with cart quantities when logged in.
pub async fn products(storefront: &mut Storefront) -> Result<()> {
    storefront.load_catalog().await?;
    storefront.load_cart().await?;
    console::show(&console::listing(storefront.listing(), storefront.cart()));
    Ok(())
}

/// Fetch the catalog again, bypassing the cache, and print it.
pub async fn refresh(storefront: &mut Storefront) -> Result<()> {
    storefront.refresh_catalog().await?;
    storefront.load_cart().await?;
    console::show(&console::listing(storefront.listing(), storefront.cart()));
    Ok(())
}

/// Print the products matching `text`.
pub async fn search(storefront: &mut Storefront, text: &str) -> Result<()> {
    storefront.search(text).await?;
    console::show(&console::listing(storefront.listing(), storefront.cart()));
    Ok(())
}
