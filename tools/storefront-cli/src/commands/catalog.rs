//! List configured products.

use anyhow::Result;
use storefront_commerce::catalog::InventoryLevel;

use crate::context::Context;

/// Run the catalog command.
pub async fn run(ctx: &Context) -> Result<()> {
    let catalog = ctx.config.catalog()?;

    if ctx.output.is_json() {
        let products: Vec<_> = catalog.products().collect();
        ctx.output.json(&products);
        return Ok(());
    }

    ctx.output.header("Catalog");
    if catalog.is_empty() {
        ctx.output.info("No products configured. Add [[catalog]] entries to storefront.toml.");
        return Ok(());
    }

    let widths = [6, 28, 12, 8];
    ctx.output.table_row(&["ID", "NAME", "PRICE", "STOCK"], &widths);
    for product in catalog.products() {
        let stock = stock_label(&product.inventory);
        ctx.output.table_row(
            &[
                &product.id.to_string(),
                &product.name,
                &product.price.display(),
                &stock,
            ],
            &widths,
        );
    }
    Ok(())
}

fn stock_label(inventory: &InventoryLevel) -> String {
    if inventory.is_out_of_stock() {
        return "sold out".to_string();
    }
    inventory
        .available()
        .map_or_else(|| "-".to_string(), |n| n.to_string())
}
