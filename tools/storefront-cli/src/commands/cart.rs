//! Cart inspection and editing.

use anyhow::{bail, Context as _, Result};
use dialoguer::Confirm;
use storefront_commerce::cart::CartStore;
use storefront_commerce::catalog::{clamp_addition, clamp_quantity, StockLookup};
use storefront_commerce::ProductId;

use super::{CartArgs, CartCommand};
use crate::context::Context;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let cache = ctx.cache()?;
    let session = ctx.require_session(&cache)?;
    let cart = ctx.cart(&cache, &session);

    match args.command.unwrap_or(CartCommand::List) {
        CartCommand::List => list(&cart, ctx),
        CartCommand::Add { product, qty } => add(&cart, ProductId::new(product), qty, ctx).await,
        CartCommand::Update { product, qty } => {
            update(&cart, ProductId::new(product), qty, ctx).await
        }
        CartCommand::Remove { product } => remove(&cart, ProductId::new(product), ctx),
        CartCommand::Select { products, all } => select(&cart, &products, all, true, ctx),
        CartCommand::Deselect { products, all } => select(&cart, &products, all, false, ctx),
        CartCommand::Clear { yes } => clear(&cart, yes, ctx),
    }
}

fn list(cart: &CartStore, ctx: &Context) -> Result<()> {
    let snapshot = cart
        .snapshot()
        .context("Failed to read the cart")?;
    let totals = cart.totals(&ctx.config.pricing_config()?)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "items": snapshot.items,
            "totals": totals,
        }));
        return Ok(());
    }

    ctx.output.header("Cart");
    if snapshot.is_empty() {
        ctx.output.info("Your cart is empty");
        return Ok(());
    }

    ctx.output.line_items(&snapshot.items);
    println!();
    ctx.output.totals(&totals);
    Ok(())
}

async fn add(cart: &CartStore, product_id: ProductId, qty: i64, ctx: &Context) -> Result<()> {
    if qty <= 0 {
        bail!("Quantity must be positive");
    }

    let catalog = ctx.config.catalog()?;
    let Some(product) = catalog.get(product_id) else {
        bail!("Product {} is not in the catalog", product_id);
    };

    let in_cart = cart
        .list()
        .iter()
        .find(|i| i.id == product_id)
        .map_or(0, |i| i.qty);
    let allowed = clamp_addition(in_cart, qty, catalog.available(product_id).await);

    if allowed == 0 {
        ctx.output.warn(&format!("{} is out of stock", product.name));
        return Ok(());
    }
    if allowed < qty {
        ctx.output
            .warn(&format!("Only {} more of {} available", allowed, product.name));
    }

    cart.add_item(
        product_id,
        product.name.clone(),
        product.price,
        allowed,
        product.image.clone(),
    );
    ctx.output
        .success(&format!("Added {} x {}", allowed, product.name));
    Ok(())
}

async fn update(cart: &CartStore, product_id: ProductId, qty: i64, ctx: &Context) -> Result<()> {
    let Some(line) = cart.list().into_iter().find(|i| i.id == product_id) else {
        bail!("Product {} is not in the cart", product_id);
    };

    let catalog = ctx.config.catalog()?;
    let clamped = clamp_quantity(qty, catalog.available(product_id).await);
    cart.update_quantity(product_id, clamped);

    if sold_out_on_update(qty, clamped) {
        ctx.output
            .warn(&format!("{} is out of stock and was removed", line.name));
    } else if clamped == 0 {
        ctx.output.success(&format!("Removed {}", line.name));
    } else {
        if clamped < qty {
            ctx.output
                .warn(&format!("Only {} of {} available", clamped, line.name));
        }
        ctx.output
            .success(&format!("{} quantity set to {}", line.name, clamped));
    }
    Ok(())
}

/// A positive request clamped to nothing means the stock ran out.
fn sold_out_on_update(requested: i64, clamped: i64) -> bool {
    requested > 0 && clamped == 0
}

fn remove(cart: &CartStore, product_id: ProductId, ctx: &Context) -> Result<()> {
    cart.remove_item(product_id);
    ctx.output.success(&format!("Removed product {}", product_id));
    Ok(())
}

fn select(
    cart: &CartStore,
    products: &[u64],
    all: bool,
    selected: bool,
    ctx: &Context,
) -> Result<()> {
    let verb = if selected { "Selected" } else { "Deselected" };

    if all {
        cart.set_all_selected(selected);
        ctx.output.success(&format!("{} all lines", verb));
        return Ok(());
    }
    if products.is_empty() {
        bail!("Pass product ids or --all");
    }

    for &id in products {
        cart.set_selected(ProductId::new(id), selected);
    }
    ctx.output
        .success(&format!("{} {} line(s)", verb, products.len()));
    Ok(())
}

fn clear(cart: &CartStore, yes: bool, ctx: &Context) -> Result<()> {
    if cart.is_empty() {
        ctx.output.info("Cart is already empty");
        return Ok(());
    }

    if !yes && !ctx.output.is_json() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove all {} items from the cart?", cart.item_count()))
            .default(false)
            .interact()?;
        if !confirmed {
            ctx.output.info("Cancelled");
            return Ok(());
        }
    }

    cart.clear();
    ctx.output.success("Cart cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_on_sold_out_product_is_flagged() {
        let clamped = clamp_quantity(3, Some(0));
        assert_eq!(clamped, 0);
        assert!(sold_out_on_update(3, clamped));

        // Explicit removal is not a stock problem.
        assert!(!sold_out_on_update(0, clamp_quantity(0, Some(0))));
        assert!(!sold_out_on_update(-2, clamp_quantity(-2, Some(5))));
        assert!(!sold_out_on_update(3, clamp_quantity(3, Some(1))));
    }
}
