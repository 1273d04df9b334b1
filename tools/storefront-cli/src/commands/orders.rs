//! Completed order history.

use anyhow::{Context as _, Result};
use storefront_commerce::checkout::{CompletedOrder, OrderHistory};
use storefront_commerce::OrderId;

use super::{OrdersArgs, OrdersCommand};
use crate::context::Context;

/// Run the orders command.
pub async fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    let cache = ctx.cache()?;
    let session = ctx.require_session(&cache)?;
    let history = ctx.history(&cache, &session);

    match args.command.unwrap_or(OrdersCommand::List) {
        OrdersCommand::List => list(&history, args.limit, ctx),
        OrdersCommand::Show { order_id } => show(&history, &OrderId::new(order_id), ctx),
    }
}

fn list(history: &OrderHistory, limit: Option<usize>, ctx: &Context) -> Result<()> {
    let mut orders = history.list().context("Failed to read order history")?;
    if let Some(limit) = limit {
        orders.truncate(limit);
    }

    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return Ok(());
    }

    ctx.output.header("Orders");
    if orders.is_empty() {
        ctx.output.info("No completed orders yet");
        return Ok(());
    }

    let widths = [22, 20, 6, 12, 16];
    ctx.output
        .table_row(&["ORDER", "DATE", "ITEMS", "TOTAL", "METHOD"], &widths);
    for order in &orders {
        ctx.output.table_row(
            &[
                order.order_id.as_str(),
                &order.completed_at.format("%Y-%m-%d %H:%M").to_string(),
                &order.item_count().to_string(),
                &order.amount.display(),
                order.method.display_name(),
            ],
            &widths,
        );
    }
    Ok(())
}

fn show(history: &OrderHistory, order_id: &OrderId, ctx: &Context) -> Result<()> {
    let order = history
        .get(order_id)
        .context("Failed to read order history")?
        .with_context(|| format!("Order {} not found", order_id))?;

    if ctx.output.is_json() {
        ctx.output.json(&order);
        return Ok(());
    }

    print_order(&order, ctx);
    Ok(())
}

fn print_order(order: &CompletedOrder, ctx: &Context) {
    ctx.output.header(&format!("Order {}", order.order_id));
    ctx.output.kv("Completed", &order.completed_at.to_rfc3339());
    ctx.output.kv("Method", order.method.display_name());
    ctx.output.kv("Ship to", &order.shipping_address.one_line());
    println!();
    ctx.output.line_items(&order.items);
    println!();
    ctx.output.totals(&order.totals);
}
