//! Quote and pay for the selected cart lines.

use anyhow::{bail, Context as _, Result};
use dialoguer::{Confirm, Input, Select};
use storefront_commerce::checkout::{CheckoutOutcome, PaymentMethod, ShippingAddress};

use super::{CheckoutArgs, CheckoutCommand};
use crate::context::Context;
use crate::output::state_badge;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    match args.command {
        CheckoutCommand::Quote => quote(ctx),
        CheckoutCommand::Pay {
            method,
            recipient,
            address,
            phone,
            yes,
        } => pay(ctx, method, recipient, address, phone, yes).await,
    }
}

fn quote(ctx: &Context) -> Result<()> {
    let cache = ctx.cache()?;
    let session = ctx.require_session(&cache)?;
    let cart = ctx.cart(&cache, &session);

    let items = cart.selected_items();
    let totals = cart.totals(&ctx.config.pricing_config()?)?;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "items": items,
            "totals": totals,
        }));
        return Ok(());
    }

    ctx.output.header("Checkout quote");
    if items.is_empty() {
        ctx.output.info("Nothing selected. Use `storefront cart select` first.");
        return Ok(());
    }
    ctx.output.line_items(&items);
    println!();
    ctx.output.totals(&totals);
    Ok(())
}

async fn pay(
    ctx: &Context,
    method: Option<String>,
    recipient: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    yes: bool,
) -> Result<()> {
    let cache = ctx.cache()?;
    let session = ctx.require_session(&cache)?;
    let orchestrator = ctx.orchestrator(&cache, session.clone())?;
    let cart = ctx.cart(&cache, &session);

    let items = cart.selected_items();
    if items.is_empty() {
        bail!("No items selected for checkout");
    }
    let totals = orchestrator.compute_totals(&items)?;

    let interactive = !ctx.output.is_json();
    let method = resolve_method(method, interactive)?;
    let shipping_address = resolve_address(recipient, address, phone, interactive)?;

    if interactive && !yes {
        ctx.output.header("Confirm payment");
        ctx.output.kv("Ship to", &shipping_address.one_line());
        ctx.output.kv("Method", method.display_name());
        ctx.output.totals(&totals);

        let confirmed = Confirm::new()
            .with_prompt(format!("Pay {}?", totals.grand_total.display()))
            .default(true)
            .interact()?;
        if !confirmed {
            ctx.output.info("Checkout cancelled");
            return Ok(());
        }
    }

    let mut attempt = orchestrator.begin();
    attempt.select_payment_method(method);

    let spinner = ctx.output.spinner("Processing payment...");
    let outcome = orchestrator
        .pay(attempt, totals, items, shipping_address)
        .await;
    spinner.finish_and_clear();

    report(&outcome, ctx);
    if outcome.is_success() {
        Ok(())
    } else {
        bail!("{}", outcome.message())
    }
}

fn resolve_method(method: Option<String>, interactive: bool) -> Result<PaymentMethod> {
    if let Some(method) = method {
        return method
            .parse::<PaymentMethod>()
            .with_context(|| format!("Unsupported payment method: {}", method));
    }
    if !interactive {
        bail!("--method is required with --json");
    }

    let names: Vec<&str> = PaymentMethod::ALL.iter().map(|m| m.display_name()).collect();
    let selection = Select::new()
        .with_prompt("Payment method")
        .items(&names)
        .default(0)
        .interact()?;
    Ok(PaymentMethod::ALL[selection])
}

fn resolve_address(
    recipient: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    interactive: bool,
) -> Result<ShippingAddress> {
    let recipient = match recipient {
        Some(r) => r,
        None if interactive => Input::<String>::new()
            .with_prompt("Recipient")
            .interact_text()?,
        None => bail!("--recipient is required with --json"),
    };
    let address = match address {
        Some(a) => a,
        None if interactive => Input::<String>::new()
            .with_prompt("Shipping address")
            .interact_text()?,
        None => bail!("--address is required with --json"),
    };

    let mut shipping = ShippingAddress::new(recipient, address);
    if let Some(phone) = phone {
        shipping = shipping.with_phone(phone);
    }
    if !shipping.is_complete() {
        bail!("Recipient and address must not be empty");
    }
    Ok(shipping)
}

fn report(outcome: &CheckoutOutcome, ctx: &Context) {
    if ctx.output.is_json() {
        let states: Vec<&str> = outcome.transitions.iter().map(|s| s.as_str()).collect();
        ctx.output.json(&serde_json::json!({
            "success": outcome.is_success(),
            "order_id": outcome.order_id(),
            "message": outcome.message(),
            "states": states,
            "receipt": outcome.result.as_ref().ok(),
        }));
        return;
    }

    if ctx.output.is_verbose() {
        let trail: Vec<String> = outcome.transitions.iter().map(|s| state_badge(*s)).collect();
        ctx.output.debug(&trail.join(" -> "));
    }

    match &outcome.result {
        Ok(receipt) => {
            ctx.output.success(&outcome.message());
            ctx.output.kv("Order", receipt.order_id.as_str());
            ctx.output.kv("Paid", &receipt.amount.display());
        }
        Err(_) => {
            if let Some(order_id) = outcome.order_id() {
                ctx.output.kv("Order", order_id.as_str());
            }
        }
    }
}
