//! Configuration management commands.

use std::fs;

use anyhow::{bail, Context as _, Result};
use storefront_commerce::checkout::GatewayMode;

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match ctx.config_path {
        Some(ref path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }
    ctx.output.kv("data_dir", &ctx.data_dir().display().to_string());

    let config = &ctx.config;

    ctx.output.info("[pricing]");
    ctx.output.kv("currency", &config.pricing.currency);
    ctx.output
        .kv("shipping_fee", &format!("{:.2}", config.pricing.shipping_fee));
    ctx.output.kv(
        "tax_rate_percent",
        &config.pricing.tax_rate_percent.to_string(),
    );

    ctx.output.info("[payment]");
    match config.payment.gateway {
        GatewayMode::AlwaysSucceed => ctx.output.kv("gateway", "always_succeed"),
        GatewayMode::AlwaysFail => ctx.output.kv("gateway", "always_fail"),
        GatewayMode::Randomized {
            seed,
            wallet_success_rate,
            card_success_rate,
        } => {
            ctx.output.kv("gateway", "randomized");
            if let Some(seed) = seed {
                ctx.output.kv("seed", &seed.to_string());
            }
            ctx.output
                .kv("wallet_success_rate", &wallet_success_rate.to_string());
            ctx.output
                .kv("card_success_rate", &card_success_rate.to_string());
        }
    }
    ctx.output.kv(
        "cancel_unpaid_orders",
        &config.payment.cancel_unpaid_orders.to_string(),
    );

    ctx.output.info("[wallet]");
    ctx.output.kv("balance", &format!("{:.2}", config.wallet.balance));

    if !config.catalog.is_empty() {
        ctx.output.info("[[catalog]]");
        for entry in &config.catalog {
            ctx.output
                .list_item(&format!("{} {} ({:.2})", entry.id, entry.name, entry.price));
        }
    }

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let path = ctx.default_config_path();

    if path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }

    fs::write(&path, generate_default_config())
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    ctx.output
        .success(&format!("Created config file: {}", path.display()));
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    let problems = ctx.config.validate();

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "valid": problems.is_empty(),
            "problems": problems,
        }));
    } else if problems.is_empty() {
        ctx.output.success("Configuration is valid");
    } else {
        for problem in &problems {
            ctx.output.warn(problem);
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        bail!("Configuration has {} problem(s)", problems.len())
    }
}
