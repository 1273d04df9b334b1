//! CLI configuration.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use storefront_commerce::cart::PricingConfig;
use storefront_commerce::catalog::{Catalog, CatalogProduct, InventoryLevel};
use storefront_commerce::checkout::{CheckoutOptions, GatewayMode};
use storefront_commerce::{Currency, Money, ProductId};

/// Contents of `storefront.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Directory holding persisted cart, orders and sessions.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Totals rules.
    #[serde(default)]
    pub pricing: PricingSection,

    /// Gateway and checkout behaviour.
    #[serde(default)]
    pub payment: PaymentSection,

    /// Simulated wallet.
    #[serde(default)]
    pub wallet: WalletSection,

    /// Products available to add.
    #[serde(default)]
    pub catalog: Vec<ProductEntry>,
}

fn default_data_dir() -> String {
    ".storefront".to_string()
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            pricing: PricingSection::default(),
            payment: PaymentSection::default(),
            wallet: WalletSection::default(),
            catalog: Vec::new(),
        }
    }
}

impl StorefrontConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content, is_json(path))
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse config text, TOML unless `json`.
    pub fn parse(content: &str, json: bool) -> Result<Self> {
        if json {
            Ok(serde_json::from_str(content)?)
        } else {
            Ok(toml::from_str(content)?)
        }
    }

    /// Currency every configured amount is expressed in.
    pub fn currency(&self) -> Result<Currency> {
        self.pricing
            .currency
            .parse::<Currency>()
            .with_context(|| format!("Unknown currency: {}", self.pricing.currency))
    }

    /// Pricing rules for totals.
    pub fn pricing_config(&self) -> Result<PricingConfig> {
        let currency = self.currency()?;
        let config = PricingConfig {
            currency,
            shipping_fee: Money::from_decimal(self.pricing.shipping_fee, currency),
            tax_rate_percent: self.pricing.tax_rate_percent,
        };
        config.validate()?;
        Ok(config)
    }

    /// Orchestrator options.
    pub fn checkout_options(&self) -> CheckoutOptions {
        CheckoutOptions {
            cancel_unpaid_orders: self.payment.cancel_unpaid_orders,
        }
    }

    /// Configured wallet balance.
    pub fn wallet_balance(&self) -> Result<Money> {
        Ok(Money::from_decimal(self.wallet.balance, self.currency()?))
    }

    /// Products from `[[catalog]]`.
    pub fn catalog(&self) -> Result<Catalog> {
        let currency = self.currency()?;
        let mut products = Vec::with_capacity(self.catalog.len());
        for entry in &self.catalog {
            if entry.price < 0.0 {
                bail!("Product {} has a negative price", entry.id);
            }
            let inventory = match entry.stock {
                Some(quantity) => InventoryLevel {
                    reserved: entry.reserved,
                    ..InventoryLevel::new(quantity)
                },
                None => InventoryLevel::untracked(),
            };
            products.push(CatalogProduct {
                id: ProductId::new(entry.id),
                name: entry.name.clone(),
                price: Money::from_decimal(entry.price, currency),
                inventory,
                image: entry.image.clone(),
            });
        }
        Ok(Catalog::new(products))
    }

    /// Problems that would stop commands from running.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.data_dir.trim().is_empty() {
            problems.push("data_dir is empty".to_string());
        }
        if let Err(e) = self.pricing_config() {
            problems.push(format!("[pricing]: {:#}", e));
        }
        if self.wallet.balance < 0.0 {
            problems.push("[wallet] balance is negative".to_string());
        }
        if let GatewayMode::Randomized {
            wallet_success_rate,
            card_success_rate,
            ..
        } = self.payment.gateway
        {
            for (name, rate) in [
                ("wallet_success_rate", wallet_success_rate),
                ("card_success_rate", card_success_rate),
            ] {
                if !(0.0..=1.0).contains(&rate) {
                    problems.push(format!("[payment.gateway] {} must be within 0..=1", name));
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        for entry in &self.catalog {
            if !seen.insert(entry.id) {
                problems.push(format!("[[catalog]] duplicate product id {}", entry.id));
            }
            if entry.name.trim().is_empty() {
                problems.push(format!("[[catalog]] product {} has no name", entry.id));
            }
            if entry.price < 0.0 {
                problems.push(format!("[[catalog]] product {} has a negative price", entry.id));
            }
        }

        problems
    }
}

/// `[pricing]` section. Amounts are decimal in the configured currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSection {
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default = "default_shipping_fee")]
    pub shipping_fee: f64,

    #[serde(default = "default_tax_rate")]
    pub tax_rate_percent: f64,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_shipping_fee() -> f64 {
    5.0
}

fn default_tax_rate() -> f64 {
    9.0
}

impl Default for PricingSection {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            shipping_fee: default_shipping_fee(),
            tax_rate_percent: default_tax_rate(),
        }
    }
}

/// `[payment]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentSection {
    /// Simulated gateway behaviour.
    #[serde(default)]
    pub gateway: GatewayMode,

    /// Cancel orders whose payment failed.
    #[serde(default)]
    pub cancel_unpaid_orders: bool,
}

/// `[wallet]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSection {
    #[serde(default = "default_balance")]
    pub balance: f64,
}

fn default_balance() -> f64 {
    100.0
}

impl Default for WalletSection {
    fn default() -> Self {
        Self {
            balance: default_balance(),
        }
    }
}

/// One `[[catalog]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductEntry {
    pub id: u64,
    pub name: String,
    pub price: f64,

    /// On-hand units. Untracked when absent.
    #[serde(default)]
    pub stock: Option<i64>,

    #[serde(default)]
    pub reserved: i64,

    #[serde(default)]
    pub image: Option<String>,
}

fn is_json(path: &Path) -> bool {
    path.extension().map_or(false, |e| e == "json")
}

/// Generate a default storefront.toml config file.
pub fn generate_default_config() -> String {
    r#"# Storefront configuration

data_dir = ".storefront"

[pricing]
currency = "USD"
shipping_fee = 5.00
tax_rate_percent = 9.0

[payment]
cancel_unpaid_orders = false

[payment.gateway]
mode = "randomized"
# seed = 42
wallet_success_rate = 0.95
card_success_rate = 0.90

[wallet]
balance = 100.00

[[catalog]]
id = 1
name = "Ceramic Mug"
price = 10.00
stock = 25

[[catalog]]
id = 2
name = "Tea Sampler"
price = 5.00
stock = 40

[[catalog]]
id = 3
name = "Cast Iron Teapot"
price = 42.50
stock = 3
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses_and_validates() {
        let config = StorefrontConfig::parse(&generate_default_config(), false).unwrap();
        assert!(config.validate().is_empty(), "{:?}", config.validate());
        assert_eq!(config.catalog().unwrap().len(), 3);

        let pricing = config.pricing_config().unwrap();
        assert_eq!(pricing.shipping_fee.amount_cents, 500);
        assert_eq!(pricing.tax_rate_percent, 9.0);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = StorefrontConfig::parse("", false).unwrap();
        assert_eq!(config.data_dir, ".storefront");
        assert_eq!(config.wallet_balance().unwrap().amount_cents, 10_000);
        assert!(!config.checkout_options().cancel_unpaid_orders);
        assert!(matches!(
            config.payment.gateway,
            GatewayMode::Randomized { seed: None, .. }
        ));
    }

    #[test]
    fn test_gateway_mode_table() {
        let config = StorefrontConfig::parse(
            r#"
[payment]
cancel_unpaid_orders = true

[payment.gateway]
mode = "always_fail"
"#,
            false,
        )
        .unwrap();
        assert_eq!(config.payment.gateway, GatewayMode::AlwaysFail);
        assert!(config.checkout_options().cancel_unpaid_orders);
    }

    #[test]
    fn test_validate_reports_problems() {
        let config = StorefrontConfig::parse(
            r#"
[pricing]
currency = "XYZ"

[[catalog]]
id = 1
name = "A"
price = 1.0

[[catalog]]
id = 1
name = ""
price = -2.0
"#,
            false,
        )
        .unwrap();

        let problems = config.validate();
        assert!(problems.iter().any(|p| p.starts_with("[pricing]")));
        assert!(problems.iter().any(|p| p.contains("duplicate product id 1")));
        assert!(problems.iter().any(|p| p.contains("has no name")));
        assert!(problems.iter().any(|p| p.contains("negative price")));
    }

    #[test]
    fn test_json_config() {
        let json = r#"{"data_dir": "/tmp/shop", "wallet": {"balance": 3.5}}"#;
        let config = StorefrontConfig::parse(json, true).unwrap();
        assert_eq!(config.data_dir, "/tmp/shop");
        assert_eq!(config.wallet_balance().unwrap().amount_cents, 350);
    }
}
