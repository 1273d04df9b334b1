//! Order total calculations.

use crate::cart::CartLineItem;
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Store-wide pricing rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PricingConfig {
    /// Currency every line must be priced in.
    pub currency: Currency,
    /// Flat shipping fee charged on any non-empty order.
    pub shipping_fee: Money,
    /// Tax rate applied to the subtotal, in percent.
    pub tax_rate_percent: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            currency: Currency::USD,
            shipping_fee: Money::new(500, Currency::USD),
            tax_rate_percent: 9.0,
        }
    }
}

impl PricingConfig {
    /// Reject configurations that would produce nonsensical totals.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.shipping_fee.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: self.shipping_fee.currency.code().to_string(),
            });
        }
        if self.shipping_fee.is_negative() {
            return Err(CommerceError::ValidationError(
                "shipping fee must not be negative".to_string(),
            ));
        }
        if !self.tax_rate_percent.is_finite() || self.tax_rate_percent < 0.0 {
            return Err(CommerceError::ValidationError(format!(
                "tax rate must be a non-negative percentage, got {}",
                self.tax_rate_percent
            )));
        }
        Ok(())
    }
}

/// Totals for a checkout. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderTotals {
    /// Sum of `price * qty` over selected lines.
    pub subtotal: Money,
    /// Flat fee, zero when the subtotal is zero.
    pub shipping: Money,
    /// `subtotal * rate`, rounded to whole cents.
    pub tax: Money,
    /// subtotal + shipping + tax.
    pub grand_total: Money,
}

impl OrderTotals {
    /// Whether there is anything to charge.
    pub fn is_empty(&self) -> bool {
        self.subtotal.is_zero()
    }
}

/// Compute order totals from cart lines.
///
/// Only lines with `selected == true` contribute. The function is pure: the
/// same lines and config always give the same totals.
pub fn compute_totals<'a>(
    items: impl IntoIterator<Item = &'a CartLineItem>,
    config: &PricingConfig,
) -> Result<OrderTotals, CommerceError> {
    let mut subtotal = Money::zero(config.currency);
    for item in items.into_iter().filter(|i| i.selected) {
        subtotal = subtotal.try_add(&item.line_total()?)?;
    }

    let shipping = if subtotal.is_zero() {
        Money::zero(config.currency)
    } else {
        config.shipping_fee
    };

    let tax = subtotal.percentage(config.tax_rate_percent);
    let grand_total = subtotal.try_add(&shipping)?.try_add(&tax)?;

    Ok(OrderTotals {
        subtotal,
        shipping,
        tax,
        grand_total,
    })
}
