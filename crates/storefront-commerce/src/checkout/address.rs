//! Shipping address summary.

use serde::{Deserialize, Serialize};

/// The address a checkout ships to, as entered on the checkout page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ShippingAddress {
    /// Recipient name.
    pub recipient: String,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Street address, already formatted.
    pub address: String,
}

impl ShippingAddress {
    /// Create a new address.
    pub fn new(recipient: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            phone: None,
            address: address.into(),
        }
    }

    /// Set the contact phone.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Format as single line.
    pub fn one_line(&self) -> String {
        match self.phone {
            Some(ref phone) => format!("{} ({}), {}", self.recipient, phone, self.address),
            None => format!("{}, {}", self.recipient, self.address),
        }
    }

    /// Check if address is complete.
    pub fn is_complete(&self) -> bool {
        !self.recipient.trim().is_empty() && !self.address.trim().is_empty()
    }
}
