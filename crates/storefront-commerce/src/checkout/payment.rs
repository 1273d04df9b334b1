//! Payment methods and statuses.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the shopper pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Store wallet balance.
    Wallet,
    Visa,
    Mastercard,
    Amex,
    PayPal,
    Alipay,
    WeChatPay,
}

/// Family a payment method belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodKind {
    /// Paid from the shopper's store balance.
    StoreWallet,
    /// Card brand.
    Card,
    /// External wallet provider.
    ThirdPartyWallet,
}

impl PaymentMethod {
    /// Every supported method.
    pub const ALL: [PaymentMethod; 7] = [
        PaymentMethod::Wallet,
        PaymentMethod::Visa,
        PaymentMethod::Mastercard,
        PaymentMethod::Amex,
        PaymentMethod::PayPal,
        PaymentMethod::Alipay,
        PaymentMethod::WeChatPay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Wallet => "wallet",
            PaymentMethod::Visa => "visa",
            PaymentMethod::Mastercard => "mastercard",
            PaymentMethod::Amex => "amex",
            PaymentMethod::PayPal => "pay_pal",
            PaymentMethod::Alipay => "alipay",
            PaymentMethod::WeChatPay => "we_chat_pay",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Wallet => "Wallet balance",
            PaymentMethod::Visa => "Visa",
            PaymentMethod::Mastercard => "Mastercard",
            PaymentMethod::Amex => "American Express",
            PaymentMethod::PayPal => "PayPal",
            PaymentMethod::Alipay => "Alipay",
            PaymentMethod::WeChatPay => "WeChat Pay",
        }
    }

    pub fn kind(&self) -> MethodKind {
        match self {
            PaymentMethod::Wallet => MethodKind::StoreWallet,
            PaymentMethod::Visa | PaymentMethod::Mastercard | PaymentMethod::Amex => {
                MethodKind::Card
            }
            PaymentMethod::PayPal | PaymentMethod::Alipay | PaymentMethod::WeChatPay => {
                MethodKind::ThirdPartyWallet
            }
        }
    }

    /// Whether the method draws on the store wallet and needs a balance check.
    pub fn is_wallet(&self) -> bool {
        self.kind() == MethodKind::StoreWallet
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "wallet" | "balance" => Ok(PaymentMethod::Wallet),
            "visa" => Ok(PaymentMethod::Visa),
            "mastercard" => Ok(PaymentMethod::Mastercard),
            "amex" | "americanexpress" => Ok(PaymentMethod::Amex),
            "paypal" => Ok(PaymentMethod::PayPal),
            "alipay" => Ok(PaymentMethod::Alipay),
            "wechat" | "wechatpay" => Ok(PaymentMethod::WeChatPay),
            _ => Err(CommerceError::ValidationError(format!(
                "unknown payment method: {}",
                s
            ))),
        }
    }
}

/// Terminal result reported by the payment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Failed,
}
