//! Payment gateway seam and the simulated gateway used in place of a real one.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checkout::{PaymentMethod, PaymentStatus};
use crate::money::Money;

/// Default success probability for wallet payments.
pub const WALLET_SUCCESS_RATE: f64 = 0.95;

/// Default success probability for card and third-party payments.
pub const CARD_SUCCESS_RATE: f64 = 0.90;

/// Transport-level gateway failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The gateway could not be reached.
    #[error("payment gateway unreachable: {0}")]
    Unreachable(String),

    /// The gateway refused the request before processing it.
    #[error("payment gateway rejected the request: {0}")]
    Rejected(String),
}

/// Charges an amount with a payment method.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Attempt a payment. `Ok(Failed)` is a declined payment; `Err` is a
    /// transport problem.
    async fn attempt(
        &self,
        method: PaymentMethod,
        amount: Money,
    ) -> Result<PaymentStatus, GatewayError>;
}

/// Configuration-level choice of simulated behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GatewayMode {
    AlwaysSucceed,
    AlwaysFail,
    Randomized {
        /// Fixed seed for reproducible runs; random when absent.
        #[serde(default)]
        seed: Option<u64>,
        #[serde(default = "default_wallet_rate")]
        wallet_success_rate: f64,
        #[serde(default = "default_card_rate")]
        card_success_rate: f64,
    },
}

fn default_wallet_rate() -> f64 {
    WALLET_SUCCESS_RATE
}

fn default_card_rate() -> f64 {
    CARD_SUCCESS_RATE
}

impl Default for GatewayMode {
    fn default() -> Self {
        GatewayMode::Randomized {
            seed: None,
            wallet_success_rate: WALLET_SUCCESS_RATE,
            card_success_rate: CARD_SUCCESS_RATE,
        }
    }
}

/// Stand-in gateway with injectable outcome.
#[derive(Debug)]
pub enum SimulatedGateway {
    /// Every payment completes.
    AlwaysSucceed,
    /// Every payment is declined.
    AlwaysFail,
    /// Payments complete with a per-method probability drawn from a seeded
    /// generator.
    Randomized {
        rng: Mutex<StdRng>,
        wallet_success_rate: f64,
        card_success_rate: f64,
    },
}

impl SimulatedGateway {
    /// Randomized gateway with the default success rates.
    pub fn randomized(seed: u64) -> Self {
        Self::randomized_with_rates(seed, WALLET_SUCCESS_RATE, CARD_SUCCESS_RATE)
    }

    /// Randomized gateway with explicit success rates (clamped to `0..=1`).
    pub fn randomized_with_rates(
        seed: u64,
        wallet_success_rate: f64,
        card_success_rate: f64,
    ) -> Self {
        SimulatedGateway::Randomized {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            wallet_success_rate: clamp_rate(wallet_success_rate),
            card_success_rate: clamp_rate(card_success_rate),
        }
    }

    /// Build from configuration.
    pub fn from_mode(mode: GatewayMode) -> Self {
        match mode {
            GatewayMode::AlwaysSucceed => SimulatedGateway::AlwaysSucceed,
            GatewayMode::AlwaysFail => SimulatedGateway::AlwaysFail,
            GatewayMode::Randomized {
                seed,
                wallet_success_rate,
                card_success_rate,
            } => {
                let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
                Self::randomized_with_rates(seed, wallet_success_rate, card_success_rate)
            }
        }
    }
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn attempt(
        &self,
        method: PaymentMethod,
        amount: Money,
    ) -> Result<PaymentStatus, GatewayError> {
        let status = match self {
            SimulatedGateway::AlwaysSucceed => PaymentStatus::Completed,
            SimulatedGateway::AlwaysFail => PaymentStatus::Failed,
            SimulatedGateway::Randomized {
                rng,
                wallet_success_rate,
                card_success_rate,
            } => {
                let rate = if method.is_wallet() {
                    *wallet_success_rate
                } else {
                    *card_success_rate
                };
                let draw: f64 = rng
                    .lock()
                    .map_err(|e| GatewayError::Unreachable(e.to_string()))?
                    .gen();
                if draw < rate {
                    PaymentStatus::Completed
                } else {
                    PaymentStatus::Failed
                }
            }
        };
        tracing::debug!(%method, amount = %amount, ?status, "simulated payment");
        Ok(status)
    }
}
