//! Checkout payment orchestration.
//!
//! One [`CheckoutAttempt`] walks through
//!
//! ```text
//! Idle -> MethodSelected -> (InsufficientFunds | OrderCreating) -> OrderCreated
//!      -> PaymentPending -> (PaymentSucceeded -> CartCleaned | PaymentFailed) -> Done
//! ```
//!
//! [`CheckoutOrchestrator::pay`] consumes the attempt, so a finished attempt
//! can never be resumed; retrying means starting a new one.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{compute_totals, CartLineItem, CartStore, OrderTotals, PricingConfig};
use crate::checkout::{
    CompletedOrder, NewOrder, OrderHistory, OrderService, PaymentGateway, PaymentMethod,
    PaymentStatus, ServiceError, ShippingAddress, WalletService,
};
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId};
use crate::money::Money;
use crate::session::Session;

/// States of a single checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutState {
    Idle,
    MethodSelected,
    InsufficientFunds,
    OrderCreating,
    OrderCreated,
    PaymentPending,
    PaymentSucceeded,
    PaymentFailed,
    CartCleaned,
    Done,
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::MethodSelected => "method_selected",
            CheckoutState::InsufficientFunds => "insufficient_funds",
            CheckoutState::OrderCreating => "order_creating",
            CheckoutState::OrderCreated => "order_created",
            CheckoutState::PaymentPending => "payment_pending",
            CheckoutState::PaymentSucceeded => "payment_succeeded",
            CheckoutState::PaymentFailed => "payment_failed",
            CheckoutState::CartCleaned => "cart_cleaned",
            CheckoutState::Done => "done",
        }
    }

    /// Whether `next` is a legal successor. Every non-terminal state may
    /// finish early into `Done` when a step fails.
    pub fn can_transition_to(&self, next: CheckoutState) -> bool {
        use CheckoutState::*;
        match (self, next) {
            (Done, _) => false,
            (_, Done) => true,
            (Idle, MethodSelected) => true,
            (MethodSelected, MethodSelected) => true,
            (MethodSelected, InsufficientFunds) => true,
            (MethodSelected, OrderCreating) => true,
            (OrderCreating, OrderCreated) => true,
            (OrderCreated, PaymentPending) => true,
            (PaymentPending, PaymentSucceeded) => true,
            (PaymentPending, PaymentFailed) => true,
            (PaymentSucceeded, CartCleaned) => true,
            _ => false,
        }
    }
}

/// Why a checkout attempt did not complete.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckoutError {
    /// Wallet balance does not cover the grand total. Nothing was created.
    #[error("Insufficient wallet balance: {balance} available, {required} required")]
    InsufficientFunds { balance: Money, required: Money },

    /// The wallet balance could not be fetched. Nothing was created.
    #[error("Could not check wallet balance: {0}")]
    BalanceUnavailable(ServiceError),

    /// The order backend refused or failed. No payment was attempted.
    #[error("Order could not be created: {0}")]
    OrderCreationFailed(ServiceError),

    /// The order exists but payment did not complete.
    #[error("Payment for order {order_id} failed: {reason}")]
    PaymentAttemptFailed { order_id: OrderId, reason: String },

    /// `pay` was called before a payment method was chosen.
    #[error("No payment method selected")]
    MethodNotSelected,

    /// Nothing selected to pay for.
    #[error("No items selected for checkout")]
    EmptySelection,

    /// Amounts could not be compared or computed.
    #[error("Pricing error: {0}")]
    Pricing(#[from] CommerceError),
}

/// In-progress checkout, owned by the caller until handed to `pay`.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutAttempt {
    method: Option<PaymentMethod>,
    transitions: Vec<CheckoutState>,
}

impl Default for CheckoutAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutAttempt {
    /// Start a fresh attempt in `Idle`.
    pub fn new() -> Self {
        Self {
            method: None,
            transitions: vec![CheckoutState::Idle],
        }
    }

    /// Record the chosen payment method. Funds are not checked here.
    pub fn select_payment_method(&mut self, method: PaymentMethod) {
        self.method = Some(method);
        self.enter(CheckoutState::MethodSelected);
    }

    /// Chosen method, if any.
    pub fn method(&self) -> Option<PaymentMethod> {
        self.method
    }

    /// Current state.
    pub fn state(&self) -> CheckoutState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(CheckoutState::Idle)
    }

    fn enter(&mut self, next: CheckoutState) {
        let current = self.state();
        debug_assert!(
            current.can_transition_to(next),
            "illegal checkout transition {:?} -> {:?}",
            current,
            next
        );
        if current == next {
            return;
        }
        tracing::debug!(from = current.as_str(), to = next.as_str(), "checkout transition");
        self.transitions.push(next);
    }
}

/// Proof of a completed payment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentReceipt {
    /// Paid order.
    pub order_id: OrderId,
    /// Amount charged.
    pub amount: Money,
    /// How it was paid.
    pub method: PaymentMethod,
    /// When payment completed.
    pub completed_at: DateTime<Utc>,
}

/// What happened during one `pay` call.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    /// Every state the attempt visited, in order, ending with `Done`.
    pub transitions: Vec<CheckoutState>,
    /// Receipt on success, reason on failure.
    pub result: Result<PaymentReceipt, CheckoutError>,
}

impl CheckoutOutcome {
    /// Check if payment completed.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Id of the order this attempt created, if it got that far.
    pub fn order_id(&self) -> Option<&OrderId> {
        match &self.result {
            Ok(receipt) => Some(&receipt.order_id),
            Err(CheckoutError::PaymentAttemptFailed { order_id, .. }) => Some(order_id),
            Err(_) => None,
        }
    }

    /// Human-readable summary for display.
    pub fn message(&self) -> String {
        match &self.result {
            Ok(receipt) => format!(
                "Payment of {} via {} completed for order {}",
                receipt.amount,
                receipt.method.display_name(),
                receipt.order_id
            ),
            Err(e) => e.to_string(),
        }
    }

    /// Last state reached. Always `Done` for outcomes returned by `pay`.
    pub fn final_state(&self) -> CheckoutState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(CheckoutState::Done)
    }

    /// Whether the attempt passed through `state`.
    pub fn visited(&self, state: CheckoutState) -> bool {
        self.transitions.contains(&state)
    }
}

/// Behaviour switches for the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutOptions {
    /// Cancel the created order when its payment fails. Off by default, which
    /// leaves the unpaid order in place.
    pub cancel_unpaid_orders: bool,
}

/// Sequences balance check, order creation, payment and post-payment cleanup.
pub struct CheckoutOrchestrator {
    session: Session,
    pricing: PricingConfig,
    cart: CartStore,
    history: OrderHistory,
    orders: Arc<dyn OrderService>,
    wallet: Arc<dyn WalletService>,
    gateway: Arc<dyn PaymentGateway>,
    options: CheckoutOptions,
}

impl std::fmt::Debug for CheckoutOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutOrchestrator")
            .field("user_id", &self.session.user_id)
            .field("pricing", &self.pricing)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CheckoutOrchestrator {
    /// Wire an orchestrator for `session`.
    pub fn new(
        session: Session,
        pricing: PricingConfig,
        cart: CartStore,
        history: OrderHistory,
        orders: Arc<dyn OrderService>,
        wallet: Arc<dyn WalletService>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            session,
            pricing,
            cart,
            history,
            orders,
            wallet,
            gateway,
            options: CheckoutOptions::default(),
        }
    }

    /// Override the default options.
    pub fn with_options(mut self, options: CheckoutOptions) -> Self {
        self.options = options;
        self
    }

    /// Pricing rules in effect.
    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    /// Start a fresh attempt.
    pub fn begin(&self) -> CheckoutAttempt {
        CheckoutAttempt::new()
    }

    /// Totals for `items` under this orchestrator's pricing rules.
    pub fn compute_totals(&self, items: &[CartLineItem]) -> Result<OrderTotals, CommerceError> {
        compute_totals(items, &self.pricing)
    }

    /// Snapshot the selected cart lines, price them and pay.
    pub async fn pay_selected(
        &self,
        attempt: CheckoutAttempt,
        shipping_address: ShippingAddress,
    ) -> CheckoutOutcome {
        let items = self.cart.selected_items();
        match self.compute_totals(&items) {
            Ok(totals) => self.pay(attempt, totals, items, shipping_address).await,
            Err(e) => finish(attempt, Err(CheckoutError::Pricing(e))),
        }
    }

    /// Run one payment attempt.
    ///
    /// `totals.grand_total` is the amount charged. The cart is only touched
    /// when payment completes, and then only to remove the purchased lines.
    pub async fn pay(
        &self,
        mut attempt: CheckoutAttempt,
        totals: OrderTotals,
        items: Vec<CartLineItem>,
        shipping_address: ShippingAddress,
    ) -> CheckoutOutcome {
        let result = self
            .run(&mut attempt, totals, items, shipping_address)
            .await;

        match &result {
            Ok(receipt) => tracing::info!(
                order_id = %receipt.order_id,
                amount = %receipt.amount,
                method = %receipt.method,
                "checkout completed"
            ),
            Err(e) => tracing::warn!(
                user_id = %self.session.user_id,
                state = attempt.state().as_str(),
                error = %e,
                "checkout failed"
            ),
        }

        finish(attempt, result)
    }

    async fn run(
        &self,
        attempt: &mut CheckoutAttempt,
        totals: OrderTotals,
        items: Vec<CartLineItem>,
        shipping_address: ShippingAddress,
    ) -> Result<PaymentReceipt, CheckoutError> {
        let method = attempt.method().ok_or(CheckoutError::MethodNotSelected)?;
        if items.is_empty() {
            return Err(CheckoutError::EmptySelection);
        }
        let amount = totals.grand_total;

        if method.is_wallet() {
            let balance = self
                .wallet
                .wallet_balance(&self.session.user_id)
                .await
                .map_err(CheckoutError::BalanceUnavailable)?;
            if balance.try_cmp(&amount)? == Ordering::Less {
                attempt.enter(CheckoutState::InsufficientFunds);
                return Err(CheckoutError::InsufficientFunds {
                    balance,
                    required: amount,
                });
            }
        }

        attempt.enter(CheckoutState::OrderCreating);
        let receipt = self
            .orders
            .create_order(NewOrder {
                order_id: OrderId::generate(),
                user_id: self.session.user_id.clone(),
                items: items.clone(),
                totals,
                method,
                shipping_address: shipping_address.clone(),
            })
            .await
            .map_err(CheckoutError::OrderCreationFailed)?;
        let order_id = receipt.order_id;
        attempt.enter(CheckoutState::OrderCreated);

        attempt.enter(CheckoutState::PaymentPending);
        let reason = match self.gateway.attempt(method, amount).await {
            Ok(PaymentStatus::Completed) => None,
            Ok(PaymentStatus::Failed) => Some("payment was declined".to_string()),
            Err(e) => Some(e.to_string()),
        };
        if let Some(reason) = reason {
            attempt.enter(CheckoutState::PaymentFailed);
            self.compensate(&order_id).await;
            return Err(CheckoutError::PaymentAttemptFailed { order_id, reason });
        }
        attempt.enter(CheckoutState::PaymentSucceeded);

        let completed_at = Utc::now();
        let purchased: Vec<ProductId> = items.iter().map(|i| i.id).collect();
        let completed = CompletedOrder {
            order_id: order_id.clone(),
            user_id: self.session.user_id.clone(),
            amount,
            totals,
            method,
            items,
            shipping_address,
            completed_at,
        };
        if let Err(e) = self.history.record(completed) {
            tracing::warn!(order_id = %order_id, error = %e, "failed to record completed order");
        }

        self.cart.remove_purchased(&purchased);
        attempt.enter(CheckoutState::CartCleaned);

        Ok(PaymentReceipt {
            order_id,
            amount,
            method,
            completed_at,
        })
    }

    async fn compensate(&self, order_id: &OrderId) {
        if !self.options.cancel_unpaid_orders {
            tracing::debug!(order_id = %order_id, "leaving unpaid order in place");
            return;
        }
        match self.orders.cancel_order(order_id).await {
            Ok(()) => tracing::info!(order_id = %order_id, "cancelled unpaid order"),
            Err(e) => {
                tracing::warn!(order_id = %order_id, error = %e, "failed to cancel unpaid order")
            }
        }
    }
}

fn finish(
    mut attempt: CheckoutAttempt,
    result: Result<PaymentReceipt, CheckoutError>,
) -> CheckoutOutcome {
    attempt.enter(CheckoutState::Done);
    CheckoutOutcome {
        transitions: attempt.transitions,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_attempt_is_idle() {
        let attempt = CheckoutAttempt::new();
        assert_eq!(attempt.state(), CheckoutState::Idle);
        assert!(attempt.method().is_none());
    }

    #[test]
    fn test_reselecting_method_stays_in_method_selected() {
        let mut attempt = CheckoutAttempt::new();
        attempt.select_payment_method(PaymentMethod::Visa);
        attempt.select_payment_method(PaymentMethod::Wallet);

        assert_eq!(attempt.method(), Some(PaymentMethod::Wallet));
        assert_eq!(
            attempt.transitions,
            vec![CheckoutState::Idle, CheckoutState::MethodSelected]
        );
    }

    #[test]
    fn test_done_is_terminal() {
        use CheckoutState::*;
        for state in [Idle, MethodSelected, PaymentPending, Done] {
            assert!(!Done.can_transition_to(state));
        }
        assert!(PaymentPending.can_transition_to(PaymentFailed));
        assert!(!PaymentFailed.can_transition_to(CartCleaned));
        assert!(!OrderCreated.can_transition_to(MethodSelected));
    }

    #[test]
    fn test_outcome_message_for_failure() {
        let outcome = finish(CheckoutAttempt::new(), Err(CheckoutError::MethodNotSelected));
        assert_eq!(outcome.message(), "No payment method selected");
        assert_eq!(
            outcome.transitions,
            vec![CheckoutState::Idle, CheckoutState::Done]
        );
        assert!(outcome.order_id().is_none());
    }
}
