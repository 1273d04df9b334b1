//! End-to-end checkout tests against in-memory collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use storefront_commerce::prelude::*;
use storefront_kv::{Cache, MemoryStore};

#[derive(Default)]
struct RecordingOrders {
    created: Mutex<Vec<NewOrder>>,
    cancelled: Mutex<Vec<OrderId>>,
    fail_create: bool,
    fail_cancel: bool,
}

impl RecordingOrders {
    fn create_calls(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    fn cancel_calls(&self) -> usize {
        self.cancelled.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderService for RecordingOrders {
    async fn create_order(&self, order: NewOrder) -> Result<OrderReceipt, ServiceError> {
        let order_id = order.order_id.clone();
        self.created.lock().unwrap().push(order);
        if self.fail_create {
            return Err(ServiceError::Unavailable {
                service: "orders",
                message: "connection refused".to_string(),
            });
        }
        Ok(OrderReceipt { order_id })
    }

    async fn cancel_order(&self, order_id: &OrderId) -> Result<(), ServiceError> {
        self.cancelled.lock().unwrap().push(order_id.clone());
        if self.fail_cancel {
            return Err(ServiceError::Rejected {
                service: "orders",
                message: "already paid".to_string(),
            });
        }
        Ok(())
    }
}

struct FixedWallet {
    balance: Option<Money>,
    calls: AtomicUsize,
}

impl FixedWallet {
    fn with_balance(cents: i64) -> Self {
        Self {
            balance: Some(Money::new(cents, Currency::USD)),
            calls: AtomicUsize::new(0),
        }
    }

    fn unavailable() -> Self {
        Self {
            balance: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl WalletService for FixedWallet {
    async fn wallet_balance(&self, _user_id: &UserId) -> Result<Money, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.balance.ok_or_else(|| ServiceError::Unavailable {
            service: "profile",
            message: "timeout".to_string(),
        })
    }
}

struct Harness {
    cart: CartStore,
    history: OrderHistory,
    orders: Arc<RecordingOrders>,
    wallet: Arc<FixedWallet>,
    orchestrator: CheckoutOrchestrator,
}

fn harness(
    orders: RecordingOrders,
    wallet: FixedWallet,
    gateway: SimulatedGateway,
    options: CheckoutOptions,
) -> Harness {
    let cache = Cache::new(Arc::new(MemoryStore::new()));
    let session = Session::login(UserId::new("u-1"), "ada");
    let cart = CartStore::new(cache.clone(), &session);
    let history = OrderHistory::new(cache, &session);
    let orders = Arc::new(orders);
    let wallet = Arc::new(wallet);

    let orchestrator = CheckoutOrchestrator::new(
        session,
        PricingConfig::default(),
        cart.clone(),
        history.clone(),
        orders.clone(),
        wallet.clone(),
        Arc::new(gateway),
    )
    .with_options(options);

    Harness {
        cart,
        history,
        orders,
        wallet,
        orchestrator,
    }
}

fn usd(cents: i64) -> Money {
    Money::new(cents, Currency::USD)
}

fn address() -> ShippingAddress {
    ShippingAddress::new("Ada Lovelace", "1 Main St, Springfield")
}

/// Cart with A (10.00 x2, selected) and B (5.00 x1, not selected).
fn fill_cart(cart: &CartStore) {
    cart.add_item(ProductId::new(1), "A", usd(1000), 2, None);
    cart.add_item(ProductId::new(2), "B", usd(500), 1, None);
    cart.set_selected(ProductId::new(2), false);
}

fn attempt_with(method: PaymentMethod) -> CheckoutAttempt {
    let mut attempt = CheckoutAttempt::new();
    attempt.select_payment_method(method);
    attempt
}

#[tokio::test]
async fn test_wallet_with_insufficient_balance_creates_nothing() {
    let h = harness(
        RecordingOrders::default(),
        FixedWallet::with_balance(1000),
        SimulatedGateway::AlwaysSucceed,
        CheckoutOptions::default(),
    );
    fill_cart(&h.cart);
    let items = h.cart.selected_items();
    let totals = h.orchestrator.compute_totals(&items).unwrap();
    assert_eq!(totals.grand_total, usd(2680));

    let outcome = h
        .orchestrator
        .pay(attempt_with(PaymentMethod::Wallet), totals, items, address())
        .await;

    assert_eq!(
        outcome.result,
        Err(CheckoutError::InsufficientFunds {
            balance: usd(1000),
            required: usd(2680),
        })
    );
    assert!(outcome.order_id().is_none());
    assert_eq!(
        outcome.transitions,
        vec![
            CheckoutState::Idle,
            CheckoutState::MethodSelected,
            CheckoutState::InsufficientFunds,
            CheckoutState::Done,
        ]
    );
    assert_eq!(h.orders.create_calls(), 0);
    assert_eq!(h.cart.list().len(), 2);
}

#[tokio::test]
async fn test_wallet_exact_balance_pays() {
    let exact = harness(
        RecordingOrders::default(),
        FixedWallet::with_balance(2680),
        SimulatedGateway::AlwaysSucceed,
        CheckoutOptions::default(),
    );
    fill_cart(&exact.cart);

    let outcome = exact
        .orchestrator
        .pay_selected(attempt_with(PaymentMethod::Wallet), address())
        .await;
    assert!(outcome.is_success(), "{}", outcome.message());
    assert_eq!(outcome.result.as_ref().unwrap().amount, usd(2680));
    assert_eq!(exact.orders.create_calls(), 1);

    let short = harness(
        RecordingOrders::default(),
        FixedWallet::with_balance(2679),
        SimulatedGateway::AlwaysSucceed,
        CheckoutOptions::default(),
    );
    fill_cart(&short.cart);

    let outcome = short
        .orchestrator
        .pay_selected(attempt_with(PaymentMethod::Wallet), address())
        .await;
    assert_eq!(
        outcome.result,
        Err(CheckoutError::InsufficientFunds {
            balance: usd(2679),
            required: usd(2680),
        })
    );
    assert_eq!(short.orders.create_calls(), 0);
}

#[tokio::test]
async fn test_successful_payment_removes_only_purchased_lines() {
    let h = harness(
        RecordingOrders::default(),
        FixedWallet::with_balance(10_000),
        SimulatedGateway::AlwaysSucceed,
        CheckoutOptions::default(),
    );
    fill_cart(&h.cart);

    let outcome = h
        .orchestrator
        .pay_selected(attempt_with(PaymentMethod::Wallet), address())
        .await;

    assert!(outcome.is_success(), "{}", outcome.message());
    assert_eq!(
        outcome.transitions,
        vec![
            CheckoutState::Idle,
            CheckoutState::MethodSelected,
            CheckoutState::OrderCreating,
            CheckoutState::OrderCreated,
            CheckoutState::PaymentPending,
            CheckoutState::PaymentSucceeded,
            CheckoutState::CartCleaned,
            CheckoutState::Done,
        ]
    );

    let receipt = outcome.result.as_ref().unwrap();
    assert_eq!(receipt.amount, usd(2680));
    assert_eq!(receipt.method, PaymentMethod::Wallet);

    let remaining = h.cart.list();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, ProductId::new(2));

    let recorded = h.history.get(&receipt.order_id).unwrap().unwrap();
    assert_eq!(recorded.amount, usd(2680));
    assert_eq!(recorded.product_ids(), vec![ProductId::new(1)]);
    assert_eq!(h.orders.create_calls(), 1);
}

#[tokio::test]
async fn test_card_payment_skips_wallet_balance() {
    let h = harness(
        RecordingOrders::default(),
        FixedWallet::with_balance(0),
        SimulatedGateway::AlwaysSucceed,
        CheckoutOptions::default(),
    );
    fill_cart(&h.cart);

    let outcome = h
        .orchestrator
        .pay_selected(attempt_with(PaymentMethod::Visa), address())
        .await;

    assert!(outcome.is_success());
    assert_eq!(h.wallet.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_declined_payment_leaves_cart_and_history_untouched() {
    let h = harness(
        RecordingOrders::default(),
        FixedWallet::with_balance(10_000),
        SimulatedGateway::AlwaysFail,
        CheckoutOptions::default(),
    );
    fill_cart(&h.cart);
    let before = h.cart.list();

    let outcome = h
        .orchestrator
        .pay_selected(attempt_with(PaymentMethod::Mastercard), address())
        .await;

    assert!(matches!(
        outcome.result,
        Err(CheckoutError::PaymentAttemptFailed { .. })
    ));
    assert!(outcome.visited(CheckoutState::PaymentFailed));
    assert!(!outcome.visited(CheckoutState::CartCleaned));
    assert!(outcome.order_id().is_some());

    assert_eq!(h.cart.list(), before);
    assert!(h.history.list().unwrap().is_empty());
    assert_eq!(h.orders.cancel_calls(), 0);
}

#[tokio::test]
async fn test_declined_payment_cancels_order_when_enabled() {
    let h = harness(
        RecordingOrders::default(),
        FixedWallet::with_balance(10_000),
        SimulatedGateway::AlwaysFail,
        CheckoutOptions {
            cancel_unpaid_orders: true,
        },
    );
    fill_cart(&h.cart);

    let outcome = h
        .orchestrator
        .pay_selected(attempt_with(PaymentMethod::PayPal), address())
        .await;

    let order_id = outcome.order_id().cloned().unwrap();
    assert_eq!(*h.orders.cancelled.lock().unwrap(), vec![order_id]);
}

#[tokio::test]
async fn test_cancellation_failure_keeps_payment_error() {
    let h = harness(
        RecordingOrders {
            fail_cancel: true,
            ..Default::default()
        },
        FixedWallet::with_balance(10_000),
        SimulatedGateway::AlwaysFail,
        CheckoutOptions {
            cancel_unpaid_orders: true,
        },
    );
    fill_cart(&h.cart);

    let outcome = h
        .orchestrator
        .pay_selected(attempt_with(PaymentMethod::Amex), address())
        .await;

    assert!(matches!(
        outcome.result,
        Err(CheckoutError::PaymentAttemptFailed { .. })
    ));
    assert_eq!(h.orders.cancel_calls(), 1);
}

#[tokio::test]
async fn test_order_creation_failure_stops_before_payment() {
    let h = harness(
        RecordingOrders {
            fail_create: true,
            ..Default::default()
        },
        FixedWallet::with_balance(10_000),
        SimulatedGateway::AlwaysSucceed,
        CheckoutOptions::default(),
    );
    fill_cart(&h.cart);

    let outcome = h
        .orchestrator
        .pay_selected(attempt_with(PaymentMethod::Alipay), address())
        .await;

    assert!(matches!(
        outcome.result,
        Err(CheckoutError::OrderCreationFailed(_))
    ));
    assert!(!outcome.visited(CheckoutState::PaymentPending));
    assert_eq!(outcome.final_state(), CheckoutState::Done);
    assert_eq!(h.cart.list().len(), 2);
}

#[tokio::test]
async fn test_unavailable_balance_is_reported() {
    let h = harness(
        RecordingOrders::default(),
        FixedWallet::unavailable(),
        SimulatedGateway::AlwaysSucceed,
        CheckoutOptions::default(),
    );
    fill_cart(&h.cart);

    let outcome = h
        .orchestrator
        .pay_selected(attempt_with(PaymentMethod::Wallet), address())
        .await;

    assert!(matches!(
        outcome.result,
        Err(CheckoutError::BalanceUnavailable(_))
    ));
    assert_eq!(h.orders.create_calls(), 0);
}

#[tokio::test]
async fn test_pay_without_method_or_items() {
    let h = harness(
        RecordingOrders::default(),
        FixedWallet::with_balance(10_000),
        SimulatedGateway::AlwaysSucceed,
        CheckoutOptions::default(),
    );

    let outcome = h
        .orchestrator
        .pay_selected(CheckoutAttempt::new(), address())
        .await;
    assert_eq!(outcome.result, Err(CheckoutError::MethodNotSelected));

    let outcome = h
        .orchestrator
        .pay_selected(attempt_with(PaymentMethod::WeChatPay), address())
        .await;
    assert_eq!(outcome.result, Err(CheckoutError::EmptySelection));
    assert_eq!(h.orders.create_calls(), 0);
}

#[tokio::test]
async fn test_amount_charged_is_grand_total_at_initiation() {
    let h = harness(
        RecordingOrders::default(),
        FixedWallet::with_balance(10_000),
        SimulatedGateway::AlwaysSucceed,
        CheckoutOptions::default(),
    );
    fill_cart(&h.cart);
    let items = h.cart.selected_items();
    let totals = h.orchestrator.compute_totals(&items).unwrap();

    // Cart changes after pricing do not affect the charged amount.
    h.cart.update_quantity(ProductId::new(1), 5);

    let outcome = h
        .orchestrator
        .pay(attempt_with(PaymentMethod::Visa), totals, items, address())
        .await;

    assert_eq!(outcome.result.unwrap().amount, usd(2680));
    let created = h.orders.created.lock().unwrap();
    assert_eq!(created[0].totals.grand_total, usd(2680));
}
