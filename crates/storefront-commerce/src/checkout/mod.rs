//! Checkout module.
//!
//! Payment methods, the backend seams, the simulated gateway, the checkout
//! orchestrator and the record of completed orders.

mod address;
mod gateway;
mod orchestrator;
mod order;
mod payment;
mod services;

pub use address::ShippingAddress;
pub use gateway::{
    GatewayError, GatewayMode, PaymentGateway, SimulatedGateway, CARD_SUCCESS_RATE,
    WALLET_SUCCESS_RATE,
};
pub use orchestrator::{
    CheckoutAttempt, CheckoutError, CheckoutOptions, CheckoutOrchestrator, CheckoutOutcome,
    CheckoutState, PaymentReceipt,
};
pub use order::{CompletedOrder, OrderHistory};
pub use payment::{MethodKind, PaymentMethod, PaymentStatus};
pub use services::{NewOrder, OrderReceipt, OrderService, ServiceError, WalletService};
