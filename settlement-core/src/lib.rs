//! Booking cancellation settlement domain model.
//!
//! Pure types and money math for settling cancelled bookings that were
//! paid through up to two payment intents (deposit and balance):
//!
//! - Time-based cancellation fee policies and their evaluation
//! - Fee allocation across the deposit and balance intents
//! - Refund-amount math and pre-cancellation quotes
//! - Typed requests, responses, and errors for the processor boundary
//! - Settlement outcomes and the payment status derived from them
//!
//! Everything here is synchronous and side-effect free; orchestration
//! against a live processor lives in `settlement-engine`.

pub mod error;
pub mod fees;
pub mod money;
pub mod outcome;
pub mod policy;
pub mod quote;
pub mod types;

// Re-export error types
pub use error::{ProcessorError, SettlementError, SettlementResult};

// Re-export money helpers
pub use money::{from_minor_units, to_minor_units};

// Re-export domain types
pub use fees::FeeBreakdown;
pub use outcome::SettlementOutcome;
pub use policy::{hours_until, PolicyCalculator, PolicyDecision};
pub use quote::{refund_amount_for, CancellationQuote};
pub use types::{
    BookingId, CancellationActor, CancellationPolicy, CancellationRequest, CancelRequest,
    CaptureRequest, ChargeReceipt, ChargeRequest, ConnectedAccountId, CustomerId,
    DestinationTransfer, IdempotencyKey, IntentSnapshot, IntentStatus, PaymentIntentId,
    PaymentMethodId, PaymentRecord, PaymentStatus, ProcessorOp, RefundId, RefundReceipt,
    RefundRequest,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
