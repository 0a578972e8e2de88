//! Core type definitions for cancellation settlement.

pub mod common;
pub mod payment;
pub mod processor;

// Re-export commonly used types
pub use common::{
    BookingId, CancellationActor, ConnectedAccountId, CustomerId, IdempotencyKey, PaymentIntentId,
    PaymentMethodId, RefundId,
};
pub use payment::{CancellationPolicy, CancellationRequest, PaymentRecord, PaymentStatus};
pub use processor::{
    CancelRequest, CaptureRequest, ChargeReceipt, ChargeRequest, DestinationTransfer,
    IntentSnapshot, IntentStatus, ProcessorOp, RefundReceipt, RefundRequest,
};
