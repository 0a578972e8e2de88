//! Booking cancellation settlement orchestration.
//!
//! Drives the capture/refund/void sequence for a cancelled booking paid
//! through a deposit intent and a balance intent:
//!
//! - [`ProcessorClient`]: the injected payment-processor boundary
//! - [`SettlementEngine`]: dual-intent settlement, deposit before balance
//! - Compensating off-session charge when a partial capture is rejected
//! - [`MockProcessor`]: in-memory processor double with scriptable
//!   failures and a recorded call log
//!
//! Fee math, policy evaluation, and the outcome types live in
//! `settlement-core`; this crate adds the async orchestration on top.

pub mod compensation;
pub mod engine;
pub mod error;
pub mod processor;

// Re-export the engine API
pub use compensation::build_compensating_charge;
pub use engine::{EngineConfig, SettlementEngine};
pub use error::{EngineError, EngineResult};
pub use processor::{MockProcessor, ProcessorClient, RecordedCall};

// Re-export the domain layer so callers need only one dependency
pub use settlement_core;
pub use settlement_core::{
    CancellationActor, CancellationPolicy, CancellationQuote, CancellationRequest, PaymentRecord,
    PaymentStatus, SettlementOutcome,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
