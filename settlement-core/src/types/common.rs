//! Basic identifier types.
//!
//! Naming conventions:
//! - `_id` suffix: primary key identifiers
//! - all identifiers are opaque strings issued by the datastore or the
//!   payment processor; they are newtypes so they cannot be swapped by
//!   accident

use serde::{Deserialize, Serialize};

// ============================================================
// Processor-issued identifiers
// ============================================================

/// Payment intent identifier issued by the payment processor
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentIntentId(pub String);

impl PaymentIntentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentIntentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Refund identifier issued by the payment processor
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefundId(pub String);

impl RefundId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stored customer identifier at the payment processor
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stored payment instrument identifier at the payment processor
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentMethodId(pub String);

impl PaymentMethodId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Connected payout account identifier for a professional
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectedAccountId(pub String);

impl ConnectedAccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================
// Platform identifiers
// ============================================================

/// Booking identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingId(pub String);

impl BookingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Idempotency key attached to every mutating processor request
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey(pub String);

impl IdempotencyKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================
// Core enums
// ============================================================

/// The party initiating a cancellation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationActor {
    /// The client who booked the appointment
    Client,
    /// The professional providing the service
    Professional,
}

impl CancellationActor {
    /// Get actor name for logging
    pub fn name(&self) -> &'static str {
        match self {
            CancellationActor::Client => "client",
            CancellationActor::Professional => "professional",
        }
    }

    pub fn is_professional(&self) -> bool {
        matches!(self, CancellationActor::Professional)
    }
}

impl std::fmt::Display for CancellationActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
