//! Typed requests and responses for the payment processor boundary.
//!
//! Amounts at this boundary are integer minor units. Wire statuses are
//! collapsed into [`IntentStatus`] at the edge so the settlement logic
//! never matches on raw processor strings.

use serde::{Deserialize, Serialize};

use crate::types::common::{
    ConnectedAccountId, CustomerId, IdempotencyKey, PaymentIntentId, PaymentMethodId, RefundId,
};

// ============================================================
// Operations
// ============================================================

/// Processor operations the settlement engine performs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorOp {
    RetrieveIntent,
    CaptureIntent,
    CancelIntent,
    CreateRefund,
    CreateCharge,
}

impl ProcessorOp {
    /// Get operation name for logging
    pub fn name(&self) -> &'static str {
        match self {
            ProcessorOp::RetrieveIntent => "retrieve_intent",
            ProcessorOp::CaptureIntent => "capture_intent",
            ProcessorOp::CancelIntent => "cancel_intent",
            ProcessorOp::CreateRefund => "create_refund",
            ProcessorOp::CreateCharge => "create_charge",
        }
    }
}

impl std::fmt::Display for ProcessorOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================
// Intent status
// ============================================================

/// Normalized payment intent status.
///
/// Wire statuses the settlement flow does not act on (processing,
/// requires_confirmation, and anything the processor adds later) map to
/// `Other` and are treated as requiring no action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    /// Funds are held and can be captured or released
    Authorized,
    /// Funds have been captured
    Captured,
    /// The authorization was released
    Voided,
    /// Any state the settlement flow does not act on
    Other,
}

impl IntentStatus {
    /// Map a raw processor status string to the normalized status.
    pub fn from_wire(status: &str) -> Self {
        match status {
            "requires_capture" => IntentStatus::Authorized,
            "succeeded" => IntentStatus::Captured,
            "canceled" => IntentStatus::Voided,
            _ => IntentStatus::Other,
        }
    }

    /// Get status name for logging
    pub fn name(&self) -> &'static str {
        match self {
            IntentStatus::Authorized => "authorized",
            IntentStatus::Captured => "captured",
            IntentStatus::Voided => "voided",
            IntentStatus::Other => "other",
        }
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Point-in-time view of a payment intent at the processor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSnapshot {
    pub intent_id: PaymentIntentId,
    pub status: IntentStatus,
    /// Amount the intent was created for, in minor units
    pub amount_minor: i64,
    /// Amount actually captured so far, in minor units
    pub amount_received_minor: i64,
}

impl IntentSnapshot {
    /// Snapshot of an uncaptured authorization
    pub fn authorized(intent_id: PaymentIntentId, amount_minor: i64) -> Self {
        Self {
            intent_id,
            status: IntentStatus::Authorized,
            amount_minor,
            amount_received_minor: 0,
        }
    }

    /// Snapshot of a fully captured intent
    pub fn captured(intent_id: PaymentIntentId, amount_minor: i64) -> Self {
        Self {
            intent_id,
            status: IntentStatus::Captured,
            amount_minor,
            amount_received_minor: amount_minor,
        }
    }

    /// Snapshot of a voided intent
    pub fn voided(intent_id: PaymentIntentId, amount_minor: i64) -> Self {
        Self {
            intent_id,
            status: IntentStatus::Voided,
            amount_minor,
            amount_received_minor: 0,
        }
    }
}

// ============================================================
// Requests
// ============================================================

/// Capture some or all of an authorized intent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub intent_id: PaymentIntentId,
    /// Amount to capture in minor units; `None` captures the full
    /// authorized amount
    pub amount_minor: Option<i64>,
    pub idempotency_key: IdempotencyKey,
}

impl CaptureRequest {
    pub fn full(intent_id: PaymentIntentId) -> Self {
        Self {
            intent_id,
            amount_minor: None,
            idempotency_key: IdempotencyKey::generate(),
        }
    }

    pub fn partial(intent_id: PaymentIntentId, amount_minor: i64) -> Self {
        Self {
            intent_id,
            amount_minor: Some(amount_minor),
            idempotency_key: IdempotencyKey::generate(),
        }
    }
}

/// Void an authorized intent, releasing the hold
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    pub intent_id: PaymentIntentId,
    /// Reason forwarded to the processor
    pub reason: Option<String>,
    pub idempotency_key: IdempotencyKey,
}

impl CancelRequest {
    pub fn new(intent_id: PaymentIntentId) -> Self {
        Self {
            intent_id,
            reason: None,
            idempotency_key: IdempotencyKey::generate(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Refund part or all of a captured intent
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundRequest {
    pub intent_id: PaymentIntentId,
    /// Amount to refund in minor units; `None` refunds the remaining
    /// captured amount
    pub amount_minor: Option<i64>,
    pub reason: Option<String>,
    pub idempotency_key: IdempotencyKey,
}

impl RefundRequest {
    pub fn full(intent_id: PaymentIntentId) -> Self {
        Self {
            intent_id,
            amount_minor: None,
            reason: None,
            idempotency_key: IdempotencyKey::generate(),
        }
    }

    pub fn partial(intent_id: PaymentIntentId, amount_minor: i64) -> Self {
        Self {
            intent_id,
            amount_minor: Some(amount_minor),
            reason: None,
            idempotency_key: IdempotencyKey::generate(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Funds routed to a professional's connected account as part of a charge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationTransfer {
    pub destination: ConnectedAccountId,
    /// Share forwarded to the destination, in minor units
    pub amount_minor: i64,
}

/// Create and confirm a new charge against a stored payment method.
///
/// Used for the compensating fee charge when an existing authorization
/// cannot be partially captured.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub customer_id: CustomerId,
    pub payment_method_id: PaymentMethodId,
    /// Charge without the customer present
    pub off_session: bool,
    /// Confirm immediately instead of leaving the intent pending
    pub confirm: bool,
    pub description: Option<String>,
    pub transfer: Option<DestinationTransfer>,
    pub idempotency_key: IdempotencyKey,
}

impl ChargeRequest {
    pub fn new(
        amount_minor: i64,
        currency: impl Into<String>,
        customer_id: CustomerId,
        payment_method_id: PaymentMethodId,
    ) -> Self {
        Self {
            amount_minor,
            currency: currency.into(),
            customer_id,
            payment_method_id,
            off_session: false,
            confirm: true,
            description: None,
            transfer: None,
            idempotency_key: IdempotencyKey::generate(),
        }
    }

    pub fn off_session(mut self) -> Self {
        self.off_session = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_transfer(mut self, transfer: DestinationTransfer) -> Self {
        self.transfer = Some(transfer);
        self
    }
}

// ============================================================
// Receipts
// ============================================================

/// Result of a successful refund
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundReceipt {
    pub refund_id: RefundId,
    pub intent_id: PaymentIntentId,
    pub amount_minor: i64,
}

/// Result of a successful compensating charge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeReceipt {
    pub intent_id: PaymentIntentId,
    pub amount_minor: i64,
    /// Share forwarded to the connected account, if any
    pub transferred_minor: Option<i64>,
}
