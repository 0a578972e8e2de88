//! Payment records, cancellation policies, and cancellation requests.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{SettlementError, SettlementResult};
use crate::types::common::{
    BookingId, CancellationActor, ConnectedAccountId, CustomerId, PaymentIntentId, PaymentMethodId,
};

// ============================================================
// Payment status
// ============================================================

/// Lifecycle status of a booking payment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Funds are authorized but not yet captured
    Authorized,
    /// Funds have been captured in full
    Paid,
    /// The payment was cancelled with money returned to the client
    Refunded,
    /// The payment was cancelled with a fee retained
    PartiallyRefunded,
    /// The payment was cancelled with no money movement
    Cancelled,
    /// Settlement hit an unrecoverable error and needs operator attention
    Failed,
}

impl PaymentStatus {
    /// Get status name for logging
    pub fn name(&self) -> &'static str {
        match self {
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::PartiallyRefunded => "partially_refunded",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================
// Payment record
// ============================================================

/// The persisted payment state for one booking.
///
/// A booking is paid through up to two payment intents: an optional
/// deposit taken at booking time and a balance intent placed closer to
/// the appointment. Either side may be absent. All amounts are decimal
/// major units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Booking this payment belongs to
    pub booking_id: BookingId,
    /// Service price excluding tip
    pub amount: Decimal,
    /// Tip amount, zero when none was given
    pub tip_amount: Decimal,
    /// Non-refundable platform service fee paid by the client
    pub service_fee: Decimal,
    /// Portion of the price taken as a deposit, zero when none
    pub deposit_amount: Decimal,
    /// Remainder charged via the balance intent
    pub balance_amount: Decimal,
    /// Processor intent holding the deposit
    pub deposit_intent_id: Option<PaymentIntentId>,
    /// Processor intent holding the balance
    pub balance_intent_id: Option<PaymentIntentId>,
    /// Processor customer the payment instrument belongs to
    pub customer_id: CustomerId,
    /// Payment instrument used for the booking
    pub payment_method_id: PaymentMethodId,
    /// Current lifecycle status
    pub status: PaymentStatus,
}

impl PaymentRecord {
    pub fn new(
        booking_id: BookingId,
        customer_id: CustomerId,
        payment_method_id: PaymentMethodId,
        amount: Decimal,
    ) -> Self {
        Self {
            booking_id,
            amount,
            tip_amount: Decimal::ZERO,
            service_fee: Decimal::ZERO,
            deposit_amount: Decimal::ZERO,
            balance_amount: amount,
            deposit_intent_id: None,
            balance_intent_id: None,
            customer_id,
            payment_method_id,
            status: PaymentStatus::Authorized,
        }
    }

    pub fn with_tip(mut self, tip_amount: Decimal) -> Self {
        self.tip_amount = tip_amount;
        self
    }

    pub fn with_service_fee(mut self, service_fee: Decimal) -> Self {
        self.service_fee = service_fee;
        self
    }

    /// Record a deposit split: the deposit is carved out of the service
    /// price, the balance shrinks accordingly.
    pub fn with_deposit(mut self, deposit_amount: Decimal, intent_id: PaymentIntentId) -> Self {
        self.deposit_amount = deposit_amount;
        self.balance_amount = self.amount - deposit_amount;
        self.deposit_intent_id = Some(intent_id);
        self
    }

    pub fn with_balance_intent(mut self, intent_id: PaymentIntentId) -> Self {
        self.balance_intent_id = Some(intent_id);
        self
    }

    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }

    /// Total the client paid for the appointment: service price plus tip.
    ///
    /// This is both the base the cancellation fee is computed against and
    /// the starting point of refund math.
    pub fn total_paid(&self) -> Decimal {
        self.amount + self.tip_amount
    }

    pub fn has_deposit(&self) -> bool {
        self.deposit_amount > Decimal::ZERO && self.deposit_intent_id.is_some()
    }

    /// Check that every stored amount is non-negative.
    pub fn validate(&self) -> SettlementResult<()> {
        let fields = [
            ("amount", self.amount),
            ("tip_amount", self.tip_amount),
            ("service_fee", self.service_fee),
            ("deposit_amount", self.deposit_amount),
            ("balance_amount", self.balance_amount),
        ];
        for (field, value) in fields {
            if value < Decimal::ZERO {
                return Err(SettlementError::invalid_amount(
                    field,
                    format!("must not be negative, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================
// Cancellation policy
// ============================================================

/// A professional's time-based cancellation fee policy.
///
/// Percentages are whole-number percent values (50 means 50%). A `None`
/// percentage falls back to the platform default for that window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CancellationPolicy {
    /// Whether the professional charges cancellation fees at all
    pub enabled: bool,
    /// Fee percentage when cancelling under 24 hours before start
    pub within_24h_pct: Option<Decimal>,
    /// Fee percentage when cancelling between 24 and 48 hours before start
    pub within_48h_pct: Option<Decimal>,
}

impl CancellationPolicy {
    /// Platform default percentage for the under-24-hours window
    pub fn default_within_24h_pct() -> Decimal {
        Decimal::new(50, 0)
    }

    /// Platform default percentage for the 24-to-48-hours window
    pub fn default_within_48h_pct() -> Decimal {
        Decimal::new(25, 0)
    }

    /// Policy that never charges a fee
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            within_24h_pct: None,
            within_48h_pct: None,
        }
    }

    pub fn new(within_24h_pct: Option<Decimal>, within_48h_pct: Option<Decimal>) -> Self {
        Self {
            enabled: true,
            within_24h_pct,
            within_48h_pct,
        }
    }

    /// Effective percentage for the under-24-hours window
    pub fn within_24h_or_default(&self) -> Decimal {
        self.within_24h_pct
            .unwrap_or_else(Self::default_within_24h_pct)
    }

    /// Effective percentage for the 24-to-48-hours window
    pub fn within_48h_or_default(&self) -> Decimal {
        self.within_48h_pct
            .unwrap_or_else(Self::default_within_48h_pct)
    }

    /// Check that configured percentages are within 0..=100.
    pub fn validate(&self) -> SettlementResult<()> {
        let hundred = Decimal::ONE_HUNDRED;
        for (field, value) in [
            ("within_24h_pct", self.within_24h_pct),
            ("within_48h_pct", self.within_48h_pct),
        ] {
            if let Some(pct) = value {
                if pct < Decimal::ZERO || pct > hundred {
                    return Err(SettlementError::invalid_amount(
                        field,
                        format!("percentage must be between 0 and 100, got {}", pct),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self::new(None, None)
    }
}

// ============================================================
// Cancellation request
// ============================================================

/// Everything the settlement engine needs to cancel one booking.
///
/// Assembled by the caller from the booking, its payment record, and the
/// professional's policy. Not persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CancellationRequest {
    /// Payment state of the booking being cancelled
    pub payment: PaymentRecord,
    /// The professional's cancellation policy
    pub policy: CancellationPolicy,
    /// Scheduled appointment start time
    pub appointment_start: DateTime<Utc>,
    /// Who initiated the cancellation
    pub actor: CancellationActor,
    /// Free-form reason supplied by the actor
    pub reason: Option<String>,
    /// Apply the fee policy even for professional cancellations
    pub force_policy: bool,
    /// Connected account receiving the professional's share of a
    /// compensating charge
    pub payout_destination: Option<ConnectedAccountId>,
}

impl CancellationRequest {
    pub fn new(
        payment: PaymentRecord,
        policy: CancellationPolicy,
        appointment_start: DateTime<Utc>,
        actor: CancellationActor,
    ) -> Self {
        Self {
            payment,
            policy,
            appointment_start,
            actor,
            reason: None,
            force_policy: false,
            payout_destination: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_force_policy(mut self, force_policy: bool) -> Self {
        self.force_policy = force_policy;
        self
    }

    pub fn with_payout_destination(mut self, destination: ConnectedAccountId) -> Self {
        self.payout_destination = Some(destination);
        self
    }
}
