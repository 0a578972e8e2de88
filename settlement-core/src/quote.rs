//! Pre-cancellation quote: fee, refund, and window in one shot.
//!
//! The quote is pure math over the payment record and policy. The
//! settlement engine computes the same numbers before touching the
//! processor, so what a client is shown is exactly what gets settled.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SettlementResult;
use crate::fees::FeeBreakdown;
use crate::money::to_minor_units;
use crate::policy::{hours_until, PolicyCalculator, PolicyDecision};
use crate::types::{CancellationActor, CancellationPolicy, PaymentRecord};

/// Expected refund for a cancellation, before processor state is known.
///
/// Professionals return the full amount including tip. Clients get the
/// total back minus the non-refundable service fee and any cancellation
/// charge, floored at zero.
pub fn refund_amount_for(
    record: &PaymentRecord,
    actor: CancellationActor,
    charge_amount: Decimal,
) -> Decimal {
    if actor.is_professional() {
        return record.total_paid();
    }
    (record.total_paid() - record.service_fee - charge_amount).max(Decimal::ZERO)
}

/// Everything a caller needs to present a cancellation to the user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CancellationQuote {
    pub actor: CancellationActor,
    /// Signed fractional hours between quote time and appointment start
    pub hours_until_appointment: Decimal,
    /// Fee percentage the policy selected (0 to 100)
    pub charge_percentage: Decimal,
    /// Whether the cancellation fell inside a chargeable window
    pub within_policy_window: bool,
    /// Fee allocation across the deposit and balance intents
    pub fees: FeeBreakdown,
    /// Total cancellation fee in major units
    pub charge_amount: Decimal,
    /// Expected refund to the client in major units
    pub refund_amount: Decimal,
}

impl CancellationQuote {
    /// Price out a cancellation happening at `now`.
    pub fn compute(
        record: &PaymentRecord,
        policy: &CancellationPolicy,
        actor: CancellationActor,
        force_policy: bool,
        appointment_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> SettlementResult<Self> {
        record.validate()?;
        policy.validate()?;

        let decision = PolicyCalculator::new(policy.clone()).evaluate(
            actor,
            force_policy,
            appointment_start,
            now,
        );
        let PolicyDecision {
            charge_percentage,
            within_policy_window,
        } = decision;

        let fee_base_minor = to_minor_units(record.total_paid())?;
        let deposit_minor = to_minor_units(record.deposit_amount)?;
        let fees = FeeBreakdown::split(fee_base_minor, deposit_minor, charge_percentage)?;

        let charge_amount = fees.total_fee();
        let refund_amount = refund_amount_for(record, actor, charge_amount);

        Ok(Self {
            actor,
            hours_until_appointment: hours_until(appointment_start, now),
            charge_percentage,
            within_policy_window,
            fees,
            charge_amount,
            refund_amount,
        })
    }
}
