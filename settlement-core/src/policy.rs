//! Time-based cancellation fee policy evaluation.
//!
//! The calculator answers one question: what percentage of the booking
//! total does the professional keep for this cancellation? The answer
//! depends on who cancels, how far out the appointment is, and the
//! professional's configured policy.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::types::{CancellationActor, CancellationPolicy};

const SECONDS_PER_HOUR: i64 = 3_600;

/// Hours between `now` and the appointment start, fractional and signed.
///
/// Negative values mean the appointment has already started; those fall
/// in the under-24-hours window.
pub fn hours_until(appointment_start: DateTime<Utc>, now: DateTime<Utc>) -> Decimal {
    let seconds = (appointment_start - now).num_seconds();
    Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR)
}

/// Outcome of evaluating a cancellation policy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolicyDecision {
    /// Percentage of the booking total retained as a fee (0 to 100)
    pub charge_percentage: Decimal,
    /// Whether the cancellation fell inside a chargeable window
    pub within_policy_window: bool,
}

impl PolicyDecision {
    /// Decision that charges nothing
    pub fn no_charge() -> Self {
        Self {
            charge_percentage: Decimal::ZERO,
            within_policy_window: false,
        }
    }

    /// Whether any fee applies
    pub fn applies(&self) -> bool {
        self.charge_percentage > Decimal::ZERO
    }
}

/// Evaluates a professional's cancellation policy against a point in time
pub struct PolicyCalculator {
    policy: CancellationPolicy,
}

impl PolicyCalculator {
    pub fn new(policy: CancellationPolicy) -> Self {
        Self { policy }
    }

    /// Decide the fee percentage for a cancellation happening at `now`.
    ///
    /// Professional-initiated cancellations are free unless the caller
    /// forces the policy. Disabled policies never charge.
    pub fn evaluate(
        &self,
        actor: CancellationActor,
        force_policy: bool,
        appointment_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> PolicyDecision {
        // Step 1: professionals cancelling their own appointment owe nothing
        if actor.is_professional() && !force_policy {
            return PolicyDecision::no_charge();
        }

        // Step 2: a disabled policy charges nothing regardless of timing
        if !self.policy.enabled {
            return PolicyDecision::no_charge();
        }

        // Step 3: pick the window from the time remaining
        let hours = hours_until(appointment_start, now);
        let charge_percentage = if hours < Decimal::from(24) {
            self.policy.within_24h_or_default()
        } else if hours < Decimal::from(48) {
            self.policy.within_48h_or_default()
        } else {
            Decimal::ZERO
        };

        PolicyDecision {
            charge_percentage,
            within_policy_window: charge_percentage > Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(hours_out: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc::now();
        (now + Duration::hours(hours_out), now)
    }

    #[test]
    fn test_under_24_hours_uses_24h_rate() {
        let calc = PolicyCalculator::new(CancellationPolicy::default());
        let (start, now) = at(10);
        let decision = calc.evaluate(CancellationActor::Client, false, start, now);
        assert_eq!(decision.charge_percentage, Decimal::new(50, 0));
        assert!(decision.within_policy_window);
    }

    #[test]
    fn test_between_24_and_48_hours_uses_48h_rate() {
        let calc = PolicyCalculator::new(CancellationPolicy::default());
        let (start, now) = at(36);
        let decision = calc.evaluate(CancellationActor::Client, false, start, now);
        assert_eq!(decision.charge_percentage, Decimal::new(25, 0));
    }

    #[test]
    fn test_beyond_48_hours_is_free() {
        let calc = PolicyCalculator::new(CancellationPolicy::default());
        let (start, now) = at(72);
        let decision = calc.evaluate(CancellationActor::Client, false, start, now);
        assert_eq!(decision, PolicyDecision::no_charge());
    }

    #[test]
    fn test_window_boundaries() {
        let calc = PolicyCalculator::new(CancellationPolicy::default());
        let now = Utc::now();

        // Exactly 24 hours out falls in the 24-48 window
        let decision =
            calc.evaluate(CancellationActor::Client, false, now + Duration::hours(24), now);
        assert_eq!(decision.charge_percentage, Decimal::new(25, 0));

        // Exactly 48 hours out is free
        let decision =
            calc.evaluate(CancellationActor::Client, false, now + Duration::hours(48), now);
        assert_eq!(decision.charge_percentage, Decimal::ZERO);

        // One second under 24 hours uses the 24h rate
        let decision = calc.evaluate(
            CancellationActor::Client,
            false,
            now + Duration::hours(24) - Duration::seconds(1),
            now,
        );
        assert_eq!(decision.charge_percentage, Decimal::new(50, 0));
    }

    #[test]
    fn test_past_appointment_counts_as_under_24h() {
        let calc = PolicyCalculator::new(CancellationPolicy::default());
        let (start, now) = at(-2);
        let decision = calc.evaluate(CancellationActor::Client, false, start, now);
        assert_eq!(decision.charge_percentage, Decimal::new(50, 0));
    }

    #[test]
    fn test_professional_cancellation_is_free() {
        let calc = PolicyCalculator::new(CancellationPolicy::default());
        let (start, now) = at(2);
        let decision = calc.evaluate(CancellationActor::Professional, false, start, now);
        assert_eq!(decision, PolicyDecision::no_charge());
    }

    #[test]
    fn test_force_policy_charges_professional() {
        let calc = PolicyCalculator::new(CancellationPolicy::default());
        let (start, now) = at(2);
        let decision = calc.evaluate(CancellationActor::Professional, true, start, now);
        assert_eq!(decision.charge_percentage, Decimal::new(50, 0));
    }

    #[test]
    fn test_disabled_policy_never_charges() {
        let calc = PolicyCalculator::new(CancellationPolicy::disabled());
        let (start, now) = at(1);
        let decision = calc.evaluate(CancellationActor::Client, false, start, now);
        assert_eq!(decision, PolicyDecision::no_charge());
    }

    #[test]
    fn test_custom_percentages() {
        let policy = CancellationPolicy::new(Some(Decimal::new(100, 0)), Some(Decimal::new(10, 0)));
        let calc = PolicyCalculator::new(policy);
        let now = Utc::now();

        let decision =
            calc.evaluate(CancellationActor::Client, false, now + Duration::hours(3), now);
        assert_eq!(decision.charge_percentage, Decimal::new(100, 0));

        let decision =
            calc.evaluate(CancellationActor::Client, false, now + Duration::hours(30), now);
        assert_eq!(decision.charge_percentage, Decimal::new(10, 0));

        // Configured percentages never apply beyond 48 hours
        let decision =
            calc.evaluate(CancellationActor::Client, false, now + Duration::hours(72), now);
        assert_eq!(decision.charge_percentage, Decimal::ZERO);
    }

    #[test]
    fn test_zero_percent_window_is_not_a_window() {
        let policy = CancellationPolicy::new(Some(Decimal::ZERO), Some(Decimal::ZERO));
        let calc = PolicyCalculator::new(policy);
        let (start, now) = at(10);
        let decision = calc.evaluate(CancellationActor::Client, false, start, now);
        assert!(!decision.within_policy_window);
        assert!(!decision.applies());
    }

    #[test]
    fn test_hours_until_fractional() {
        let now = Utc::now();
        let start = now + Duration::minutes(90);
        assert_eq!(hours_until(start, now), Decimal::new(15, 1));
    }
}
