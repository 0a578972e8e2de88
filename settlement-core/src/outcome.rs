//! Settlement outcome and the payment status derived from it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::PaymentStatus;

/// What a settlement run actually did.
///
/// The flags describe completed money movement only. When a run fails
/// partway through, flags for the finished side stay set and `error`
/// records the failure; nothing is rolled back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettlementOutcome {
    /// Money moved back to the client from the deposit intent
    pub deposit_refunded: bool,
    /// The balance hold was released or partially refunded
    pub balance_cancelled: bool,
    /// Cancellation fee retained, in major units
    pub charge_amount: Decimal,
    /// First error encountered, if the run did not complete
    pub error: Option<String>,
}

impl SettlementOutcome {
    pub fn new(charge_amount: Decimal) -> Self {
        Self {
            deposit_refunded: false,
            balance_cancelled: false,
            charge_amount,
            error: None,
        }
    }

    /// Outcome for a run that failed before any money moved
    pub fn failed(charge_amount: Decimal, error: impl Into<String>) -> Self {
        Self {
            deposit_refunded: false,
            balance_cancelled: false,
            charge_amount,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Payment status implied by this outcome.
    ///
    /// Precedence: failure trumps everything, then a retained fee, then
    /// any money returned, and a run that moved nothing is a plain
    /// cancellation. Pure function of the outcome, safe to re-derive.
    pub fn derived_status(&self) -> PaymentStatus {
        if self.error.is_some() {
            PaymentStatus::Failed
        } else if self.charge_amount > Decimal::ZERO {
            PaymentStatus::PartiallyRefunded
        } else if self.deposit_refunded || self.balance_cancelled {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::Cancelled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_maps_to_failed() {
        let mut outcome = SettlementOutcome::new(Decimal::new(100, 0));
        outcome.deposit_refunded = true;
        outcome.error = Some("processor api error".to_string());
        assert_eq!(outcome.derived_status(), PaymentStatus::Failed);
    }

    #[test]
    fn test_fee_maps_to_partially_refunded() {
        let mut outcome = SettlementOutcome::new(Decimal::new(100, 0));
        outcome.deposit_refunded = true;
        outcome.balance_cancelled = true;
        assert_eq!(outcome.derived_status(), PaymentStatus::PartiallyRefunded);
    }

    #[test]
    fn test_free_cancellation_maps_to_refunded() {
        let mut outcome = SettlementOutcome::new(Decimal::ZERO);
        outcome.deposit_refunded = true;
        assert_eq!(outcome.derived_status(), PaymentStatus::Refunded);

        let mut outcome = SettlementOutcome::new(Decimal::ZERO);
        outcome.balance_cancelled = true;
        assert_eq!(outcome.derived_status(), PaymentStatus::Refunded);
    }

    #[test]
    fn test_no_movement_maps_to_cancelled() {
        let outcome = SettlementOutcome::new(Decimal::ZERO);
        assert_eq!(outcome.derived_status(), PaymentStatus::Cancelled);
    }

    #[test]
    fn test_derivation_is_stable() {
        let outcome = SettlementOutcome::failed(Decimal::new(50, 0), "boom");
        assert_eq!(outcome.derived_status(), outcome.derived_status());
    }
}
