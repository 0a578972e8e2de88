//! Cancellation fee computation and allocation across payment intents.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SettlementResult;
use crate::money::{from_minor_units, round_minor_units};

/// A cancellation fee allocated across the deposit and balance intents.
///
/// The deposit share is proportional to the deposit's share of the
/// booking total; the balance share is the exact remainder, so the two
/// always sum to the total and rounding never creates or destroys a cent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub total_fee_minor: i64,
    pub deposit_fee_minor: i64,
    pub balance_fee_minor: i64,
}

impl FeeBreakdown {
    /// Breakdown with no fee at all
    pub fn zero() -> Self {
        Self::default()
    }

    /// Split a percentage fee over the deposit and balance intents.
    ///
    /// `fee_base_minor` is the booking total the percentage applies to
    /// (service price plus tip) and `deposit_minor` the deposit carved
    /// out of it, both in minor units. Percentages above 100 are treated
    /// as 100; a non-positive base or percentage yields no fee.
    pub fn split(
        fee_base_minor: i64,
        deposit_minor: i64,
        charge_percentage: Decimal,
    ) -> SettlementResult<Self> {
        if fee_base_minor <= 0 || charge_percentage <= Decimal::ZERO {
            return Ok(Self::zero());
        }

        let pct = charge_percentage.min(Decimal::ONE_HUNDRED);
        let base = Decimal::from(fee_base_minor);

        let total_fee_minor =
            round_minor_units(base * pct / Decimal::ONE_HUNDRED)?.clamp(0, fee_base_minor);

        let deposit_fee_minor = if deposit_minor <= 0 {
            0
        } else {
            let proportion = Decimal::from(deposit_minor) / base;
            round_minor_units(Decimal::from(total_fee_minor) * proportion)?
                .clamp(0, total_fee_minor)
        };

        Ok(Self {
            total_fee_minor,
            deposit_fee_minor,
            balance_fee_minor: total_fee_minor - deposit_fee_minor,
        })
    }

    /// Whether any fee is owed
    pub fn applies(&self) -> bool {
        self.total_fee_minor > 0
    }

    /// Total fee in major units
    pub fn total_fee(&self) -> Decimal {
        from_minor_units(self.total_fee_minor)
    }

    /// Deposit share in major units
    pub fn deposit_fee(&self) -> Decimal {
        from_minor_units(self.deposit_fee_minor)
    }

    /// Balance share in major units
    pub fn balance_fee(&self) -> Decimal {
        from_minor_units(self.balance_fee_minor)
    }
}
