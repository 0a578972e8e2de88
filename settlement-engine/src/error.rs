//! Engine error types.

use settlement_core::{ProcessorError, SettlementError};
use thiserror::Error;

/// Engine result type
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised while settling a cancellation.
///
/// These never escape [`crate::SettlementEngine::settle_cancellation`];
/// they are folded into the returned outcome so one booking's failure
/// cannot poison a caller's batch. The deposit and balance variants keep
/// which side of the payment failed, since the other side may already
/// have settled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Fee or refund math failed before any processor call
    #[error("failed to price cancellation: {source}")]
    Quote {
        #[source]
        source: SettlementError,
    },

    /// The deposit intent could not be settled
    #[error("failed to settle deposit intent {intent_id}: {source}")]
    DepositSettlement {
        intent_id: String,
        #[source]
        source: ProcessorError,
    },

    /// The balance intent could not be settled
    #[error("failed to settle balance intent {intent_id}: {source}")]
    BalanceSettlement {
        intent_id: String,
        #[source]
        source: ProcessorError,
    },
}

impl EngineError {
    pub fn quote(source: SettlementError) -> Self {
        EngineError::Quote { source }
    }

    pub fn deposit(intent_id: impl Into<String>, source: ProcessorError) -> Self {
        EngineError::DepositSettlement {
            intent_id: intent_id.into(),
            source,
        }
    }

    pub fn balance(intent_id: impl Into<String>, source: ProcessorError) -> Self {
        EngineError::BalanceSettlement {
            intent_id: intent_id.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_the_side() {
        let err = EngineError::deposit("pi_dep", ProcessorError::intent_not_found("pi_dep"));
        assert_eq!(
            err.to_string(),
            "failed to settle deposit intent pi_dep: payment intent pi_dep not found"
        );

        let err = EngineError::balance(
            "pi_bal",
            ProcessorError::declined("capture_intent", "pi_bal", "partial capture not enabled"),
        );
        assert!(err.to_string().starts_with("failed to settle balance intent pi_bal"));
    }
}
