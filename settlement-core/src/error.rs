//! Error types for the settlement domain and the processor boundary.

use thiserror::Error;

/// Settlement domain result type
pub type SettlementResult<T> = Result<T, SettlementError>;

/// Errors raised by the pure settlement domain layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    /// A monetary amount cannot be represented in whole minor units
    #[error("amount {amount} cannot be represented in minor currency units")]
    AmountOutOfRange { amount: String },

    /// An input amount violates a domain constraint
    #[error("invalid amount for {field}: {reason}")]
    InvalidAmount { field: String, reason: String },
}

impl SettlementError {
    pub fn amount_out_of_range(amount: impl std::fmt::Display) -> Self {
        SettlementError::AmountOutOfRange {
            amount: amount.to_string(),
        }
    }

    pub fn invalid_amount(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SettlementError::InvalidAmount {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors surfaced by the payment processor boundary.
///
/// Every operation on a processor client resolves to one of these. The
/// settlement engine inspects the variant to decide between aborting,
/// degrading, or compensating.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessorError {
    /// The processor refused the request outright
    #[error("processor declined {operation} for intent {intent_id}: {message}")]
    Declined {
        operation: String,
        intent_id: String,
        message: String,
    },

    /// The intent exists but its state does not allow the operation
    #[error("intent {intent_id} is {state} and does not allow {operation}")]
    InvalidIntentState {
        intent_id: String,
        state: String,
        operation: String,
    },

    /// The referenced intent does not exist at the processor
    #[error("payment intent {intent_id} not found")]
    IntentNotFound { intent_id: String },

    /// Transport or API-level failure
    #[error("processor api error during {operation}: {message}")]
    Api { operation: String, message: String },
}

impl ProcessorError {
    pub fn declined(
        operation: impl Into<String>,
        intent_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ProcessorError::Declined {
            operation: operation.into(),
            intent_id: intent_id.into(),
            message: message.into(),
        }
    }

    pub fn invalid_intent_state(
        intent_id: impl Into<String>,
        state: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        ProcessorError::InvalidIntentState {
            intent_id: intent_id.into(),
            state: state.into(),
            operation: operation.into(),
        }
    }

    pub fn intent_not_found(intent_id: impl Into<String>) -> Self {
        ProcessorError::IntentNotFound {
            intent_id: intent_id.into(),
        }
    }

    pub fn api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        ProcessorError::Api {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SettlementError::amount_out_of_range("92233720368547758.08");
        assert!(err.to_string().contains("minor currency units"));

        let err = ProcessorError::declined("capture", "pi_123", "partial capture not enabled");
        assert_eq!(
            err.to_string(),
            "processor declined capture for intent pi_123: partial capture not enabled"
        );
    }

    #[test]
    fn test_intent_not_found_display() {
        let err = ProcessorError::intent_not_found("pi_missing");
        assert_eq!(err.to_string(), "payment intent pi_missing not found");
    }
}
