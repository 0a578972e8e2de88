//! The cancellation settlement engine.
//!
//! Orchestrates the capture/refund/void sequence that realizes a
//! cancellation quote against the payment processor. The deposit intent
//! is always settled before the balance intent, each step awaited in
//! sequence. Completed steps are never rolled back: a mid-sequence
//! failure produces an outcome with the error recorded and the flags
//! reflecting whatever finished, and reconciliation happens out of band.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use settlement_core::{
    from_minor_units, to_minor_units, CancelRequest, CancellationQuote, CancellationRequest,
    CaptureRequest, FeeBreakdown, IntentStatus, RefundRequest, SettlementOutcome,
};

use crate::compensation::build_compensating_charge;
use crate::error::{EngineError, EngineResult};
use crate::processor::ProcessorClient;

const CANCELLATION_REASON: &str = "requested_by_customer";

/// Engine configuration
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// ISO currency code used for compensating charges
    pub currency: String,
    /// Flat fee the platform keeps from a compensating charge before
    /// transferring the professional's share, in minor units
    pub flat_platform_fee_minor: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency: "usd".to_string(),
            flat_platform_fee_minor: 200,
        }
    }
}

impl EngineConfig {
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_flat_platform_fee(mut self, fee_minor: i64) -> Self {
        self.flat_platform_fee_minor = fee_minor;
        self
    }
}

/// Settles booking cancellations against a payment processor.
///
/// The processor client is injected so callers own construction and
/// tests can substitute a double. The engine holds no datastore access;
/// it returns an outcome and the caller persists the derived status.
pub struct SettlementEngine {
    processor: Arc<dyn ProcessorClient>,
    config: EngineConfig,
}

impl SettlementEngine {
    pub fn new(processor: Arc<dyn ProcessorClient>) -> Self {
        Self::with_config(processor, EngineConfig::default())
    }

    pub fn with_config(processor: Arc<dyn ProcessorClient>, config: EngineConfig) -> Self {
        Self { processor, config }
    }

    /// Price a cancellation without touching the processor.
    pub fn quote(&self, request: &CancellationRequest) -> EngineResult<CancellationQuote> {
        CancellationQuote::compute(
            &request.payment,
            &request.policy,
            request.actor,
            request.force_policy,
            request.appointment_start,
            Utc::now(),
        )
        .map_err(EngineError::quote)
    }

    /// Settle a booking cancellation end to end.
    ///
    /// Never returns `Err`: every failure is folded into the outcome's
    /// `error` field with the flags reflecting the steps that completed.
    pub async fn settle_cancellation(&self, request: &CancellationRequest) -> SettlementOutcome {
        let record = &request.payment;

        // Step 1: price the cancellation
        let quote = match self.quote(request) {
            Ok(quote) => quote,
            Err(err) => {
                error!(
                    booking_id = %record.booking_id,
                    error = %err,
                    "cancellation aborted before any processor call"
                );
                return SettlementOutcome::failed(Decimal::ZERO, err.to_string());
            }
        };
        let service_fee_minor = match to_minor_units(record.service_fee) {
            Ok(minor) => minor,
            Err(err) => {
                let err = EngineError::quote(err);
                error!(booking_id = %record.booking_id, error = %err, "cancellation aborted");
                return SettlementOutcome::failed(Decimal::ZERO, err.to_string());
            }
        };

        info!(
            booking_id = %record.booking_id,
            actor = %request.actor,
            hours_until = %quote.hours_until_appointment.round_dp(2),
            charge_percentage = %quote.charge_percentage,
            total_fee = %quote.charge_amount,
            deposit_fee = %quote.fees.deposit_fee(),
            balance_fee = %quote.fees.balance_fee(),
            "settling cancellation"
        );

        let mut outcome = SettlementOutcome::new(quote.charge_amount);

        // Step 2: settle the deposit intent
        match self.settle_deposit(request, &quote.fees).await {
            Ok(refunded) => outcome.deposit_refunded = refunded,
            Err(err) => {
                error!(
                    booking_id = %record.booking_id,
                    error = %err,
                    "deposit settlement failed, leaving balance untouched"
                );
                outcome.error = Some(err.to_string());
                return outcome;
            }
        }

        // Step 3: settle the balance intent
        match self.settle_balance(request, &quote.fees, service_fee_minor).await {
            Ok(cancelled) => outcome.balance_cancelled = cancelled,
            Err(err) => {
                error!(
                    booking_id = %record.booking_id,
                    error = %err,
                    deposit_refunded = outcome.deposit_refunded,
                    "balance settlement failed after deposit side completed"
                );
                outcome.error = Some(err.to_string());
                return outcome;
            }
        }

        info!(
            booking_id = %record.booking_id,
            deposit_refunded = outcome.deposit_refunded,
            balance_cancelled = outcome.balance_cancelled,
            charge_amount = %outcome.charge_amount,
            status = %outcome.derived_status(),
            "cancellation settled"
        );
        outcome
    }

    /// Settle the deposit intent. Returns whether money moved back to
    /// the client from this side.
    async fn settle_deposit(
        &self,
        request: &CancellationRequest,
        fees: &FeeBreakdown,
    ) -> EngineResult<bool> {
        let record = &request.payment;
        let Some(intent_id) = &record.deposit_intent_id else {
            debug!(booking_id = %record.booking_id, "no deposit intent to settle");
            return Ok(false);
        };
        let ctx = |source| EngineError::deposit(intent_id.as_str(), source);

        let snapshot = self.processor.retrieve_intent(intent_id).await.map_err(ctx)?;
        let fee_minor = fees.deposit_fee_minor;
        debug!(
            intent_id = %intent_id,
            status = %snapshot.status,
            fee = %from_minor_units(fee_minor),
            "settling deposit intent"
        );

        match snapshot.status {
            IntentStatus::Captured => {
                let refund_minor = snapshot.amount_received_minor - fee_minor;
                if refund_minor <= 0 {
                    info!(intent_id = %intent_id, "entire deposit retained as cancellation fee");
                    return Ok(false);
                }
                let refund = if fee_minor == 0 {
                    RefundRequest::full(intent_id.clone())
                } else {
                    RefundRequest::partial(intent_id.clone(), refund_minor)
                };
                let receipt = self
                    .processor
                    .create_refund(refund.with_reason(CANCELLATION_REASON))
                    .await
                    .map_err(ctx)?;
                info!(
                    intent_id = %intent_id,
                    refund_id = receipt.refund_id.as_str(),
                    amount = %from_minor_units(receipt.amount_minor),
                    "deposit refunded"
                );
                Ok(true)
            }
            IntentStatus::Authorized => {
                if fee_minor == 0 {
                    self.processor
                        .cancel_intent(
                            CancelRequest::new(intent_id.clone())
                                .with_reason(CANCELLATION_REASON),
                        )
                        .await
                        .map_err(ctx)?;
                    info!(intent_id = %intent_id, "deposit authorization released");
                    return Ok(true);
                }
                let captured = self
                    .processor
                    .capture_intent(CaptureRequest::partial(intent_id.clone(), fee_minor))
                    .await
                    .map_err(ctx)?;
                info!(
                    intent_id = %intent_id,
                    captured = %from_minor_units(captured.amount_received_minor),
                    "deposit fee captured, remainder released"
                );
                // Capturing less than the hold releases the rest to the client
                Ok(fee_minor < snapshot.amount_minor)
            }
            IntentStatus::Voided | IntentStatus::Other => {
                debug!(
                    intent_id = %intent_id,
                    status = %snapshot.status,
                    "deposit intent requires no action"
                );
                Ok(false)
            }
        }
    }

    /// Settle the balance intent. Returns whether the hold was released
    /// or captured funds flowed back to the client.
    async fn settle_balance(
        &self,
        request: &CancellationRequest,
        fees: &FeeBreakdown,
        service_fee_minor: i64,
    ) -> EngineResult<bool> {
        let record = &request.payment;
        let Some(intent_id) = &record.balance_intent_id else {
            debug!(booking_id = %record.booking_id, "no balance intent to settle");
            return Ok(false);
        };
        let ctx = |source| EngineError::balance(intent_id.as_str(), source);

        let snapshot = self.processor.retrieve_intent(intent_id).await.map_err(ctx)?;
        let fee_minor = fees.balance_fee_minor;
        debug!(
            intent_id = %intent_id,
            status = %snapshot.status,
            fee = %from_minor_units(fee_minor),
            "settling balance intent"
        );

        match snapshot.status {
            IntentStatus::Authorized => {
                if fee_minor == 0 {
                    self.processor
                        .cancel_intent(
                            CancelRequest::new(intent_id.clone())
                                .with_reason(CANCELLATION_REASON),
                        )
                        .await
                        .map_err(ctx)?;
                    info!(intent_id = %intent_id, "balance authorization released");
                    return Ok(true);
                }
                match self
                    .processor
                    .capture_intent(CaptureRequest::partial(intent_id.clone(), fee_minor))
                    .await
                {
                    Ok(captured) => {
                        info!(
                            intent_id = %intent_id,
                            captured = %from_minor_units(captured.amount_received_minor),
                            "balance fee captured, remainder released"
                        );
                        Ok(fee_minor < snapshot.amount_minor)
                    }
                    Err(capture_err) => {
                        // The processor would not do a partial capture.
                        // Void the hold so the client's money is freed,
                        // then recover the fee with a separate charge.
                        warn!(
                            intent_id = %intent_id,
                            error = %capture_err,
                            "partial capture rejected, voiding authorization and \
                             recovering the fee with a separate charge"
                        );
                        self.processor
                            .cancel_intent(
                                CancelRequest::new(intent_id.clone())
                                    .with_reason("partial capture unavailable"),
                            )
                            .await
                            .map_err(ctx)?;
                        self.recover_balance_fee(request, fee_minor).await;
                        Ok(true)
                    }
                }
            }
            IntentStatus::Captured => {
                let withheld_minor = if fees.applies() {
                    fee_minor
                } else if request.actor.is_professional() {
                    0
                } else {
                    // Free cancellation by the client still keeps the
                    // non-refundable platform service fee
                    service_fee_minor
                };
                let refund_minor = snapshot.amount_received_minor - withheld_minor;
                if refund_minor <= 0 {
                    info!(intent_id = %intent_id, "captured balance retained in full");
                    return Ok(false);
                }
                let refund = if withheld_minor == 0 {
                    RefundRequest::full(intent_id.clone())
                } else {
                    RefundRequest::partial(intent_id.clone(), refund_minor)
                };
                let receipt = self
                    .processor
                    .create_refund(refund.with_reason(CANCELLATION_REASON))
                    .await
                    .map_err(ctx)?;
                info!(
                    intent_id = %intent_id,
                    refund_id = receipt.refund_id.as_str(),
                    amount = %from_minor_units(receipt.amount_minor),
                    "balance refunded"
                );
                Ok(true)
            }
            IntentStatus::Voided | IntentStatus::Other => {
                debug!(
                    intent_id = %intent_id,
                    status = %snapshot.status,
                    "balance intent requires no action"
                );
                Ok(false)
            }
        }
    }

    /// Charge the balance fee as a fresh off-session payment after the
    /// original authorization was voided. Failure is logged and swallowed:
    /// the cancellation itself already succeeded, fee collection is
    /// reconciled out of band.
    async fn recover_balance_fee(&self, request: &CancellationRequest, fee_minor: i64) {
        let record = &request.payment;
        let charge = build_compensating_charge(request, fee_minor, &self.config);
        let transfer_minor = charge.transfer.as_ref().map(|t| t.amount_minor);

        match self.processor.create_charge(charge).await {
            Ok(receipt) => {
                info!(
                    booking_id = %record.booking_id,
                    charge_intent = %receipt.intent_id,
                    amount = %from_minor_units(receipt.amount_minor),
                    transferred = %from_minor_units(transfer_minor.unwrap_or(0)),
                    "cancellation fee recovered with a separate charge"
                );
            }
            Err(err) => {
                warn!(
                    booking_id = %record.booking_id,
                    customer_id = record.customer_id.as_str(),
                    amount = %from_minor_units(fee_minor),
                    error = %err,
                    "compensating charge failed, fee collection needs manual follow-up"
                );
            }
        }
    }
}
