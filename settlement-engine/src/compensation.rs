//! Fallback charge construction for unrecoverable balance fees.
//!
//! When a balance authorization cannot be partially captured, the engine
//! voids it and charges the fee as a fresh off-session payment against
//! the stored payment method. The professional's share rides along as a
//! destination transfer, less the platform's flat fee.

use settlement_core::{CancellationRequest, ChargeRequest, DestinationTransfer};

use crate::engine::EngineConfig;

/// Build the off-session charge that recovers a balance fee.
///
/// The transfer is attached only when the fee exceeds the platform's
/// flat fee; below that threshold the platform keeps the whole charge.
pub fn build_compensating_charge(
    request: &CancellationRequest,
    fee_minor: i64,
    config: &EngineConfig,
) -> ChargeRequest {
    let record = &request.payment;
    let description = match &request.reason {
        Some(reason) => format!(
            "cancellation fee for booking {} ({})",
            record.booking_id, reason
        ),
        None => format!("cancellation fee for booking {}", record.booking_id),
    };

    let mut charge = ChargeRequest::new(
        fee_minor,
        config.currency.clone(),
        record.customer_id.clone(),
        record.payment_method_id.clone(),
    )
    .off_session()
    .with_description(description);

    if let Some(destination) = &request.payout_destination {
        let transfer_minor = fee_minor - config.flat_platform_fee_minor;
        if transfer_minor > 0 {
            charge = charge.with_transfer(DestinationTransfer {
                destination: destination.clone(),
                amount_minor: transfer_minor,
            });
        }
    }

    charge
}
