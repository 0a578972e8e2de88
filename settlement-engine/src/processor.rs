//! Payment processor client trait and the in-memory test double.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use settlement_core::{
    CancelRequest, CaptureRequest, ChargeReceipt, ChargeRequest, IntentSnapshot, IntentStatus,
    PaymentIntentId, ProcessorError, ProcessorOp, RefundId, RefundReceipt, RefundRequest,
};

/// Client for the payment processor the settlement engine runs against.
///
/// Implementations are injected into the engine as `Arc<dyn
/// ProcessorClient>`; the engine owns no processor configuration itself.
/// All amounts are minor units and every mutating request carries an
/// idempotency key.
#[async_trait]
pub trait ProcessorClient: Send + Sync {
    /// Fetch the current state of a payment intent
    async fn retrieve_intent(
        &self,
        intent_id: &PaymentIntentId,
    ) -> Result<IntentSnapshot, ProcessorError>;

    /// Capture some or all of an authorized intent
    async fn capture_intent(
        &self,
        request: CaptureRequest,
    ) -> Result<IntentSnapshot, ProcessorError>;

    /// Void an authorized intent, releasing the hold
    async fn cancel_intent(&self, request: CancelRequest)
        -> Result<IntentSnapshot, ProcessorError>;

    /// Refund part or all of a captured intent
    async fn create_refund(&self, request: RefundRequest)
        -> Result<RefundReceipt, ProcessorError>;

    /// Create and confirm a fresh charge against a stored payment method
    async fn create_charge(&self, request: ChargeRequest)
        -> Result<ChargeReceipt, ProcessorError>;
}

/// One processor call observed by the mock, in call order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedCall {
    RetrieveIntent {
        intent_id: PaymentIntentId,
    },
    CaptureIntent {
        intent_id: PaymentIntentId,
        amount_minor: Option<i64>,
    },
    CancelIntent {
        intent_id: PaymentIntentId,
    },
    CreateRefund {
        intent_id: PaymentIntentId,
        amount_minor: Option<i64>,
    },
    CreateCharge {
        amount_minor: i64,
        transfer_minor: Option<i64>,
    },
}

impl RecordedCall {
    /// Whether this call addressed the given intent
    pub fn touches(&self, id: &PaymentIntentId) -> bool {
        match self {
            RecordedCall::RetrieveIntent { intent_id }
            | RecordedCall::CaptureIntent { intent_id, .. }
            | RecordedCall::CancelIntent { intent_id }
            | RecordedCall::CreateRefund { intent_id, .. } => intent_id == id,
            RecordedCall::CreateCharge { .. } => false,
        }
    }
}

struct MockIntent {
    snapshot: IntentSnapshot,
    refunded_minor: i64,
}

/// In-memory processor double.
///
/// Behaves like a real processor for the states the engine cares about:
/// captures require an authorization, refunds require captured funds,
/// and every mutation is recorded so tests can assert call order.
/// Failure modes (partial-capture rejection, charge declines) are
/// scripted per test.
#[derive(Default)]
pub struct MockProcessor {
    intents: RwLock<HashMap<PaymentIntentId, MockIntent>>,
    calls: RwLock<Vec<RecordedCall>>,
    created_charges: RwLock<Vec<ChargeRequest>>,
    reject_partial_capture: RwLock<HashSet<PaymentIntentId>>,
    decline_charges: RwLock<bool>,
    seq: RwLock<u64>,
}

impl MockProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an intent the engine can act on
    pub async fn register_intent(&self, snapshot: IntentSnapshot) {
        let mut intents = self.intents.write().await;
        intents.insert(
            snapshot.intent_id.clone(),
            MockIntent {
                snapshot,
                refunded_minor: 0,
            },
        );
    }

    /// Make partial captures of this intent fail like a processor that
    /// has partial capture disabled
    pub async fn reject_partial_capture(&self, intent_id: &PaymentIntentId) {
        let mut rejects = self.reject_partial_capture.write().await;
        rejects.insert(intent_id.clone());
    }

    /// Make all new charges decline
    pub async fn decline_charges(&self) {
        let mut flag = self.decline_charges.write().await;
        *flag = true;
    }

    /// Calls observed so far, in order
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Current state of an intent, if it exists
    pub async fn intent(&self, intent_id: &PaymentIntentId) -> Option<IntentSnapshot> {
        let intents = self.intents.read().await;
        intents.get(intent_id).map(|i| i.snapshot.clone())
    }

    /// Total refunded from an intent so far, in minor units
    pub async fn refunded_minor(&self, intent_id: &PaymentIntentId) -> i64 {
        let intents = self.intents.read().await;
        intents.get(intent_id).map(|i| i.refunded_minor).unwrap_or(0)
    }

    /// Charge requests that succeeded, in order
    pub async fn created_charges(&self) -> Vec<ChargeRequest> {
        self.created_charges.read().await.clone()
    }

    async fn record(&self, call: RecordedCall) {
        let mut calls = self.calls.write().await;
        calls.push(call);
    }

    async fn next_seq(&self) -> u64 {
        let mut seq = self.seq.write().await;
        *seq += 1;
        *seq
    }
}

#[async_trait]
impl ProcessorClient for MockProcessor {
    async fn retrieve_intent(
        &self,
        intent_id: &PaymentIntentId,
    ) -> Result<IntentSnapshot, ProcessorError> {
        self.record(RecordedCall::RetrieveIntent {
            intent_id: intent_id.clone(),
        })
        .await;

        let intents = self.intents.read().await;
        intents
            .get(intent_id)
            .map(|i| i.snapshot.clone())
            .ok_or_else(|| ProcessorError::intent_not_found(intent_id.as_str()))
    }

    async fn capture_intent(
        &self,
        request: CaptureRequest,
    ) -> Result<IntentSnapshot, ProcessorError> {
        let op = ProcessorOp::CaptureIntent.name();
        self.record(RecordedCall::CaptureIntent {
            intent_id: request.intent_id.clone(),
            amount_minor: request.amount_minor,
        })
        .await;

        let rejects = self.reject_partial_capture.read().await;
        let mut intents = self.intents.write().await;
        let intent = intents
            .get_mut(&request.intent_id)
            .ok_or_else(|| ProcessorError::intent_not_found(request.intent_id.as_str()))?;

        if intent.snapshot.status != IntentStatus::Authorized {
            return Err(ProcessorError::invalid_intent_state(
                request.intent_id.as_str(),
                intent.snapshot.status.name(),
                op,
            ));
        }

        let authorized = intent.snapshot.amount_minor;
        let amount = request.amount_minor.unwrap_or(authorized);
        if amount <= 0 || amount > authorized {
            return Err(ProcessorError::declined(
                op,
                request.intent_id.as_str(),
                "capture amount exceeds the authorized amount",
            ));
        }
        if amount < authorized && rejects.contains(&request.intent_id) {
            return Err(ProcessorError::declined(
                op,
                request.intent_id.as_str(),
                "partial capture is not available for this payment intent",
            ));
        }

        intent.snapshot.status = IntentStatus::Captured;
        intent.snapshot.amount_received_minor = amount;
        Ok(intent.snapshot.clone())
    }

    async fn cancel_intent(
        &self,
        request: CancelRequest,
    ) -> Result<IntentSnapshot, ProcessorError> {
        self.record(RecordedCall::CancelIntent {
            intent_id: request.intent_id.clone(),
        })
        .await;

        let mut intents = self.intents.write().await;
        let intent = intents
            .get_mut(&request.intent_id)
            .ok_or_else(|| ProcessorError::intent_not_found(request.intent_id.as_str()))?;

        if intent.snapshot.status != IntentStatus::Authorized {
            return Err(ProcessorError::invalid_intent_state(
                request.intent_id.as_str(),
                intent.snapshot.status.name(),
                ProcessorOp::CancelIntent.name(),
            ));
        }

        intent.snapshot.status = IntentStatus::Voided;
        Ok(intent.snapshot.clone())
    }

    async fn create_refund(
        &self,
        request: RefundRequest,
    ) -> Result<RefundReceipt, ProcessorError> {
        let op = ProcessorOp::CreateRefund.name();
        self.record(RecordedCall::CreateRefund {
            intent_id: request.intent_id.clone(),
            amount_minor: request.amount_minor,
        })
        .await;

        let mut intents = self.intents.write().await;
        let intent = intents
            .get_mut(&request.intent_id)
            .ok_or_else(|| ProcessorError::intent_not_found(request.intent_id.as_str()))?;

        if intent.snapshot.status != IntentStatus::Captured {
            return Err(ProcessorError::invalid_intent_state(
                request.intent_id.as_str(),
                intent.snapshot.status.name(),
                op,
            ));
        }

        let refundable = intent.snapshot.amount_received_minor - intent.refunded_minor;
        let amount = request.amount_minor.unwrap_or(refundable);
        if amount <= 0 || amount > refundable {
            return Err(ProcessorError::declined(
                op,
                request.intent_id.as_str(),
                "refund amount exceeds the refundable balance",
            ));
        }

        intent.refunded_minor += amount;
        drop(intents);

        let seq = self.next_seq().await;
        Ok(RefundReceipt {
            refund_id: RefundId::new(format!("re_mock_{}", seq)),
            intent_id: request.intent_id,
            amount_minor: amount,
        })
    }

    async fn create_charge(&self, request: ChargeRequest) -> Result<ChargeReceipt, ProcessorError> {
        self.record(RecordedCall::CreateCharge {
            amount_minor: request.amount_minor,
            transfer_minor: request.transfer.as_ref().map(|t| t.amount_minor),
        })
        .await;

        if *self.decline_charges.read().await {
            return Err(ProcessorError::api(
                ProcessorOp::CreateCharge.name(),
                "card_declined",
            ));
        }
        if request.amount_minor <= 0 {
            return Err(ProcessorError::api(
                ProcessorOp::CreateCharge.name(),
                "amount must be positive",
            ));
        }

        let seq = self.next_seq().await;
        let intent_id = PaymentIntentId::new(format!("pi_mock_charge_{}", seq));
        let transferred_minor = request.transfer.as_ref().map(|t| t.amount_minor);

        let mut intents = self.intents.write().await;
        intents.insert(
            intent_id.clone(),
            MockIntent {
                snapshot: IntentSnapshot::captured(intent_id.clone(), request.amount_minor),
                refunded_minor: 0,
            },
        );
        drop(intents);

        let mut charges = self.created_charges.write().await;
        charges.push(request.clone());

        Ok(ChargeReceipt {
            intent_id,
            amount_minor: request.amount_minor,
            transferred_minor,
        })
    }
}
