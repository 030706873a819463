//! Request entity and its lifecycle status enums.
//!
//! Each status enum carries an explicit transition table. Transitions not
//! listed there are illegal and rejected by the engine before any write.

use serde::{Deserialize, Serialize};

/// Admin review status of a request.
///
/// `Approved` and `Rejected` are terminal. Over-the-counter requests start
/// directly at `Approved`; prescription requests start at `Pending`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Whether an admin review may move the request from `self` to `next`.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
        )
    }

    /// Terminal states admit no further review transitions.
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// Payment status of a request. Monotonic toward `Paid`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    /// Whether the payment adapter may move payment state from `self` to `next`.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
        )
    }
}

/// Delivery status of a request, admin-managed behind the delivery gate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

/// A single user's ask to obtain one medicine, carrying its own
/// approval/payment/delivery state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Unique request ID, generated at creation
    pub id: String,
    /// Owning user reference, immutable after creation
    pub user_id: String,
    /// Requested medicine reference, immutable after creation
    pub medicine_id: String,
    /// Stored prescription document reference; present iff the medicine's
    /// policy required a prescription at creation time
    pub prescription_file: Option<String>,
    /// National identity card reference, required for every request
    pub nic: String,
    /// Admin review status
    pub status: RequestStatus,
    /// Payment status
    pub payment_status: PaymentStatus,
    /// Set exactly once, when payment succeeds
    pub payment_date: Option<String>,
    /// Delivery status
    pub delivery_status: DeliveryStatus,
    /// Set exactly once, on the first transition to delivered
    pub delivery_date: Option<String>,
    /// Free-text annotation written at delivery transitions
    pub delivery_notes: String,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Request {
    /// Create a new request record. The initial review status is computed
    /// from the medicine's prescription policy: prescription items await
    /// admin review, over-the-counter items are auto-approved.
    pub fn new(
        user_id: String,
        medicine_id: String,
        prescription_file: Option<String>,
        nic: String,
        prescription_required: bool,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        let status = if prescription_required {
            RequestStatus::Pending
        } else {
            RequestStatus::Approved
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            medicine_id,
            prescription_file: if prescription_required {
                prescription_file
            } else {
                None
            },
            nic,
            status,
            payment_status: PaymentStatus::Pending,
            payment_date: None,
            delivery_status: DeliveryStatus::Pending,
            delivery_date: None,
            delivery_notes: String::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// The delivery gate: delivery transitions are only meaningful once the
    /// request is approved and paid.
    pub fn delivery_gate_open(&self) -> bool {
        self.status == RequestStatus::Approved && self.payment_status == PaymentStatus::Paid
    }
}
