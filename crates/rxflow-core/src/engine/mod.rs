//! Request lifecycle engine.
//!
//! Drives a request from creation through admin review, payment, and
//! delivery. All validation happens before any write, every caller passes
//! an explicit [`Session`], and every transition is backed by a conditional
//! UPDATE in the store so concurrent calls cannot lose writes.

mod payment;

pub use payment::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::db::Database;
use crate::models::{DeliveryStatus, PaymentStatus, Request, RequestStatus, Session};

/// Lifecycle engine errors, mapped to transport status codes by
/// [`EngineError::status_code`].
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Db(#[from] crate::db::DbError),
}

impl EngineError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            EngineError::Validation(_) => 400,
            EngineError::NotFound(_) => 404,
            EngineError::Forbidden(_) => 403,
            EngineError::Db(_) => 500,
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Input for request creation, as received from the upload form. The
/// prescription file has already been stored by document intake; only its
/// reference arrives here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    pub medicine_id: Option<String>,
    pub prescription_file: Option<String>,
    pub nic: Option<String>,
}

/// Input for payment processing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSubmission {
    pub request_id: String,
    #[serde(flatten)]
    pub card: CardDetails,
}

/// Result of a successful payment.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub success: bool,
    pub message: String,
    pub request: Request,
}

/// Main engine that coordinates lifecycle transitions.
pub struct RequestEngine<'a, A = MockAuthorizer> {
    db: &'a Database,
    authorizer: A,
}

impl<'a> RequestEngine<'a> {
    /// Create an engine with the mock payment authorizer.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            authorizer: MockAuthorizer,
        }
    }
}

impl<'a, A: PaymentAuthorizer> RequestEngine<'a, A> {
    /// Create an engine with a custom payment authorizer.
    pub fn with_authorizer(db: &'a Database, authorizer: A) -> Self {
        Self { db, authorizer }
    }

    /// Create a request on behalf of the session's user.
    ///
    /// Validation order: medicine must resolve, prescription file must be
    /// present iff the medicine's policy requires one, and an NIC is
    /// required for every request. Over-the-counter requests are
    /// auto-approved; prescription requests await admin review.
    pub fn create_request(&self, session: &Session, input: NewRequest) -> EngineResult<Request> {
        let medicine_id = match input.medicine_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(EngineError::Validation("Medicine ID is required".into())),
        };

        let medicine = self
            .db
            .get_medicine(medicine_id)?
            .ok_or_else(|| EngineError::NotFound("Medicine not found".into()))?;

        if medicine.prescription_required && input.prescription_file.is_none() {
            return Err(EngineError::Validation(
                "Prescription file is required for this medicine".into(),
            ));
        }

        let nic = match input.nic.as_deref().map(str::trim) {
            Some(nic) if !nic.is_empty() => nic.to_string(),
            _ => {
                return Err(EngineError::Validation(
                    "NIC is required for this request".into(),
                ))
            }
        };

        let request = Request::new(
            session.user_id.clone(),
            medicine.id.clone(),
            input.prescription_file,
            nic,
            medicine.prescription_required,
        );
        self.db.insert_request(&request)?;

        info!(
            request_id = %request.id,
            medicine_id = %medicine.id,
            status = ?request.status,
            "request created"
        );
        Ok(request)
    }

    /// Admin review: move a pending request to approved or rejected.
    /// Terminal states admit no further transitions.
    pub fn update_status(
        &self,
        session: &Session,
        request_id: &str,
        new_status: &str,
    ) -> EngineResult<Request> {
        self.require_admin(session)?;

        let new_status = match new_status {
            "approved" => RequestStatus::Approved,
            "rejected" => RequestStatus::Rejected,
            _ => {
                return Err(EngineError::Validation(
                    "Status must be approved or rejected".into(),
                ))
            }
        };

        let request = self.get_existing(request_id)?;
        if !request.status.can_transition_to(new_status) {
            return Err(EngineError::Validation(format!(
                "Request has already been {}",
                status_word(request.status)
            )));
        }

        // Conditional update: a concurrent review wins or loses atomically
        if !self.db.set_status_if_pending(request_id, new_status)? {
            let current = self.get_existing(request_id)?;
            return Err(EngineError::Validation(format!(
                "Request has already been {}",
                status_word(current.status)
            )));
        }

        info!(request_id, status = ?new_status, "request reviewed");
        self.get_existing(request_id)
    }

    /// Process a mock payment on behalf of the request's owner.
    pub fn process_payment(
        &self,
        session: &Session,
        submission: PaymentSubmission,
    ) -> EngineResult<PaymentOutcome> {
        if submission.request_id.trim().is_empty() || submission.card.has_missing_fields() {
            return Err(EngineError::Validation(
                "All payment details are required".into(),
            ));
        }
        submission
            .card
            .validate_format()
            .map_err(EngineError::Validation)?;

        let request = self.get_existing(&submission.request_id)?;

        if request.user_id != session.user_id {
            return Err(EngineError::Forbidden(
                "Not authorized to pay for this request".into(),
            ));
        }
        if request.status != RequestStatus::Approved {
            return Err(EngineError::Validation(
                "Request must be approved before payment".into(),
            ));
        }
        if let Some(reason) = unpayable_reason(request.payment_status) {
            return Err(EngineError::Validation(reason.into()));
        }

        if !self.authorizer.authorize(&submission.card) {
            self.db.mark_payment_failed(&request.id)?;
            warn!(request_id = %request.id, "payment declined");
            return Err(EngineError::Validation("Payment was declined".into()));
        }

        // Conditional update closes the double-submission race: only one of
        // two concurrent attempts flips pending -> paid. On a zero-row
        // update, re-read and report the state that actually blocked us.
        if !self.db.mark_paid(&request.id)? {
            let current = self.get_existing(&request.id)?;
            let reason = unpayable_reason(current.payment_status)
                .unwrap_or("Request must be approved before payment");
            return Err(EngineError::Validation(reason.into()));
        }

        info!(request_id = %request.id, "payment processed");
        let request = self.get_existing(&request.id)?;
        Ok(PaymentOutcome {
            success: true,
            message: "Payment successful".into(),
            request,
        })
    }

    /// Admin-only delivery transition. The delivery gate (approved and
    /// paid) is enforced here, not just in the presentation layer.
    pub fn update_delivery(
        &self,
        session: &Session,
        request_id: &str,
        new_status: &str,
        notes: Option<&str>,
    ) -> EngineResult<Request> {
        self.require_admin(session)?;

        let new_status = match new_status {
            "pending" => DeliveryStatus::Pending,
            "shipped" => DeliveryStatus::Shipped,
            "delivered" => DeliveryStatus::Delivered,
            "cancelled" => DeliveryStatus::Cancelled,
            _ => {
                return Err(EngineError::Validation(
                    "Delivery status must be pending, shipped, delivered or cancelled".into(),
                ))
            }
        };

        let request = self.get_existing(request_id)?;
        if !request.delivery_gate_open() {
            return Err(EngineError::Validation(
                "Request must be approved and paid before delivery updates".into(),
            ));
        }

        if !self.db.set_delivery_status(request_id, new_status, notes)? {
            // Gate re-checked in the WHERE clause; losing the race means the
            // record changed under us
            return Err(EngineError::Validation(
                "Request must be approved and paid before delivery updates".into(),
            ));
        }

        info!(request_id, delivery_status = ?new_status, "delivery updated");
        self.get_existing(request_id)
    }

    fn require_admin(&self, session: &Session) -> EngineResult<()> {
        if !session.is_admin() {
            return Err(EngineError::Forbidden("Admin role required".into()));
        }
        Ok(())
    }

    fn get_existing(&self, request_id: &str) -> EngineResult<Request> {
        self.db
            .get_request(request_id)?
            .ok_or_else(|| EngineError::NotFound("Request not found".into()))
    }
}

fn unpayable_reason(status: PaymentStatus) -> Option<&'static str> {
    match status {
        PaymentStatus::Pending => None,
        PaymentStatus::Paid => Some("Request is already paid"),
        PaymentStatus::Failed => Some("Payment previously failed for this request"),
    }
}

fn status_word(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Pending => "submitted",
        RequestStatus::Approved => "approved",
        RequestStatus::Rejected => "rejected",
    }
}
