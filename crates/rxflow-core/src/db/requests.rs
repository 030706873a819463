//! Request store operations.
//!
//! Every lifecycle transition is a single conditional UPDATE whose WHERE
//! clause re-checks the state being transitioned from. A zero row count
//! means the precondition no longer held; callers re-read to find out why.
//! This closes the lost-update race between concurrent admin tabs and
//! double-submitted payments without any explicit locking.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{DeliveryStatus, PaymentStatus, Request, RequestStatus};

impl Database {
    /// Insert a new request.
    pub fn insert_request(&self, request: &Request) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO requests (
                id, user_id, medicine_id, prescription_file, nic,
                status, payment_status, payment_date,
                delivery_status, delivery_date, delivery_notes,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                request.id,
                request.user_id,
                request.medicine_id,
                request.prescription_file,
                request.nic,
                status_to_string(&request.status),
                payment_status_to_string(&request.payment_status),
                request.payment_date,
                delivery_status_to_string(&request.delivery_status),
                request.delivery_date,
                request.delivery_notes,
                request.created_at,
                request.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Get a request by ID.
    pub fn get_request(&self, id: &str) -> DbResult<Option<Request>> {
        self.conn
            .query_row(
                r#"
                SELECT id, user_id, medicine_id, prescription_file, nic,
                       status, payment_status, payment_date,
                       delivery_status, delivery_date, delivery_notes,
                       created_at, updated_at
                FROM requests
                WHERE id = ?
                "#,
                [id],
                map_request_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Move a pending request to a terminal review status. Returns false if
    /// the request is missing or no longer pending.
    pub fn set_status_if_pending(&self, id: &str, new_status: RequestStatus) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE requests SET
                status = ?2,
                updated_at = ?3
            WHERE id = ?1 AND status = 'pending'
            "#,
            params![
                id,
                status_to_string(&new_status),
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Mark a request paid, stamping the payment date. Only fires while the
    /// request is approved and payment is still pending, so a racing second
    /// payment attempt affects zero rows.
    pub fn mark_paid(&self, id: &str) -> DbResult<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let rows_affected = self.conn.execute(
            r#"
            UPDATE requests SET
                payment_status = 'paid',
                payment_date = ?2,
                updated_at = ?2
            WHERE id = ?1 AND status = 'approved' AND payment_status = 'pending'
            "#,
            params![id, now],
        )?;
        Ok(rows_affected > 0)
    }

    /// Mark a request's payment as failed. Only fires while payment is
    /// still pending; a paid request is never demoted.
    pub fn mark_payment_failed(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE requests SET
                payment_status = 'failed',
                updated_at = ?2
            WHERE id = ?1 AND payment_status = 'pending'
            "#,
            params![id, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(rows_affected > 0)
    }

    /// Set the delivery status of an approved, paid request. The WHERE
    /// clause re-checks the delivery gate; `delivery_date` is written only
    /// on the first transition to `delivered`.
    pub fn set_delivery_status(
        &self,
        id: &str,
        new_status: DeliveryStatus,
        notes: Option<&str>,
    ) -> DbResult<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let rows_affected = self.conn.execute(
            r#"
            UPDATE requests SET
                delivery_status = ?2,
                delivery_notes = COALESCE(?3, delivery_notes),
                delivery_date = CASE
                    WHEN ?2 = 'delivered' AND delivery_date IS NULL THEN ?4
                    ELSE delivery_date
                END,
                updated_at = ?4
            WHERE id = ?1 AND status = 'approved' AND payment_status = 'paid'
            "#,
            params![id, delivery_status_to_string(&new_status), notes, now],
        )?;
        Ok(rows_affected > 0)
    }

    /// Count all requests (dashboard report).
    pub fn count_requests(&self) -> DbResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM requests", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Count requests in a given review status (dashboard report).
    pub fn count_requests_by_status(&self, status: RequestStatus) -> DbResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM requests WHERE status = ?",
            [status_to_string(&status)],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

/// Intermediate row struct for database mapping.
pub(crate) struct RequestRow {
    pub id: String,
    pub user_id: String,
    pub medicine_id: String,
    pub prescription_file: Option<String>,
    pub nic: String,
    pub status: String,
    pub payment_status: String,
    pub payment_date: Option<String>,
    pub delivery_status: String,
    pub delivery_date: Option<String>,
    pub delivery_notes: String,
    pub created_at: String,
    pub updated_at: String,
}

pub(crate) fn map_request_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RequestRow> {
    Ok(RequestRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        medicine_id: row.get(2)?,
        prescription_file: row.get(3)?,
        nic: row.get(4)?,
        status: row.get(5)?,
        payment_status: row.get(6)?,
        payment_date: row.get(7)?,
        delivery_status: row.get(8)?,
        delivery_date: row.get(9)?,
        delivery_notes: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

impl TryFrom<RequestRow> for Request {
    type Error = DbError;

    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        Ok(Request {
            id: row.id,
            user_id: row.user_id,
            medicine_id: row.medicine_id,
            prescription_file: row.prescription_file,
            nic: row.nic,
            status: string_to_status(&row.status)?,
            payment_status: string_to_payment_status(&row.payment_status)?,
            payment_date: row.payment_date,
            delivery_status: string_to_delivery_status(&row.delivery_status)?,
            delivery_date: row.delivery_date,
            delivery_notes: row.delivery_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) fn status_to_string(status: &RequestStatus) -> &'static str {
    match status {
        RequestStatus::Pending => "pending",
        RequestStatus::Approved => "approved",
        RequestStatus::Rejected => "rejected",
    }
}

pub(crate) fn string_to_status(s: &str) -> Result<RequestStatus, DbError> {
    match s {
        "pending" => Ok(RequestStatus::Pending),
        "approved" => Ok(RequestStatus::Approved),
        "rejected" => Ok(RequestStatus::Rejected),
        _ => Err(DbError::Constraint(format!("Unknown request status: {}", s))),
    }
}

pub(crate) fn payment_status_to_string(status: &PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "pending",
        PaymentStatus::Paid => "paid",
        PaymentStatus::Failed => "failed",
    }
}

pub(crate) fn string_to_payment_status(s: &str) -> Result<PaymentStatus, DbError> {
    match s {
        "pending" => Ok(PaymentStatus::Pending),
        "paid" => Ok(PaymentStatus::Paid),
        "failed" => Ok(PaymentStatus::Failed),
        _ => Err(DbError::Constraint(format!("Unknown payment status: {}", s))),
    }
}

pub(crate) fn delivery_status_to_string(status: &DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::Pending => "pending",
        DeliveryStatus::Shipped => "shipped",
        DeliveryStatus::Delivered => "delivered",
        DeliveryStatus::Cancelled => "cancelled",
    }
}

pub(crate) fn string_to_delivery_status(s: &str) -> Result<DeliveryStatus, DbError> {
    match s {
        "pending" => Ok(DeliveryStatus::Pending),
        "shipped" => Ok(DeliveryStatus::Shipped),
        "delivered" => Ok(DeliveryStatus::Delivered),
        "cancelled" => Ok(DeliveryStatus::Cancelled),
        _ => Err(DbError::Constraint(format!(
            "Unknown delivery status: {}",
            s
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Medicine, User};

    fn setup_db() -> (Database, String, String) {
        let db = Database::open_in_memory().unwrap();
        let user = User::new("Amara".into(), "amara@example.com".into());
        db.upsert_user(&user).unwrap();

        let mut medicine = Medicine::new("Amoxicillin".into(), "Antibiotic".into(), 12.5);
        medicine.prescription_required = true;
        db.upsert_medicine(&medicine).unwrap();

        (db, user.id, medicine.id)
    }

    fn make_request(db: &Database, user_id: &str, medicine_id: &str) -> Request {
        let request = Request::new(
            user_id.into(),
            medicine_id.into(),
            Some("/uploads/rx.pdf".into()),
            "991234567V".into(),
            true,
        );
        db.insert_request(&request).unwrap();
        request
    }

    #[test]
    fn test_insert_and_get_request() {
        let (db, user_id, medicine_id) = setup_db();
        let request = make_request(&db, &user_id, &medicine_id);

        let retrieved = db.get_request(&request.id).unwrap().unwrap();
        assert_eq!(retrieved, request);
    }

    #[test]
    fn test_set_status_if_pending() {
        let (db, user_id, medicine_id) = setup_db();
        let request = make_request(&db, &user_id, &medicine_id);

        assert!(db
            .set_status_if_pending(&request.id, RequestStatus::Approved)
            .unwrap());

        let retrieved = db.get_request(&request.id).unwrap().unwrap();
        assert_eq!(retrieved.status, RequestStatus::Approved);

        // Terminal state: a second transition affects zero rows
        assert!(!db
            .set_status_if_pending(&request.id, RequestStatus::Rejected)
            .unwrap());
        let retrieved = db.get_request(&request.id).unwrap().unwrap();
        assert_eq!(retrieved.status, RequestStatus::Approved);
    }

    #[test]
    fn test_mark_paid_requires_approval() {
        let (db, user_id, medicine_id) = setup_db();
        let request = make_request(&db, &user_id, &medicine_id);

        // Still pending review
        assert!(!db.mark_paid(&request.id).unwrap());

        db.set_status_if_pending(&request.id, RequestStatus::Approved)
            .unwrap();
        assert!(db.mark_paid(&request.id).unwrap());

        let retrieved = db.get_request(&request.id).unwrap().unwrap();
        assert_eq!(retrieved.payment_status, PaymentStatus::Paid);
        assert!(retrieved.payment_date.is_some());

        // Double submission affects zero rows
        assert!(!db.mark_paid(&request.id).unwrap());
    }

    #[test]
    fn test_mark_payment_failed_never_demotes_paid() {
        let (db, user_id, medicine_id) = setup_db();
        let request = make_request(&db, &user_id, &medicine_id);

        db.set_status_if_pending(&request.id, RequestStatus::Approved)
            .unwrap();
        db.mark_paid(&request.id).unwrap();

        assert!(!db.mark_payment_failed(&request.id).unwrap());
        let retrieved = db.get_request(&request.id).unwrap().unwrap();
        assert_eq!(retrieved.payment_status, PaymentStatus::Paid);
    }

    #[test]
    fn test_delivery_gate_in_where_clause() {
        let (db, user_id, medicine_id) = setup_db();
        let request = make_request(&db, &user_id, &medicine_id);

        // Gate closed: not approved, not paid
        assert!(!db
            .set_delivery_status(&request.id, DeliveryStatus::Shipped, None)
            .unwrap());

        db.set_status_if_pending(&request.id, RequestStatus::Approved)
            .unwrap();
        assert!(!db
            .set_delivery_status(&request.id, DeliveryStatus::Shipped, None)
            .unwrap());

        db.mark_paid(&request.id).unwrap();
        assert!(db
            .set_delivery_status(&request.id, DeliveryStatus::Shipped, Some("Courier booked"))
            .unwrap());

        let retrieved = db.get_request(&request.id).unwrap().unwrap();
        assert_eq!(retrieved.delivery_status, DeliveryStatus::Shipped);
        assert_eq!(retrieved.delivery_notes, "Courier booked");
        assert!(retrieved.delivery_date.is_none());
    }

    #[test]
    fn test_delivery_date_set_exactly_once() {
        let (db, user_id, medicine_id) = setup_db();
        let request = make_request(&db, &user_id, &medicine_id);
        db.set_status_if_pending(&request.id, RequestStatus::Approved)
            .unwrap();
        db.mark_paid(&request.id).unwrap();

        db.set_delivery_status(&request.id, DeliveryStatus::Delivered, None)
            .unwrap();
        let first = db.get_request(&request.id).unwrap().unwrap();
        let first_date = first.delivery_date.clone().unwrap();

        // Bounce through cancelled and back; the original date survives
        db.set_delivery_status(&request.id, DeliveryStatus::Cancelled, None)
            .unwrap();
        db.set_delivery_status(&request.id, DeliveryStatus::Delivered, None)
            .unwrap();

        let second = db.get_request(&request.id).unwrap().unwrap();
        assert_eq!(second.delivery_date.unwrap(), first_date);
    }

    #[test]
    fn test_notes_unchanged_when_omitted() {
        let (db, user_id, medicine_id) = setup_db();
        let request = make_request(&db, &user_id, &medicine_id);
        db.set_status_if_pending(&request.id, RequestStatus::Approved)
            .unwrap();
        db.mark_paid(&request.id).unwrap();

        db.set_delivery_status(&request.id, DeliveryStatus::Shipped, Some("Fragile"))
            .unwrap();
        db.set_delivery_status(&request.id, DeliveryStatus::Delivered, None)
            .unwrap();

        let retrieved = db.get_request(&request.id).unwrap().unwrap();
        assert_eq!(retrieved.delivery_notes, "Fragile");
    }

    #[test]
    fn test_counts_by_status() {
        let (db, user_id, medicine_id) = setup_db();
        let r1 = make_request(&db, &user_id, &medicine_id);
        let _r2 = make_request(&db, &user_id, &medicine_id);

        db.set_status_if_pending(&r1.id, RequestStatus::Approved)
            .unwrap();

        assert_eq!(db.count_requests().unwrap(), 2);
        assert_eq!(
            db.count_requests_by_status(RequestStatus::Pending).unwrap(),
            1
        );
        assert_eq!(
            db.count_requests_by_status(RequestStatus::Approved)
                .unwrap(),
            1
        );
    }
}
