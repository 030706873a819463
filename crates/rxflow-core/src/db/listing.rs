//! Read-side listing queries with joined display fields.
//!
//! Pagination clamping happens in the query layer; these methods take
//! already-clamped limit/offset values.

use rusqlite::params;

use super::requests::map_request_row;
use super::{Database, DbResult};
use crate::models::{AdminRequestView, MedicineSummary, RequestStatus, UserRequestView, UserSummary};

const REQUEST_COLUMNS: &str = r#"
    r.id, r.user_id, r.medicine_id, r.prescription_file, r.nic,
    r.status, r.payment_status, r.payment_date,
    r.delivery_status, r.delivery_date, r.delivery_notes,
    r.created_at, r.updated_at
"#;

impl Database {
    /// List a user's own requests, newest first, medicine fields joined.
    pub fn list_requests_for_user(
        &self,
        user_id: &str,
        limit: u32,
        offset: u64,
    ) -> DbResult<Vec<UserRequestView>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {REQUEST_COLUMNS},
                   m.id, m.name, m.price, m.prescription_required
            FROM requests r
            JOIN medicines m ON m.id = r.medicine_id
            WHERE r.user_id = ?1
            ORDER BY r.created_at DESC
            LIMIT ?2 OFFSET ?3
            "#
        ))?;

        let rows = stmt.query_map(params![user_id, limit, offset], |row| {
            Ok((map_request_row(row)?, map_medicine_summary(row, 13)?))
        })?;

        let mut views = Vec::new();
        for row in rows {
            let (request_row, medicine) = row?;
            views.push(UserRequestView {
                request: request_row.try_into()?,
                medicine,
            });
        }
        Ok(views)
    }

    /// Total request count for one user.
    pub fn count_requests_for_user(&self, user_id: &str) -> DbResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM requests WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// List all requests for the admin view, newest first, optionally
    /// filtered by review status, with user and medicine fields joined.
    pub fn list_requests_admin(
        &self,
        status: Option<RequestStatus>,
        limit: u32,
        offset: u64,
    ) -> DbResult<Vec<AdminRequestView>> {
        let filter = if status.is_some() {
            "WHERE r.status = ?3"
        } else {
            ""
        };
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {REQUEST_COLUMNS},
                   m.id, m.name, m.price, m.prescription_required,
                   u.id, u.name, u.email
            FROM requests r
            JOIN medicines m ON m.id = r.medicine_id
            JOIN users u ON u.id = r.user_id
            {filter}
            ORDER BY r.created_at DESC
            LIMIT ?1 OFFSET ?2
            "#
        ))?;

        let map = |row: &rusqlite::Row<'_>| {
            Ok((
                map_request_row(row)?,
                map_medicine_summary(row, 13)?,
                map_user_summary(row, 17)?,
            ))
        };

        let mut views = Vec::new();
        match status {
            Some(status) => {
                let rows = stmt.query_map(
                    params![limit, offset, super::requests::status_to_string(&status)],
                    map,
                )?;
                for row in rows {
                    views.push(admin_view(row?)?);
                }
            }
            None => {
                let rows = stmt.query_map(params![limit, offset], map)?;
                for row in rows {
                    views.push(admin_view(row?)?);
                }
            }
        }
        Ok(views)
    }

    /// Total request count for the admin view, with the same filter.
    pub fn count_requests_admin(&self, status: Option<RequestStatus>) -> DbResult<u64> {
        let count: i64 = match status {
            Some(status) => self.conn.query_row(
                "SELECT COUNT(*) FROM requests WHERE status = ?",
                [super::requests::status_to_string(&status)],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM requests", [], |row| row.get(0))?,
        };
        Ok(count as u64)
    }

    /// List paid requests for the admin payments view, newest payment
    /// first, with user and medicine fields joined.
    pub fn list_paid_requests(&self, limit: u32, offset: u64) -> DbResult<Vec<AdminRequestView>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {REQUEST_COLUMNS},
                   m.id, m.name, m.price, m.prescription_required,
                   u.id, u.name, u.email
            FROM requests r
            JOIN medicines m ON m.id = r.medicine_id
            JOIN users u ON u.id = r.user_id
            WHERE r.payment_status = 'paid'
            ORDER BY r.payment_date DESC
            LIMIT ?1 OFFSET ?2
            "#
        ))?;

        let rows = stmt.query_map(params![limit, offset], |row| {
            Ok((
                map_request_row(row)?,
                map_medicine_summary(row, 13)?,
                map_user_summary(row, 17)?,
            ))
        })?;

        let mut views = Vec::new();
        for row in rows {
            views.push(admin_view(row?)?);
        }
        Ok(views)
    }

    /// Total paid request count.
    pub fn count_paid_requests(&self) -> DbResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM requests WHERE payment_status = 'paid'",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn map_medicine_summary(
    row: &rusqlite::Row<'_>,
    base: usize,
) -> rusqlite::Result<MedicineSummary> {
    Ok(MedicineSummary {
        id: row.get(base)?,
        name: row.get(base + 1)?,
        price: row.get(base + 2)?,
        prescription_required: row.get(base + 3)?,
    })
}

fn map_user_summary(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<UserSummary> {
    Ok(UserSummary {
        id: row.get(base)?,
        name: row.get(base + 1)?,
        email: row.get(base + 2)?,
    })
}

fn admin_view(
    (request_row, medicine, user): (
        super::requests::RequestRow,
        MedicineSummary,
        UserSummary,
    ),
) -> DbResult<AdminRequestView> {
    Ok(AdminRequestView {
        request: request_row.try_into()?,
        user,
        medicine,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Medicine, Request, User};

    fn setup() -> (Database, String, String) {
        let db = Database::open_in_memory().unwrap();

        let user = User::new("Amara".into(), "amara@example.com".into());
        db.upsert_user(&user).unwrap();

        let mut medicine = Medicine::new("Paracetamol".into(), "Pain relief".into(), 2.5);
        medicine.stock = 100;
        db.upsert_medicine(&medicine).unwrap();

        (db, user.id, medicine.id)
    }

    fn insert_request(db: &Database, user_id: &str, medicine_id: &str, created_at: &str) -> Request {
        let mut request = Request::new(
            user_id.into(),
            medicine_id.into(),
            None,
            "991234567V".into(),
            false,
        );
        request.created_at = created_at.into();
        db.insert_request(&request).unwrap();
        request
    }

    #[test]
    fn test_user_listing_newest_first_with_join() {
        let (db, user_id, medicine_id) = setup();
        let older = insert_request(&db, &user_id, &medicine_id, "2026-01-01T00:00:00Z");
        let newer = insert_request(&db, &user_id, &medicine_id, "2026-02-01T00:00:00Z");

        let views = db.list_requests_for_user(&user_id, 10, 0).unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].request.id, newer.id);
        assert_eq!(views[1].request.id, older.id);
        assert_eq!(views[0].medicine.name, "Paracetamol");
        assert_eq!(views[0].medicine.price, 2.5);
    }

    #[test]
    fn test_user_listing_scoped_to_owner() {
        let (db, user_id, medicine_id) = setup();
        let other = User::new("Ben".into(), "ben@example.com".into());
        db.upsert_user(&other).unwrap();

        insert_request(&db, &user_id, &medicine_id, "2026-01-01T00:00:00Z");
        insert_request(&db, &other.id, &medicine_id, "2026-01-02T00:00:00Z");

        let views = db.list_requests_for_user(&user_id, 10, 0).unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(db.count_requests_for_user(&user_id).unwrap(), 1);
    }

    #[test]
    fn test_admin_listing_with_status_filter() {
        let (db, user_id, medicine_id) = setup();
        // Auto-approved (OTC)
        insert_request(&db, &user_id, &medicine_id, "2026-01-01T00:00:00Z");

        let mut rx_medicine = Medicine::new("Amoxicillin".into(), "Antibiotic".into(), 12.5);
        rx_medicine.prescription_required = true;
        db.upsert_medicine(&rx_medicine).unwrap();
        let pending = Request::new(
            user_id.clone(),
            rx_medicine.id.clone(),
            Some("/uploads/rx.pdf".into()),
            "991234567V".into(),
            true,
        );
        db.insert_request(&pending).unwrap();

        let all = db.list_requests_admin(None, 10, 0).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].user.email, "amara@example.com");

        let pending_only = db
            .list_requests_admin(Some(RequestStatus::Pending), 10, 0)
            .unwrap();
        assert_eq!(pending_only.len(), 1);
        assert_eq!(pending_only[0].request.id, pending.id);
        assert_eq!(
            db.count_requests_admin(Some(RequestStatus::Pending))
                .unwrap(),
            1
        );
        assert_eq!(db.count_requests_admin(None).unwrap(), 2);
    }

    #[test]
    fn test_limit_and_offset() {
        let (db, user_id, medicine_id) = setup();
        for day in 1..=5 {
            insert_request(
                &db,
                &user_id,
                &medicine_id,
                &format!("2026-01-{:02}T00:00:00Z", day),
            );
        }

        let first_page = db.list_requests_for_user(&user_id, 2, 0).unwrap();
        let second_page = db.list_requests_for_user(&user_id, 2, 2).unwrap();
        assert_eq!(first_page.len(), 2);
        assert_eq!(second_page.len(), 2);
        assert_ne!(first_page[0].request.id, second_page[0].request.id);
    }

    #[test]
    fn test_paid_requests_listing() {
        let (db, user_id, medicine_id) = setup();
        let request = insert_request(&db, &user_id, &medicine_id, "2026-01-01T00:00:00Z");
        insert_request(&db, &user_id, &medicine_id, "2026-01-02T00:00:00Z");

        // OTC request is already approved; pay it
        db.mark_paid(&request.id).unwrap();

        let paid = db.list_paid_requests(10, 0).unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].request.id, request.id);
        assert_eq!(db.count_paid_requests().unwrap(), 1);
    }

    #[test]
    fn test_paid_requests_newest_payment_first() {
        let (db, user_id, medicine_id) = setup();
        let early = insert_request(&db, &user_id, &medicine_id, "2026-01-01T00:00:00Z");
        let late = insert_request(&db, &user_id, &medicine_id, "2026-01-02T00:00:00Z");

        db.mark_paid(&early.id).unwrap();
        db.mark_paid(&late.id).unwrap();

        // Pin the payment dates so the ordering assertion is deterministic;
        // the older request gets the more recent payment
        db.conn()
            .execute(
                "UPDATE requests SET payment_date = ?2 WHERE id = ?1",
                rusqlite::params![early.id, "2026-03-01T00:00:00Z"],
            )
            .unwrap();
        db.conn()
            .execute(
                "UPDATE requests SET payment_date = ?2 WHERE id = ?1",
                rusqlite::params![late.id, "2026-02-01T00:00:00Z"],
            )
            .unwrap();

        let paid = db.list_paid_requests(10, 0).unwrap();
        assert_eq!(paid.len(), 2);
        assert_eq!(paid[0].request.id, early.id);
        assert_eq!(paid[1].request.id, late.id);
    }
}
