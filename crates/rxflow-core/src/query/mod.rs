//! Paginated listing queries for user and admin views.

use crate::db::Database;
use crate::engine::{EngineError, EngineResult};
use crate::models::{
    AdminRequestView, Page, PageParams, RequestStatus, Session, UserRequestView,
};

/// Read-side query object over the request store.
pub struct RequestQuery<'a> {
    db: &'a Database,
}

impl<'a> RequestQuery<'a> {
    /// Create a new query object.
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// The caller's own requests, newest first, medicine fields joined.
    pub fn list_user_requests(
        &self,
        session: &Session,
        params: PageParams,
    ) -> EngineResult<Page<UserRequestView>> {
        let params = params.clamped();
        let items =
            self.db
                .list_requests_for_user(&session.user_id, params.limit, params.offset())?;
        let total = self.db.count_requests_for_user(&session.user_id)?;
        Ok(Page::new(items, params, total))
    }

    /// All requests for the admin view, optionally filtered by a single
    /// review status, newest first, user and medicine fields joined.
    pub fn list_all_requests(
        &self,
        session: &Session,
        status_filter: Option<&str>,
        params: PageParams,
    ) -> EngineResult<Page<AdminRequestView>> {
        self.require_admin(session)?;

        let status = status_filter.map(parse_status_filter).transpose()?;
        let params = params.clamped();
        let items = self
            .db
            .list_requests_admin(status, params.limit, params.offset())?;
        let total = self.db.count_requests_admin(status)?;
        Ok(Page::new(items, params, total))
    }

    /// Paid requests for the admin payments view, newest payment first.
    pub fn list_payments(
        &self,
        session: &Session,
        params: PageParams,
    ) -> EngineResult<Page<AdminRequestView>> {
        self.require_admin(session)?;

        let params = params.clamped();
        let items = self.db.list_paid_requests(params.limit, params.offset())?;
        let total = self.db.count_paid_requests()?;
        Ok(Page::new(items, params, total))
    }

    fn require_admin(&self, session: &Session) -> EngineResult<()> {
        if !session.is_admin() {
            return Err(EngineError::Forbidden("Admin role required".into()));
        }
        Ok(())
    }
}

fn parse_status_filter(s: &str) -> EngineResult<RequestStatus> {
    match s {
        "pending" => Ok(RequestStatus::Pending),
        "approved" => Ok(RequestStatus::Approved),
        "rejected" => Ok(RequestStatus::Rejected),
        _ => Err(EngineError::Validation(
            "Status filter must be pending, approved or rejected".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Medicine, Request, User};

    fn setup() -> (Database, Session, String) {
        let db = Database::open_in_memory().unwrap();

        let user = User::new("Amara".into(), "amara@example.com".into());
        db.upsert_user(&user).unwrap();

        let mut medicine = Medicine::new("Paracetamol".into(), "Pain relief".into(), 2.5);
        medicine.stock = 100;
        db.upsert_medicine(&medicine).unwrap();

        (db, Session::user(user.id), medicine.id)
    }

    fn insert_requests(db: &Database, user_id: &str, medicine_id: &str, count: usize) {
        for i in 0..count {
            let mut request = Request::new(
                user_id.into(),
                medicine_id.into(),
                None,
                "991234567V".into(),
                false,
            );
            request.created_at = format!("2026-01-01T00:00:{:02}Z", i);
            db.insert_request(&request).unwrap();
        }
    }

    #[test]
    fn test_user_list_pagination_totals() {
        let (db, session, medicine_id) = setup();
        insert_requests(&db, &session.user_id, &medicine_id, 5);

        let query = RequestQuery::new(&db);
        let page = query
            .list_user_requests(&session, PageParams::new(1, 2))
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);

        let last = query
            .list_user_requests(&session, PageParams::new(3, 2))
            .unwrap();
        assert_eq!(last.items.len(), 1);
    }

    #[test]
    fn test_pagination_clamping() {
        let (db, session, medicine_id) = setup();
        insert_requests(&db, &session.user_id, &medicine_id, 3);

        let query = RequestQuery::new(&db);

        // limit=1000 clamps to 100, page=0 clamps to 1
        let page = query
            .list_user_requests(&session, PageParams::new(0, 1000))
            .unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 100);
        assert_eq!(page.items.len(), 3);
    }

    #[test]
    fn test_extreme_page_number_returns_empty_page() {
        let (db, session, medicine_id) = setup();
        insert_requests(&db, &session.user_id, &medicine_id, 3);

        let query = RequestQuery::new(&db);
        let page = query
            .list_user_requests(&session, PageParams::new(u32::MAX, 100))
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_admin_list_requires_admin() {
        let (db, session, _) = setup();
        let query = RequestQuery::new(&db);

        let err = query
            .list_all_requests(&session, None, PageParams::default())
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn test_admin_list_bad_filter() {
        let (db, _, _) = setup();
        let query = RequestQuery::new(&db);
        let admin = Session::admin("admin-1");

        let err = query
            .list_all_requests(&admin, Some("shipped"), PageParams::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_admin_list_filtered() {
        let (db, session, medicine_id) = setup();
        insert_requests(&db, &session.user_id, &medicine_id, 2);

        let query = RequestQuery::new(&db);
        let admin = Session::admin("admin-1");

        let approved = query
            .list_all_requests(&admin, Some("approved"), PageParams::default())
            .unwrap();
        assert_eq!(approved.total, 2);

        let pending = query
            .list_all_requests(&admin, Some("pending"), PageParams::default())
            .unwrap();
        assert_eq!(pending.total, 0);
    }

    #[test]
    fn test_payments_list() {
        let (db, session, medicine_id) = setup();
        insert_requests(&db, &session.user_id, &medicine_id, 2);

        // Pay one of the auto-approved requests
        let views = db.list_requests_for_user(&session.user_id, 10, 0).unwrap();
        db.mark_paid(&views[0].request.id).unwrap();

        let query = RequestQuery::new(&db);
        let admin = Session::admin("admin-1");
        let payments = query.list_payments(&admin, PageParams::default()).unwrap();
        assert_eq!(payments.total, 1);
        assert!(payments.items[0].request.payment_date.is_some());
    }
}
