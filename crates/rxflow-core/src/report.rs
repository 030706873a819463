//! Dashboard statistics for the admin view.

use serde::{Deserialize, Serialize};

use crate::db::Database;
use crate::engine::{EngineError, EngineResult};
use crate::models::{RequestStatus, Session};

/// Aggregate counts shown on the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub users: UserStats,
    pub medicines: MedicineStats,
    pub requests: RequestStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserStats {
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineStats {
    pub total: u64,
    pub low_stock: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestStats {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
}

/// Compute dashboard statistics. Admin-only.
pub fn dashboard_stats(db: &Database, session: &Session) -> EngineResult<DashboardStats> {
    if !session.is_admin() {
        return Err(EngineError::Forbidden("Admin role required".into()));
    }

    Ok(DashboardStats {
        users: UserStats {
            total: db.count_users()?,
        },
        medicines: MedicineStats {
            total: db.count_medicines()?,
            low_stock: db.count_low_stock_medicines()?,
        },
        requests: RequestStats {
            total: db.count_requests()?,
            pending: db.count_requests_by_status(RequestStatus::Pending)?,
            approved: db.count_requests_by_status(RequestStatus::Approved)?,
        },
    })
}
