//! Read-side view types with joined display fields.

use serde::{Deserialize, Serialize};

use super::request::Request;

/// Medicine fields joined into listing rows for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MedicineSummary {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub prescription_required: bool,
}

/// User fields joined into admin listing rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A request as seen in the owner's own listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRequestView {
    #[serde(flatten)]
    pub request: Request,
    pub medicine: MedicineSummary,
}

/// A request as seen in the admin listing, with both sides joined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminRequestView {
    #[serde(flatten)]
    pub request: Request,
    pub user: UserSummary,
    pub medicine: MedicineSummary,
}
