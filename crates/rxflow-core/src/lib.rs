//! RxFlow Core Library
//!
//! Prescription-request lifecycle engine for a pharmacy-operations backend.
//!
//! # Architecture
//!
//! ```text
//! Catalog lookup ──► Lifecycle Engine ──► Request Store (SQLite)
//!  (policy/price)        │                     │
//!                        │                     ▼
//!   Payment Adapter ─────┤              Query / Listing
//!   (mock authorize)     │              (user + admin views)
//!                        ▼                     │
//!                 Delivery transitions         ▼
//!                 (admin, gated on          Reports
//!                  approved && paid)     (dashboard stats)
//! ```
//!
//! # Core Principles
//!
//! - **Explicit state machines.** Review, payment, and delivery statuses
//!   each carry a transition table; illegal transitions are rejected before
//!   any write, and terminal states stay terminal.
//! - **Explicit sessions.** Every operation takes the caller's [`Session`];
//!   there is no ambient auth state.
//! - **Atomic transitions.** Each state change is a single conditional
//!   UPDATE that re-checks the state it moves from, so concurrent admin
//!   tabs and double-submitted payments cannot lose writes.
//!
//! # Modules
//!
//! - [`db`]: SQLite store (requests, medicines, users, listings)
//! - [`models`]: Domain types (Request, Medicine, Session, pagination)
//! - [`engine`]: Lifecycle engine (create, review, payment, delivery)
//! - [`query`]: Paginated user/admin listings
//! - [`report`]: Dashboard statistics

pub mod db;
pub mod engine;
pub mod models;
pub mod query;
pub mod report;

// Re-export commonly used types
pub use db::Database;
pub use engine::{
    CardDetails, EngineError, EngineResult, MockAuthorizer, NewRequest, PaymentAuthorizer,
    PaymentOutcome, PaymentSubmission, RequestEngine,
};
pub use models::{
    AdminRequestView, DeliveryStatus, Medicine, Page, PageParams, PaymentStatus, Request,
    RequestStatus, Role, Session, User, UserRequestView,
};
pub use query::RequestQuery;
pub use report::{dashboard_stats, DashboardStats};
