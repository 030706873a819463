//! Domain models for the prescription-request lifecycle.

mod medicine;
mod page;
mod request;
mod user;
mod views;

pub use medicine::*;
pub use page::*;
pub use request::*;
pub use user::*;
pub use views::*;
