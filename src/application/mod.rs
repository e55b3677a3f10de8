pub mod cart;
pub mod catalog;
pub mod errors;
pub mod orders;
pub mod session;

pub use cart::{CartViewModel, SubmissionState};
pub use catalog::CatalogViewModel;
pub use errors::{CartError, PurchaseError};
pub use orders::OrderHistoryViewModel;
pub use session::{SessionStatus, SessionStore};
