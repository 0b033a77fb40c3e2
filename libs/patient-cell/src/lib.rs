pub mod models;
pub mod handlers;
pub mod router;
pub mod services;

pub use models::*;
pub use handlers::*;
pub use router::*;
pub use services::resolver::{matching_patients, normalize_phone_number, resolve_candidates};
