pub mod directory;
pub mod error;

pub use directory::*;
pub use error::AppError;
