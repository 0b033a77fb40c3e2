pub mod filter;
pub mod session;
pub mod slots;

pub use filter::{filter_and_sort, VoicemailFilter};
pub use session::InboxSession;
pub use slots::suggest_slots;
