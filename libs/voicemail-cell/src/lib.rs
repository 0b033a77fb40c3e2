// Voicemail Cell - inbox session, triage search/filter and slot suggestions
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::voicemail_routes;
pub use services::{InboxSession, VoicemailFilter};
