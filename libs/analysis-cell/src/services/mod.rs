pub mod extraction;
pub mod gemini;
pub mod prompt;
pub mod schema;
