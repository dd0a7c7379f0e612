pub mod logging;
pub mod text;

pub use text::{redact_token, slugify, truncate_text};
