//! Typed views over stored documents

pub mod user;

pub use user::{CREDENTIAL_FIELD, User, redact};
