//! Error taxonomy for catalog lookups and schema resolution.
//!
//! Resolution-policy failures (`NoSchemasAvailable`, `NoCompatibleSchema`,
//! `MalformedVersion`) are kept apart from `CorruptBundle`, which signals a
//! damaged package rather than a bad request.

use thiserror::Error;

/// Errors surfaced by [`crate::SchemaResolver`] and the free functions built
/// on it.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("No schema versions available")]
    NoSchemasAvailable,

    #[error(
        "No compatible schema found for version {requested}. Available versions: {}",
        .available.join(", ")
    )]
    NoCompatibleSchema {
        requested: String,
        available: Vec<String>,
    },

    #[error("Malformed version '{requested}': {source}")]
    MalformedVersion {
        requested: String,
        #[source]
        source: semver::Error,
    },

    #[error("bundled schema {version} is corrupt: {reason}")]
    CorruptBundle { version: String, reason: String },
}

impl SchemaError {
    pub(crate) fn corrupt(version: impl ToString, reason: impl ToString) -> Self {
        SchemaError::CorruptBundle {
            version: version.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True for failures caused by the caller's input rather than the bundle.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            SchemaError::NoCompatibleSchema { .. } | SchemaError::MalformedVersion { .. }
        )
    }
}
