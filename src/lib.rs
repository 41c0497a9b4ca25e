//! Bundled Pulumi deployment-plan schemas with version resolution.
//!
//! The crate ships one JSON Schema per Pulumi release in which the plan
//! format changed. Callers ask for the schema matching the Pulumi version
//! that produced a plan; the resolver picks the newest bundled schema at or
//! below that version, so releases between two bundled schemas share the
//! older one and releases newer than every bundled schema get the newest.
//!
//! The free functions here use the compiled-in bundle. Build a
//! [`SchemaResolver`] directly to resolve against another [`SchemaBundle`]
//! such as a [`DirectoryBundle`].

pub mod catalog;
pub mod error;
pub mod plan_validation;
pub mod resolver;
pub mod runtime;
pub mod schema_loader;
pub mod version;

pub use catalog::{
    CatalogEntry, DirectoryBundle, EmbeddedBundle, SCHEMA_FILE_NAME, SchemaBundle, SchemaCatalog,
};
pub use error::SchemaError;
pub use plan_validation::{PlanValidator, validate_plan_files};
pub use resolver::SchemaResolver;
pub use schema_loader::{FlattenError, flatten_root_ref};
pub use version::{RequestedVersion, SchemaVersion, VERSION_PREFIX};

use serde_json::Value;

/// All bundled schema versions, ascending.
pub fn list_versions() -> Vec<SchemaVersion> {
    runtime::default_resolver().list_versions()
}

/// Schema document for the Pulumi version `requested` (`v3.112.0` or
/// `3.112.0`).
pub fn get_schema(requested: &str) -> Result<Value, SchemaError> {
    runtime::default_resolver().get_schema(requested)
}

/// Bundled version whose schema `requested` resolves to.
pub fn resolve(requested: &str) -> Result<SchemaVersion, SchemaError> {
    runtime::default_resolver().resolve(requested)
}

/// Validate a plan document against the schema for `requested`.
///
/// Returns every violation; an empty list means the plan is valid.
pub fn validate_plan(requested: &str, document: &Value) -> Result<Vec<String>, SchemaError> {
    runtime::default_resolver().validate_plan(requested, document)
}
