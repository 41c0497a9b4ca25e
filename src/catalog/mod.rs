//! Schema catalog wiring.
//!
//! A [`SchemaBundle`] is the storage the schemas ship in: the manifest
//! compiled into the crate by `build.rs`, or a directory laid out as
//! `<root>/<version>/plan.json`. [`SchemaCatalog`] is the sorted view of the
//! versions a bundle holds and answers "newest entry at or below X".

pub mod bundle;
pub mod index;

pub use bundle::{DirectoryBundle, EmbeddedBundle, SCHEMA_FILE_NAME, SchemaBundle};
pub use index::{CatalogEntry, SchemaCatalog};
