//! Bundle selection shared by the binaries.
//!
//! Library calls always use the compiled-in schemas. Binaries may point at an
//! unpacked `schemas/plan` directory instead, via `--schemas-dir` or the
//! `PULUMIX_SCHEMA_DIR` environment variable.

use crate::catalog::DirectoryBundle;
use crate::resolver::SchemaResolver;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Environment variable naming a schema directory to use instead of the
/// compiled-in bundle.
pub const SCHEMA_DIR_ENV: &str = "PULUMIX_SCHEMA_DIR";

/// Process-wide resolver over the compiled-in schemas.
pub fn default_resolver() -> &'static SchemaResolver {
    static RESOLVER: OnceLock<SchemaResolver> = OnceLock::new();
    RESOLVER.get_or_init(SchemaResolver::embedded)
}

/// Schema directory requested through the environment, if any.
///
/// Empty values are ignored so `PULUMIX_SCHEMA_DIR=` behaves like unset.
pub fn schema_dir_from_env() -> Option<PathBuf> {
    env::var_os(SCHEMA_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Build a resolver for a binary invocation.
///
/// An explicit directory wins over `PULUMIX_SCHEMA_DIR`; with neither, the
/// compiled-in schemas are used.
pub fn resolver_for(schemas_dir: Option<&Path>) -> SchemaResolver {
    match schemas_dir
        .map(Path::to_path_buf)
        .or_else(schema_dir_from_env)
    {
        Some(dir) => {
            log::debug!("using schema directory {}", dir.display());
            SchemaResolver::new(DirectoryBundle::new(dir))
        }
        None => SchemaResolver::embedded(),
    }
}
