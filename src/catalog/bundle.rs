//! Storage backends for bundled schema documents.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

/// File name of the schema document inside each version directory.
pub const SCHEMA_FILE_NAME: &str = "plan.json";

/// `(identifier, document)` pairs generated from `schemas/plan/` at build time.
static BUNDLED: &[(&str, &str)] = include!(concat!(env!("OUT_DIR"), "/bundled_schemas.rs"));

/// Read-only storage mapping version identifiers to schema documents.
///
/// Identifiers are returned exactly as stored (`v3.24.0`); the catalog takes
/// care of parsing and ordering them.
pub trait SchemaBundle: fmt::Debug + Send + Sync {
    /// Every identifier present in storage, in no particular order.
    ///
    /// Missing storage yields an empty list rather than an error.
    fn entries(&self) -> Vec<String>;

    /// Raw bytes of the document stored under `id`.
    fn read(&self, id: &str) -> io::Result<Vec<u8>>;
}

/// Schemas compiled into the binary.
#[derive(Clone, Copy)]
pub struct EmbeddedBundle {
    documents: &'static [(&'static str, &'static str)],
}

impl EmbeddedBundle {
    /// The plan schemas packaged with this crate.
    pub fn bundled() -> Self {
        Self::new(BUNDLED)
    }

    /// Wrap an arbitrary static manifest.
    pub fn new(documents: &'static [(&'static str, &'static str)]) -> Self {
        Self { documents }
    }
}

impl Default for EmbeddedBundle {
    fn default() -> Self {
        Self::bundled()
    }
}

impl fmt::Debug for EmbeddedBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedBundle")
            .field("entries", &self.documents.len())
            .finish()
    }
}

impl SchemaBundle for EmbeddedBundle {
    fn entries(&self) -> Vec<String> {
        self.documents.iter().map(|(id, _)| id.to_string()).collect()
    }

    fn read(&self, id: &str) -> io::Result<Vec<u8>> {
        self.documents
            .iter()
            .find(|(candidate, _)| *candidate == id)
            .map(|(_, document)| document.as_bytes().to_vec())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no embedded schema for {id}"),
                )
            })
    }
}

/// Schemas laid out on disk as `<root>/<version>/plan.json`.
///
/// Only directories holding a `plan.json` count as entries, the same rule
/// `build.rs` applies to the compiled-in manifest.
#[derive(Clone, Debug)]
pub struct DirectoryBundle {
    root: PathBuf,
}

impl DirectoryBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, id: &str) -> PathBuf {
        self.root.join(id).join(SCHEMA_FILE_NAME)
    }
}

impl SchemaBundle for DirectoryBundle {
    fn entries(&self) -> Vec<String> {
        let dir = match fs::read_dir(&self.root) {
            Ok(dir) => dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                log::warn!(
                    "unable to list schema directory {}: {err}",
                    self.root.display()
                );
                return Vec::new();
            }
        };

        let mut ids = Vec::new();
        for entry in dir.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !path.join(SCHEMA_FILE_NAME).is_file() {
                log::warn!(
                    "skipping schema directory {}: no {SCHEMA_FILE_NAME}",
                    path.display()
                );
                continue;
            }
            ids.push(name.to_string());
        }
        ids
    }

    fn read(&self, id: &str) -> io::Result<Vec<u8>> {
        fs::read(self.document_path(id))
    }
}
