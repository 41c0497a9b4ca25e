//! Sorted view of the versions held by a schema bundle.
//!
//! The catalog is strict about ordering and duplicates: entries are kept in
//! ascending semver order and two storage names that parse to the same
//! version collapse into one entry, so every version maps to exactly one
//! stored document.

use crate::catalog::bundle::SchemaBundle;
use crate::version::SchemaVersion;
use semver::Prerelease;
use std::collections::BTreeMap;

/// One catalog version plus the storage identifier its document lives under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub version: SchemaVersion,
    pub storage_id: String,
}

/// Ascending, duplicate-free list of bundled schema versions.
#[derive(Clone, Debug, Default)]
pub struct SchemaCatalog {
    entries: Vec<CatalogEntry>,
}

impl SchemaCatalog {
    /// Enumerate a bundle and build the sorted catalog.
    pub fn from_bundle(bundle: &dyn SchemaBundle) -> Self {
        let catalog = Self::from_ids(bundle.entries());
        log::debug!(
            "schema catalog built from {bundle:?}: {} version(s)",
            catalog.len()
        );
        catalog
    }

    /// Build a catalog from raw storage identifiers.
    ///
    /// Identifiers that do not parse as versions are skipped with a warning.
    /// When two identifiers share a precedence (build metadata is ignored)
    /// the lexically smaller one wins so the choice does not depend on
    /// storage enumeration order.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        ids.sort();

        // Keyed on precedence: names differing only in build metadata collide.
        let mut by_version: BTreeMap<(u64, u64, u64, Prerelease), CatalogEntry> = BTreeMap::new();
        for id in ids {
            let version = match SchemaVersion::parse(&id) {
                Ok(version) => version,
                Err(err) => {
                    log::warn!("skipping bundled schema '{id}': not a version ({err})");
                    continue;
                }
            };
            let (major, minor, patch, pre) = precedence(&version);
            let key = (major, minor, patch, pre.clone());
            if let Some(existing) = by_version.get(&key) {
                log::warn!(
                    "skipping bundled schema '{id}': duplicates '{}'",
                    existing.storage_id
                );
                continue;
            }
            by_version.insert(
                key,
                CatalogEntry {
                    version,
                    storage_id: id,
                },
            );
        }

        Self {
            entries: by_version.into_values().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Versions in ascending order.
    pub fn versions(&self) -> impl Iterator<Item = &SchemaVersion> {
        self.entries.iter().map(|entry| &entry.version)
    }

    /// Version identifiers (`v`-prefixed) in ascending order.
    pub fn ids(&self) -> Vec<String> {
        self.versions().map(SchemaVersion::id).collect()
    }

    pub fn latest(&self) -> Option<&CatalogEntry> {
        self.entries.last()
    }

    pub fn get(&self, version: &SchemaVersion) -> Option<&CatalogEntry> {
        self.entries
            .binary_search_by(|entry| entry.version.cmp(version))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Newest entry whose precedence is at or below `bound`.
    ///
    /// Build metadata is ignored, pre-releases sort below their release.
    /// Returns `None` when every entry is newer than `bound`.
    pub fn max_at_or_below(&self, bound: &SchemaVersion) -> Option<&CatalogEntry> {
        let key = precedence(bound);
        let idx = self
            .entries
            .partition_point(|entry| precedence(&entry.version) <= key);
        idx.checked_sub(1).map(|last| &self.entries[last])
    }
}

fn precedence(version: &SchemaVersion) -> (u64, u64, u64, &Prerelease) {
    let v = version.semver();
    (v.major, v.minor, v.patch, &v.pre)
}
