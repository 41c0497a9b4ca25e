//! Version identifiers for bundled schemas and incoming requests.
//!
//! Catalog entries are stored on disk (and in the compiled-in manifest) as
//! `v<major>.<minor>.<patch>`. Requests may omit the prefix and may carry
//! pre-release or build suffixes; only the numeric triple takes part in
//! matching a request to a catalog entry.

use crate::error::SchemaError;
use semver::{BuildMetadata, Prerelease, Version};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Prefix carried by every catalog identifier.
pub const VERSION_PREFIX: char = 'v';

/// Identifier of one bundled schema.
///
/// Ordering follows semver precedence, so `v3.95.0 < v3.132.0` and a
/// pre-release sorts below the release of the same triple. Build metadata
/// only breaks ties between otherwise equal identifiers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaVersion(Version);

impl SchemaVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    /// Parse an identifier, accepting a single optional leading `v`.
    pub fn parse(raw: &str) -> Result<Self, semver::Error> {
        Version::parse(strip_prefix(raw)).map(Self)
    }

    pub fn semver(&self) -> &Version {
        &self.0
    }

    /// The identifier with the `v` prefix, e.g. `v3.24.0`.
    pub fn id(&self) -> String {
        self.to_string()
    }

    /// Same numeric triple with any pre-release or build suffix removed.
    pub fn release(&self) -> Self {
        let mut version = self.0.clone();
        version.pre = Prerelease::EMPTY;
        version.build = BuildMetadata::EMPTY;
        Self(version)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{VERSION_PREFIX}{}", self.0)
    }
}

impl FromStr for SchemaVersion {
    type Err = semver::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A version string as supplied by a caller, kept alongside its parsed form
/// so error messages can echo the original text.
#[derive(Clone, Debug)]
pub struct RequestedVersion {
    raw: String,
    parsed: SchemaVersion,
}

impl RequestedVersion {
    /// Parse a caller-supplied version.
    ///
    /// Anything the strict semver grammar rejects (`invalid`, `3.x`, leading
    /// zeros, a fourth segment) is a [`SchemaError::MalformedVersion`].
    pub fn parse(raw: &str) -> Result<Self, SchemaError> {
        let parsed =
            SchemaVersion::parse(raw).map_err(|source| SchemaError::MalformedVersion {
                requested: raw.to_string(),
                source,
            })?;
        Ok(Self {
            raw: raw.to_string(),
            parsed,
        })
    }

    /// The string exactly as the caller passed it.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Upper bound used when matching against the catalog: the numeric triple
    /// only, so `3.132.0-alpha` lands in the same bucket as `3.132.0`.
    pub fn bound(&self) -> SchemaVersion {
        self.parsed.release()
    }
}

fn strip_prefix(raw: &str) -> &str {
    raw.strip_prefix(VERSION_PREFIX).unwrap_or(raw)
}
