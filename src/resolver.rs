//! Maps requested versions onto bundled schemas.
//!
//! A request resolves to the newest catalog entry whose version is at or
//! below the request's `major.minor.patch`. Requests newer than every entry
//! therefore fall back to the newest schema, while requests older than every
//! entry fail with the full list of available versions.

use crate::catalog::{CatalogEntry, EmbeddedBundle, SchemaBundle, SchemaCatalog};
use crate::error::SchemaError;
use crate::plan_validation::PlanValidator;
use crate::schema_loader::parse_schema;
use crate::version::{RequestedVersion, SchemaVersion};
use serde_json::Value;
use std::sync::OnceLock;

/// Resolver over one schema bundle.
///
/// The catalog is enumerated on first use and cached for the resolver's
/// lifetime; documents are read from the bundle on every load.
#[derive(Debug)]
pub struct SchemaResolver {
    bundle: Box<dyn SchemaBundle>,
    catalog: OnceLock<SchemaCatalog>,
}

impl SchemaResolver {
    pub fn new(bundle: impl SchemaBundle + 'static) -> Self {
        Self {
            bundle: Box::new(bundle),
            catalog: OnceLock::new(),
        }
    }

    /// Resolver over the schemas compiled into this crate.
    pub fn embedded() -> Self {
        Self::new(EmbeddedBundle::bundled())
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        self.catalog
            .get_or_init(|| SchemaCatalog::from_bundle(self.bundle.as_ref()))
    }

    /// Bundled versions, ascending by semver precedence.
    pub fn list_versions(&self) -> Vec<SchemaVersion> {
        self.catalog().versions().cloned().collect()
    }

    /// Catalog version whose schema should be used for `requested`.
    pub fn resolve(&self, requested: &str) -> Result<SchemaVersion, SchemaError> {
        self.resolve_entry(requested)
            .map(|entry| entry.version.clone())
    }

    /// Resolve `requested` and load the matching schema document.
    pub fn get_schema(&self, requested: &str) -> Result<Value, SchemaError> {
        let entry = self.resolve_entry(requested)?;
        self.load_entry(entry)
    }

    /// Load the document stored for a catalog version.
    ///
    /// Versions outside the catalog are reported as
    /// [`SchemaError::NoCompatibleSchema`]; read or parse failures on a
    /// catalog entry are [`SchemaError::CorruptBundle`].
    pub fn load_schema_document(&self, version: &SchemaVersion) -> Result<Value, SchemaError> {
        let catalog = self.catalog();
        let entry = catalog
            .get(version)
            .ok_or_else(|| SchemaError::NoCompatibleSchema {
                requested: version.id(),
                available: catalog.ids(),
            })?;
        self.load_entry(entry)
    }

    /// Compiled validator for the schema `requested` resolves to.
    pub fn validator(&self, requested: &str) -> Result<PlanValidator, SchemaError> {
        let entry = self.resolve_entry(requested)?;
        let schema = self.load_entry(entry)?;
        PlanValidator::new(entry.version.clone(), schema)
    }

    /// Validate `document` against the schema `requested` resolves to.
    pub fn validate_plan(
        &self,
        requested: &str,
        document: &Value,
    ) -> Result<Vec<String>, SchemaError> {
        Ok(self.validator(requested)?.validate(document))
    }

    fn resolve_entry(&self, requested: &str) -> Result<&CatalogEntry, SchemaError> {
        let catalog = self.catalog();
        if catalog.is_empty() {
            return Err(SchemaError::NoSchemasAvailable);
        }
        let request = RequestedVersion::parse(requested)?;

        let entry = catalog.max_at_or_below(&request.bound()).ok_or_else(|| {
            SchemaError::NoCompatibleSchema {
                requested: request.as_str().to_string(),
                available: catalog.ids(),
            }
        })?;
        log::debug!("resolved schema version {} -> {}", request.as_str(), entry.version);
        Ok(entry)
    }

    fn load_entry(&self, entry: &CatalogEntry) -> Result<Value, SchemaError> {
        let bytes = self
            .bundle
            .read(&entry.storage_id)
            .map_err(|err| SchemaError::corrupt(&entry.version, format!("reading schema: {err}")))?;
        parse_schema(&entry.version, &bytes)
    }
}

impl Default for SchemaResolver {
    fn default() -> Self {
        Self::embedded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static TWO_VERSIONS: &[(&str, &str)] = &[
        ("v3.24.0", r#"{"title": "first"}"#),
        ("v3.35.0", r#"{"title": "second"}"#),
    ];

    fn resolver() -> SchemaResolver {
        SchemaResolver::new(EmbeddedBundle::new(TWO_VERSIONS))
    }

    fn title(resolver: &SchemaResolver, requested: &str) -> String {
        resolver
            .get_schema(requested)
            .expect("schema resolves")["title"]
            .as_str()
            .expect("title present")
            .to_string()
    }

    #[test]
    fn exact_and_prefixless_matches() {
        let resolver = resolver();
        assert_eq!(title(&resolver, "v3.24.0"), "first");
        assert_eq!(title(&resolver, "3.24.0"), "first");
        assert_eq!(title(&resolver, "v3.35.0"), "second");
    }

    #[test]
    fn between_entries_resolves_to_lower() {
        let resolver = resolver();
        assert_eq!(title(&resolver, "v3.30.0"), "first");
        assert_eq!(title(&resolver, "v3.24.5"), "first");
    }

    #[test]
    fn future_versions_fall_back_to_latest() {
        let resolver = resolver();
        assert_eq!(title(&resolver, "v999.0.0"), "second");
        assert_eq!(resolver.resolve("v999.999.999").unwrap().id(), "v3.35.0");
    }

    #[test]
    fn prerelease_request_uses_release_bucket() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("v3.35.0-alpha").unwrap().id(), "v3.35.0");
        assert_eq!(resolver.resolve("3.35.0+build.5").unwrap().id(), "v3.35.0");
    }

    #[test]
    fn too_old_lists_available_versions() {
        let err = resolver().get_schema("v1.0.0").unwrap_err();
        match &err {
            SchemaError::NoCompatibleSchema {
                requested,
                available,
            } => {
                assert_eq!(requested, "v1.0.0");
                assert_eq!(available, &vec!["v3.24.0".to_string(), "v3.35.0".to_string()]);
            }
            other => panic!("expected NoCompatibleSchema, got {other:?}"),
        }
        assert!(
            err.to_string()
                .contains("version v1.0.0. Available versions: v3.24.0, v3.35.0")
        );
    }

    #[test]
    fn malformed_requests_are_distinct() {
        let resolver = resolver();
        for raw in ["invalid", "3.x"] {
            let err = resolver.get_schema(raw).unwrap_err();
            assert!(
                matches!(err, SchemaError::MalformedVersion { .. }),
                "{raw}: {err:?}"
            );
        }
    }

    #[test]
    fn empty_bundle_has_no_schemas() {
        static EMPTY: &[(&str, &str)] = &[];
        let resolver = SchemaResolver::new(EmbeddedBundle::new(EMPTY));
        assert!(resolver.list_versions().is_empty());
        for raw in ["v3.24.0", "invalid"] {
            let err = resolver.get_schema(raw).unwrap_err();
            assert!(matches!(err, SchemaError::NoSchemasAvailable), "{raw}: {err:?}");
        }
        let err = resolver.resolve("3.x").unwrap_err();
        assert!(matches!(err, SchemaError::NoSchemasAvailable));
    }

    #[test]
    fn corrupt_document_is_not_substituted() {
        static BROKEN: &[(&str, &str)] = &[
            ("v3.24.0", r#"{"title": "first"}"#),
            ("v3.35.0", "{ not json"),
        ];
        let resolver = SchemaResolver::new(EmbeddedBundle::new(BROKEN));
        let err = resolver.get_schema("v3.40.0").unwrap_err();
        match err {
            SchemaError::CorruptBundle { version, .. } => assert_eq!(version, "v3.35.0"),
            other => panic!("expected CorruptBundle, got {other:?}"),
        }
        assert_eq!(title(&resolver, "v3.30.0"), "first");
    }

    #[test]
    fn load_schema_document_requires_catalog_version() {
        let resolver = resolver();
        let doc = resolver
            .load_schema_document(&SchemaVersion::new(3, 35, 0))
            .unwrap();
        assert_eq!(doc, json!({"title": "second"}));
        let err = resolver
            .load_schema_document(&SchemaVersion::new(3, 30, 0))
            .unwrap_err();
        assert!(matches!(err, SchemaError::NoCompatibleSchema { .. }));
    }

    #[test]
    fn repeated_calls_are_idempotent() {
        let resolver = resolver();
        assert_eq!(resolver.list_versions(), resolver.list_versions());
        assert_eq!(
            resolver.get_schema("v3.30.0").unwrap(),
            resolver.get_schema("v3.30.0").unwrap()
        );
    }
}
