//! Shared JSON Schema loading for bundled plan schemas.
//!
//! Bundled bytes are parsed into a JSON object and compiled into a
//! `jsonschema` validator; any failure along the way is reported as a
//! corrupt bundle for the version being loaded. [`flatten_root_ref`] is the
//! packaging transform applied to raw reflector output before a schema is
//! added to `schemas/plan/`.

use crate::error::SchemaError;
use crate::version::SchemaVersion;
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use thiserror::Error;

const REF: &str = "$ref";
const DEFS: &str = "$defs";
const DEFS_REF_PREFIX: &str = "#/$defs/";

/// Parse a bundled document; it must be a JSON object.
pub(crate) fn parse_schema(version: &SchemaVersion, bytes: &[u8]) -> Result<Value, SchemaError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|err| SchemaError::corrupt(version, format!("parsing schema: {err}")))?;
    if !value.is_object() {
        return Err(SchemaError::corrupt(
            version,
            "schema document is not a JSON object",
        ));
    }
    Ok(value)
}

/// Compile a validator for a parsed schema.
///
/// The bundled schemas declare draft 2020-12 but only use keywords whose
/// meaning is shared with draft 7, which every `jsonschema` build supports.
pub(crate) fn compile_schema(
    version: &SchemaVersion,
    schema: &Value,
) -> Result<JSONSchema, SchemaError> {
    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema)
        .map_err(|err| SchemaError::corrupt(version, format!("compiling schema: {err}")))
}

/// Reasons a schema's root `$ref` cannot be inlined.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlattenError {
    #[error("schema root is not a JSON object")]
    RootNotObject,
    #[error("schema has a root $ref but no $defs")]
    MissingDefs,
    #[error("referenced definition {0} not found in $defs")]
    MissingDefinition(String),
    #[error("definition {0} is not an object")]
    DefinitionNotObject(String),
}

/// Inline a root-level `"$ref": "#/$defs/<Name>"` into the schema root.
///
/// Every key of the referenced definition is copied to the root and the root
/// `$ref` is removed. The definition stays in `$defs` while anything else in
/// the schema still points at it. Returns `Ok(false)` when there is no root
/// `$ref` of that shape and the schema was left untouched.
pub fn flatten_root_ref(schema: &mut Value) -> Result<bool, FlattenError> {
    let root = schema.as_object_mut().ok_or(FlattenError::RootNotObject)?;
    let Some(def_name) = root
        .get(REF)
        .and_then(Value::as_str)
        .and_then(|target| target.strip_prefix(DEFS_REF_PREFIX))
        .map(str::to_string)
    else {
        return Ok(false);
    };

    let defs = root
        .get(DEFS)
        .and_then(Value::as_object)
        .ok_or(FlattenError::MissingDefs)?;
    let definition = defs
        .get(&def_name)
        .ok_or_else(|| FlattenError::MissingDefinition(def_name.clone()))?
        .as_object()
        .ok_or_else(|| FlattenError::DefinitionNotObject(def_name.clone()))?
        .clone();

    for (key, value) in definition {
        root.insert(key, value);
    }
    root.remove(REF);

    let target = format!("{DEFS_REF_PREFIX}{def_name}");
    if !references(schema, &target) {
        if let Some(defs) = schema.get_mut(DEFS).and_then(Value::as_object_mut) {
            defs.remove(&def_name);
        }
    }
    log::debug!("inlined root definition {def_name}");
    Ok(true)
}

fn references(value: &Value, target: &str) -> bool {
    match value {
        Value::Object(map) => map.iter().any(|(key, nested)| {
            (key == REF && nested.as_str() == Some(target)) || references(nested, target)
        }),
        Value::Array(items) => items.iter().any(|item| references(item, target)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn version() -> SchemaVersion {
        SchemaVersion::new(3, 24, 0)
    }

    #[test]
    fn parse_rejects_non_objects() {
        let err = parse_schema(&version(), b"[1, 2]").unwrap_err();
        assert!(matches!(err, SchemaError::CorruptBundle { .. }));
        let err = parse_schema(&version(), b"{ truncated").unwrap_err();
        assert!(err.to_string().contains("v3.24.0"));
    }

    #[test]
    fn compile_rejects_invalid_keywords() {
        let schema = json!({"type": 12});
        let err = compile_schema(&version(), &schema).unwrap_err();
        assert!(matches!(err, SchemaError::CorruptBundle { .. }));
    }

    #[test]
    fn flatten_inlines_root_definition() {
        let mut schema = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "$ref": "#/$defs/DeploymentPlanV1",
            "$defs": {
                "DeploymentPlanV1": {
                    "properties": {"manifest": {"$ref": "#/$defs/ManifestV1"}},
                    "type": "object"
                },
                "ManifestV1": {"type": "object"}
            }
        });
        assert_eq!(flatten_root_ref(&mut schema), Ok(true));
        assert!(schema.get("$ref").is_none());
        assert_eq!(schema["type"], "object");
        assert_eq!(
            schema.pointer("/properties/manifest/$ref"),
            Some(&json!("#/$defs/ManifestV1"))
        );
        assert!(schema.pointer("/$defs/DeploymentPlanV1").is_none());
        assert!(schema.pointer("/$defs/ManifestV1").is_some());
    }

    #[test]
    fn flatten_keeps_definitions_still_referenced() {
        let mut schema = json!({
            "$ref": "#/$defs/Node",
            "$defs": {
                "Node": {
                    "properties": {"children": {"items": {"$ref": "#/$defs/Node"}, "type": "array"}},
                    "type": "object"
                }
            }
        });
        assert_eq!(flatten_root_ref(&mut schema), Ok(true));
        assert!(schema.pointer("/$defs/Node").is_some());
        assert_eq!(
            schema.pointer("/properties/children/items/$ref"),
            Some(&json!("#/$defs/Node"))
        );
    }

    #[test]
    fn flatten_ignores_schemas_without_local_root_ref() {
        let mut plain = json!({"type": "object"});
        assert_eq!(flatten_root_ref(&mut plain), Ok(false));

        let mut remote = json!({"$ref": "https://example.com/schema.json"});
        assert_eq!(flatten_root_ref(&mut remote), Ok(false));
        assert_eq!(remote["$ref"], "https://example.com/schema.json");
    }

    #[test]
    fn flatten_reports_broken_references() {
        let mut no_defs = json!({"$ref": "#/$defs/Plan"});
        assert_eq!(flatten_root_ref(&mut no_defs), Err(FlattenError::MissingDefs));

        let mut missing = json!({"$ref": "#/$defs/Plan", "$defs": {}});
        assert_eq!(
            flatten_root_ref(&mut missing),
            Err(FlattenError::MissingDefinition("Plan".to_string()))
        );

        let mut scalar = json!({"$ref": "#/$defs/Plan", "$defs": {"Plan": true}});
        assert_eq!(
            flatten_root_ref(&mut scalar),
            Err(FlattenError::DefinitionNotObject("Plan".to_string()))
        );

        let mut array = json!([]);
        assert_eq!(flatten_root_ref(&mut array), Err(FlattenError::RootNotObject));
    }
}
