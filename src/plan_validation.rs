//! Validation of deployment plan documents against a resolved schema.
//!
//! Used by the `plan-schema validate` subcommand and by library callers that
//! want to check a plan before handing it to the engine. Violations are
//! collected rather than short-circuited so one run reports every problem.

use crate::error::SchemaError;
use crate::schema_loader::compile_schema;
use crate::version::SchemaVersion;
use anyhow::Result;
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Compiled schema for one catalog version.
pub struct PlanValidator {
    version: SchemaVersion,
    schema: Value,
    compiled: JSONSchema,
}

impl PlanValidator {
    pub(crate) fn new(version: SchemaVersion, schema: Value) -> Result<Self, SchemaError> {
        let compiled = compile_schema(&version, &schema)?;
        Ok(Self {
            version,
            schema,
            compiled,
        })
    }

    /// Catalog version the schema was loaded from.
    pub fn version(&self) -> &SchemaVersion {
        &self.version
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn is_valid(&self, document: &Value) -> bool {
        self.compiled.is_valid(document)
    }

    /// Every schema violation in `document`, as `<instance path>: <message>`.
    ///
    /// An empty list means the document is valid.
    pub fn validate(&self, document: &Value) -> Vec<String> {
        match self.compiled.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| {
                    let path = err.instance_path.to_string();
                    let path = if path.is_empty() { "/" } else { path.as_str() };
                    format!("{path}: {err}")
                })
                .collect(),
        }
    }
}

impl fmt::Debug for PlanValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanValidator")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Validate every plan file under `paths`.
///
/// Directories are walked recursively and only `.json` files inside them are
/// checked; explicitly named files are checked regardless of extension.
/// Unreadable files, invalid JSON, and schema violations are all reported in
/// the returned list, prefixed with the file path.
pub fn validate_plan_files(validator: &PlanValidator, paths: &[PathBuf]) -> Result<Vec<String>> {
    let mut errors = Vec::new();
    for file in find_plan_files(paths)? {
        let data = match fs::read_to_string(&file) {
            Ok(data) => data,
            Err(err) => {
                errors.push(format!("{}: unable to read: {err}", file.display()));
                continue;
            }
        };

        let document: Value = match serde_json::from_str(&data) {
            Ok(value) => value,
            Err(err) => {
                errors.push(format!("{}: invalid JSON: {err}", file.display()));
                continue;
            }
        };

        for violation in validator.validate(&document) {
            errors.push(format!("{}: {violation}", file.display()));
        }
    }
    Ok(errors)
}

fn find_plan_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut nested = Vec::new();
            collect_json(path, &mut nested)?;
            nested.sort();
            files.extend(nested);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn collect_json(dir: &Path, acc: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_json(&path, acc)?;
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            acc.push(path);
        }
    }
    Ok(())
}
