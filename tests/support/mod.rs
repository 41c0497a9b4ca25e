use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn schemas_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("schemas/plan")
}

/// Parsed copy of the schema file shipped for `version`.
pub fn bundled_schema(version: &str) -> Value {
    let path = schemas_root().join(version).join("plan.json");
    let raw = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("reading {}: {err}", path.display()));
    serde_json::from_str(&raw).unwrap_or_else(|err| panic!("parsing {}: {err}", path.display()))
}

/// Copy selected bundled versions into `dest` using the on-disk layout.
pub fn copy_versions(dest: &Path, versions: &[&str]) -> Result<()> {
    for version in versions {
        let target = dest.join(version);
        fs::create_dir_all(&target)?;
        fs::copy(
            schemas_root().join(version).join("plan.json"),
            target.join("plan.json"),
        )
        .with_context(|| format!("copying schema {version}"))?;
    }
    Ok(())
}

pub fn plan_schema_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_plan-schema"))
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// A plan every bundled schema accepts.
pub fn sample_plan() -> Value {
    json!({
        "manifest": {
            "time": "2024-05-01T12:00:00Z",
            "magic": "3f5e1c0a",
            "version": "v3.112.0",
            "plugins": [
                {"name": "aws", "path": "/plugins/aws", "type": "resource", "version": "6.0.0"}
            ]
        },
        "config": {},
        "resourcePlans": {
            "urn:pulumi:dev::site::aws:s3/bucket:Bucket::assets": {
                "goal": {
                    "type": "aws:s3/bucket:Bucket",
                    "name": "assets",
                    "custom": true,
                    "protect": false,
                    "dependencies": [],
                    "inputDiff": {"adds": {"acl": "private"}}
                },
                "steps": ["create"],
                "state": {"acl": "private"}
            }
        }
    })
}
