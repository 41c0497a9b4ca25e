use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const SCHEMA_ROOT: &str = "schemas/plan";
const SCHEMA_FILE: &str = "plan.json";

fn main() {
    println!("cargo:rerun-if-changed={SCHEMA_ROOT}");

    let manifest_dir =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR"));
    let schema_root = manifest_dir.join(SCHEMA_ROOT);
    let entries = collect_entries(&schema_root);

    let mut generated = String::from("&[\n");
    for (id, path) in &entries {
        println!("cargo:rerun-if-changed={}", path.display());
        check_document(id, path);
        writeln!(
            generated,
            "    ({id:?}, include_str!({:?})),",
            path.display().to_string()
        )
        .expect("writing to a String cannot fail");
    }
    generated.push_str("]\n");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));
    fs::write(out_dir.join("bundled_schemas.rs"), generated)
        .expect("failed to write bundled schema manifest");
}

/// Every `<root>/<version>/plan.json`, in directory-name order.
fn collect_entries(schema_root: &Path) -> Vec<(String, PathBuf)> {
    let Ok(dir) = fs::read_dir(schema_root) else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    for entry in dir.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let document = path.join(SCHEMA_FILE);
        if !document.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            entries.push((name.to_string(), document));
        }
    }
    entries.sort();
    entries
}

// A document that is not a JSON object would only fail at runtime; stop the
// build instead.
fn check_document(id: &str, path: &Path) {
    let raw = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("reading bundled schema {id}: {err}"));
    let value: serde_json::Value = serde_json::from_str(&raw)
        .unwrap_or_else(|err| panic!("bundled schema {id} is not valid JSON: {err}"));
    if !value.is_object() {
        panic!("bundled schema {id} must be a JSON object");
    }
}
