//! Command-line access to the bundled plan schemas.
//!
//! Lists bundled versions, shows which schema a Pulumi version resolves to,
//! prints schema documents, validates plan files, and flattens raw reflector
//! output before it is added to `schemas/plan/`. Logging goes to stderr and is
//! controlled by `RUST_LOG`.

use anyhow::{Context, Result, bail};
use pulumix_schema::runtime::resolver_for;
use pulumix_schema::{SchemaResolver, flatten_root_ref, validate_plan_files};
use serde_json::Value;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

const STDIN_MARKER: &str = "-";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse()?;
    let resolver = resolver_for(cli.schemas_dir.as_deref());

    match cli.command {
        Command::List => list(&resolver),
        Command::Resolve { version } => {
            let resolved = resolver
                .resolve(&version)
                .with_context(|| format!("resolving schema for {version}"))?;
            println!("{resolved}");
            Ok(())
        }
        Command::Show { version } => {
            let schema = resolver
                .get_schema(&version)
                .with_context(|| format!("loading schema for {version}"))?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
        Command::Validate { version, inputs } => validate(&resolver, &version, &inputs),
        Command::Flatten { input } => flatten(&input),
    }
}

fn list(resolver: &SchemaResolver) -> Result<()> {
    let versions = resolver.list_versions();
    if versions.is_empty() {
        log::warn!("no schema versions bundled");
    }
    for version in versions {
        println!("{version}");
    }
    Ok(())
}

fn validate(resolver: &SchemaResolver, version: &str, inputs: &[String]) -> Result<()> {
    let validator = resolver
        .validator(version)
        .with_context(|| format!("loading schema for {version}"))?;

    let mut errors = Vec::new();
    let mut files = Vec::new();
    for input in inputs {
        if input == STDIN_MARKER {
            let document: Value = serde_json::from_slice(&read_input(input)?)
                .context("failed to parse plan JSON from stdin")?;
            errors.extend(
                validator
                    .validate(&document)
                    .into_iter()
                    .map(|violation| format!("<stdin>: {violation}")),
            );
        } else {
            files.push(PathBuf::from(input));
        }
    }
    errors.extend(validate_plan_files(&validator, &files)?);

    if errors.is_empty() {
        println!(
            "{} plan(s) valid against schema {}",
            inputs.len(),
            validator.version()
        );
        return Ok(());
    }
    for error in &errors {
        eprintln!("{error}");
    }
    bail!(
        "{} schema violation(s) against schema {}",
        errors.len(),
        validator.version()
    )
}

fn flatten(input: &str) -> Result<()> {
    let mut schema: Value =
        serde_json::from_slice(&read_input(input)?).context("failed to parse schema JSON")?;
    let changed = flatten_root_ref(&mut schema).with_context(|| format!("flattening {input}"))?;
    if !changed {
        log::info!("{input}: no root $ref to inline");
    }
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn read_input(input: &str) -> Result<Vec<u8>> {
    if input == STDIN_MARKER {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        fs::read(input).with_context(|| format!("failed to read {input}"))
    }
}

enum Command {
    List,
    Resolve { version: String },
    Show { version: String },
    Validate { version: String, inputs: Vec<String> },
    Flatten { input: String },
}

struct Cli {
    schemas_dir: Option<PathBuf>,
    command: Command,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut schemas_dir = None;
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--schemas-dir" => {
                    let value = args
                        .next()
                        .with_context(|| "--schemas-dir requires a directory")?;
                    schemas_dir = Some(PathBuf::from(value));
                }
                "--help" | "-h" => usage(0),
                other if other.starts_with("--") => bail!("unknown option '{other}'"),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let Some(name) = positional.next() else {
            usage(1);
        };
        let rest: Vec<String> = positional.collect();

        let command = match (name.as_str(), rest.as_slice()) {
            ("list", []) => Command::List,
            ("resolve", [version]) => Command::Resolve {
                version: version.clone(),
            },
            ("show", [version]) => Command::Show {
                version: version.clone(),
            },
            ("validate", [version, inputs @ ..]) if !inputs.is_empty() => Command::Validate {
                version: version.clone(),
                inputs: inputs.to_vec(),
            },
            ("flatten", [input]) => Command::Flatten {
                input: input.clone(),
            },
            _ => usage(1),
        };

        Ok(Self {
            schemas_dir,
            command,
        })
    }
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: plan-schema [--schemas-dir DIR] <command> [args]\n\nCommands:\n  list                          List bundled schema versions (ascending).\n  resolve <version>             Print the bundled version a Pulumi version resolves to.\n  show <version>                Print the resolved schema document.\n  validate <version> <path|->...  Validate plan files, directories, or stdin.\n  flatten <file|->              Inline a root $ref definition and print the schema.\n\nOptions:\n  --schemas-dir DIR   Use DIR/<version>/plan.json instead of the compiled-in schemas\n                      (also read from PULUMIX_SCHEMA_DIR).\n\nExamples:\n  plan-schema resolve v3.112.0\n  pulumi preview --save-plan plan.json && plan-schema validate v3.112.0 plan.json"
    );
    std::process::exit(code);
}
