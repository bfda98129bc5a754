//! Developer tooling for scigraph: validate a schema file (or a directory of
//! them) against `scigraph-schema` before it is imported into a running
//! service, without standing up the HTTP surface.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "scigraph developer tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one schema JSON file, or every *.json file under a directory.
    ValidateSchema {
        /// Path to a schema file or a directory of schema files.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::ValidateSchema { path } => validate_schema(&path),
    }
}

fn validate_schema(path: &Path) -> Result<()> {
    let mut checked = 0usize;
    let mut failed = 0usize;

    for file in schema_files(path)? {
        checked += 1;
        match validate_one(&file) {
            Ok(type_count) => {
                println!("ok  {} ({} types)", file.display(), type_count);
            }
            Err(e) => {
                failed += 1;
                eprintln!("err {}: {e}", file.display());
            }
        }
    }

    if checked == 0 {
        anyhow::bail!("no .json files found under {}", path.display());
    }
    if failed > 0 {
        anyhow::bail!("{failed}/{checked} schema file(s) failed validation");
    }
    println!("{checked} schema file(s) valid");
    Ok(())
}

fn schema_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let files = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "json"))
        .map(|e| e.path().to_path_buf())
        .collect();
    Ok(files)
}

fn validate_one(path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let raw: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("parsing JSON in {}", path.display()))?;
    let schema = scigraph_schema::Schema::parse(raw).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(schema.types().count())
}
