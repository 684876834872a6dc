//! check command: List missing reference definitions
//!
//! Read-only. No lookups, no writes. JSON compact on stdout.

use crate::cache::ReflinkCache;
use crate::files::expand_files;
use crate::matcher::extract;
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct CheckArgs {
    /// Markdown files, directories, or glob patterns
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Exit with status 1 when any reference is missing
    #[arg(long)]
    pub strict: bool,
}

/// Missing reflinks for one file
#[derive(Debug, Serialize)]
pub struct FileReflinks {
    pub file: String,
    pub reflinks: Vec<String>,
}

/// Full report (compact)
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub files: Vec<FileReflinks>,
    /// Distinct missing names across all files
    pub missing: ReflinkCache,
    pub total: usize,
}

pub async fn run_check(args: CheckArgs) -> Result<()> {
    let files = expand_files(&args.files).await?;

    if files.is_empty() {
        eprintln!("No markdown files found.");
        std::process::exit(1);
    }

    eprintln!("Checking {} files...", files.len());

    let report = check_files(&files).await?;

    println!("{}", serde_json::to_string(&report)?);

    eprintln!(
        "Done: {} missing reflinks in {} files",
        report.missing.len(),
        report.files.iter().filter(|f| !f.reflinks.is_empty()).count()
    );

    if args.strict && report.total > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Collect missing reflinks from each file
pub async fn check_files(files: &[PathBuf]) -> Result<CheckReport> {
    let mut results = Vec::with_capacity(files.len());
    let mut missing = ReflinkCache::new();
    let mut total = 0;

    for file in files {
        let bytes = tokio::fs::read(file)
            .await
            .with_context(|| format!("Failed to read file: {}", file.display()))?;
        let reflinks = extract(&String::from_utf8_lossy(&bytes));

        total += reflinks.len();
        missing.union(reflinks.iter().cloned());
        results.push(FileReflinks {
            file: file.display().to_string(),
            reflinks,
        });
    }

    Ok(CheckReport {
        files: results,
        missing,
        total,
    })
}
