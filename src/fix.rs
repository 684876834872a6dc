//! fix command: Append missing reference definitions
//!
//! Looks up every missing reflink (config `links:` first, then the registry)
//! and writes the definitions to the end of each file.
//!
//! LLM-optimized output - JSON compact only.

use crate::append::{Options, Reflinks};
use crate::cache::{union, ReflinkCache};
use crate::config::Config;
use crate::document::Document;
use crate::files::expand_files;
use crate::lookup::{Chain, Lookup, RegistryLookup, StaticLookup};
use crate::pipeline::{DocumentReport, Pipeline};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct FixArgs {
    /// Markdown files, directories, or glob patterns
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Config file (default: reflint.yaml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Registry base URL
    #[arg(long, env = "REFLINT_REGISTRY")]
    pub registry: Option<String>,

    /// Only use definitions from the config file
    #[arg(long)]
    pub offline: bool,

    /// Extra name to request for every file (repeatable)
    #[arg(long = "reflink", value_name = "NAME")]
    pub reflinks: Vec<String>,

    /// Files processed in parallel (1-32)
    #[arg(short, long, default_value = "4", value_parser = clap::value_parser!(u8).range(1..=32))]
    pub parallel: u8,

    /// Registry timeout in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Dry run - don't write changes back to files
    #[arg(long)]
    pub dry_run: bool,
}

/// Output for JSON
#[derive(Debug, Serialize)]
pub struct FixOutput {
    pub files: Vec<DocumentReport>,
    pub reflinks: ReflinkCache,
    pub written: usize,
    pub failed: usize,
    pub timestamp: String,
}

pub async fn run_fix(args: FixArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref()).await?;

    let files = expand_files(&args.files).await?;
    if files.is_empty() {
        eprintln!("No markdown files found.");
        std::process::exit(1);
    }

    let mut options = config.to_options();
    options.reflinks = union(&options.reflinks, &args.reflinks);

    let lookup = build_lookup(&config, &args)?;

    eprintln!(
        "Fixing {} files ({} parallel{})...",
        files.len(),
        args.parallel,
        if args.offline { ", offline" } else { "" }
    );

    let output = fix_files(&files, lookup, options, args.parallel as usize, args.dry_run).await?;

    println!("{}", serde_json::to_string(&output)?);

    eprintln!(
        "Done: {} written, {} failed{}",
        output.written,
        output.failed,
        if args.dry_run { " (dry run)" } else { "" }
    );

    if output.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// Config links, backed by the registry unless offline
fn build_lookup(config: &Config, args: &FixArgs) -> Result<Box<dyn Lookup>> {
    let local = StaticLookup::new(config.links.clone());
    if args.offline {
        return Ok(Box::new(local));
    }

    let registry = args.registry.as_deref().unwrap_or(config.registry());
    let timeout = args.timeout.unwrap_or(config.timeout_ms());
    let remote = RegistryLookup::new(registry, timeout)?;

    if local.is_empty() {
        Ok(Box::new(remote))
    } else {
        Ok(Box::new(Chain::new(local, remote)))
    }
}

/// Run the transform over `files` and write back the changed ones
pub async fn fix_files<L: Lookup>(
    files: &[PathBuf],
    lookup: L,
    options: Options,
    parallel: usize,
    dry_run: bool,
) -> Result<FixOutput> {
    let mut documents = Vec::with_capacity(files.len());
    for file in files {
        let doc = Document::read(file)
            .await
            .with_context(|| format!("Failed to read file: {}", file.display()))?;
        documents.push(doc);
    }

    let mut pipeline = Pipeline::new(Reflinks::new(lookup, options), parallel);
    let reports = pipeline.process(&mut documents).await;

    let mut written = 0;
    for (doc, report) in documents.iter().zip(&reports) {
        if !report.changed() {
            continue;
        }
        eprintln!("  -> {}", report.file);
        if dry_run {
            continue;
        }
        if let Some(contents) = &doc.contents {
            tokio::fs::write(&doc.path, contents)
                .await
                .with_context(|| format!("Failed to write file: {}", doc.path.display()))?;
            written += 1;
        }
    }

    let failed = reports.iter().filter(|r| r.error.is_some()).count();

    Ok(FixOutput {
        files: reports,
        reflinks: pipeline.into_cache(),
        written,
        failed,
        timestamp: Utc::now().to_rfc3339(),
    })
}
