use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::debug;

use symgen_core::config::{dump_syms_executable, GeneratorConfig};
use symgen_core::{Platform, SchedulerReport, SymbolGenerator};

use crate::{canonicalize_or_current, find_in_path};

/// Options for a single `generate-symbols` run, as parsed from the command line.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub binary: String,
    pub symbols_dir: String,
    pub dump_syms_path: Option<String>,
    pub clear: bool,
    pub jobs: Option<usize>,
    pub verbose: bool,
    pub platform: Option<String>,
    pub json: bool,
}

impl GenerateOptions {
    pub fn new(binary: impl Into<String>, symbols_dir: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            symbols_dir: symbols_dir.into(),
            dump_syms_path: None,
            clear: false,
            jobs: None,
            verbose: false,
            platform: None,
            json: false,
        }
    }
}

/// Turn command-line options into a validated generator configuration.
///
/// Returns the canonical root binary alongside the config.
pub fn build_config(options: &GenerateOptions) -> Result<(PathBuf, GeneratorConfig)> {
    let binary = Path::new(&options.binary)
        .canonicalize()
        .map_err(|_| anyhow!("Cannot find {}.", options.binary))?;
    let symbols_dir = canonicalize_or_current(&options.symbols_dir)?;

    let mut config = GeneratorConfig::new(symbols_dir);
    if let Some(platform) = &options.platform {
        config.platform = platform.parse::<Platform>()?;
    }
    if let Some(jobs) = options.jobs {
        config.jobs = jobs;
    }
    config.clear = options.clear;
    let dump_syms = match &options.dump_syms_path {
        Some(path) => PathBuf::from(path),
        None => find_in_path(dump_syms_executable())
            .ok_or_else(|| anyhow!("Cannot find {}.", dump_syms_executable()))?,
    };
    config.dump_syms_path = Some(dump_syms);
    config.validate()?;
    Ok((binary, config))
}

/// Generate symbols for a binary and its shared-library closure.
pub fn generate_command(options: &GenerateOptions) -> Result<SchedulerReport> {
    let (binary, config) = build_config(options)?;
    debug!("configuration: {:?}", config);

    let generator = SymbolGenerator::from_config(config)?;
    let report = generator
        .run(&binary)
        .with_context(|| format!("Failed to generate symbols for {}", binary.display()))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Symbols for {} binaries in {} ({} generated, {} skipped)",
            report.records.len(),
            generator.store().root().display(),
            report.extracted(),
            report.skipped()
        );
    }
    Ok(report)
}
