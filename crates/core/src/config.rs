use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Platform;

/// Hosts where spawning more than this many concurrent dump_syms processes has
/// been observed to hang. Re-validate before raising.
pub const WINDOWS_MAX_JOBS: usize = 56;

/// Default worker count: host parallelism, capped on Windows hosts.
pub fn default_jobs() -> usize {
    let cpus = num_cpus::get().max(1);
    if cfg!(windows) {
        cpus.min(WINDOWS_MAX_JOBS)
    } else {
        cpus
    }
}

/// Default dump_syms executable name for this host.
pub fn dump_syms_executable() -> &'static str {
    if cfg!(windows) {
        "dump_syms.exe"
    } else {
        "dump_syms"
    }
}

/// Programs used to list shared-library dependencies.
///
/// Each defaults to the plain tool name (looked up on `PATH` at spawn time) and can
/// be redirected through `SYMGEN_LDD`, `SYMGEN_OTOOL` and `SYMGEN_DUMPBIN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    pub ldd: PathBuf,
    pub otool: PathBuf,
    pub dumpbin: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ldd: PathBuf::from("ldd"),
            otool: PathBuf::from("otool"),
            dumpbin: PathBuf::from("dumpbin"),
        }
    }
}

impl ToolPaths {
    /// Defaults, overridden by any `SYMGEN_*` variables present in the environment.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let pick = |var: &str, fallback: PathBuf| {
            env::var_os(var).filter(|v| !v.is_empty()).map(PathBuf::from).unwrap_or(fallback)
        };
        Self {
            ldd: pick("SYMGEN_LDD", defaults.ldd),
            otool: pick("SYMGEN_OTOOL", defaults.otool),
            dumpbin: pick("SYMGEN_DUMPBIN", defaults.dumpbin),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--jobs must be at least 1")]
    ZeroJobs,
    #[error("Cannot find {0}.")]
    MissingDumpSyms(PathBuf),
}

/// Settings for one symbol-generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Root of the symbol store.
    pub symbols_dir: PathBuf,
    /// dump_syms executable. `None` skips every job as tool-unavailable; the CLI
    /// never leaves it unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dump_syms_path: Option<PathBuf>,
    /// Number of parallel workers.
    pub jobs: usize,
    pub platform: Platform,
    /// Delete `symbols_dir` before writing.
    #[serde(default)]
    pub clear: bool,
    #[serde(default = "ToolPaths::from_env")]
    pub tools: ToolPaths,
}

impl GeneratorConfig {
    pub fn new(symbols_dir: impl Into<PathBuf>) -> Self {
        Self {
            symbols_dir: symbols_dir.into(),
            dump_syms_path: None,
            jobs: default_jobs(),
            platform: Platform::host(),
            clear: false,
            tools: ToolPaths::from_env(),
        }
    }

    /// Reject settings that can never produce a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs == 0 {
            return Err(ConfigError::ZeroJobs);
        }
        if let Some(path) = &self.dump_syms_path {
            if !path.exists() {
                return Err(ConfigError::MissingDumpSyms(path.clone()));
            }
        }
        Ok(())
    }
}
