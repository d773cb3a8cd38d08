//! Core data model for symbol generation.
//!
//! This module contains:
//! - `SymbolIdentity`, parsed from the `MODULE` header every symbol file starts with
//! - `Platform`, the tag selecting which dependency extractor runs
//! - `SkipReason` / `JobOutcome`, the terminal states of a symbol-dump job

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of a module as reported by dump_syms.
///
/// Parsed from the first line of a symbol file:
/// `MODULE <platform> <arch> <hash> <name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolIdentity {
    pub platform: String,
    pub arch: String,
    /// Stable content identifier; together with `name` it addresses the store.
    pub hash: String,
    /// Declared module name, not necessarily the on-disk file name.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("header has {0} fields, expected 5")]
    FieldCount(usize),
    #[error("header starts with '{0}' instead of MODULE")]
    NotModule(String),
}

impl SymbolIdentity {
    /// Parse a `MODULE` header line.
    ///
    /// The name is everything after the fourth space, so module names that
    /// contain spaces survive intact.
    pub fn parse(header: &str) -> Result<Self, HeaderError> {
        let fields: Vec<&str> = header.trim().splitn(5, ' ').collect();
        if fields.len() != 5 {
            return Err(HeaderError::FieldCount(fields.len()));
        }
        if fields[0] != "MODULE" {
            return Err(HeaderError::NotModule(fields[0].to_string()));
        }
        Ok(Self {
            platform: fields[1].to_string(),
            arch: fields[2].to_string(),
            hash: fields[3].to_string(),
            name: fields[4].to_string(),
        })
    }
}

impl fmt::Display for SymbolIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MODULE {} {} {} {}", self.platform, self.arch, self.hash, self.name)
    }
}

/// Target platform of the binary being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Darwin,
    Win32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Platform not supported: {0}")]
pub struct UnsupportedPlatform(pub String);

impl Platform {
    /// Platform of the host this binary was compiled for.
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Win32
        } else if cfg!(target_os = "macos") {
            Platform::Darwin
        } else {
            Platform::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Darwin => "darwin",
            Platform::Win32 => "win32",
        }
    }
}

impl FromStr for Platform {
    type Err = UnsupportedPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "darwin" | "macos" | "mac" => Ok(Platform::Darwin),
            "win32" | "windows" => Ok(Platform::Win32),
            _ => Err(UnsupportedPlatform(s.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a job finished without running dump_syms in write mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ToolUnavailable,
    HeaderUnparseable,
    AlreadyInStore,
    LocalSidecarMatches,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::ToolUnavailable => "Could not locate dump_syms executable.",
            SkipReason::HeaderUnparseable => "Could not obtain binary information.",
            SkipReason::AlreadyInStore => "Symbol file already found.",
            SkipReason::LocalSidecarMatches => "Found local symbol file.",
        };
        f.write_str(text)
    }
}

/// Terminal state of a single job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "detail")]
pub enum JobOutcome {
    Skipped(SkipReason),
    Extracted,
    Failed(String),
}

impl JobOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, JobOutcome::Failed(_))
    }
}
