use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use log::debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Exit { program: String, status: String, stderr: String },
}

/// Runs an external introspection tool and hands back its stdout.
///
/// Everything that shells out (ldd, otool, dumpbin, dump_syms) goes through this
/// trait so tests can substitute canned output.
pub trait ToolRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<String, ToolError>;
}

/// Runner backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<String, ToolError> {
        debug!("running {} {:?}", program.display(), args);
        let output = Command::new(program).args(args).output().map_err(|source| {
            ToolError::Spawn { program: program.display().to_string(), source }
        })?;
        if !output.status.success() {
            return Err(ToolError::Exit {
                program: program.display().to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

