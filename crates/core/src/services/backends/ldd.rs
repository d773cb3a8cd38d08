use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::services::dependencies::{DependencyError, DependencyExtractor};
use crate::services::tools::ToolRunner;

static LDD_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\t.* => (.+) \(.*\)$").expect("valid ldd regex"));

/// ELF dependency lister backed by `ldd`.
///
/// `ldd` asks the dynamic linker to load the whole image, so its output is already
/// the transitive set of resolved libraries.
pub struct LddExtractor {
    program: PathBuf,
    runner: Arc<dyn ToolRunner>,
}

impl LddExtractor {
    pub fn new(program: impl Into<PathBuf>, runner: Arc<dyn ToolRunner>) -> Self {
        Self { program: program.into(), runner }
    }
}

impl DependencyExtractor for LddExtractor {
    fn direct_dependencies(
        &self,
        binary: &Path,
        _exe_dir: &Path,
    ) -> Result<Vec<PathBuf>, DependencyError> {
        let output = self.runner.run(&self.program, &[OsString::from(binary)])?;
        let cwd = std::env::current_dir()
            .map_err(|source| DependencyError::Io { path: PathBuf::from("."), source })?;
        Ok(parse_ldd_output(&output).into_iter().map(|p| absolutize(&cwd, p)).collect())
    }

    fn reports_transitive(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "ldd"
    }
}

/// Extract the resolved path of every `name => path (addr)` line.
///
/// Lines without a resolved path (the vDSO, `not found` entries, the interpreter)
/// are skipped.
pub fn parse_ldd_output(output: &str) -> Vec<PathBuf> {
    output
        .lines()
        .filter_map(|line| LDD_LINE.captures(line))
        .map(|caps| PathBuf::from(&caps[1]))
        .collect()
}

fn absolutize(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path_clean::clean(path)
    } else {
        path_clean::clean(cwd.join(path))
    }
}
