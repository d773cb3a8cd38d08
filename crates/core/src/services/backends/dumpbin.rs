use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::services::dependencies::{DependencyError, DependencyExtractor};
use crate::services::tools::ToolRunner;

static DLL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([\w.-]+\.dll)\b").expect("valid dll regex"));

/// PE dependency lister backed by `dumpbin /DEPENDENTS`.
///
/// dumpbin only reports module names, so each one is looked up the way the loader
/// would: along the search path, then next to the binary.
pub struct DumpbinExtractor {
    program: PathBuf,
    runner: Arc<dyn ToolRunner>,
    search_path: Vec<PathBuf>,
}

impl DumpbinExtractor {
    pub fn new(
        program: impl Into<PathBuf>,
        runner: Arc<dyn ToolRunner>,
        search_path: Vec<PathBuf>,
    ) -> Self {
        Self { program: program.into(), runner, search_path }
    }

    /// Search path taken from the process `PATH`.
    pub fn from_env(program: impl Into<PathBuf>, runner: Arc<dyn ToolRunner>) -> Self {
        let search_path =
            env::var_os("PATH").map(|paths| env::split_paths(&paths).collect()).unwrap_or_default();
        Self::new(program, runner, search_path)
    }

    fn locate(&self, binary: &Path, dll: &str) -> Option<PathBuf> {
        self.search_path
            .iter()
            .map(PathBuf::as_path)
            .chain(binary.parent())
            .map(|dir| dir.join(dll))
            .find(|candidate| candidate.exists())
    }
}

impl DependencyExtractor for DumpbinExtractor {
    fn direct_dependencies(
        &self,
        binary: &Path,
        _exe_dir: &Path,
    ) -> Result<Vec<PathBuf>, DependencyError> {
        let output = self
            .runner
            .run(&self.program, &[OsString::from("/DEPENDENTS"), OsString::from(binary)])?;
        let mut deps = Vec::new();
        for dll in parse_dependents(&output) {
            if let Some(found) = self.locate(binary, &dll) {
                let resolved = found
                    .canonicalize()
                    .map_err(|source| DependencyError::Io { path: found.clone(), source })?;
                deps.push(resolved);
            }
        }
        Ok(deps)
    }

    fn name(&self) -> &'static str {
        "dumpbin"
    }
}

/// Every distinct `*.dll` module name mentioned in dumpbin output, in order.
pub fn parse_dependents(output: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in DLL_NAME.captures_iter(output) {
        let name = caps[1].to_string();
        if !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            names.push(name);
        }
    }
    names
}
