use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::services::dependencies::{DependencyError, DependencyExtractor};
use crate::services::resolve::{resolve, substitute_tokens};
use crate::services::tools::ToolRunner;

static RPATH_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ *path (.*) \(offset .*\)$").expect("valid rpath regex"));
static DYLIB_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ *name (.*) \(offset .*\)$").expect("valid dylib id regex"));
static LINKED_LIBRARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\t(.*) \(compatibility .*\)$").expect("valid otool -L regex"));

/// Load commands relevant to dependency resolution, from `otool -l`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadCommands {
    /// Raw `LC_RPATH` entries, tokens not yet substituted.
    pub rpaths: Vec<String>,
    /// Install name from `LC_ID_DYLIB`; present for dylibs and frameworks.
    pub dylib_id: Option<String>,
}

/// Mach-O dependency lister backed by `otool`.
pub struct OtoolExtractor {
    program: PathBuf,
    runner: Arc<dyn ToolRunner>,
}

impl OtoolExtractor {
    pub fn new(program: impl Into<PathBuf>, runner: Arc<dyn ToolRunner>) -> Self {
        Self { program: program.into(), runner }
    }

    fn otool(&self, flag: &str, binary: &Path) -> Result<String, DependencyError> {
        Ok(self.runner.run(&self.program, &[OsString::from(flag), OsString::from(binary)])?)
    }
}

impl DependencyExtractor for OtoolExtractor {
    fn direct_dependencies(
        &self,
        binary: &Path,
        exe_dir: &Path,
    ) -> Result<Vec<PathBuf>, DependencyError> {
        // @loader_path is the canonical directory holding the image; the image
        // itself is not resolved.
        let parent = binary.parent().unwrap_or_else(|| Path::new("."));
        let loader_dir = parent
            .canonicalize()
            .map_err(|source| DependencyError::Io { path: parent.to_path_buf(), source })?;

        let commands = parse_load_commands(&self.otool("-lm", binary)?)?;
        let rpaths: Vec<String> =
            commands.rpaths.iter().map(|r| substitute_tokens(r, exe_dir, &loader_dir)).collect();

        let mut deps = Vec::new();
        for reference in parse_linked_libraries(&self.otool("-Lm", binary)?) {
            if commands.dylib_id.as_deref() == Some(reference.as_str()) {
                continue;
            }
            let resolved = resolve(&reference, exe_dir, &loader_dir, &rpaths).ok_or_else(|| {
                DependencyError::Unresolved {
                    reference: reference.clone(),
                    exe_dir: exe_dir.to_path_buf(),
                    loader_dir: loader_dir.clone(),
                    rpaths: rpaths.clone(),
                }
            })?;
            debug!("{} -> {}", reference, resolved.display());
            deps.push(path_clean::clean(resolved));
        }
        Ok(deps)
    }

    fn name(&self) -> &'static str {
        "otool"
    }
}

/// Collect `LC_RPATH` and `LC_ID_DYLIB` from `otool -l` output.
///
/// The interesting value sits two lines below the `cmd` line, after `cmdsize`.
pub fn parse_load_commands(output: &str) -> Result<LoadCommands, DependencyError> {
    let lines: Vec<&str> = output.lines().collect();
    let mut commands = LoadCommands::default();
    for (idx, line) in lines.iter().enumerate() {
        let (pattern, is_rpath) = if line.contains("cmd LC_RPATH") {
            (&*RPATH_PATH, true)
        } else if line.contains("cmd LC_ID_DYLIB") {
            (&*DYLIB_NAME, false)
        } else {
            continue;
        };
        let value_line = lines.get(idx + 2).copied().unwrap_or_default();
        let value = pattern
            .captures(value_line)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| DependencyError::MalformedOutput {
                tool: "otool -l",
                line: idx + 3,
                text: value_line.to_string(),
            })?;
        if is_rpath {
            commands.rpaths.push(value);
        } else {
            commands.dylib_id = Some(value);
        }
    }
    Ok(commands)
}

/// Library references from `otool -L` output, in load-command order.
///
/// For dylibs the first entry is the image's own install name.
pub fn parse_linked_libraries(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| LINKED_LIBRARY.captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}
