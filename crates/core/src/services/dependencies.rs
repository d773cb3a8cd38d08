use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use thiserror::Error;

use crate::config::ToolPaths;
use crate::model::Platform;
use crate::services::backends::{DumpbinExtractor, LddExtractor, OtoolExtractor};
use crate::services::tools::{ToolError, ToolRunner};

#[derive(Debug, Error)]
pub enum DependencyError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(
        "failed to resolve {reference}, exe_path {}, loader_path {}, rpaths {}",
        .exe_dir.display(),
        .loader_dir.display(),
        .rpaths.join(", ")
    )]
    Unresolved { reference: String, exe_dir: PathBuf, loader_dir: PathBuf, rpaths: Vec<String> },
    #[error("unexpected {tool} output near line {line}: {text}")]
    MalformedOutput { tool: &'static str, line: usize, text: String },
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Lists the shared libraries a binary links against.
///
/// Implementations return absolute paths and do no scoping; see
/// [`DependencyScope`] for the build-directory filter.
pub trait DependencyExtractor: Send + Sync {
    /// Direct dependencies of `binary`. `exe_dir` is the directory of the root
    /// executable the closure started from.
    fn direct_dependencies(
        &self,
        binary: &Path,
        exe_dir: &Path,
    ) -> Result<Vec<PathBuf>, DependencyError>;

    /// True when `direct_dependencies` already returns the full transitive set.
    fn reports_transitive(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str;
}

/// Select the extractor for a target platform.
pub fn extractor_for(
    platform: Platform,
    tools: &ToolPaths,
    runner: Arc<dyn ToolRunner>,
) -> Box<dyn DependencyExtractor> {
    match platform {
        Platform::Linux => Box::new(LddExtractor::new(tools.ldd.clone(), runner)),
        Platform::Darwin => Box::new(OtoolExtractor::new(tools.otool.clone(), runner)),
        Platform::Win32 => Box::new(DumpbinExtractor::from_env(tools.dumpbin.clone(), runner)),
    }
}

/// Restricts dependencies to libraries produced by the build.
///
/// System and runtime libraries live outside the build output directory and are
/// not ours to symbolicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyScope {
    /// Directory of the root executable.
    pub exe_dir: PathBuf,
    /// Build output directory; the parent of `exe_dir`.
    pub build_dir: PathBuf,
}

impl DependencyScope {
    /// Scope for a root binary at e.g. `out/bin/app`: exe dir `out/bin`, build dir `out`.
    pub fn for_root(root: &Path) -> Self {
        let exe_dir = root.parent().map(Path::to_path_buf).unwrap_or_default();
        let build_dir = exe_dir.parent().map(Path::to_path_buf).unwrap_or_else(|| exe_dir.clone());
        Self { exe_dir, build_dir }
    }

    /// Whether `dep` exists and sits under the build directory.
    pub fn contains(&self, dep: &Path) -> bool {
        dep.exists() && dep.parent().map(|p| p.starts_with(&self.build_dir)).unwrap_or(false)
    }

    /// Direct dependencies of `binary`, filtered to this scope.
    pub fn dependencies_of(
        &self,
        extractor: &dyn DependencyExtractor,
        binary: &Path,
    ) -> Result<Vec<PathBuf>, DependencyError> {
        let deps = extractor.direct_dependencies(binary, &self.exe_dir)?;
        let (kept, dropped): (Vec<_>, Vec<_>) = deps.into_iter().partition(|d| self.contains(d));
        for dep in &dropped {
            debug!("ignoring {} (outside {})", dep.display(), self.build_dir.display());
        }
        Ok(kept)
    }
}
