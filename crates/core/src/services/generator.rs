use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use thiserror::Error;

use crate::config::{ConfigError, GeneratorConfig};
use crate::services::closure::transitive_closure;
use crate::services::dependencies::{
    extractor_for, DependencyError, DependencyExtractor, DependencyScope,
};
use crate::services::dump_syms::{DumpSyms, SymbolDumper};
use crate::services::scheduler::{JobScheduler, SchedulerReport};
use crate::services::tools::{SystemRunner, ToolRunner};
use crate::store::SymbolStore;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Cannot find {}.", .0.display())]
    MissingBinary(PathBuf),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to collect shared library dependencies: {0}")]
    Dependencies(#[from] DependencyError),
    #[error("One or more errors occurred while generating symbols:\n{}", .0.join("\n"))]
    JobsFailed(Vec<String>),
}

/// Produces symbols for a binary and every shared library of the build it loads.
pub struct SymbolGenerator {
    config: GeneratorConfig,
    extractor: Box<dyn DependencyExtractor>,
    dumper: Option<Box<dyn SymbolDumper>>,
    store: SymbolStore,
}

impl SymbolGenerator {
    /// Wire up the process-backed extractor and dump_syms for `config`.
    pub fn from_config(config: GeneratorConfig) -> Result<Self, GenerateError> {
        config.validate()?;
        let runner: Arc<dyn ToolRunner> = Arc::new(SystemRunner);
        let extractor = extractor_for(config.platform, &config.tools, runner.clone());
        let dumper = config.dump_syms_path.as_ref().map(|path| {
            Box::new(DumpSyms::with_runner(path, runner.clone())) as Box<dyn SymbolDumper>
        });
        Ok(Self::with_parts(config, extractor, dumper))
    }

    /// Assemble a generator from explicit collaborators.
    pub fn with_parts(
        config: GeneratorConfig,
        extractor: Box<dyn DependencyExtractor>,
        dumper: Option<Box<dyn SymbolDumper>>,
    ) -> Self {
        let store = SymbolStore::new(&config.symbols_dir);
        Self { config, extractor, dumper, store }
    }

    pub fn store(&self) -> &SymbolStore {
        &self.store
    }

    /// Every binary that needs symbols for `root`, sorted by path.
    pub fn closure(&self, root: &Path) -> Result<Vec<PathBuf>, GenerateError> {
        if !root.exists() {
            return Err(GenerateError::MissingBinary(root.to_path_buf()));
        }
        let scope = DependencyScope::for_root(root);
        let closure = transitive_closure(root, self.extractor.as_ref(), &scope)?;
        info!(
            "{} binaries in the {} closure of {}",
            closure.len(),
            self.extractor.name(),
            root.display()
        );
        Ok(closure.into_iter().collect())
    }

    /// Build the closure of `root` and dump symbols for all of it.
    ///
    /// Job failures do not stop the run; they are reported together at the end.
    pub fn run(&self, root: &Path) -> Result<SchedulerReport, GenerateError> {
        let binaries = self.closure(root)?;
        if self.config.clear {
            self.store.clear();
        }
        let scheduler = JobScheduler::new(&self.store, self.dumper.as_deref(), self.config.jobs);
        let report = scheduler.run(binaries);
        info!(
            "{} extracted, {} skipped, {} failed",
            report.extracted(),
            report.skipped(),
            report.failures().count()
        );
        report.into_result()
    }
}
