use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::services::tools::{ToolError, ToolRunner};

/// The external symbol-extraction capability.
pub trait SymbolDumper: Send + Sync {
    /// Dump `binary` to stdout; only the first (`MODULE`) line is interpreted.
    fn module_header(&self, binary: &Path) -> Result<String, ToolError>;

    /// Dump `binary` straight into the store rooted at `symbols_dir`. The tool
    /// picks the relative path from the identity it computes.
    fn write_to_store(&self, binary: &Path, symbols_dir: &Path) -> Result<(), ToolError>;
}

/// `dump_syms` invoked as a child process.
pub struct DumpSyms {
    path: PathBuf,
    runner: Arc<dyn ToolRunner>,
}

impl DumpSyms {
    pub fn with_runner(path: impl Into<PathBuf>, runner: Arc<dyn ToolRunner>) -> Self {
        Self { path: path.into(), runner }
    }
}

impl SymbolDumper for DumpSyms {
    fn module_header(&self, binary: &Path) -> Result<String, ToolError> {
        self.runner.run(&self.path, &[OsString::from(binary)])
    }

    fn write_to_store(&self, binary: &Path, symbols_dir: &Path) -> Result<(), ToolError> {
        let args = [OsString::from(binary), OsString::from("-s"), OsString::from(symbols_dir)];
        self.runner.run(&self.path, &args).map(|_| ())
    }
}
