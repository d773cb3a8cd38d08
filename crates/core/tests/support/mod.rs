#![allow(dead_code)]

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use symgen_core::services::dependencies::{DependencyError, DependencyExtractor};
use symgen_core::services::dump_syms::SymbolDumper;
use symgen_core::services::tools::{ToolError, ToolRunner};
use symgen_core::SymbolIdentity;

/// Serves canned stdout keyed by the full command line.
#[derive(Default)]
pub struct FakeRunner {
    responses: HashMap<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, program: &str, args: &[&str], stdout: &str) -> Self {
        self.responses.insert(command_line(Path::new(program), args.iter()), stdout.to_string());
        self
    }
}

fn command_line<I, S>(program: &Path, args: I) -> String
where
    I: Iterator<Item = S>,
    S: AsRef<std::ffi::OsStr>,
{
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

impl ToolRunner for FakeRunner {
    fn run(&self, program: &Path, args: &[OsString]) -> Result<String, ToolError> {
        let line = command_line(program, args.iter());
        self.calls.lock().unwrap().push(line.clone());
        self.responses.get(&line).cloned().ok_or_else(|| ToolError::Exit {
            program: program.display().to_string(),
            status: "exit status: 1".into(),
            stderr: format!("no canned output for `{line}`"),
        })
    }
}

/// Fake dump_syms: a "binary" is a text file whose first line is its own MODULE
/// header, and writing to the store copies it to the identity's slot.
#[derive(Default)]
pub struct FakeDumper {
    pub header_calls: AtomicUsize,
    pub writes: Mutex<Vec<PathBuf>>,
}

impl FakeDumper {
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

impl SymbolDumper for FakeDumper {
    fn module_header(&self, binary: &Path) -> Result<String, ToolError> {
        self.header_calls.fetch_add(1, Ordering::SeqCst);
        fs::read_to_string(binary).map_err(|source| ToolError::Spawn {
            program: "fake_dump_syms".into(),
            source,
        })
    }

    fn write_to_store(&self, binary: &Path, symbols_dir: &Path) -> Result<(), ToolError> {
        self.writes.lock().unwrap().push(binary.to_path_buf());
        let body = fs::read_to_string(binary).unwrap();
        let identity = SymbolIdentity::parse(body.lines().next().unwrap()).unwrap();
        let dir = symbols_dir.join(&identity.name).join(&identity.hash);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.sym", identity.name)), format!("{body}FUNC 0 10 0 main\n"))
            .unwrap();
        Ok(())
    }
}

/// Dependency graph held in memory.
#[derive(Default)]
pub struct GraphExtractor {
    pub edges: HashMap<PathBuf, Vec<PathBuf>>,
    pub transitive: bool,
    pub calls: AtomicUsize,
}

impl GraphExtractor {
    pub fn edge(mut self, from: &Path, to: &Path) -> Self {
        self.edges.entry(from.to_path_buf()).or_default().push(to.to_path_buf());
        self
    }
}

impl DependencyExtractor for GraphExtractor {
    fn direct_dependencies(
        &self,
        binary: &Path,
        _exe_dir: &Path,
    ) -> Result<Vec<PathBuf>, DependencyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.edges.get(binary).cloned().unwrap_or_default())
    }

    fn reports_transitive(&self) -> bool {
        self.transitive
    }

    fn name(&self) -> &'static str {
        "graph"
    }
}

/// Canonical temp root, so paths compare equal to what the code under test sees.
pub fn canonical_root(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().canonicalize().unwrap()
}

/// Write a fake binary whose content is its MODULE header.
pub fn write_binary(path: &Path, name: &str, hash: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, format!("MODULE Linux x86_64 {hash} {name}\n")).unwrap();
}

/// Every file under `root` with its contents, sorted by relative path.
pub fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<(PathBuf, Vec<u8>)>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            let meta = fs::symlink_metadata(&path).unwrap();
            if meta.is_dir() {
                walk(root, &path, out);
            } else if meta.is_file() {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                out.push((relative, fs::read(&path).unwrap()));
            }
        }
    }
    let mut out = Vec::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out.sort();
    out
}
