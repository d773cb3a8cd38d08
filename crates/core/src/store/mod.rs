//! On-disk Breakpad symbol store.
//!
//! Layout: `<root>/<name>/<hash>/<name>.sym`. The path depends only on the
//! module identity, so concurrent writers for different binaries never collide.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use crate::model::{HeaderError, SymbolIdentity};

/// Name of the compatibility link for consumers that cannot read the real hash.
pub const ZERO_HASH_DIR: &str = "00000000000000000000000000000000";

/// Suffix (after the binary's file name) of symbol files shipped next to a binary.
pub const SIDECAR_MARKER: &str = ".breakpad";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn io<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> Self + 'a {
        move |source| StoreError::Io { action, path: path.to_path_buf(), source }
    }
}

/// Result of trying to create the zero-hash compatibility link.
///
/// None of these are errors; the link is a convenience.
#[derive(Debug)]
pub enum SymlinkOutcome {
    Created,
    AlreadyPresent,
    Failed(io::Error),
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct SymbolStore {
    root: PathBuf,
}

impl SymbolStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<name>/<hash>`.
    pub fn hash_dir(&self, identity: &SymbolIdentity) -> PathBuf {
        self.root.join(&identity.name).join(&identity.hash)
    }

    /// `<root>/<name>/<hash>/<name>.sym`; a `.pdb` name has its extension replaced.
    pub fn symbol_path(&self, identity: &SymbolIdentity) -> PathBuf {
        self.hash_dir(identity).join(symbol_file_name(&identity.name))
    }

    pub fn contains(&self, identity: &SymbolIdentity) -> bool {
        self.symbol_path(identity).is_file()
    }

    /// Create the hash directory and attempt the zero-hash compatibility link.
    pub fn create_symbol_dir(
        &self,
        identity: &SymbolIdentity,
    ) -> Result<(PathBuf, SymlinkOutcome), StoreError> {
        let dir = self.hash_dir(identity);
        fs::create_dir_all(&dir).map_err(StoreError::io("create", &dir))?;
        let link = self.root.join(&identity.name).join(ZERO_HASH_DIR);
        let outcome = link_zero_hash(&link, &identity.hash);
        match &outcome {
            SymlinkOutcome::Failed(e) => {
                warn!("ignoring failure to link {}: {}", link.display(), e)
            }
            other => debug!("zero-hash link {}: {:?}", link.display(), other),
        }
        Ok((dir, outcome))
    }

    /// Copy a sidecar symbol file into its store slot.
    pub fn import(&self, identity: &SymbolIdentity, source: &Path) -> Result<PathBuf, StoreError> {
        self.create_symbol_dir(identity)?;
        let dest = self.symbol_path(identity);
        fs::copy(source, &dest).map_err(StoreError::io("copy into", &dest))?;
        Ok(dest)
    }

    /// Best-effort recursive delete of the store root.
    pub fn clear(&self) -> bool {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => true,
            Err(e) => {
                debug!("could not clear {}: {}", self.root.display(), e);
                false
            }
        }
    }
}

fn symbol_file_name(name: &str) -> String {
    let stem =
        if name.to_ascii_lowercase().ends_with(".pdb") { &name[..name.len() - 4] } else { name };
    format!("{stem}.sym")
}

#[cfg(unix)]
fn link_zero_hash(link: &Path, hash: &str) -> SymlinkOutcome {
    match std::os::unix::fs::symlink(hash, link) {
        Ok(()) => SymlinkOutcome::Created,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => SymlinkOutcome::AlreadyPresent,
        Err(e) => SymlinkOutcome::Failed(e),
    }
}

#[cfg(not(unix))]
fn link_zero_hash(_link: &Path, _hash: &str) -> SymlinkOutcome {
    SymlinkOutcome::Unsupported
}

/// Candidate sidecar files for `binary`: siblings named `<file name>.breakpad*`,
/// sorted by path.
pub fn sidecar_candidates(binary: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let (Some(dir), Some(file_name)) = (binary.parent(), binary.file_name()) else {
        return Ok(Vec::new());
    };
    let prefix = format!("{}{}", file_name.to_string_lossy(), SIDECAR_MARKER);
    let entries = fs::read_dir(dir).map_err(StoreError::io("list", dir))?;
    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(StoreError::io("list", dir))?;
        if entry.file_name().to_string_lossy().starts_with(&prefix) && entry.path().is_file() {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// Parse the `MODULE` header of an existing symbol file.
///
/// The outer result carries IO failures, the inner one a malformed header.
pub fn read_identity(path: &Path) -> Result<Result<SymbolIdentity, HeaderError>, StoreError> {
    let file = fs::File::open(path).map_err(StoreError::io("open", path))?;
    let mut first = String::new();
    BufReader::new(file).read_line(&mut first).map_err(StoreError::io("read", path))?;
    Ok(SymbolIdentity::parse(&first))
}
