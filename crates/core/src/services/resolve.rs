//! dyld path-token resolution.
//!
//! Mach-O load commands reference libraries through three placeholders:
//! - `@loader_path`: directory of the image doing the loading
//! - `@executable_path`: directory of the main executable
//! - `@rpath`: each `LC_RPATH` entry of the loading image, tried in order
//!
//! dyld resolves `@rpath` against the stack of `LC_RPATH`s of every image in the
//! load chain. Only the rpaths declared by the image itself are consulted here,
//! so every dylib is expected to carry all the rpaths it needs on its own.

use std::path::{Path, PathBuf};

const LOADER_PATH: &str = "@loader_path";
const EXECUTABLE_PATH: &str = "@executable_path";
const RPATH: &str = "@rpath";

/// Replace `@loader_path` and `@executable_path` unconditionally.
pub fn substitute_tokens(raw: &str, exe_dir: &Path, loader_dir: &Path) -> String {
    raw.replace(LOADER_PATH, &loader_dir.to_string_lossy())
        .replace(EXECUTABLE_PATH, &exe_dir.to_string_lossy())
}

/// Resolve a library reference to a concrete path.
///
/// Returns `None` when the reference uses `@rpath` and no candidate yields an
/// executable file. Callers treat that as a fatal resolution error.
pub fn resolve(raw: &str, exe_dir: &Path, loader_dir: &Path, rpaths: &[String]) -> Option<PathBuf> {
    let path = substitute_tokens(raw, exe_dir, loader_dir);
    if !path.contains(RPATH) {
        return Some(PathBuf::from(path));
    }
    rpaths
        .iter()
        .map(|rpath| PathBuf::from(path.replace(RPATH, rpath)))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata().map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
