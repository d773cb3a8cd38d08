use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use log::debug;

use crate::services::dependencies::{DependencyError, DependencyExtractor, DependencyScope};

/// Every binary that needs symbols: `root` plus its in-scope shared libraries, to
/// any depth.
///
/// Binaries are keyed by path; two paths to the same inode stay distinct.
pub fn transitive_closure(
    root: &Path,
    extractor: &dyn DependencyExtractor,
    scope: &DependencyScope,
) -> Result<BTreeSet<PathBuf>, DependencyError> {
    let mut visited = BTreeSet::from([root.to_path_buf()]);

    if extractor.reports_transitive() {
        visited.extend(scope.dependencies_of(extractor, root)?);
        return Ok(visited);
    }

    let mut queue = VecDeque::from([root.to_path_buf()]);
    while let Some(binary) = queue.pop_front() {
        for dep in scope.dependencies_of(extractor, &binary)? {
            if visited.insert(dep.clone()) {
                debug!("{} depends on {}", binary.display(), dep.display());
                queue.push_back(dep);
            }
        }
    }
    Ok(visited)
}
