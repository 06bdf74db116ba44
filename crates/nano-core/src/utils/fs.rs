use std::path::{Path, PathBuf};

use crate::kernel::error::Result;
use crate::storage::provider::StorageProvider;

/// Find files recursively under `root` that match a predicate.
///
/// Results are sorted so callers that import files in this order get the same
/// order on every platform. A missing root yields no files.
pub fn find_files<F>(
    storage: &dyn StorageProvider,
    root: &Path,
    predicate: &F,
) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool + ?Sized,
{
    let mut result = Vec::new();
    if storage.is_file(root) {
        if predicate(root) {
            result.push(root.to_path_buf());
        }
    } else if storage.is_dir(root) {
        collect_files(storage, root, predicate, &mut result)?;
    }
    result.sort();
    Ok(result)
}

fn collect_files<F>(
    storage: &dyn StorageProvider,
    dir: &Path,
    predicate: &F,
    result: &mut Vec<PathBuf>,
) -> Result<()>
where
    F: Fn(&Path) -> bool + ?Sized,
{
    for entry in storage.read_dir(dir)? {
        if storage.is_file(&entry) {
            if predicate(&entry) {
                result.push(entry);
            }
        } else if storage.is_dir(&entry) {
            collect_files(storage, &entry, predicate, result)?;
        }
    }
    Ok(())
}

/// Walk from `start` towards the filesystem root and return the first
/// directory that contains a file named `marker`.
pub fn find_ancestor_with_file(
    storage: &dyn StorageProvider,
    start: &Path,
    marker: &str,
) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| storage.is_file(&dir.join(marker)))
        .map(Path::to_path_buf)
}
