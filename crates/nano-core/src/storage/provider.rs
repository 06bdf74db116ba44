use std::fmt::Debug;
use std::path::{Path, PathBuf};
use crate::kernel::error::Result;

/// Filesystem operations the kernel needs while booting.
///
/// Every path the kernel hands to a provider is already absolute (derived from
/// the project directory), so providers resolve relative paths only for their
/// own convenience.
pub trait StorageProvider: Send + Sync + Debug {
    /// Gates cache reuse and optional `services.yaml` detection
    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Recursive; succeeds when the directory already exists
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    fn write_string(&self, path: &Path, contents: &str) -> Result<()>;

    /// Replace the file at `path`, creating missing parent directories.
    /// Readers never observe a partially written file.
    fn write_bytes(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Used by `cache-clear` on the environment cache directory
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    /// Direct children of a directory, sorted
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;
}
