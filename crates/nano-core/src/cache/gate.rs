use std::path::Path;

use crate::storage::provider::StorageProvider;

/// Decides whether the container has to be built or can be loaded from cache.
///
/// Debug mode always rebuilds. Otherwise the artifact is reused as long as it
/// exists; its contents are not checked for freshness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGate {
    debug: bool,
}

impl CacheGate {
    pub fn new(debug: bool) -> Self {
        Self { debug }
    }

    pub fn should_rebuild(&self, storage: &dyn StorageProvider, artifact: &Path) -> bool {
        let rebuild = self.debug || !storage.is_file(artifact);
        log::debug!(
            "Cache gate for '{}': debug={}, rebuild={}",
            artifact.display(),
            self.debug,
            rebuild
        );
        rebuild
    }
}
