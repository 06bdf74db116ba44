use std::sync::Arc;

use crate::container::builder::ContainerBuilder;
use crate::container::extension::Extension;
use crate::container::runtime::Container;
use crate::kernel::error::Result;

/// A self-contained unit of functionality plugged into the kernel.
///
/// Hooks are called in activation order:
/// - [`container_extension`](Self::container_extension) and
///   [`build`](Self::build) while a container is being built (skipped when
///   the cached container is reused),
/// - [`set_container`](Self::set_container) then [`boot`](Self::boot) on
///   every kernel boot,
/// - [`shutdown`](Self::shutdown) in reverse order when the kernel shuts down.
pub trait Bundle: Send + Sync {
    /// Unique name of the bundle within a kernel
    fn name(&self) -> &str;

    /// Extension that receives the configuration blocks keyed by its alias
    fn container_extension(&self) -> Option<Box<dyn Extension>> {
        None
    }

    /// Register services or compiler passes directly
    fn build(&self, _container: &mut ContainerBuilder) -> Result<()> {
        Ok(())
    }

    fn set_container(&mut self, _container: Arc<Container>) {}

    fn boot(&mut self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}
