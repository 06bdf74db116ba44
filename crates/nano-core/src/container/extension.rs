use serde_json::Value;

use crate::container::builder::ContainerBuilder;
use crate::kernel::error::Result;

/// A bundle's configuration contribution to the container.
///
/// Every top-level key of a configuration file that is not reserved
/// (`parameters`, `services`, `imports`) is collected as a config block for the
/// extension with that alias. During compilation the merge pass hands all
/// blocks collected for an alias to [`Extension::load`], in import order.
pub trait Extension: Send + Sync {
    /// Configuration key this extension answers to
    fn alias(&self) -> &str;

    /// Register services and parameters from the collected config blocks.
    ///
    /// `container` is a scratch builder pre-filled with the current parameters;
    /// whatever it ends up holding is merged into the real builder.
    fn load(&self, configs: &[Value], container: &mut ContainerBuilder) -> Result<()>;
}
