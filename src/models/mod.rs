// Gateway module for models - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod provider;
mod registry;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod testing;

// Public re-exports - the ONLY way to access model functionality
pub use provider::ProviderClient;
pub use registry::{ModelRegistry, RegistryConfig};
pub use traits::{ModelCaller, ModelLister};
pub use types::{CallError, CapabilityClass, ModelDescriptor, ProviderId, RouterModel};

#[cfg(test)]
pub(crate) use traits::{MockModelCaller, MockModelLister};
