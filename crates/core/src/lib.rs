pub mod foundation;
pub mod errors;
pub mod providers;
pub mod consumers;
pub mod config;

// Re-export key types for convenience
pub use foundation::{Attributes, Key, Value};
pub use errors::CoreError;
pub use providers::{
    GlobalProviders, LazyProvider, ManyProvider, Mutability, OneProvider, ProcessScopedProvider,
    Provider, ProviderOptions,
};
pub use consumers::{
    AsConsumer, Consumer, ConsumerType, ConsumerTypeBuilder, DependencyDeclaration,
    DependencyOptions,
};
pub use config::{ConfigFormat, ConfigSource, ProviderConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const LIBRARY_NAME: &str = "conduit";

/// Get library version
pub fn version() -> &'static str {
    VERSION
}

/// Get library name
pub fn name() -> &'static str {
    LIBRARY_NAME
}
