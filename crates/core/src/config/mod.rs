pub mod provider_config;
pub mod sources;

pub use provider_config::*;
pub use sources::*;
