use thiserror::Error;

/// Message used when a provider is configured both read-only and write-once.
pub const INCOMPATIBLE_OPTIONS_MESSAGE: &str = "read_only and write_once are incompatible options";

/// Core error type for the conduit engine
///
/// Three variants form the domain taxonomy raised by resolution and provider
/// writes: [`CoreError::MissingDependency`], [`CoreError::InvalidKey`] and
/// [`CoreError::Immutable`]. The remaining variants are argument, traversal,
/// locking and configuration failures.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("dependency not found with key {key:?}")]
    MissingDependency { key: String },

    #[error("invalid key {key:?} for {provider}")]
    InvalidKey { key: String, provider: String },

    #[error("unable to change immutable value for {provider} with key {key:?}")]
    Immutable { key: String, provider: String },

    #[error("invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },

    #[error("unable to read {segment:?} from dependency {key:?}: {message}")]
    PathTraversal {
        key: String,
        segment: String,
        message: String,
    },

    #[error("Lock error on resource: {resource}")]
    LockError { resource: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Create a new missing dependency error
    pub fn missing_dependency(key: impl Into<String>) -> Self {
        Self::MissingDependency { key: key.into() }
    }

    /// Create a new invalid key error
    pub fn invalid_key(key: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            provider: provider.into(),
        }
    }

    /// Create a new immutable value error
    pub fn immutable(key: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::Immutable {
            key: key.into(),
            provider: provider.into(),
        }
    }

    /// Create a new invalid argument error
    pub fn invalid_argument(argument: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// Create a new path traversal error
    pub fn path_traversal(
        key: impl Into<String>,
        segment: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::PathTraversal {
            key: key.into(),
            segment: segment.into(),
            message: message.into(),
        }
    }

    /// Create a new lock error
    pub fn lock_error(resource: impl Into<String>) -> Self {
        Self::LockError {
            resource: resource.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if the error is a missing dependency error
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::MissingDependency { .. })
    }

    /// Check if the error is an invalid key error
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, Self::InvalidKey { .. })
    }

    /// Check if the error is an immutable value error
    pub fn is_immutable(&self) -> bool {
        matches!(self, Self::Immutable { .. })
    }

    /// Check if the error is an argument validation error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Check if the error is a path traversal error
    pub fn is_path_traversal(&self) -> bool {
        matches!(self, Self::PathTraversal { .. })
    }

    /// Check if the error belongs to the domain taxonomy
    pub fn is_domain_error(&self) -> bool {
        self.is_missing_dependency() || self.is_invalid_key() || self.is_immutable()
    }
}
