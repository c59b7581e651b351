use crate::errors::{CoreError, INCOMPATIBLE_OPTIONS_MESSAGE};
use crate::foundation::{Key, Value};
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Write policy of a provider, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// `set` always fails with an immutable error
    ReadOnly,
    /// `set` succeeds for every recognized key
    Mutable,
    /// Each recognized key may be written exactly once
    WriteOnce,
}

impl Mutability {
    /// Get the policy name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Mutability::ReadOnly => "read_only",
            Mutability::Mutable => "mutable",
            Mutability::WriteOnce => "write_once",
        }
    }

    /// Check whether a key may be written under this policy
    ///
    /// `written` reports whether the key currently holds a value.
    pub fn check_write(&self, key: &Key, written: bool, provider: &str) -> Result<(), CoreError> {
        match self {
            Mutability::ReadOnly => Err(CoreError::immutable(key.as_str(), provider)),
            Mutability::WriteOnce if written => Err(CoreError::immutable(key.as_str(), provider)),
            _ => Ok(()),
        }
    }
}

impl Default for Mutability {
    fn default() -> Self {
        Mutability::ReadOnly
    }
}

impl fmt::Display for Mutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Construction-time provider configuration
///
/// `read_only` defaults to true unless `write_once` is requested. Any other
/// entries are informational and never consulted during resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderOptions {
    read_only: Option<bool>,
    write_once: bool,
    extra: serde_json::Map<String, serde_json::Value>,
}

impl ProviderOptions {
    /// Create default options (read-only)
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a provider that accepts any number of writes
    pub fn mutable() -> Self {
        Self::new().with_read_only(false)
    }

    /// Options for a provider that accepts one write per key
    pub fn write_once() -> Self {
        Self::new().with_write_once(true)
    }

    /// Set the read-only flag
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = Some(read_only);
        self
    }

    /// Set the write-once flag
    pub fn with_write_once(mut self, write_once: bool) -> Self {
        self.write_once = write_once;
        self
    }

    /// Add an informational option
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Effective read-only flag
    pub fn is_read_only(&self) -> bool {
        self.read_only.unwrap_or(!self.write_once)
    }

    /// Write-once flag
    pub fn is_write_once(&self) -> bool {
        self.write_once
    }

    /// Get an informational option by name
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.extra.get(name)
    }

    /// Resolve the write policy, rejecting `read_only` together with `write_once`
    pub fn mutability(&self) -> Result<Mutability, CoreError> {
        match (self.read_only, self.write_once) {
            (Some(true), true) => Err(CoreError::invalid_argument(
                "options",
                INCOMPATIBLE_OPTIONS_MESSAGE,
            )),
            (_, true) => Ok(Mutability::WriteOnce),
            (Some(false), false) => Ok(Mutability::Mutable),
            _ => Ok(Mutability::ReadOnly),
        }
    }

    /// The options as a mapping, including explicitly given flags
    pub fn to_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = self.extra.clone();

        if let Some(read_only) = self.read_only {
            map.insert("read_only".to_string(), read_only.into());
        }
        if self.write_once {
            map.insert("write_once".to_string(), true.into());
        }

        map
    }
}

/// A component making values available to consumers under named keys
///
/// Implementors supply the `*_value` methods against canonical keys; the
/// provided `get`, `has` and `set` methods normalize raw keys first.
///
/// Providers are shared between consumers behind `Arc`. Each provider guards
/// its own storage, but a check followed by a write is not atomic across
/// calls, so concurrent writers must be coordinated by the caller.
pub trait Provider: Send + Sync {
    /// Provider name used in error messages
    fn name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Construction-time options
    fn options(&self) -> &ProviderOptions;

    /// Write policy
    fn mutability(&self) -> Mutability;

    /// Value for a canonical key, or `None` when the key holds no value
    fn get_value(&self, key: &Key) -> Option<Value>;

    /// Whether the canonical key is recognized and holds a value
    fn has_value(&self, key: &Key) -> bool;

    /// Store a value for a canonical key, enforcing the write policy
    fn set_value(&self, key: &Key, value: Value) -> Result<Value, CoreError>;

    /// Retrieve the value for a key
    fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let key = Key::parse(key)?;

        if !self.has_value(&key) {
            return Ok(None);
        }

        Ok(self.get_value(&key))
    }

    /// Check if the provider has a value for a key
    fn has(&self, key: &str) -> Result<bool, CoreError> {
        let key = Key::parse(key)?;

        Ok(self.has_value(&key))
    }

    /// Set the value for a key, returning the stored value
    fn set(&self, key: &str, value: Value) -> Result<Value, CoreError> {
        let key = Key::parse(key)?;
        let value = self.set_value(&key, value)?;

        tracing::debug!(provider = %self.name(), key = %key, "provider value written");

        Ok(value)
    }

    /// Check if the provider rejects every write
    fn is_read_only(&self) -> bool {
        self.mutability() == Mutability::ReadOnly
    }

    /// Check if the provider accepts one write per key
    fn is_write_once(&self) -> bool {
        self.mutability() == Mutability::WriteOnce
    }
}

impl fmt::Debug for dyn Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name())
            .field("mutability", &self.mutability())
            .finish()
    }
}

/// Shared read access; a lock poisoned by a panicking writer still yields its data
///
/// Every guarded write is a single assignment, so poisoned data is never torn.
pub(crate) fn read_lock<'a, T>(lock: &'a RwLock<T>) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    resource: &str,
) -> Result<RwLockWriteGuard<'a, T>, CoreError> {
    lock.write().map_err(|_| CoreError::lock_error(resource))
}
