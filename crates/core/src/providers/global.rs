use crate::errors::CoreError;
use crate::foundation::{Key, Value};
use crate::providers::provider::{read_lock, write_lock, Mutability, Provider, ProviderOptions};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// Provider of a single value shared across the whole process
///
/// Created without a value, the first write always succeeds regardless of
/// the options, read-only included. Once a value is held (including one given
/// at construction, and including a null), further writes require a mutable
/// provider. [`Provider::mutability`] reports the policy from the options; the
/// first write is the only exception to it.
#[derive(Debug)]
pub struct ProcessScopedProvider {
    key: Key,
    value: RwLock<Option<Value>>,
    mutability: Mutability,
    options: ProviderOptions,
}

impl ProcessScopedProvider {
    /// Create a provider whose value will be supplied later
    pub fn new(key: impl AsRef<str>, options: ProviderOptions) -> Result<Self, CoreError> {
        Self::build(key, None, options)
    }

    /// Create a provider holding `value`
    pub fn with_value(
        key: impl AsRef<str>,
        value: impl Into<Value>,
        options: ProviderOptions,
    ) -> Result<Self, CoreError> {
        Self::build(key, Some(value.into()), options)
    }

    fn build(
        key: impl AsRef<str>,
        value: Option<Value>,
        options: ProviderOptions,
    ) -> Result<Self, CoreError> {
        let key = Key::parse(key)?;
        let mutability = options.mutability()?;

        Ok(Self {
            key,
            value: RwLock::new(value),
            mutability,
            options,
        })
    }

    /// The key matched by the provider
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Check if the value may be replaced once set
    pub fn is_mutable(&self) -> bool {
        self.mutability == Mutability::Mutable
    }

    /// The current value, if any
    pub fn value(&self) -> Option<Value> {
        read_lock(&self.value).clone()
    }

    /// Write the value for the provider key
    pub fn write(&self, value: impl Into<Value>) -> Result<Value, CoreError> {
        let key = self.key.clone();
        self.set(key.as_str(), value.into())
    }
}

impl Provider for ProcessScopedProvider {
    fn name(&self) -> String {
        "ProcessScopedProvider".to_string()
    }

    fn options(&self) -> &ProviderOptions {
        &self.options
    }

    fn mutability(&self) -> Mutability {
        self.mutability
    }

    fn get_value(&self, key: &Key) -> Option<Value> {
        if *key != self.key {
            return None;
        }

        self.value()
    }

    fn has_value(&self, key: &Key) -> bool {
        *key == self.key
            && read_lock(&self.value).is_some()
    }

    fn set_value(&self, key: &Key, value: Value) -> Result<Value, CoreError> {
        if *key != self.key {
            return Err(CoreError::invalid_key(key.as_str(), self.name()));
        }

        let mut current = write_lock(&self.value, "process_scoped_provider")?;
        if current.is_some() && !self.is_mutable() {
            return Err(CoreError::immutable(key.as_str(), self.name()));
        }

        *current = Some(value.clone());
        Ok(value)
    }
}

type Registry = RwLock<HashMap<String, Arc<ProcessScopedProvider>>>;

static GLOBAL_PROVIDERS: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    GLOBAL_PROVIDERS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Process-wide registry of named [`ProcessScopedProvider`] singletons
///
/// Registration is explicit: nothing is added implicitly. The map itself is
/// guarded, but writes to the registered providers are not coordinated, so
/// bootstrap them from a single thread before consumers start resolving.
pub struct GlobalProviders;

impl GlobalProviders {
    /// Register a provider under `name`, failing if the name is taken
    pub fn register(
        name: impl Into<String>,
        provider: ProcessScopedProvider,
    ) -> Result<Arc<ProcessScopedProvider>, CoreError> {
        let name = name.into();
        let mut providers = write_lock(registry(), "global_providers")?;

        if providers.contains_key(&name) {
            return Err(CoreError::invalid_argument(
                "name",
                format!("global provider '{}' already registered", name),
            ));
        }

        let provider = Arc::new(provider);
        providers.insert(name.clone(), provider.clone());

        tracing::debug!(name = %name, key = %provider.key(), "global provider registered");

        Ok(provider)
    }

    /// Get a registered provider, registering the one built by `init` if absent
    pub fn get_or_register<F>(
        name: impl Into<String>,
        init: F,
    ) -> Result<Arc<ProcessScopedProvider>, CoreError>
    where
        F: FnOnce() -> Result<ProcessScopedProvider, CoreError>,
    {
        let name = name.into();
        let mut providers = write_lock(registry(), "global_providers")?;

        if let Some(provider) = providers.get(&name) {
            return Ok(provider.clone());
        }

        let provider = Arc::new(init()?);
        providers.insert(name, provider.clone());

        Ok(provider)
    }

    /// Get a registered provider by name
    pub fn get(name: &str) -> Option<Arc<ProcessScopedProvider>> {
        read_lock(registry()).get(name).cloned()
    }

    /// Remove a registered provider
    pub fn remove(name: &str) -> Result<Option<Arc<ProcessScopedProvider>>, CoreError> {
        let removed = write_lock(registry(), "global_providers")?.remove(name);

        if removed.is_some() {
            tracing::debug!(name = %name, "global provider removed");
        }

        Ok(removed)
    }

    /// Names of every registered provider, sorted
    pub fn names() -> Vec<String> {
        let mut names: Vec<String> = read_lock(registry()).keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove every registered provider
    pub fn clear() -> Result<(), CoreError> {
        write_lock(registry(), "global_providers")?.clear();
        Ok(())
    }
}
