use crate::consumers::consumer_type::ConsumerType;
use crate::consumers::declaration::DependencyDeclaration;
use crate::errors::CoreError;
use crate::foundation::{Key, Value};
use crate::providers::provider::{read_lock, write_lock};
use crate::providers::{ManyProvider, Provider, ProviderOptions};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// An instance resolving its declared dependencies through a provider chain
///
/// The chain is copied from the consumer type at construction, so providers
/// registered on the type afterwards are not seen. Memoized values are cached
/// per instance under their canonical key.
pub struct Consumer {
    id: Uuid,
    consumer_type: Arc<ConsumerType>,
    providers: Vec<Arc<dyn Provider>>,
    cache: RwLock<HashMap<Key, Value>>,
}

impl Consumer {
    /// Create an instance using the type's provider chain
    pub fn new(consumer_type: &Arc<ConsumerType>) -> Self {
        let consumer = Self {
            id: Uuid::new_v4(),
            consumer_type: consumer_type.clone(),
            providers: consumer_type.providers().to_vec(),
            cache: RwLock::new(HashMap::new()),
        };

        tracing::trace!(
            consumer = %consumer.id,
            consumer_type = %consumer_type.name(),
            providers = consumer.providers.len(),
            "consumer created"
        );

        consumer
    }

    /// Create an instance from constructor parameters
    ///
    /// Parameters named after a declared dependency key are served by a
    /// read-only provider placed ahead of every type provider. The remaining
    /// parameters are handed back in their original order.
    pub fn with_parameters<I, K, V>(
        consumer_type: &Arc<ConsumerType>,
        parameters: I,
    ) -> Result<(Self, Vec<(String, Value)>), CoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (declared, remaining): (Vec<(String, Value)>, Vec<(String, Value)>) = parameters
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .partition(|(name, _)| consumer_type.declares(name));

        let consumer = Self::new(consumer_type);

        if declared.is_empty() {
            return Ok((consumer, remaining));
        }

        let parameters = ManyProvider::with_values(declared, ProviderOptions::new())?
            .with_name("Parameters");

        Ok((consumer.with_provider(Arc::new(parameters)), remaining))
    }

    /// Place an instance-scoped provider ahead of the whole chain
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.insert(0, provider);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn consumer_type(&self) -> &Arc<ConsumerType> {
        &self.consumer_type
    }

    /// The instance provider chain, most specific first
    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    /// Resolve a key, failing when no provider has a value for it
    pub fn resolve(&self, key: &str) -> Result<Value, CoreError> {
        let key = Key::parse(key)?;

        self.lookup(&key)
            .ok_or_else(|| self.missing(&key))
    }

    /// Resolve a key, yielding `None` when no provider has a value for it
    pub fn resolve_optional(&self, key: &str) -> Result<Option<Value>, CoreError> {
        let key = Key::parse(key)?;

        Ok(self.lookup(&key))
    }

    /// Check if any provider in the chain has a value for a key
    ///
    /// Never consults or fills the memoization cache.
    pub fn has_dependency(&self, key: &str) -> Result<bool, CoreError> {
        let key = Key::parse(key)?;

        Ok(self.providers.iter().any(|provider| provider.has_value(&key)))
    }

    /// Invoke the value accessor declared under `accessor`
    ///
    /// Returns `Ok(None)` only for optional dependencies that no provider
    /// satisfies. A declared path is applied after the lookup, and after the
    /// cache for memoized dependencies.
    pub fn dependency(&self, accessor: &str) -> Result<Option<Value>, CoreError> {
        let declaration = self.declaration(accessor)?;
        let key = declaration.key();

        let value = match self.cached(declaration) {
            Some(value) => Some(value),
            None => {
                let value = self.lookup(key);

                if let (Some(value), true) = (&value, declaration.is_memoized()) {
                    write_lock(&self.cache, "consumer_cache")?.insert(key.clone(), value.clone());
                }

                value
            }
        };

        match value {
            Some(value) => value.dig(key.as_str(), declaration.path()).map(Some),
            None if declaration.is_optional() => Ok(None),
            None => Err(self.missing(key)),
        }
    }

    /// Invoke the predicate accessor declared under `accessor`
    ///
    /// Accepts the accessor name with or without its trailing `?`.
    pub fn predicate(&self, accessor: &str) -> Result<bool, CoreError> {
        let name = accessor.strip_suffix('?').unwrap_or(accessor);
        let declaration = self.declaration(name)?;

        if !declaration.has_predicate() {
            return Err(CoreError::invalid_argument(
                "accessor",
                format!("no predicate declared for '{}' on {}", name, self.consumer_type.name()),
            ));
        }

        Ok(self
            .providers
            .iter()
            .any(|provider| provider.has_value(declaration.key())))
    }

    fn declaration(&self, accessor: &str) -> Result<&DependencyDeclaration, CoreError> {
        self.consumer_type.declaration(accessor).ok_or_else(|| {
            CoreError::invalid_argument(
                "accessor",
                format!("no dependency declared as '{}' on {}", accessor, self.consumer_type.name()),
            )
        })
    }

    fn cached(&self, declaration: &DependencyDeclaration) -> Option<Value> {
        if !declaration.is_memoized() {
            return None;
        }

        let value = read_lock(&self.cache).get(declaration.key()).cloned();

        if value.is_some() {
            tracing::trace!(consumer = %self.id, key = %declaration.key(), "memoized dependency");
        }

        value
    }

    /// First value in the chain for `key`
    ///
    /// A provider whose value disappears between `has_value` and `get_value`
    /// is skipped, and the scan moves on to the next provider.
    fn lookup(&self, key: &Key) -> Option<Value> {
        let (index, provider, value) =
            self.providers
                .iter()
                .enumerate()
                .find_map(|(index, provider)| {
                    provider
                        .has_value(key)
                        .then(|| provider.get_value(key))
                        .flatten()
                        .map(|value| (index, provider, value))
                })?;

        tracing::trace!(
            consumer = %self.id,
            key = %key,
            provider = %provider.name(),
            position = index,
            "dependency resolved"
        );

        Some(value)
    }

    fn missing(&self, key: &Key) -> CoreError {
        tracing::debug!(
            consumer = %self.id,
            consumer_type = %self.consumer_type.name(),
            key = %key,
            "dependency not found"
        );

        CoreError::missing_dependency(key.as_str())
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("id", &self.id)
            .field("consumer_type", &self.consumer_type.name())
            .field("providers", &self.providers.len())
            .finish()
    }
}
