use crate::errors::CoreError;
use crate::foundation::{Key, Value};
use crate::providers::provider::{read_lock, write_lock, Mutability, Provider, ProviderOptions};
use std::collections::BTreeMap;
use std::sync::RwLock;

type Entries = BTreeMap<Key, Option<Value>>;

/// Provider of a mapping from keys to values
///
/// An entry may be declared without a value: the key is then a valid target
/// for `set` but `has` reports false for it. A provider created with
/// [`ManyProvider::new`] has no mapping at all and recognizes no key until a
/// mapping is supplied through [`ManyProvider::replace_values`].
#[derive(Debug)]
pub struct ManyProvider {
    name: String,
    entries: RwLock<Option<Entries>>,
    mutability: Mutability,
    options: ProviderOptions,
}

impl ManyProvider {
    /// Create a provider without a mapping
    pub fn new(options: ProviderOptions) -> Result<Self, CoreError> {
        let mutability = options.mutability()?;

        Ok(Self {
            name: "ManyProvider".to_string(),
            entries: RwLock::new(None),
            mutability,
            options,
        })
    }

    /// Create a provider where every key holds a value
    pub fn with_values<I, K, V>(values: I, options: ProviderOptions) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        Self::with_entries(
            values.into_iter().map(|(key, value)| (key, Some(value.into()))),
            options,
        )
    }

    /// Create a provider from entries, where `None` declares a key without a value
    pub fn with_entries<I, K>(entries: I, options: ProviderOptions) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (K, Option<Value>)>,
        K: AsRef<str>,
    {
        let provider = Self::new(options)?;
        let entries = normalize_entries(entries)?;

        *write_lock(&provider.entries, "many_provider")? = Some(entries);

        Ok(provider)
    }

    /// Rename the provider, as reported in error messages
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Check if the provider has received a mapping
    pub fn is_initialized(&self) -> bool {
        read_lock(&self.entries).is_some()
    }

    /// Snapshot of the keys that currently hold a value
    pub fn values(&self) -> BTreeMap<String, Value> {
        read_lock(&self.entries)
            .as_ref()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|(key, value)| {
                        value.clone().map(|value| (key.as_str().to_string(), value))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Snapshot of every declared key, including keys without a value
    pub fn entries(&self) -> BTreeMap<String, Option<Value>> {
        read_lock(&self.entries)
            .as_ref()
            .map(|entries| {
                entries
                    .iter()
                    .map(|(key, value)| (key.as_str().to_string(), value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Presence check that optionally counts keys declared without a value
    pub fn has_with(&self, key: &str, allow_undefined: bool) -> Result<bool, CoreError> {
        let key = Key::parse(key)?;

        if !allow_undefined {
            return Ok(self.has_value(&key));
        }

        Ok(read_lock(&self.entries)
            .as_ref()
            .map(|entries| entries.contains_key(&key))
            .unwrap_or(false))
    }

    /// Replace the whole mapping
    ///
    /// Rejected outright for read-only providers. Under write-once, every key
    /// that already holds a value in the current mapping stays protected; keys
    /// that are new or were declared without a value may be written.
    pub fn replace_values<I, K>(&self, entries: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = (K, Option<Value>)>,
        K: AsRef<str>,
    {
        let replacement = normalize_entries(entries)?;
        let mut current = write_lock(&self.entries, "many_provider")?;

        match self.mutability {
            Mutability::ReadOnly => {
                let key = replacement
                    .keys()
                    .next()
                    .map(|key| key.as_str().to_string())
                    .unwrap_or_else(|| "values".to_string());

                return Err(CoreError::immutable(key, self.name()));
            }
            Mutability::WriteOnce => {
                if let Some(previous) = current.as_ref() {
                    for key in replacement.keys() {
                        let written = matches!(previous.get(key), Some(Some(_)));
                        self.mutability.check_write(key, written, &self.name())?;
                    }
                }
            }
            Mutability::Mutable => {}
        }

        tracing::debug!(
            provider = %self.name(),
            keys = replacement.len(),
            "provider mapping replaced"
        );

        *current = Some(replacement);
        Ok(())
    }
}

impl Provider for ManyProvider {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn options(&self) -> &ProviderOptions {
        &self.options
    }

    fn mutability(&self) -> Mutability {
        self.mutability
    }

    fn get_value(&self, key: &Key) -> Option<Value> {
        read_lock(&self.entries)
            .as_ref()
            .and_then(|entries| entries.get(key).cloned())
            .flatten()
    }

    fn has_value(&self, key: &Key) -> bool {
        matches!(
            read_lock(&self.entries).as_ref().and_then(|entries| entries.get(key)),
            Some(Some(_))
        )
    }

    fn set_value(&self, key: &Key, value: Value) -> Result<Value, CoreError> {
        let mut current = write_lock(&self.entries, "many_provider")?;

        let entry = current
            .as_mut()
            .and_then(|entries| entries.get_mut(key))
            .ok_or_else(|| CoreError::invalid_key(key.as_str(), self.name()))?;

        self.mutability
            .check_write(key, entry.is_some(), &self.name())?;

        *entry = Some(value.clone());
        Ok(value)
    }
}

fn normalize_entries<I, K>(entries: I) -> Result<Entries, CoreError>
where
    I: IntoIterator<Item = (K, Option<Value>)>,
    K: AsRef<str>,
{
    entries
        .into_iter()
        .enumerate()
        .map(|(index, (key, value))| {
            Key::validate_name(key, &format!("values.keys[{}]", index)).map(|key| (key, value))
        })
        .collect()
}
