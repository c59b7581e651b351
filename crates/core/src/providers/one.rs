use crate::errors::CoreError;
use crate::foundation::{Key, Value};
use crate::providers::provider::{read_lock, write_lock, Mutability, Provider, ProviderOptions};
use std::sync::RwLock;

/// Provider of a single value under one fixed key
///
/// Without an initial value the key is recognized but reports no value until
/// written. Read-only by default; with `write_once` it behaves as a late-bound
/// singleton that accepts exactly one write.
#[derive(Debug)]
pub struct OneProvider {
    key: Key,
    value: RwLock<Option<Value>>,
    mutability: Mutability,
    options: ProviderOptions,
}

impl OneProvider {
    /// Create a provider for `key` holding no value yet
    pub fn new(key: impl AsRef<str>, options: ProviderOptions) -> Result<Self, CoreError> {
        Self::build(key, None, options)
    }

    /// Create a provider for `key` holding `value`
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

impl Provider for OneProvider {
    fn name(&self) -> String {
        "OneProvider".to_string()
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

        let mut current = write_lock(&self.value, "one_provider")?;
        self.mutability
            .check_write(key, current.is_some(), &self.name())?;

        *current = Some(value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_without_value() {
        let provider = OneProvider::new("option", ProviderOptions::new()).unwrap();

        assert!(!provider.has("option").unwrap());
        assert_eq!(provider.get("option").unwrap(), None);
        assert_eq!(provider.value(), None);
    }

    #[test]
    fn test_with_null_value() {
        let provider = OneProvider::with_value("option", Value::null(), ProviderOptions::new()).unwrap();

        assert!(provider.has("option").unwrap());
        assert_eq!(provider.get("option").unwrap(), Some(Value::null()));
    }

    #[test]
    fn test_invalid_constructor_key() {
        let error = OneProvider::new("", ProviderOptions::new()).unwrap_err();
        assert!(error.is_invalid_argument());
    }

    #[test]
    fn test_read_only_fixed_key() {
        let provider = OneProvider::with_value("env", "prod", ProviderOptions::new()).unwrap();

        assert!(provider.is_read_only());

        let error = provider.set("env", Value::from("dev")).unwrap_err();
        assert!(error.is_immutable());
        assert_eq!(
            error.to_string(),
            r#"unable to change immutable value for OneProvider with key "env""#
        );

        let error = provider.set("other", Value::from("x")).unwrap_err();
        assert!(error.is_invalid_key());
        assert_eq!(error.to_string(), r#"invalid key "other" for OneProvider"#);

        assert_eq!(provider.get("env").unwrap(), Some(Value::from("prod")));
    }

    #[test]
    fn test_mutable_writes() {
        let provider = OneProvider::with_value("env", "prod", ProviderOptions::mutable()).unwrap();

        assert_eq!(provider.set("env", Value::from("dev")).unwrap(), Value::from("dev"));
        assert_eq!(provider.write("test").unwrap(), Value::from("test"));
        assert_eq!(provider.get("env").unwrap(), Some(Value::from("test")));
    }

    #[test]
    fn test_write_once_without_value() {
        let provider = OneProvider::new("env", ProviderOptions::write_once()).unwrap();

        assert!(provider.is_write_once());
        assert_eq!(provider.write("prod").unwrap(), Value::from("prod"));

        let error = provider.write("dev").unwrap_err();
        assert!(error.is_immutable());
        assert_eq!(provider.value(), Some(Value::from("prod")));
    }

    #[test]
    fn test_write_once_with_value() {
        let provider = OneProvider::with_value("env", "prod", ProviderOptions::write_once()).unwrap();

        assert!(provider.set("env", Value::from("dev")).unwrap_err().is_immutable());
    }

    #[test]
    fn test_incompatible_options() {
        let options = ProviderOptions::new()
            .with_read_only(true)
            .with_write_once(true);

        let error = OneProvider::new("env", options).unwrap_err();
        assert!(error.is_invalid_argument());
    }

    #[test]
    fn test_poisoned_lock_keeps_value_and_rejects_writes() {
        let provider = Arc::new(OneProvider::with_value("env", "prod", ProviderOptions::mutable()).unwrap());

        let poisoner = provider.clone();
        let outcome = std::thread::spawn(move || {
            let _guard = poisoner.value.write().unwrap();
            panic!("writer panicked while holding the lock");
        })
        .join();
        assert!(outcome.is_err());
        assert!(provider.value.is_poisoned());

        assert!(provider.has("env").unwrap());
        assert_eq!(provider.get("env").unwrap(), Some(Value::from("prod")));

        let error = provider.write("dev").unwrap_err();
        assert!(matches!(error, CoreError::LockError { ref resource } if resource == "one_provider"));
        assert!(!error.is_missing_dependency());
    }
}
