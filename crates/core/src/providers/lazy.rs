use crate::errors::CoreError;
use crate::foundation::{Key, Value};
use crate::providers::provider::{Mutability, Provider, ProviderOptions};

/// Provider wrapper that evaluates deferred values on every access
///
/// Values stored as [`Value::Deferred`] keep a stable definition while their
/// result may change between calls, e.g. a handle that is swapped on reload.
/// Every other value is returned unchanged.
#[derive(Debug)]
pub struct LazyProvider<P> {
    inner: P,
}

impl<P: Provider> LazyProvider<P> {
    /// Wrap a provider
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    /// Get the wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Unwrap the provider
    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: Provider> Provider for LazyProvider<P> {
    fn name(&self) -> String {
        format!("Lazy<{}>", self.inner.name())
    }

    fn options(&self) -> &ProviderOptions {
        self.inner.options()
    }

    fn mutability(&self) -> Mutability {
        self.inner.mutability()
    }

    fn get_value(&self, key: &Key) -> Option<Value> {
        self.inner.get_value(key).map(|value| value.evaluate())
    }

    fn has_value(&self, key: &Key) -> bool {
        self.inner.has_value(key)
    }

    fn set_value(&self, key: &Key, value: Value) -> Result<Value, CoreError> {
        self.inner.set_value(key, value)
    }
}
