use crate::errors::CoreError;
use crate::foundation::traits::Attributes;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Deferred value producer evaluated by lazy providers
pub type DeferredFn = dyn Fn() -> Value + Send + Sync;

/// A value supplied by a provider
///
/// Absence is never encoded here: providers return `Option<Value>`, and
/// `Value::Data(serde_json::Value::Null)` is a present null.
#[derive(Clone)]
pub enum Value {
    /// Plain data, drillable through objects and arrays
    Data(serde_json::Value),
    /// A drillable object exposing named attributes
    Object(Arc<dyn Attributes>),
    /// An opaque shared service, retrieved with [`Value::downcast`]
    Service(Arc<dyn Any + Send + Sync>),
    /// A producer evaluated on access by lazy providers
    Deferred(Arc<DeferredFn>),
}

impl Value {
    /// A present null value
    pub fn null() -> Self {
        Self::Data(serde_json::Value::Null)
    }

    /// Wrap plain data
    pub fn data(value: impl Into<serde_json::Value>) -> Self {
        Self::Data(value.into())
    }

    /// Wrap a drillable object
    pub fn object<T: Attributes>(object: T) -> Self {
        Self::Object(Arc::new(object))
    }

    /// Wrap an opaque service
    pub fn service<T: Any + Send + Sync>(service: T) -> Self {
        Self::Service(Arc::new(service))
    }

    /// Wrap an already shared service without re-allocating it
    pub fn shared<T: Any + Send + Sync>(service: Arc<T>) -> Self {
        Self::Service(service)
    }

    /// Wrap a producer evaluated on every access through a lazy provider
    pub fn deferred<F>(producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::Deferred(Arc::new(producer))
    }

    /// Check if this is a present null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Data(serde_json::Value::Null))
    }

    /// Check if this value is a deferred producer
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Get the plain data, if this is a data value
    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }

    /// Get the data as a string slice
    pub fn as_str(&self) -> Option<&str> {
        self.as_data().and_then(|data| data.as_str())
    }

    /// Get the data as an integer
    pub fn as_i64(&self) -> Option<i64> {
        self.as_data().and_then(|data| data.as_i64())
    }

    /// Get the data as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        self.as_data().and_then(|data| data.as_bool())
    }

    /// Downcast a service value to its concrete type
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Self::Service(service) => service.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Evaluate a deferred producer, or return the value unchanged
    pub fn evaluate(&self) -> Value {
        match self {
            Self::Deferred(producer) => producer(),
            other => other.clone(),
        }
    }

    /// Read one named attribute
    ///
    /// `key` only labels the error; it is the dependency key the value was
    /// resolved from.
    pub fn attribute(&self, key: &str, name: &str) -> Result<Value, CoreError> {
        match self {
            Self::Data(serde_json::Value::Object(map)) => map
                .get(name)
                .cloned()
                .map(Value::Data)
                .ok_or_else(|| CoreError::path_traversal(key, name, "object has no such field")),
            Self::Data(serde_json::Value::Array(items)) => name
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .cloned()
                .map(Value::Data)
                .ok_or_else(|| CoreError::path_traversal(key, name, "array has no such index")),
            Self::Data(other) => Err(CoreError::path_traversal(
                key,
                name,
                format!("{} has no attributes", data_kind(other)),
            )),
            Self::Object(object) => object.attribute(name).ok_or_else(|| {
                CoreError::path_traversal(
                    key,
                    name,
                    format!("{} has no such attribute", object.type_name()),
                )
            }),
            Self::Service(_) => Err(CoreError::path_traversal(
                key,
                name,
                "service values are opaque",
            )),
            Self::Deferred(producer) => producer().attribute(key, name),
        }
    }

    /// Drill through a sequence of attribute names, in order
    pub fn dig<S: AsRef<str>>(&self, key: &str, path: &[S]) -> Result<Value, CoreError> {
        let mut current = self.clone();

        for segment in path {
            current = current.attribute(key, segment.as_ref())?;
        }

        Ok(current)
    }
}

fn data_kind(data: &serde_json::Value) -> &'static str {
    match data {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn same_allocation<T: ?Sized, U: ?Sized>(left: &Arc<T>, right: &Arc<U>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(left) as *const (),
        Arc::as_ptr(right) as *const (),
    )
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Data(left), Self::Data(right)) => left == right,
            (Self::Object(left), Self::Object(right)) => same_allocation(left, right),
            (Self::Service(left), Self::Service(right)) => same_allocation(left, right),
            (Self::Deferred(left), Self::Deferred(right)) => same_allocation(left, right),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(data) => f.debug_tuple("Data").field(data).finish(),
            Self::Object(object) => f.debug_tuple("Object").field(&object.type_name()).finish(),
            Self::Service(_) => f.debug_tuple("Service").field(&"<service>").finish(),
            Self::Deferred(_) => f.debug_tuple("Deferred").field(&"<deferred>").finish(),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::Data(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Data(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Data(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Data(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Data(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Data(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Data(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Data(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Application {
        name: &'static str,
    }

    impl Attributes for Application {
        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "name" => Some(Value::from(self.name)),
                "tools" => Some(Value::data(json!({ "string_tools": { "enabled": true } }))),
                _ => None,
            }
        }
    }

    #[test]
    fn test_null_is_present_data() {
        let value = Value::null();
        assert!(value.is_null());
        assert_eq!(value.as_data(), Some(&serde_json::Value::Null));
    }

    #[test]
    fn test_dig_through_data() {
        let value = Value::data(json!({ "tools": { "items": ["a", "b"] } }));

        let found = value.dig("config", &["tools", "items", "1"]).unwrap();
        assert_eq!(found, Value::from("b"));
    }

    #[test]
    fn test_dig_through_object_and_data() {
        let value = Value::object(Application { name: "conduit" });

        assert_eq!(value.dig("application", &["name"]).unwrap(), Value::from("conduit"));

        let enabled = value
            .dig("application", &["tools", "string_tools", "enabled"])
            .unwrap();
        assert_eq!(enabled.as_bool(), Some(true));
    }

    #[test]
    fn test_dig_failure_is_path_traversal() {
        let value = Value::object(Application { name: "conduit" });

        let error = value.dig("application", &["missing"]).unwrap_err();
        assert!(error.is_path_traversal());
        assert!(!error.is_missing_dependency());

        let error = Value::from(5).dig("count", &["digits"]).unwrap_err();
        assert!(error.is_path_traversal());

        let error = Value::service(42u32).dig("answer", &["value"]).unwrap_err();
        assert!(error.is_path_traversal());
    }

    #[test]
    fn test_service_downcast_and_identity() {
        let shared = Arc::new(String::from("repository"));
        let left = Value::shared(shared.clone());
        let right = Value::shared(shared);

        assert_eq!(left, right);
        assert_ne!(left, Value::service(String::from("repository")));
        assert_eq!(left.downcast::<String>().unwrap().as_str(), "repository");
        assert!(left.downcast::<u32>().is_none());
    }

    #[test]
    fn test_deferred_evaluation() {
        let value = Value::deferred(|| Value::from("computed"));

        assert!(value.is_deferred());
        assert_eq!(value.evaluate(), Value::from("computed"));
        assert_eq!(Value::from(1).evaluate(), Value::from(1));
    }
}
