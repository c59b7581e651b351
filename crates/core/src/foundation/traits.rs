use crate::foundation::value::Value;

/// Named attribute access used when drilling into a resolved dependency
///
/// A dependency declared as `"application.tools"` resolves `application` and
/// then reads the `tools` attribute from it. Plain data values are drilled
/// through their JSON structure; anything else that wants to be drillable
/// implements this trait and is wrapped with [`Value::object`].
pub trait Attributes: Send + Sync + 'static {
    /// Read a named attribute, or `None` if the attribute does not exist
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Type name used in traversal error messages
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
