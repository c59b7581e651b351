use crate::errors::CoreError;
use crate::foundation::Key;

/// Options for declaring a dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyOptions {
    alias: Option<String>,
    memoize: bool,
    optional: bool,
    predicate: bool,
}

impl DependencyOptions {
    /// Default options: memoized, required, no predicate
    pub fn new() -> Self {
        Self {
            alias: None,
            memoize: true,
            optional: false,
            predicate: false,
        }
    }

    /// Name the accessor instead of deriving it from the key
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Cache the first resolved value on the consumer instance
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Resolve to no value instead of failing when no provider matches
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Also define the `<accessor>?` presence check
    pub fn with_predicate(mut self, predicate: bool) -> Self {
        self.predicate = predicate;
        self
    }
}

impl Default for DependencyOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A dependency declared by a consumer type
///
/// Created once per `declare` call and never modified. For a dotted key such
/// as `application.tools.object_tools`, `key` is `application` and `path` is
/// `["tools", "object_tools"]`; the accessor defaults to the last segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDeclaration {
    key: Key,
    accessor: String,
    memoize: bool,
    optional: bool,
    predicate: bool,
    path: Vec<String>,
}

impl DependencyDeclaration {
    pub fn new(key: impl AsRef<str>, options: DependencyOptions) -> Result<Self, CoreError> {
        Key::parse(key.as_ref())?;

        let alias = options
            .alias
            .map(|alias| Key::validate_name(alias, "as").map(Key::into_string))
            .transpose()?;

        let (key, path) = Key::split_path(key)?;
        let accessor = alias.unwrap_or_else(|| {
            path.last()
                .cloned()
                .unwrap_or_else(|| key.as_str().to_string())
        });

        Ok(Self {
            key,
            accessor,
            memoize: options.memoize,
            optional: options.optional,
            predicate: options.predicate,
            path,
        })
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn accessor(&self) -> &str {
        &self.accessor
    }

    /// Name of the generated presence check, if one was requested
    pub fn predicate_name(&self) -> Option<String> {
        self.predicate.then(|| format!("{}?", self.accessor))
    }

    pub fn is_memoized(&self) -> bool {
        self.memoize
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn has_predicate(&self) -> bool {
        self.predicate
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }
}
