use crate::consumers::declaration::{DependencyDeclaration, DependencyOptions};
use crate::errors::CoreError;
use crate::providers::Provider;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Type-level dependency metadata shared by every instance of a consumer
///
/// A consumer type owns the dependencies it declares and the providers it
/// registers, and composes with one parent type and any number of included
/// component types. Built once with [`ConsumerType::builder`] and immutable
/// afterwards.
pub struct ConsumerType {
    name: String,
    parent: Option<Arc<ConsumerType>>,
    components: Vec<Arc<ConsumerType>>,
    declarations: Vec<DependencyDeclaration>,
    providers: Vec<Arc<dyn Provider>>,
    dependency_keys: OnceLock<BTreeSet<String>>,
    provider_chain: OnceLock<Vec<Arc<dyn Provider>>>,
}

impl ConsumerType {
    /// Start building a consumer type
    pub fn builder(name: impl Into<String>) -> ConsumerTypeBuilder {
        ConsumerTypeBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<ConsumerType>> {
        self.parent.as_ref()
    }

    pub fn components(&self) -> &[Arc<ConsumerType>] {
        &self.components
    }

    /// Providers registered directly on this type, most recent first
    pub fn own_providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    /// The composed provider chain, most specific first
    ///
    /// Own providers come first, then each included component's chain with
    /// the most recently included component first, then the parent's chain.
    /// A provider reachable through several sources keeps its most specific
    /// position. Computed on first use and cached.
    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        self.provider_chain.get_or_init(|| {
            let mut chain: Vec<Arc<dyn Provider>> = Vec::new();

            let sources = self
                .components
                .iter()
                .rev()
                .chain(self.parent.iter())
                .flat_map(|source| source.providers().iter());

            for provider in self.providers.iter().chain(sources) {
                if !chain.iter().any(|known| Arc::ptr_eq(known, provider)) {
                    chain.push(provider.clone());
                }
            }

            tracing::debug!(
                consumer_type = %self.name,
                providers = chain.len(),
                "provider chain composed"
            );

            chain
        })
    }

    /// Canonical keys declared by this type, its components and its ancestors
    pub fn dependency_keys(&self) -> &BTreeSet<String> {
        self.dependency_keys.get_or_init(|| {
            let mut keys: BTreeSet<String> = self
                .parent
                .iter()
                .chain(self.components.iter())
                .flat_map(|source| source.dependency_keys().iter().cloned())
                .collect();

            keys.extend(
                self.declarations
                    .iter()
                    .map(|declaration| declaration.key().as_str().to_string()),
            );

            keys
        })
    }

    /// Check if a canonical key is declared anywhere in the type's ancestry
    pub fn declares(&self, key: &str) -> bool {
        self.dependency_keys().contains(key)
    }

    /// Find the most specific declaration for an accessor name
    pub fn declaration(&self, accessor: &str) -> Option<&DependencyDeclaration> {
        self.declarations
            .iter()
            .rev()
            .find(|declaration| declaration.accessor() == accessor)
            .or_else(|| {
                self.components
                    .iter()
                    .rev()
                    .find_map(|component| component.declaration(accessor))
            })
            .or_else(|| {
                self.parent
                    .as_ref()
                    .and_then(|parent| parent.declaration(accessor))
            })
    }

    /// Every effective declaration, one per accessor, sorted by accessor
    pub fn declarations(&self) -> Vec<&DependencyDeclaration> {
        let mut accessors: BTreeSet<String> = BTreeSet::new();
        self.collect_accessors(&mut accessors);

        accessors
            .iter()
            .filter_map(|accessor| self.declaration(accessor))
            .collect()
    }

    fn collect_accessors(&self, accessors: &mut BTreeSet<String>) {
        if let Some(parent) = &self.parent {
            parent.collect_accessors(accessors);
        }
        for component in &self.components {
            component.collect_accessors(accessors);
        }
        accessors.extend(
            self.declarations
                .iter()
                .map(|declaration| declaration.accessor().to_string()),
        );
    }
}

impl fmt::Debug for ConsumerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsumerType")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|parent| parent.name()))
            .field(
                "components",
                &self
                    .components
                    .iter()
                    .map(|component| component.name())
                    .collect::<Vec<_>>(),
            )
            .field("declarations", &self.declarations.len())
            .field("providers", &self.providers.len())
            .finish()
    }
}

/// Builder assembling a [`ConsumerType`] at definition time
pub struct ConsumerTypeBuilder {
    name: String,
    parent: Option<Arc<ConsumerType>>,
    components: Vec<Arc<ConsumerType>>,
    declarations: Vec<DependencyDeclaration>,
    providers: Vec<Arc<dyn Provider>>,
}

impl ConsumerTypeBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            components: Vec::new(),
            declarations: Vec::new(),
            providers: Vec::new(),
        }
    }

    /// Inherit declarations and providers from a parent type
    pub fn extends(mut self, parent: &Arc<ConsumerType>) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Mix in a component type; later components take precedence
    pub fn include(mut self, component: &Arc<ConsumerType>) -> Self {
        self.components.push(component.clone());
        self
    }

    /// Declare a dependency, returning the accessor name
    pub fn declare(
        &mut self,
        key: impl AsRef<str>,
        options: DependencyOptions,
    ) -> Result<String, CoreError> {
        let declaration = DependencyDeclaration::new(key, options)?;
        let accessor = declaration.accessor().to_string();

        tracing::trace!(
            consumer_type = %self.name,
            key = %declaration.key(),
            accessor = %accessor,
            "dependency declared"
        );

        self.declarations.push(declaration);
        Ok(accessor)
    }

    /// Chainable form of [`ConsumerTypeBuilder::declare`]
    pub fn with_dependency(
        mut self,
        key: impl AsRef<str>,
        options: DependencyOptions,
    ) -> Result<Self, CoreError> {
        self.declare(key, options)?;
        Ok(self)
    }

    /// Declare a dependency with default options
    pub fn dependency(self, key: impl AsRef<str>) -> Result<Self, CoreError> {
        self.with_dependency(key, DependencyOptions::new())
    }

    /// Register a provider ahead of every provider registered before it
    pub fn register_provider(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(0, provider);
    }

    /// Chainable form of [`ConsumerTypeBuilder::register_provider`]
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.register_provider(provider);
        self
    }

    pub fn build(self) -> Arc<ConsumerType> {
        tracing::debug!(
            consumer_type = %self.name,
            declarations = self.declarations.len(),
            providers = self.providers.len(),
            "consumer type built"
        );

        Arc::new(ConsumerType {
            name: self.name,
            parent: self.parent,
            components: self.components,
            declarations: self.declarations,
            providers: self.providers,
            dependency_keys: OnceLock::new(),
            provider_chain: OnceLock::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{OneProvider, ProviderOptions};

    fn provider(key: &str, value: &str) -> Arc<dyn Provider> {
        Arc::new(OneProvider::with_value(key, value, ProviderOptions::new()).unwrap())
    }

    fn names(chain: &[Arc<dyn Provider>]) -> Vec<String> {
        chain
            .iter()
            .map(|provider| provider.get("tools").unwrap().unwrap().as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_registration_prepends() {
        let consumer_type = ConsumerType::builder("Orchestrator")
            .with_provider(provider("tools", "first"))
            .with_provider(provider("tools", "second"))
            .build();

        assert_eq!(names(consumer_type.providers()), vec!["second", "first"]);
    }

    #[test]
    fn test_chain_order_most_specific_first() {
        let base = ConsumerType::builder("Base")
            .with_provider(provider("tools", "base"))
            .build();
        let first = ConsumerType::builder("FirstMixin")
            .with_provider(provider("tools", "first mixin"))
            .build();
        let second = ConsumerType::builder("SecondMixin")
            .with_provider(provider("tools", "second mixin"))
            .build();

        let derived = ConsumerType::builder("Derived")
            .extends(&base)
            .include(&first)
            .include(&second)
            .with_provider(provider("tools", "derived"))
            .build();

        assert_eq!(
            names(derived.providers()),
            vec!["derived", "second mixin", "first mixin", "base"]
        );
        assert_eq!(names(base.providers()), vec!["base"]);
    }

    #[test]
    fn test_shared_provider_listed_once() {
        let shared = provider("tools", "shared");
        let component = ConsumerType::builder("Component")
            .with_provider(shared.clone())
            .build();
        let base = ConsumerType::builder("Base").include(&component).build();
        let derived = ConsumerType::builder("Derived")
            .extends(&base)
            .include(&component)
            .build();

        assert_eq!(derived.providers().len(), 1);
        assert!(Arc::ptr_eq(&derived.providers()[0], &shared));
    }

    #[test]
    fn test_dependency_keys_merge() {
        let base = ConsumerType::builder("Base")
            .dependency("env")
            .unwrap()
            .build();
        let component = ConsumerType::builder("Component")
            .dependency("application.tools")
            .unwrap()
            .build();
        let derived = ConsumerType::builder("Derived")
            .extends(&base)
            .include(&component)
            .dependency("tools")
            .unwrap()
            .dependency("env")
            .unwrap()
            .build();

        let keys: Vec<&str> = derived.dependency_keys().iter().map(String::as_str).collect();
        assert_eq!(keys, vec!["application", "env", "tools"]);
        assert!(derived.declares("application"));
        assert!(!base.declares("tools"));
    }

    #[test]
    fn test_redeclaration_overrides_for_subtype_only() {
        let base = ConsumerType::builder("Base")
            .with_dependency("tools", DependencyOptions::new().with_optional(true))
            .unwrap()
            .build();
        let derived = ConsumerType::builder("Derived")
            .extends(&base)
            .with_dependency("tools", DependencyOptions::new().with_memoize(false))
            .unwrap()
            .build();

        assert!(base.declaration("tools").unwrap().is_optional());
        assert!(base.declaration("tools").unwrap().is_memoized());

        let overridden = derived.declaration("tools").unwrap();
        assert!(!overridden.is_optional());
        assert!(!overridden.is_memoized());
        assert_eq!(derived.declarations().len(), 1);
    }

    #[test]
    fn test_declare_returns_accessor() {
        let mut builder = ConsumerType::builder("Orchestrator");

        assert_eq!(
            builder.declare("application.tools", DependencyOptions::new()).unwrap(),
            "tools"
        );
        assert_eq!(
            builder
                .declare("application", DependencyOptions::new().with_alias("app"))
                .unwrap(),
            "app"
        );
        assert!(builder.declare("", DependencyOptions::new()).is_err());

        let consumer_type = builder.build();
        assert_eq!(consumer_type.declarations().len(), 2);
        assert!(consumer_type.declaration("application").is_none());
    }
}
