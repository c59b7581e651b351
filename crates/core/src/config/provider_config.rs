use crate::config::sources::{ConfigFormat, ConfigSource};
use crate::errors::CoreError;
use crate::foundation::Value;
use crate::providers::{ManyProvider, ProviderOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Declarative description of a mapping provider
///
/// ```yaml
/// name: Settings
/// write_once: true
/// values:
///   env: production
///   logger: ~
/// undefined:
///   - region
/// ```
///
/// A key mapped to `~` (or JSON `null`) holds a present null. Keys listed
/// under `undefined` are recognized by the provider but hold no value yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub read_only: Option<bool>,

    #[serde(default)]
    pub write_once: bool,

    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub undefined: Vec<String>,

    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,

    #[serde(skip)]
    pub source: ConfigSource,
}

impl ProviderConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, CoreError> {
        let mut config: Self = serde_yaml::from_str(content)?;
        config.source = ConfigSource::Inline(ConfigFormat::Yaml);
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CoreError> {
        let mut config: Self = serde_json::from_str(content)?;
        config.source = ConfigSource::Inline(ConfigFormat::Json);
        Ok(config)
    }

    /// Load a configuration file; `.json` files are parsed as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let mut config = match ConfigFormat::from_path(path) {
            ConfigFormat::Json => Self::from_json_str(&content)?,
            ConfigFormat::Yaml => Self::from_yaml_str(&content)?,
        };
        config.source = ConfigSource::File(path.to_path_buf());

        tracing::debug!(
            source = %config.source,
            values = config.values.len(),
            undefined = config.undefined.len(),
            "provider configuration loaded"
        );

        Ok(config)
    }

    /// Provider options described by the configuration
    pub fn provider_options(&self) -> ProviderOptions {
        let options = self
            .options
            .iter()
            .fold(ProviderOptions::new(), |options, (name, value)| {
                options.with_option(name.clone(), value.clone())
            });

        let options = match self.read_only {
            Some(read_only) => options.with_read_only(read_only),
            None => options,
        };

        options.with_write_once(self.write_once)
    }

    /// Check the configuration without building a provider
    pub fn validate(&self) -> Result<(), CoreError> {
        self.provider_options().mutability()?;

        if let Some(key) = self.undefined.iter().find(|key| self.values.contains_key(*key)) {
            return Err(CoreError::configuration(format!(
                "key {:?} is listed both with a value and as undefined in {}",
                key, self.source
            )));
        }

        Ok(())
    }

    /// Build the mapping provider described by the configuration
    pub fn build_provider(&self) -> Result<ManyProvider, CoreError> {
        self.validate()?;

        let entries = self
            .values
            .iter()
            .map(|(key, value)| (key.as_str(), Some(Value::data(value.clone()))))
            .chain(self.undefined.iter().map(|key| (key.as_str(), None)));

        let provider = ManyProvider::with_entries(entries, self.provider_options())?;

        Ok(match &self.name {
            Some(name) => provider.with_name(name.clone()),
            None => provider,
        })
    }
}

impl TryFrom<ProviderConfig> for ManyProvider {
    type Error = CoreError;

    fn try_from(config: ProviderConfig) -> Result<Self, Self::Error> {
        config.build_provider()
    }
}
