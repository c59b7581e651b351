use std::fmt;
use std::path::{Path, PathBuf};

/// Serialization format of a provider configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Pick the format from a file extension, defaulting to YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|extension| extension.to_str()) {
            Some(extension) if extension.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Json => "json",
        }
    }
}

/// Where a provider configuration was loaded from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    /// Loaded from a file
    File(PathBuf),
    /// Parsed from an in-memory string
    Inline(ConfigFormat),
    /// Built in code
    #[default]
    Programmatic,
}

impl ConfigSource {
    pub fn is_file(&self) -> bool {
        matches!(self, ConfigSource::File(_))
    }

    /// Get source description
    pub fn description(&self) -> String {
        match self {
            ConfigSource::File(path) => format!("configuration file: {}", path.display()),
            ConfigSource::Inline(format) => format!("inline {} configuration", format.as_str()),
            ConfigSource::Programmatic => "programmatic configuration".to_string(),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("providers.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("providers.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("providers.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("providers")), ConfigFormat::Yaml);
    }

    #[test]
    fn test_source_description() {
        let source = ConfigSource::File(PathBuf::from("config/providers.yaml"));

        assert!(source.is_file());
        assert_eq!(source.to_string(), "configuration file: config/providers.yaml");
        assert_eq!(
            ConfigSource::Inline(ConfigFormat::Json).to_string(),
            "inline json configuration"
        );
    }
}
