use crate::errors::CoreError;
use std::borrow::Borrow;
use std::fmt;

/// Canonical dependency key
///
/// Every key that enters the engine is normalized into a `Key` before it is
/// compared, looked up or stored. A key must not be empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Normalize a raw key, reporting failures against the `key` argument
    pub fn parse(value: impl AsRef<str>) -> Result<Self, CoreError> {
        Self::validate_name(value, "key")
    }

    /// Normalize a raw name, reporting failures against `argument`
    pub fn validate_name(value: impl AsRef<str>, argument: &str) -> Result<Self, CoreError> {
        let value = value.as_ref();

        if value.is_empty() {
            return Err(CoreError::invalid_argument(argument, "can't be blank"));
        }

        Ok(Self(value.to_string()))
    }

    /// Split a dotted key into its first segment and the remaining path
    ///
    /// `"application.tools.object_tools"` yields the key `application` and the
    /// path `["tools", "object_tools"]`. Every segment must be non-empty.
    pub fn split_path(value: impl AsRef<str>) -> Result<(Self, Vec<String>), CoreError> {
        let value = value.as_ref();
        let mut segments = value.split('.');

        let head = Self::parse(segments.next().unwrap_or_default())
            .map_err(|_| CoreError::invalid_argument("key", format!("{:?} has an empty segment", value)))?;

        let path = segments
            .map(|segment| {
                if segment.is_empty() {
                    Err(CoreError::invalid_argument(
                        "key",
                        format!("{:?} has an empty segment", value),
                    ))
                } else {
                    Ok(segment.to_string())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((head, path))
    }

    /// Get the canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the canonical string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Key {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_blank_keys() {
        let error = Key::parse("").unwrap_err();
        assert!(error.is_invalid_argument());
        assert_eq!(error.to_string(), "invalid argument 'key': can't be blank");

        let error = Key::validate_name("", "as").unwrap_err();
        assert_eq!(error.to_string(), "invalid argument 'as': can't be blank");
    }

    #[test]
    fn test_split_path() {
        let (key, path) = Key::split_path("application.tools.object_tools").unwrap();
        assert_eq!(key.as_str(), "application");
        assert_eq!(path, vec!["tools", "object_tools"]);

        let (key, path) = Key::split_path("env").unwrap();
        assert_eq!(key.as_str(), "env");
        assert!(path.is_empty());
    }

    #[test]
    fn test_split_path_rejects_empty_segments() {
        assert!(Key::split_path("application..tools").is_err());
        assert!(Key::split_path(".tools").is_err());
        assert!(Key::split_path("tools.").is_err());
    }
}
