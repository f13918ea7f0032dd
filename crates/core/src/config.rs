//! Type system configuration via `metatype.toml`
//!
//! The hosting service reads one config file at bootstrap. On first start a
//! default `metatype.toml` can be written next to the schema files; edit it
//! and restart to change settings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "metatype.toml";

/// Configuration for the registry and conversion engine.
///
/// # Example
///
/// ```toml
/// # Trust already-assigned ids and skip field validation for them
/// trust_assigned_ids = true
///
/// # Maximum nesting of composite values during conversion
/// max_conversion_depth = 64
///
/// # Indent unit for output()
/// output_indent = "  "
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSystemConfig {
    /// When true, converting a loose referenceable whose id is already
    /// assigned returns the instance without converting its fields.
    #[serde(default = "default_trust_assigned_ids")]
    pub trust_assigned_ids: bool,
    /// Nesting bound for recursive composite conversion.
    #[serde(default = "default_max_conversion_depth")]
    pub max_conversion_depth: usize,
    /// Indent unit used when rendering nested instances.
    #[serde(default = "default_output_indent")]
    pub output_indent: String,
}

fn default_trust_assigned_ids() -> bool {
    true
}

fn default_max_conversion_depth() -> usize {
    64
}

fn default_output_indent() -> String {
    "  ".to_string()
}

impl Default for TypeSystemConfig {
    fn default() -> Self {
        Self {
            trust_assigned_ids: default_trust_assigned_ids(),
            max_conversion_depth: default_max_conversion_depth(),
            output_indent: default_output_indent(),
        }
    }
}

impl TypeSystemConfig {
    /// Reject values that would make the engine unusable.
    pub fn validate(&self) -> Result<()> {
        if self.max_conversion_depth == 0 {
            return Err(Error::Config(
                "max_conversion_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Metatype type system configuration
#
# Already-assigned ids are trusted: converting a stored reference skips
# field-by-field validation. Set to false to always re-validate.
trust_assigned_ids = true

# Maximum nesting of composite values during conversion (default: 64)
max_conversion_depth = 64

# Indent unit for rendering nested instances
output_indent = "  "
"#
    }

    /// Parse config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TypeSystemConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_toml_parses_to_default() {
        let config = TypeSystemConfig::from_toml_str(TypeSystemConfig::default_toml()).unwrap();
        assert_eq!(config, TypeSystemConfig::default());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = TypeSystemConfig::from_toml_str("").unwrap();
        assert!(config.trust_assigned_ids);
        assert_eq!(config.max_conversion_depth, 64);
        assert_eq!(config.output_indent, "  ");
    }

    #[test]
    fn zero_depth_is_rejected() {
        let err = TypeSystemConfig::from_toml_str("max_conversion_depth = 0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        let err = TypeSystemConfig::from_toml_str("trust_assigned_ids = maybe").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn write_default_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        std::fs::write(&path, "trust_assigned_ids = false\n").unwrap();
        TypeSystemConfig::write_default_if_missing(&path).unwrap();

        let config = TypeSystemConfig::from_file(&path).unwrap();
        assert!(!config.trust_assigned_ids);
    }

    #[test]
    fn write_to_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let config = TypeSystemConfig {
            trust_assigned_ids: false,
            max_conversion_depth: 8,
            output_indent: "\t".to_string(),
        };
        config.write_to_file(&path).unwrap();

        let loaded = TypeSystemConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        let err = TypeSystemConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
