//! Scene configuration
//!
//! File naming and logging settings for the scene registry. The binary entity
//! record layout itself is fixed and not configurable.

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};

/// Settings consumed by [`Scene`](crate::scene::Scene)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Extension carried by prefab files, including the leading dot
    pub prefab_extension: String,
    /// Extension carried by whole-scene files, including the leading dot
    pub scene_extension: String,
    /// `env_logger` filter used when the host initializes logging from this config
    pub log_filter: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            prefab_extension: ".prefab".to_string(),
            scene_extension: ".scene".to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl Config for SceneConfig {}

impl SceneConfig {
    /// Builder pattern: Set the prefab extension
    pub fn with_prefab_extension(mut self, extension: impl Into<String>) -> Self {
        self.prefab_extension = extension.into();
        self
    }

    /// Builder pattern: Set the scene extension
    pub fn with_scene_extension(mut self, extension: impl Into<String>) -> Self {
        self.scene_extension = extension.into();
        self
    }

    /// Builder pattern: Set the log filter
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, extension) in [
            ("prefab_extension", &self.prefab_extension),
            ("scene_extension", &self.scene_extension),
        ] {
            if extension.len() < 2 || !extension.starts_with('.') {
                return Err(ConfigError::Invalid(format!(
                    "{field} must start with '.' and name an extension, got {extension:?}"
                )));
            }
        }

        if self.prefab_extension.eq_ignore_ascii_case(&self.scene_extension) {
            return Err(ConfigError::Invalid(
                "prefab and scene files must use different extensions".to_string(),
            ));
        }

        Ok(())
    }

    /// Load from a `.toml` or `.ron` file and validate
    pub fn load_validated(path: &str) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_extensions() {
        let config = SceneConfig::default().with_prefab_extension("prefab");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = SceneConfig::default().with_scene_extension(".prefab");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_toml_and_ron_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let config = SceneConfig::default()
            .with_prefab_extension(".pfb")
            .with_log_filter("scene_engine=debug");

        for name in ["scene.toml", "scene.ron"] {
            let path = dir.path().join(name);
            let path = path.to_str().unwrap();
            config.save_to_file(path).unwrap();
            assert_eq!(SceneConfig::load_validated(path).unwrap(), config);
        }
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: SceneConfig = toml::from_str("log_filter = \"warn\"").unwrap();
        assert_eq!(config.prefab_extension, ".prefab");
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            SceneConfig::load_from_file("settings.ini"),
            Err(ConfigError::UnsupportedFormat(_)) | Err(ConfigError::Io(_))
        ));
    }
}
