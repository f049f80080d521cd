use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Loaded from `config.toml` in the platform config dir. Every field has a
/// default, so a missing file or a partial one both work.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub expiry: ExpiryConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Load config from default location, defaults if it doesn't exist
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path, defaults if it doesn't exist
    pub fn load_from(config_path: &Path) -> crate::Result<Self> {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            config.notifications.lead_interval()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, config_path: &Path) -> crate::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, contents)?;
        Ok(())
    }

    /// Database file, falling back to the platform data dir
    pub fn db_path(&self) -> crate::Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::data_dir()?.join("freshnyam.db")),
        }
    }

    /// Get the config file path
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("freshnyam");

        Ok(config_dir.join("config.toml"))
    }

    fn data_dir() -> crate::Result<PathBuf> {
        Ok(dirs::data_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
            .join("freshnyam"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// SQLite database holding items, categories and the view mode
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Minutes before expiry the reminder fires
    #[serde(default = "default_lead_minutes")]
    pub lead_minutes: i64,

    #[serde(default = "default_title")]
    pub title: String,

    /// `{name}` is replaced with the item name
    #[serde(default = "default_body_template")]
    pub body_template: String,
}

impl NotificationConfig {
    /// How long before expiry a reminder should fire
    pub fn lead_interval(&self) -> crate::Result<chrono::Duration> {
        chrono::Duration::try_minutes(self.lead_minutes).ok_or_else(|| {
            crate::Error::ConfigError(format!(
                "lead_minutes {} is out of range",
                self.lead_minutes
            ))
        })
    }
}

pub(crate) fn default_lead_minutes() -> i64 {
    24 * 60
}

fn default_title() -> String {
    "Expiry reminder".to_string()
}

fn default_body_template() -> String {
    "{name} is about to expire.".to_string()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            lead_minutes: default_lead_minutes(),
            title: default_title(),
            body_template: default_body_template(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpiryConfig {
    /// Items this many days or fewer from expiry count as expiring soon
    #[serde(default = "default_soon_threshold")]
    pub soon_threshold_days: i64,
}

fn default_soon_threshold() -> i64 {
    3
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            soon_threshold_days: default_soon_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExportConfig {
    /// Where exports land when no path is given
    pub directory: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.notifications.lead_minutes, 1440);
        assert_eq!(
            config.notifications.lead_interval().unwrap(),
            chrono::Duration::days(1)
        );
        assert_eq!(config.expiry.soon_threshold_days, 3);
        assert!(config.storage.db_path.is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
[notifications]
lead_minutes = 1
"#,
        )
        .unwrap();

        assert_eq!(
            config.notifications.lead_interval().unwrap(),
            chrono::Duration::minutes(1)
        );
        assert_eq!(config.notifications.title, "Expiry reminder");
        assert_eq!(config.expiry.soon_threshold_days, 3);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.storage.db_path = Some(temp_dir.path().join("items.db"));
        config.notifications.lead_minutes = 90;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.notifications.lead_minutes, 90);
        assert_eq!(loaded.db_path().unwrap(), temp_dir.path().join("items.db"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.notifications.lead_minutes, 1440);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "notifications = 12").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(crate::Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_out_of_range_lead_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[notifications]\nlead_minutes = 9000000000000000\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(crate::Error::ConfigError(_))
        ));
    }
}
