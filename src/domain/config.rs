use std::{io, path::Path};

use serde::{Deserialize, Serialize};
use url::Url;

use super::query::SortField;

/// Client configuration.
///
/// Stored as TOML. The on-disk format is versioned so that the file layout
/// can change without breaking existing configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Root URL of the service; the jobs resource lives at `{base_url}/jobs`.
    base_url: Url,

    /// Number of jobs requested per page.
    page_limit: u32,

    /// Per-request timeout, in seconds.
    timeout_secs: u64,

    /// Sort applied to listings unless overridden.
    pub default_sort: SortField,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_limit: default_page_limit(),
            timeout_secs: default_timeout_secs(),
            default_sort: SortField::default(),
        }
    }
}

impl Config {
    /// Keys accepted by [`Config::get`] and [`Config::set`].
    pub const KEYS: [&'static str; 4] = ["base_url", "page_limit", "timeout_secs", "default_sort"];

    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Read)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads the configuration, falling back to defaults if the file does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Read(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(ConfigError::Write)
    }

    /// The service root URL. Always ends in `/`.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sets the service root URL.
    pub fn set_base_url(&mut self, url: Url) {
        self.base_url = with_trailing_slash(url);
    }

    /// Number of jobs requested per page.
    #[must_use]
    pub const fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// Per-request timeout, in seconds.
    #[must_use]
    pub const fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Returns a configuration value by key, formatted for display.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "base_url" => Some(self.base_url.to_string()),
            "page_limit" => Some(self.page_limit.to_string()),
            "timeout_secs" => Some(self.timeout_secs.to_string()),
            "default_sort" => Some(self.default_sort.to_string()),
            _ => None,
        }
    }

    /// Sets a configuration value by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// for that key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            reason,
        };

        match key {
            "base_url" => {
                let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
                if url.cannot_be_a_base() {
                    return Err(invalid("URL cannot be used as a base".to_string()));
                }
                self.set_base_url(url);
            }
            "page_limit" => {
                self.page_limit = match value.parse::<u32>() {
                    Ok(0) => return Err(invalid("must be at least 1".to_string())),
                    Ok(n) => n,
                    Err(e) => return Err(invalid(e.to_string())),
                };
            }
            "timeout_secs" => {
                self.timeout_secs = match value.parse::<u64>() {
                    Ok(0) => return Err(invalid("must be at least 1".to_string())),
                    Ok(n) => n,
                    Err(e) => return Err(invalid(e.to_string())),
                };
            }
            "default_sort" => {
                self.default_sort = value
                    .parse::<SortField>()
                    .map_err(|e| invalid(e.to_string()))?;
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

/// Errors from loading, saving or editing a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    Read(#[source] io::Error),
    /// The config file could not be written.
    #[error("failed to write config file: {0}")]
    Write(#[source] io::Error),
    /// The config file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// No configuration key with this name exists.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
    /// The value is not valid for the key.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// The key being set.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
}

fn default_base_url() -> Url {
    Url::parse("http://localhost:5000/").expect("default URL is valid")
}

const fn default_page_limit() -> u32 {
    20
}

const fn default_timeout_secs() -> u64 {
    10
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_base_url")]
        base_url: Url,

        #[serde(default = "default_page_limit")]
        page_limit: u32,

        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,

        #[serde(default)]
        default_sort: SortField,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                base_url,
                page_limit,
                timeout_secs,
                default_sort,
            } => Self {
                base_url: with_trailing_slash(base_url),
                page_limit: page_limit.max(1),
                timeout_secs: timeout_secs.max(1),
                default_sort,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            base_url: config.base_url,
            page_limit: config.page_limit,
            timeout_secs: config.timeout_secs,
            default_sort: config.default_sort,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use test_case::test_case;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nbase_url = \"https://jobs.example.com/api\"\npage_limit = 50\ntimeout_secs = 3\ndefault_sort = \"posting_date\"\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.base_url().as_str(), "https://jobs.example.com/api/");
        assert_eq!(config.page_limit(), 50);
        assert_eq!(config.timeout_secs(), 3);
        assert_eq!(config.default_sort, SortField::PostingDate);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.to_string().starts_with("failed to read config file:"));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        assert_eq!(Config::load_or_default(&missing).unwrap(), Config::default());
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\npage_limit = \"twenty\"\n")
            .unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("jobs.toml");

        let mut config = Config::default();
        config.set("page_limit", "5").unwrap();
        config.set("default_sort", "company").unwrap();
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn set_base_url_normalizes_trailing_slash() {
        let mut config = Config::default();
        config.set("base_url", "http://example.com/v2").unwrap();

        assert_eq!(config.get("base_url").unwrap(), "http://example.com/v2/");
    }

    #[test_case("page_limit", "0"; "zero page limit")]
    #[test_case("page_limit", "many"; "non-numeric page limit")]
    #[test_case("timeout_secs", "-1"; "negative timeout")]
    #[test_case("default_sort", "salary"; "unknown sort")]
    #[test_case("base_url", "not a url"; "malformed url")]
    fn set_rejects_invalid_values(key: &str, value: &str) {
        let mut config = Config::default();

        let error = config.set(key, value).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidValue { .. }));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let mut config = Config::default();

        assert!(matches!(
            config.set("colour", "blue"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert_eq!(config.get("colour"), None);
    }
}
