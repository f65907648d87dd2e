//! Shared configuration used across the field guide crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::ConfigError;

/// Path of the TOML config file. Defaults to `config/fieldguide`.
pub const ENV_CONFIG_PATH: &str = "FIELDGUIDE_CONFIG";
/// Knowledge-base API secret. Required by every command that talks to the API.
pub const ENV_NOTION_KEY: &str = "NOTION_KEY";
/// Deployment base URL override for notebook links.
pub const ENV_BASE_URL: &str = "FIELDGUIDE_BASE_URL";
/// Shared-data cache location used by the notebooks.
pub const ENV_SHARED_DATA: &str = "SHARED_DATA";

const DEFAULT_CONFIG_PATH: &str = "config/fieldguide";
const ONLINE_RESOURCES_DATABASE_ID: &str = "b056be0b6f22499eb08c0d466c082686";
const SOFTWARE_TOOLS_DATABASE_ID: &str = "043e925d562a4d688d83fd8f6a2aad07";

/// Which tag columns of the software-tools table a filter matches against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMatchStrategy {
    /// Only the "Used for" column.
    UsedFor,
    /// A row matches when either "Used for" or "Keywords" matches.
    #[default]
    UsedForOrKeywords,
}

/// Global pipeline configuration. Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Site identity used in log lines.
    pub site_name: String,
    /// Directory scanned for notebooks.
    pub content_root: String,
    /// Glob (relative to `content_root`) selecting notebook files.
    pub notebook_glob: String,
    /// Knowledge-base API root, without trailing slash.
    pub api_base_url: String,
    /// Value sent in the `Notion-Version` header.
    pub notion_version: String,
    pub online_resources_database: String,
    pub software_tools_database: String,
    /// Upper bound for a single knowledge-base request.
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub tool_match: ToolMatchStrategy,
    /// Build output directory, relative to the repository root, holding the rendered pages.
    pub build_subdir: String,
    /// Path component separating the repository root from the book sources.
    pub path_marker: String,
    /// Prefix prepended to case-study image file names.
    pub image_prefix: String,
    pub image_width: u32,
    /// Deployment base URL. When unset, links point into the local build directory.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub shared_data_path: Option<String>,
}

impl CoreConfig {
    /// Load config from file and environment. Precedence: explicit env overrides >
    /// `FIELDGUIDE__*` env > file at `FIELDGUIDE_CONFIG` (or `config/fieldguide.toml`) > defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let config = Self::load_from(Path::new(&config_path))?;
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Defaults layered under the TOML file at `path` (with or without the `.toml` suffix) and
    /// `FIELDGUIDE__*` environment variables.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .set_default("site_name", "Field Guide")?
            .set_default("content_root", "src/sections")?
            .set_default("notebook_glob", "**/*.ipynb")?
            .set_default("api_base_url", "https://api.notion.com/v1")?
            .set_default("notion_version", "2022-06-28")?
            .set_default("online_resources_database", ONLINE_RESOURCES_DATABASE_ID)?
            .set_default("software_tools_database", SOFTWARE_TOOLS_DATABASE_ID)?
            .set_default("request_timeout_secs", 30_i64)?
            .set_default("tool_match", "used_for_or_keywords")?
            .set_default("build_subdir", "_build/html")?
            .set_default("path_marker", "src")?
            .set_default("image_prefix", "../_images/")?
            .set_default("image_width", 150_i64)?;

        let with_suffix = path.with_extension("toml");
        let builder = if path.is_file() {
            builder.add_source(config::File::from(path))
        } else if with_suffix.is_file() {
            builder.add_source(config::File::from(with_suffix.as_path()))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("FIELDGUIDE").separator("__"))
            .build()?;

        Ok(built.try_deserialize()?)
    }

    /// Applies the standalone environment overrides (`FIELDGUIDE_BASE_URL`, `SHARED_DATA`).
    /// Blank values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(base_url) = non_blank(ENV_BASE_URL) {
            self.base_url = Some(base_url);
        }
        if let Some(shared) = non_blank(ENV_SHARED_DATA) {
            self.shared_data_path = Some(shared);
        }
        self
    }
}

/// Credentials read from the environment at startup.
#[derive(Clone)]
pub struct Secrets {
    notion_key: String,
}

impl Secrets {
    /// Reads `NOTION_KEY`. A missing or blank key is a fatal configuration error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let notion_key = lookup(ENV_NOTION_KEY)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingSecret(ENV_NOTION_KEY))?;
        Ok(Self { notion_key })
    }

    pub fn notion_key(&self) -> &str {
        &self.notion_key
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets").field("notion_key", &"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::load_from(&dir.path().join("absent")).unwrap();
        assert_eq!(config.content_root, "src/sections");
        assert_eq!(config.notebook_glob, "**/*.ipynb");
        assert_eq!(config.notion_version, "2022-06-28");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.tool_match, ToolMatchStrategy::UsedForOrKeywords);
        assert_eq!(config.image_width, 150);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fieldguide.toml");
        std::fs::write(
            &path,
            "content_root = \"book/sections\"\ntool_match = \"used_for\"\nimage_width = 200\n",
        )
        .unwrap();
        let config = CoreConfig::load_from(&dir.path().join("fieldguide")).unwrap();
        assert_eq!(config.content_root, "book/sections");
        assert_eq!(config.tool_match, ToolMatchStrategy::UsedFor);
        assert_eq!(config.image_width, 200);
    }

    #[test]
    fn env_overrides_set_base_url_and_shared_data() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::load_from(&dir.path().join("absent"))
            .unwrap()
            .with_overrides(lookup_from(&[
                (ENV_BASE_URL, "https://guide.example.org"),
                (ENV_SHARED_DATA, "  "),
            ]));
        assert_eq!(config.base_url.as_deref(), Some("https://guide.example.org"));
        assert!(config.shared_data_path.is_none());
    }

    #[test]
    fn missing_secret_is_a_configuration_error() {
        let err = Secrets::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(ENV_NOTION_KEY)));
    }

    #[test]
    fn secret_is_redacted_in_debug_output() {
        let secrets = Secrets::from_lookup(lookup_from(&[(ENV_NOTION_KEY, "secret_abc")])).unwrap();
        assert_eq!(secrets.notion_key(), "secret_abc");
        assert!(!format!("{:?}", secrets).contains("secret_abc"));
    }
}
