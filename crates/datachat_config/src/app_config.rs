use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{GenerationConfig, HttpConfig};

/// Embedded defaults, overridden by `DATACHAT_*` environment variables.
const DEFAULT_CONFIG: &str = include_str!("../env.json");

/// Fallback variable for the oracle credential when `DATACHAT_API_KEY` is not
/// set.
const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Setters)]
#[serde(rename_all = "snake_case")]
#[setters(into)]
/// Runtime configuration of the data chat pipeline.
pub struct DataChatConfig {
    /// Model identifier passed to the oracle
    pub model: String,
    /// Base URL of the oracle's REST API, ending with a slash
    pub api_url: Url,
    /// Credential for the oracle
    #[serde(default)]
    #[setters(strip_option)]
    pub api_key: Option<String>,
    /// Name under which the uploaded dataset is queryable
    pub table_name: String,
    /// Upper bound in seconds for a single oracle round-trip
    pub oracle_timeout_secs: u64,
    /// Sampling parameters for free-text calls
    pub generation: GenerationConfig,
    /// Sampling parameters for the intent classifier
    pub intent_generation: GenerationConfig,
    /// Http configuration
    pub http: HttpConfig,
}

impl Default for DataChatConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_url: Url::parse("https://generativelanguage.googleapis.com/v1beta/")
                .expect("default api url is valid"),
            api_key: None,
            table_name: "data_table".to_string(),
            oracle_timeout_secs: 120,
            generation: GenerationConfig::default(),
            intent_generation: GenerationConfig::classification(),
            http: HttpConfig::default(),
        }
    }
}

impl DataChatConfig {
    /// Loads the configuration for the current working directory.
    ///
    /// Sources in order of precedence (lowest first):
    /// 1. Embedded JSON defaults (`env.json`)
    /// 2. `.env` files from the filesystem root down to the working directory
    /// 3. Process environment variables prefixed with `DATACHAT_`
    ///
    /// Nested keys use a double underscore, for example
    /// `DATACHAT_GENERATION__TEMPERATURE=0.1` or
    /// `DATACHAT_INTENT_GENERATION__MAX_OUTPUT_TOKENS=16`. When no
    /// `DATACHAT_API_KEY` is set, `GEMINI_API_KEY` is used.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let cwd = std::env::current_dir().unwrap_or(PathBuf::from("."));
        load_dotenv(&cwd);

        let mut config = Self::build(Self::environment())?;
        if config.api_key.is_none() {
            config.api_key = std::env::var(GEMINI_API_KEY).ok();
        }
        Ok(config)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("DATACHAT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn build(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Json,
            ))
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }
}

/// Load all `.env` files with priority to lower (closer) files.
fn load_dotenv(cwd: &Path) {
    let mut paths = vec![];
    let mut current = PathBuf::new();

    for component in cwd.components() {
        current.push(component);
        paths.push(current.clone());
    }

    // dotenvy never overrides a variable that is already set, so the closest
    // file has to be loaded first.
    paths.reverse();

    for path in paths {
        let env_file = path.join(".env");
        if env_file.is_file() {
            debug!(path = %env_file.display(), "Loading environment file");
            dotenvy::from_path(&env_file).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn environment(vars: &[(&str, &str)]) -> config::Environment {
        let mut map = config::Map::new();
        for (key, value) in vars {
            map.insert(key.to_string(), value.to_string());
        }
        DataChatConfig::environment().source(Some(map))
    }

    #[test]
    fn test_embedded_defaults_match_default_impl() {
        let actual = DataChatConfig::build(environment(&[])).unwrap();
        let expected = DataChatConfig::default();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_default_model_supports_json_schema_responses() {
        let actual = DataChatConfig::build(environment(&[])).unwrap();
        assert_eq!(actual.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_environment_overrides_top_level_keys() {
        let fixture = environment(&[
            ("DATACHAT_MODEL", "gemini-2.0-flash"),
            ("DATACHAT_TABLE_NAME", "sales"),
            ("DATACHAT_ORACLE_TIMEOUT_SECS", "15"),
        ]);

        let actual = DataChatConfig::build(fixture).unwrap();

        assert_eq!(actual.model, "gemini-2.0-flash");
        assert_eq!(actual.table_name, "sales");
        assert_eq!(actual.oracle_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_environment_overrides_nested_generation_keys() {
        let fixture = environment(&[
            ("DATACHAT_GENERATION__TEMPERATURE", "0.7"),
            ("DATACHAT_INTENT_GENERATION__MAX_OUTPUT_TOKENS", "16"),
        ]);

        let actual = DataChatConfig::build(fixture).unwrap();

        assert_eq!(actual.generation.temperature, 0.7);
        assert_eq!(actual.generation.max_output_tokens, 8192);
        assert_eq!(actual.intent_generation.max_output_tokens, 16);
    }

    #[test]
    fn test_load_dotenv_reads_closest_file_first() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("project");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            root.path().join(".env"),
            "DATACHAT_TEST_DOTENV_ORDER=outer\nDATACHAT_TEST_DOTENV_OUTER=1\n",
        )
        .unwrap();
        std::fs::write(nested.join(".env"), "DATACHAT_TEST_DOTENV_ORDER=inner\n").unwrap();

        load_dotenv(&nested);

        assert_eq!(std::env::var("DATACHAT_TEST_DOTENV_ORDER").unwrap(), "inner");
        assert_eq!(std::env::var("DATACHAT_TEST_DOTENV_OUTER").unwrap(), "1");
    }
}
