use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use super::{planning::Threshold, tools::Tools};

const DEFAULT_DECOMPOSE_URL: &str =
    "https://pixarron.app.n8n.cloud/webhook/231fad25-365f-4c57-b2b9-91777892977a";
const DEFAULT_PLAN_URL: &str =
    "https://pixarron.app.n8n.cloud/webhook/b07ea639-aa4d-42e8-9cf2-b2b4da0fb5a4";

/// Configuration of the planner.
///
/// Holds the workflow endpoints and the defaults a session starts with. The
/// configuration is injected when a session or client is built, so tests can
/// point it at fakes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Versions", into = "Versions")]
pub struct Config {
    /// Endpoint that decomposes a prompt into indicators.
    pub decompose_url: String,

    /// Endpoint that turns confirmed indicators into planning suggestions.
    pub plan_url: String,

    /// Similarity threshold applied when the user does not pick one.
    pub threshold: Threshold,

    /// How long to wait for the backend before giving up.
    ///
    /// Generations routinely take tens of seconds.
    pub timeout: Duration,

    /// Generation options a session starts with.
    pub tools: Tools,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decompose_url: DEFAULT_DECOMPOSE_URL.to_string(),
            plan_url: DEFAULT_PLAN_URL.to_string(),
            threshold: Threshold::DEFAULT,
            timeout: Duration::from_secs(default_timeout_secs()),
            tools: Tools::default(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        std::fs::write(path, self.to_toml()?)
            .map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))
    }
}

const fn default_timeout_secs() -> u64 {
    120
}

fn default_decompose_url() -> String {
    DEFAULT_DECOMPOSE_URL.to_string()
}

fn default_plan_url() -> String {
    DEFAULT_PLAN_URL.to_string()
}

const fn default_threshold() -> f64 {
    Threshold::DEFAULT.value()
}

/// The serialized versions of the configuration.
///
/// Keeps the file format independent of the domain type.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_decompose_url")]
        decompose_url: String,

        #[serde(default = "default_plan_url")]
        plan_url: String,

        /// Similarity threshold, as a fraction in `[0, 1]`.
        #[serde(default = "default_threshold")]
        threshold: f64,

        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,

        #[serde(default)]
        tools: Tools,
    },
}

impl TryFrom<Versions> for Config {
    type Error = String;

    fn try_from(versions: Versions) -> Result<Self, Self::Error> {
        match versions {
            Versions::V1 {
                decompose_url,
                plan_url,
                threshold,
                timeout_secs,
                tools,
            } => Ok(Self {
                decompose_url,
                plan_url,
                threshold: Threshold::new(threshold).map_err(|e| e.to_string())?,
                timeout: Duration::from_secs(timeout_secs),
                tools,
            }),
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            decompose_url: config.decompose_url,
            plan_url: config.plan_url,
            threshold: config.threshold.value(),
            timeout_secs: config.timeout.as_secs(),
            tools: config.tools,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::domain::tools::{Difficulty, IndicatorSize};

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            "_version = \"1\"\ndecompose_url = \"http://localhost:5678/decompose\"\nthreshold = 0.7\ntimeout_secs = 5\n\n[tools]\nresearch = true\nleveling = false\ndifficulty = \"escolar\"\nindicatorSize = \"integrador\"\n"
                .as_bytes(),
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.decompose_url, "http://localhost:5678/decompose");
        assert_eq!(config.plan_url, DEFAULT_PLAN_URL);
        assert_eq!(config.threshold.value(), 0.7);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(
            config.tools,
            Tools {
                research: true,
                leveling: false,
                difficulty: Difficulty::School,
                indicator_size: IndicatorSize::Integrative,
            }
        );
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(error.starts_with("Failed to read config file:"));
    }

    #[test]
    fn load_rejects_threshold_out_of_range() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nthreshold = 1.5\n").unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(error.starts_with("Failed to parse config file:"));
        assert!(error.contains("between 0 and 1"));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_config() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("planner.toml");
        let config = Config {
            plan_url: "http://localhost/plan".to_string(),
            threshold: Threshold::from_percent(45).unwrap(),
            ..Config::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
