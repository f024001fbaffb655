use std::path::{Path, PathBuf};
use std::time::Duration;

use recorder::RetryPolicy;
use serde::{Deserialize, Serialize};

use crate::SimulationError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/v1/chat/completions";
pub const ENDPOINT_VAR: &str = "HAVENWOOD_ENDPOINT";
pub const MODEL_VAR: &str = "HAVENWOOD_MODEL";
pub const API_KEY_VAR: &str = "HAVENWOOD_API_KEY";

/// What happens to a round when the generator fails or times out.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and use the placeholder line as the utterance.
    #[default]
    Placeholder,
    /// Stop the round with `SimulationError::Generation`.
    Abort,
}

/// Knobs for a single night or day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundSettings {
    /// Passes over the living wolves before the werewolves give up on agreeing.
    pub whisper_rounds: usize,
    /// Also show wolf whispers on the public channel.
    pub reveal_whispers: bool,
    pub failure_policy: FailurePolicy,
    pub timeout_ms: u64,
    pub max_sentences: Option<usize>,
    pub strip_commas: bool,
    pub placeholder: String,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            whisper_rounds: 4,
            reveal_whispers: false,
            failure_policy: FailurePolicy::Placeholder,
            timeout_ms: 60_000,
            max_sentences: None,
            strip_commas: false,
            placeholder: "…".to_string(),
        }
    }
}

impl RoundSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// The YAML configuration file. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub seed: Option<u64>,
    pub rounds: Option<u32>,
    pub delay_ms: Option<u64>,
    pub transcript: Option<PathBuf>,
    pub retry: RetryPolicy,
    pub round: RoundSettings,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, SimulationError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SimulationError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, SimulationError> {
        serde_yaml::from_str(contents).map_err(|e| SimulationError::Config(e.to_string()))
    }
}

/// Values given on the command line. They win over everything else.
#[derive(Clone, Debug, Default)]
pub struct CliOverrides {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub seed: Option<u64>,
    pub rounds: Option<u32>,
    pub delay_ms: Option<u64>,
    pub reveal_whispers: bool,
    pub transcript: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationConfig {
    pub endpoint: String,
    pub model: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub seed: Option<u64>,
    pub max_rounds: Option<u32>,
    pub delay_ms: Option<u64>,
    pub transcript: Option<PathBuf>,
    pub retry: RetryPolicy,
    pub round: RoundSettings,
}

impl SimulationConfig {
    /// Resolves each setting from the command line, then the environment, then the
    /// YAML file, then the built-in default.
    pub fn from_cli_or_env_or_yaml(cli: CliOverrides, yaml: Option<FileConfig>) -> Self {
        Self::resolve(cli, yaml, |key| std::env::var(key).ok())
    }

    pub fn resolve(
        cli: CliOverrides,
        yaml: Option<FileConfig>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let file = yaml.unwrap_or_default();

        let endpoint = if let Some(arg) = cli.endpoint {
            arg
        } else if let Some(var) = env(ENDPOINT_VAR) {
            var
        } else if let Some(yaml) = file.endpoint {
            yaml
        } else {
            DEFAULT_ENDPOINT.to_string()
        };
        let model = cli.model.or_else(|| env(MODEL_VAR)).or(file.model);
        let api_key = env(API_KEY_VAR).or(file.api_key);

        let mut round = file.round;
        round.reveal_whispers |= cli.reveal_whispers;

        Self {
            endpoint,
            model,
            api_key,
            seed: cli.seed.or(file.seed),
            max_rounds: cli.rounds.or(file.rounds),
            delay_ms: cli.delay_ms.or(file.delay_ms),
            transcript: cli.transcript.or(file.transcript),
            retry: file.retry,
            round,
        }
    }

    /// Timeout for a single HTTP attempt. The turn timeout is split across the first
    /// attempt and every retry, so a retry can still finish before the turn gives up.
    pub fn attempt_timeout(&self) -> Duration {
        let attempts = u32::try_from(self.retry.max_retries.saturating_add(1)).unwrap_or(u32::MAX);
        self.round.timeout() / attempts
    }
}
