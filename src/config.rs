//! Application-level configuration loading: quiz content location, judging rules and tick pace.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::controller::{JudgingPolicy, WrongAnswerPolicy};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "BUZZ_QUIZ_CONFIG_PATH";
/// Default quiz content file, relative to the working directory.
const DEFAULT_CONTENT_PATH: &str = "quiz_data.json";
/// Environment variable that overrides the content path, config file included.
const CONTENT_PATH_ENV: &str = "BUZZ_QUIZ_CONTENT_PATH";
/// One countdown second.
const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Quiz content file.
    pub content_path: PathBuf,
    /// Judging rules handed to the game controller.
    pub judging: JudgingPolicy,
    /// Real-time length of one countdown tick.
    pub tick_interval: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        policy = ?app_config.judging.wrong_answer,
                        "loaded config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_content_override(env_path(CONTENT_PATH_ENV))
    }

    fn with_content_override(mut self, content_path: Option<PathBuf>) -> Self {
        if let Some(path) = content_path {
            self.content_path = path;
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// JSON spelling of [`WrongAnswerPolicy`].
enum RawWrongAnswerPolicy {
    #[default]
    Reveal,
    Reopen,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    content_path: String,
    wrong_answer_policy: RawWrongAnswerPolicy,
    allow_rebuzz_after_wrong: bool,
    tick_interval_ms: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            content_path: DEFAULT_CONTENT_PATH.into(),
            wrong_answer_policy: RawWrongAnswerPolicy::default(),
            allow_rebuzz_after_wrong: false,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl From<RawWrongAnswerPolicy> for WrongAnswerPolicy {
    fn from(value: RawWrongAnswerPolicy) -> Self {
        match value {
            RawWrongAnswerPolicy::Reveal => Self::Reveal,
            RawWrongAnswerPolicy::Reopen => Self::Reopen,
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            content_path: PathBuf::from(value.content_path),
            judging: JudgingPolicy {
                wrong_answer: value.wrong_answer_policy.into(),
                allow_rebuzz_after_wrong: value.allow_rebuzz_after_wrong,
            },
            // A zero interval would make the ticker spin.
            tick_interval: Duration::from_millis(value.tick_interval_ms.max(1)),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env_path(CONFIG_PATH_ENV).unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reveal_wrong_answers_every_second() {
        let config = AppConfig::default();
        assert_eq!(config.content_path, PathBuf::from("quiz_data.json"));
        assert_eq!(config.judging, JudgingPolicy::default());
        assert_eq!(config.judging.wrong_answer, WrongAnswerPolicy::Reveal);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"wrong_answer_policy":"reopen","tick_interval_ms":0}"#)
                .unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.judging.wrong_answer, WrongAnswerPolicy::Reopen);
        assert!(!config.judging.allow_rebuzz_after_wrong);
        assert_eq!(config.content_path, PathBuf::from("quiz_data.json"));
        assert_eq!(config.tick_interval, Duration::from_millis(1));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(serde_json::from_str::<RawConfig>(r#"{"wrong_answer_policy":"skip"}"#).is_err());
    }

    #[test]
    fn content_override_replaces_configured_path() {
        let config = AppConfig::default().with_content_override(Some("/srv/quiz.json".into()));
        assert_eq!(config.content_path, PathBuf::from("/srv/quiz.json"));

        let config = AppConfig::default().with_content_override(None);
        assert_eq!(config.content_path, PathBuf::from("quiz_data.json"));
    }
}
