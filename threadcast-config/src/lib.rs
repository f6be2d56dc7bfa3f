//! Loader for Threadcast configuration: embedded defaults, an optional YAML
//! file and `THREADCAST_`-prefixed environment overrides, in that order of
//! precedence (later wins).
//!
//! String values may reference the environment as `${VAR}`. Placeholders are
//! expanded after the sources are merged; a value that is still a single
//! unresolved placeholder afterwards is treated as absent, which is how the
//! defaults pick up `TWITTER_API_KEY` and friends without requiring them.
//!
//! Overrides use `__` for nesting, e.g. `THREADCAST_SCHEDULE__EVERY_HOURS=6`
//! or `THREADCAST_OPENAI__MODEL=gpt-4o`.
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use threadcast_common::observability::{LogConfig, LogFormat};
use threadcast_common::{Result, ThreadcastError};

pub use config::ConfigError;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const DEFAULTS_YAML: &str = include_str!("../defaults.yaml");

/// Looked up in the working directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "threadcast.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadcastConfig {
    pub twitter: TwitterConfig,
    pub openai: OpenAiConfig,
    pub topics: Vec<TopicSourceConfig>,
    pub publish: PublishConfig,
    pub schedule: ScheduleConfig,
    pub log: LogSettings,
}

#[derive(Clone, Deserialize)]
pub struct TwitterConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
    pub bearer_token: Option<String>,
    pub base_url: String,
    #[serde(default)]
    pub auth_mode: AuthMode,
}

impl fmt::Debug for TwitterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitterConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("auth_mode", &self.auth_mode)
            .finish_non_exhaustive()
    }
}

/// How post requests are authenticated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    OAuth1,
    Bearer,
}

#[derive(Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// A page scraped for topic candidates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicSourceConfig {
    pub name: String,
    pub url: String,
    pub selector: String,
    #[serde(default)]
    pub strip_prefix: Option<String>,
    #[serde(default = "default_topic_limit")]
    pub limit: usize,
}

fn default_topic_limit() -> usize {
    5
}

/// Bounds of the uniform pause before each reply, in seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PublishConfig {
    pub reply_delay_min_secs: f64,
    pub reply_delay_max_secs: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScheduleConfig {
    pub every_hours: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub format: LogFormat,
    pub stderr: bool,
    pub filter: String,
}

impl ThreadcastConfig {
    /// Logging settings for [`threadcast_common::observability::init_logging`].
    pub fn log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.log.dir.clone(),
            emit_stderr: self.log.stderr,
            format: self.log.format,
            default_filter: self.log.filter.clone(),
        }
    }
}

/// The validated secrets every entry point shares. Built once, never mutated.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
    pub bearer_token: Option<String>,
    pub openai: OpenAiCredentials,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("bearer_token", &self.bearer_token.is_some())
            .field("openai", &self.openai)
            .finish_non_exhaustive()
    }
}

/// The text-generation key on its own, for commands that never post.
///
/// Never fails: an absent key selects template generation.
#[derive(Clone, Default)]
pub struct OpenAiCredentials {
    pub api_key: Option<String>,
}

impl OpenAiCredentials {
    pub fn from_config(cfg: &ThreadcastConfig) -> Self {
        Self {
            api_key: present(&cfg.openai.api_key),
        }
    }
}

impl fmt::Debug for OpenAiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCredentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Check that the posting credentials are present.
    ///
    /// Every missing value is reported at once, by its environment variable
    /// name. Blank strings count as missing.
    pub fn from_config(cfg: &ThreadcastConfig) -> Result<Self> {
        let tw = &cfg.twitter;
        let mut missing = Vec::new();
        let mut require = |value: &Option<String>, var: &'static str| match present(value) {
            Some(v) => v,
            None => {
                missing.push(var);
                String::new()
            }
        };

        let api_key = require(&tw.api_key, "TWITTER_API_KEY");
        let api_secret = require(&tw.api_secret, "TWITTER_API_SECRET");
        let access_token = require(&tw.access_token, "TWITTER_ACCESS_TOKEN");
        let access_token_secret = require(&tw.access_token_secret, "TWITTER_ACCESS_TOKEN_SECRET");
        let bearer_token = if tw.auth_mode == AuthMode::Bearer {
            Some(require(&tw.bearer_token, "TWITTER_BEARER_TOKEN"))
        } else {
            present(&tw.bearer_token)
        };

        if !missing.is_empty() {
            return Err(ThreadcastError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            api_key,
            api_secret,
            access_token,
            access_token_secret,
            bearer_token,
            openai: OpenAiCredentials::from_config(cfg),
        })
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
    if v.as_str().is_some_and(is_bare_placeholder) {
        *v = Value::Null;
    }
}

/// `${NAME}` or `$NAME` and nothing else.
fn is_bare_placeholder(s: &str) -> bool {
    let name = match s.strip_prefix("${") {
        Some(rest) => match rest.strip_suffix('}') {
            Some(name) => name,
            None => return false,
        },
        None => match s.strip_prefix('$') {
            Some(name) => name,
            None => return false,
        },
    };
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Builder hiding the `config` crate wiring.
pub struct ConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Start from the embedded defaults.
    ///
    /// ```
    /// use threadcast_config::ConfigLoader;
    ///
    /// let cfg = ConfigLoader::new().load().expect("defaults load");
    /// assert_eq!(cfg.openai.model, "gpt-4");
    /// assert_eq!(cfg.topics.len(), 2);
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(File::from_str(DEFAULTS_YAML, FileFormat::Yaml));
        Self { builder }
    }

    /// Use `path` when given (it must exist), otherwise pick up
    /// [`DEFAULT_CONFIG_FILE`] from the working directory if there is one.
    pub fn discover(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::new().with_file(p),
            None => Self::new().with_optional_file(DEFAULT_CONFIG_FILE),
        }
    }

    /// Attach a required YAML/TOML/JSON file; format follows the suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use threadcast_config::ConfigLoader;
    ///
    /// let cfg = ConfigLoader::new()
    ///     .with_yaml_str("schedule:\n  every_hours: 6\n")
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(cfg.schedule.every_hours, 6);
    /// assert_eq!(cfg.publish.reply_delay_max_secs, 15.0);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Layer the environment on top, expand `${VAR}` placeholders and
    /// deserialize into [`ThreadcastConfig`].
    pub fn load(self) -> std::result::Result<ThreadcastConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("THREADCAST")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        // Re-wrap so the `config` deserializer can coerce env strings into numbers and bools.
        Config::try_from(&v)?.try_deserialize()
    }
}
