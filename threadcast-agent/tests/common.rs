#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex, OnceLock};

use threadcast_agent::{shared_random, Agent, ContentGenerator, Drafter, Publisher, SharedRandom};
use threadcast_common::observability::{LogConfig, LogFormat};
use threadcast_common::random::ScriptedRandom;
use threadcast_common::{Result, ThreadcastError};
use threadcast_llm::traits::{LlmClient, LlmResponse};
use threadcast_social::twitter::Poster;
use threadcast_web::TopicSource;

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "threadcast-tests",
            log_dir: Some(std::env::temp_dir().join("threadcast-tests")),
            emit_stderr: true,
            format: LogFormat::Text,
            default_filter: "debug".to_string(),
        };
        threadcast_common::observability::init_logging(config).unwrap_or_default()
    });
}

/// Records every post and fails the `fail_on`-th call (0-based).
#[derive(Default)]
pub struct RecordingPoster {
    pub calls: Mutex<Vec<(String, Option<String>)>>,
    pub fail_on: Option<usize>,
}

impl RecordingPoster {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on: Some(call),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Poster for RecordingPoster {
    async fn post(&self, text: &str, in_reply_to: Option<&str>) -> Result<String> {
        let mut calls = self.calls.lock().unwrap();
        let n = calls.len();
        calls.push((text.to_string(), in_reply_to.map(str::to_string)));
        if self.fail_on == Some(n) {
            return Err(ThreadcastError::Posting("403 Forbidden: duplicate content".into()));
        }
        Ok(format!("{}", 1000 + n))
    }
}

/// Replies with a fixed text, or fails when `reply` is `None`.
pub struct ScriptedLlm {
    pub reply: Option<String>,
    pub seen: Mutex<Vec<(String, Option<String>, Option<u32>, Option<f32>)>>,
}

impl ScriptedLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        self.seen.lock().unwrap().push((
            prompt.to_string(),
            system_prompt.map(str::to_string),
            max_tokens,
            temperature,
        ));
        match &self.reply {
            Some(text) => Ok(LlmResponse {
                text: text.clone(),
                model: Some("scripted".into()),
                tokens_used: None,
            }),
            None => Err(ThreadcastError::Generation("connection refused".into())),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub struct StaticTopics(pub Vec<String>);

#[async_trait]
impl TopicSource for StaticTopics {
    async fn topics(&self) -> Vec<String> {
        self.0.clone()
    }
}

pub fn scripted(choices: &[usize], floats: &[f64]) -> SharedRandom {
    shared_random(
        ScriptedRandom::new()
            .with_choices(choices.iter().copied())
            .with_floats(floats.iter().copied()),
    )
}

pub fn agent_with(
    topics: Vec<&str>,
    llm: Option<Arc<ScriptedLlm>>,
    poster: Arc<RecordingPoster>,
    rng: SharedRandom,
) -> Agent {
    let llm = llm.map(|l| l as Arc<dyn LlmClient + Send + Sync>);
    let generator = ContentGenerator::new(llm, rng.clone());
    let publisher = Publisher::new(poster, rng.clone());
    let topics = Arc::new(StaticTopics(topics.into_iter().map(String::from).collect()));
    Agent::new(Drafter::new(topics, generator, rng), publisher)
}
