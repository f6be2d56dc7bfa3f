//! Turns a topic into a primary message plus follow-up replies.
//!
//! The text-generation service is asked for labelled lines (`TWEET:`,
//! `LINK:`, `COMMENT1:`..). Whatever goes wrong on the way (no credential,
//! transport error, unusable reply) ends in the template fallback rather
//! than an error.
use crate::format::{ensure_follow_up, format_message};
use crate::{with_rng, SharedRandom};
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use threadcast_llm::traits::LlmClient;

pub const PERSONA: &str =
    "You are a professional AI social media manager with expertise in finding relevant resources.";

pub const FALLBACK_LINK: &str = "https://arxiv.org/abs/2303.08774";

/// Follow-up used when a custom-topic generation falls back to the template.
pub const CUSTOM_FOLLOW_UP: &str =
    "I'd love to hear your perspectives on this! Share your thoughts below. 💬";

pub const MIN_FOLLOW_UPS: u32 = 1;
pub const MAX_FOLLOW_UPS: u32 = 3;

const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A generated thread. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedContent {
    pub primary_message: String,
    pub follow_ups: Vec<String>,
}

/// Which prompt family to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// Scraped AI topic; AI-specific prompt.
    Trending,
    /// Caller-supplied topic; general prompt.
    Custom,
}

impl PromptStyle {
    pub fn max_tokens(self) -> u32 {
        match self {
            PromptStyle::Trending => 500,
            PromptStyle::Custom => 400,
        }
    }

    fn fallback_follow_up(self) -> &'static str {
        match self {
            PromptStyle::Trending => crate::format::GENERIC_FOLLOW_UP,
            PromptStyle::Custom => CUSTOM_FOLLOW_UP,
        }
    }
}

pub fn template_message(topic: &str) -> String {
    format!("Interesting thoughts on {topic}. What's your take on this topic? #Discussion")
}

/// Instruction asking for `2 + follow_ups` labelled parts, ending with the
/// exact layout the reply must use.
pub fn build_prompt(topic: &str, follow_ups: u32, style: PromptStyle) -> String {
    let mut prompt = match style {
        PromptStyle::Trending => format!("Create a tweet about this AI topic: \"{topic}\".\n\n"),
        PromptStyle::Custom => format!("Create a tweet about this topic: \"{topic}\".\n\n"),
    };
    let _ = writeln!(
        prompt,
        "Your response should include {} parts, clearly separated:\n",
        follow_ups + 2
    );

    prompt.push_str(
        "1. TWEET: A concise, engaging tweet (under 240 characters) that is professional yet \
         conversational, has a call-to-action and reads like a person wrote it.\n",
    );
    match style {
        PromptStyle::Trending => prompt.push_str(
            "   Use relevant hashtags like #AI #MachineLearning and talk about the topic the way \
             you would with a close friend: short sentences, a casual question or two.\n",
        ),
        PromptStyle::Custom => {
            let _ = writeln!(
                prompt,
                "   Use relevant hashtags and a few emojis, keep a friendly tone and stay focused \
                 on \"{topic}\"."
            );
        }
    }
    prompt.push_str(
        "2. LINK: A specific, relevant URL to an article, research paper or resource about this \
         topic. It must be a real, working URL (e.g. https://example.com/article).\n",
    );
    for i in 1..=follow_ups {
        let purpose = match i {
            1 => "adds insight or asks an engaging question about the topic",
            2 => "adds a different piece of information or perspective",
            _ => "wraps up the thread by inviting opinions or discussion",
        };
        let _ = writeln!(
            prompt,
            "{}. COMMENT{i}: A brief follow-up reply (under 200 characters) that {purpose}.",
            i + 2
        );
    }

    prompt.push_str("\nFormat your response exactly like this:\n");
    prompt.push_str("TWEET: [your tweet text here]\n");
    prompt.push_str("LINK: [your relevant URL here]\n");
    for i in 1..=follow_ups {
        let _ = writeln!(prompt, "COMMENT{i}: [follow-up comment {i} here]");
    }
    prompt
}

/// Fields pulled out of a labelled reply. Missing labels stay empty.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub message: String,
    pub link: String,
    pub follow_ups: Vec<String>,
}

/// Read `TWEET:`, `LINK:` and `COMMENT1:`..`COMMENT{follow_ups}:` lines.
///
/// Leading indentation is ignored, other lines are skipped, a repeated label
/// keeps its last value and empty comments are dropped.
pub fn parse_response(raw: &str, follow_ups: u32) -> ParsedResponse {
    let comment_labels: Vec<String> = (1..=follow_ups).map(|i| format!("COMMENT{i}:")).collect();
    let mut comments: Vec<Option<String>> = vec![None; comment_labels.len()];
    let mut parsed = ParsedResponse::default();

    for line in raw.lines().map(str::trim_start) {
        if let Some(rest) = line.strip_prefix("TWEET:") {
            parsed.message = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("LINK:") {
            parsed.link = rest.trim().to_string();
        } else if let Some((slot, rest)) = comment_labels
            .iter()
            .enumerate()
            .find_map(|(i, label)| line.strip_prefix(label.as_str()).map(|rest| (i, rest)))
        {
            comments[slot] = Some(rest.trim().to_string());
        }
    }

    parsed.follow_ups = comments
        .into_iter()
        .flatten()
        .filter(|c| !c.is_empty())
        .collect();
    parsed
}

/// Keep links that look like URLs; anything else becomes [`FALLBACK_LINK`].
pub fn validate_link(link: &str) -> String {
    if link.starts_with("http") {
        link.to_string()
    } else {
        tracing::warn!(link, fallback = FALLBACK_LINK, "invalid link format, using fallback link");
        FALLBACK_LINK.to_string()
    }
}

pub struct ContentGenerator {
    llm: Option<Arc<dyn LlmClient + Send + Sync>>,
    rng: SharedRandom,
    temperature: f32,
}

impl ContentGenerator {
    /// `llm = None` means every call takes the template path.
    pub fn new(llm: Option<Arc<dyn LlmClient + Send + Sync>>, rng: SharedRandom) -> Self {
        Self {
            llm,
            rng,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Generate a formatted primary message and at least one follow-up.
    pub async fn generate(&self, topic: &str, style: PromptStyle) -> GeneratedContent {
        let follow_ups = with_rng(&self.rng, |rng| rng.int_in(MIN_FOLLOW_UPS, MAX_FOLLOW_UPS));

        let Some(llm) = &self.llm else {
            tracing::warn!(topic, "no text-generation client configured, using template");
            return self.fallback(topic, style);
        };

        let prompt = build_prompt(topic, follow_ups, style);
        let response = match llm
            .generate(
                &prompt,
                Some(PERSONA),
                Some(style.max_tokens()),
                Some(self.temperature),
            )
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(topic, error = %e, "generation failed, using template");
                return self.fallback(topic, style);
            }
        };

        let parsed = parse_response(&response.text, follow_ups);
        tracing::debug!(
            requested = follow_ups,
            parsed = parsed.follow_ups.len(),
            has_message = !parsed.message.is_empty(),
            "generator.parsed"
        );
        let link = validate_link(&parsed.link);
        let primary_message =
            with_rng(&self.rng, |rng| format_message(&parsed.message, &link, rng));

        GeneratedContent {
            primary_message,
            follow_ups: ensure_follow_up(parsed.follow_ups),
        }
    }

    fn fallback(&self, topic: &str, style: PromptStyle) -> GeneratedContent {
        GeneratedContent {
            primary_message: template_message(topic),
            follow_ups: vec![style.fallback_follow_up().to_string()],
        }
    }
}
