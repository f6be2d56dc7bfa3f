use crate::generator::{ContentGenerator, GeneratedContent, PromptStyle};
use crate::publish::{PublishReport, Publisher};
use crate::{with_rng, SharedRandom};
use std::sync::Arc;
use threadcast_web::TopicSource;

/// Follow-up posted under caller-supplied text.
pub const VERBATIM_FOLLOW_UP: &str = "What are your thoughts on this? Let's discuss! 💬";

/// Topic selection plus generation. Needs no social-network access.
pub struct Drafter {
    topics: Arc<dyn TopicSource>,
    generator: ContentGenerator,
    rng: SharedRandom,
}

impl Drafter {
    pub fn new(topics: Arc<dyn TopicSource>, generator: ContentGenerator, rng: SharedRandom) -> Self {
        Self {
            topics,
            generator,
            rng,
        }
    }

    pub async fn topics(&self) -> Vec<String> {
        self.topics.topics().await
    }

    /// A uniformly chosen trending topic.
    pub async fn pick_topic(&self) -> String {
        let topics = self.topics.topics().await;
        let index = with_rng(&self.rng, |rng| rng.pick_index(topics.len()));
        topics.into_iter().nth(index).unwrap_or_default()
    }

    /// A blank custom topic means "pick a trending one".
    pub async fn draft(&self, custom_topic: Option<&str>) -> GeneratedContent {
        match custom_topic.map(str::trim).filter(|t| !t.is_empty()) {
            Some(topic) => {
                tracing::info!(topic, "generating content for custom topic");
                self.generator.generate(topic, PromptStyle::Custom).await
            }
            None => {
                if custom_topic.is_some() {
                    tracing::warn!("no custom topic provided, using trending topics instead");
                }
                let topic = self.pick_topic().await;
                tracing::info!(topic = %topic, "generating content for trending topic");
                self.generator.generate(&topic, PromptStyle::Trending).await
            }
        }
    }
}

/// One topic, one generation, one publish pass per call.
pub struct Agent {
    drafter: Drafter,
    publisher: Publisher,
}

impl Agent {
    pub fn new(drafter: Drafter, publisher: Publisher) -> Self {
        Self { drafter, publisher }
    }

    pub async fn post_with_comments(&self, custom_topic: Option<&str>) -> PublishReport {
        let content = self.drafter.draft(custom_topic).await;
        self.publish(&content).await
    }

    /// Post `text` as-is with the fixed follow-up.
    pub async fn post_text(&self, text: &str) -> PublishReport {
        self.publisher
            .publish(text, &[VERBATIM_FOLLOW_UP.to_string()])
            .await
    }

    pub async fn publish(&self, content: &GeneratedContent) -> PublishReport {
        self.publisher
            .publish(&content.primary_message, &content.follow_ups)
            .await
    }
}
