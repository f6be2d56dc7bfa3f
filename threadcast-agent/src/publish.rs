use crate::{with_rng, SharedRandom};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use threadcast_social::twitter::Poster;

/// Bounds of the uniform pause before each reply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplyDelay {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl Default for ReplyDelay {
    fn default() -> Self {
        Self {
            min_secs: 5.0,
            max_secs: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum PublishStage {
    Primary,
    FollowUp { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishFailure {
    #[serde(flatten)]
    pub stage: PublishStage,
    pub message: String,
}

/// What got posted. Ids posted before a failure are kept; nothing is rolled back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    pub primary_id: Option<String>,
    pub follow_up_ids: Vec<String>,
    pub failure: Option<PublishFailure>,
}

impl PublishReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none() && self.primary_id.is_some()
    }
}

pub struct Publisher {
    poster: Arc<dyn Poster>,
    rng: SharedRandom,
    delay: ReplyDelay,
}

impl Publisher {
    pub fn new(poster: Arc<dyn Poster>, rng: SharedRandom) -> Self {
        Self {
            poster,
            rng,
            delay: ReplyDelay::default(),
        }
    }

    pub fn with_delay(mut self, delay: ReplyDelay) -> Self {
        self.delay = delay;
        self
    }

    /// Post `message`, then each follow-up as a reply to it.
    ///
    /// Stops at the first failure. If the primary post fails no reply is
    /// attempted.
    pub async fn publish(&self, message: &str, follow_ups: &[String]) -> PublishReport {
        let mut report = PublishReport::default();

        let primary_id = match self.poster.post(message, None).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(error = %e, "failed to post primary message");
                report.failure = Some(PublishFailure {
                    stage: PublishStage::Primary,
                    message: e.to_string(),
                });
                return report;
            }
        };
        tracing::info!(tweet_id = %primary_id, "primary message posted");
        report.primary_id = Some(primary_id.clone());

        for (index, follow_up) in follow_ups.iter().enumerate() {
            let pause = self.next_pause();
            tracing::debug!(index, pause_secs = pause.as_secs_f64(), "publish.pause");
            tokio::time::sleep(pause).await;

            match self.poster.post(follow_up, Some(&primary_id)).await {
                Ok(id) => {
                    tracing::info!(index, tweet_id = %id, "follow-up posted");
                    report.follow_up_ids.push(id);
                }
                Err(e) => {
                    tracing::error!(index, error = %e, "failed to post follow-up");
                    report.failure = Some(PublishFailure {
                        stage: PublishStage::FollowUp { index },
                        message: e.to_string(),
                    });
                    break;
                }
            }
        }
        report
    }

    fn next_pause(&self) -> Duration {
        let ReplyDelay { min_secs, max_secs } = self.delay;
        let secs = with_rng(&self.rng, |rng| rng.float_in(min_secs, max_secs));
        Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or_default()
    }
}
