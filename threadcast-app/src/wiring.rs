use std::sync::Arc;
use threadcast_agent::{
    Agent, ContentGenerator, Drafter, Publisher, ReplyDelay, SharedRandom, shared_random,
};
use threadcast_common::Result;
use threadcast_common::random::SystemRandom;
use threadcast_config::{AuthMode, Credentials, OpenAiCredentials, ThreadcastConfig};
use threadcast_llm::client_from_key;
use threadcast_llm::traits::LlmClient;
use threadcast_social::twitter::{OAuthCredentials, PostingAuth, TwitterApi};
use threadcast_web::{PageSource, TopicScraper};

/// Falls back to the built-in arXiv and TechCrunch pages when none are configured.
pub fn page_sources(cfg: &ThreadcastConfig) -> Vec<PageSource> {
    if cfg.topics.is_empty() {
        return PageSource::defaults();
    }
    cfg.topics
        .iter()
        .map(|t| PageSource {
            name: t.name.clone(),
            url: t.url.clone(),
            selector: t.selector.clone(),
            strip_prefix: t.strip_prefix.clone(),
            limit: t.limit,
        })
        .collect()
}

pub fn topic_scraper(cfg: &ThreadcastConfig) -> TopicScraper {
    TopicScraper::new(page_sources(cfg))
}

/// `None` when the credentials carry no OpenAI key.
pub fn llm_client(
    cfg: &ThreadcastConfig,
    openai: &OpenAiCredentials,
) -> Result<Option<Arc<dyn LlmClient + Send + Sync>>> {
    client_from_key(
        openai.api_key.as_deref(),
        &cfg.openai.model,
        &cfg.openai.endpoint,
    )
}

pub fn drafter(
    cfg: &ThreadcastConfig,
    openai: &OpenAiCredentials,
    rng: SharedRandom,
) -> Result<Drafter> {
    let generator = ContentGenerator::new(llm_client(cfg, openai)?, rng.clone())
        .with_temperature(cfg.openai.temperature);
    Ok(Drafter::new(Arc::new(topic_scraper(cfg)), generator, rng))
}

pub fn twitter_api(cfg: &ThreadcastConfig, creds: &Credentials) -> Result<TwitterApi> {
    let oauth = OAuthCredentials {
        consumer_key: creds.api_key.clone(),
        consumer_secret: creds.api_secret.clone(),
        access_token: creds.access_token.clone(),
        access_token_secret: creds.access_token_secret.clone(),
    };
    let posting = match cfg.twitter.auth_mode {
        AuthMode::OAuth1 => PostingAuth::OAuth1,
        AuthMode::Bearer => PostingAuth::Bearer,
    };
    Ok(TwitterApi::with_base_url(oauth, &cfg.twitter.base_url)?
        .with_bearer(creds.bearer_token.clone())
        .with_posting_auth(posting))
}

/// Validate credentials, verify them against the API and assemble the agent.
///
/// Any error here is a setup failure: nothing has been posted.
pub async fn connect(cfg: &ThreadcastConfig) -> Result<Agent> {
    let creds = Credentials::from_config(cfg)?;
    let twitter = twitter_api(cfg, &creds)?;
    let user = twitter.verify_credentials().await?;
    tracing::info!(username = %user.username, "authentication successful");

    let rng = shared_random(SystemRandom::new());
    let publisher = Publisher::new(Arc::new(twitter), rng.clone()).with_delay(ReplyDelay {
        min_secs: cfg.publish.reply_delay_min_secs,
        max_secs: cfg.publish.reply_delay_max_secs,
    });
    Ok(Agent::new(drafter(cfg, &creds.openai, rng)?, publisher))
}
