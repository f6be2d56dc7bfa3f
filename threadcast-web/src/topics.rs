use crate::extract::extract_snippets;
use async_trait::async_trait;
use std::time::Duration;
use threadcast_common::{Result, ThreadcastError};
use threadcast_http::{HttpClient, RequestOpts};
use url::Url;

/// Used when no configured source produced a single topic.
pub const FALLBACK_TOPICS: [&str; 8] = [
    "Large Language Models and their applications",
    "AI in healthcare advancements",
    "Ethical considerations in AI development",
    "Computer vision breakthroughs",
    "AI for climate change solutions",
    "Multimodal AI systems",
    "Reinforcement learning from human feedback",
    "AI alignment research progress",
];

const PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Supplies candidate topics. Never fails and never returns an empty list.
#[async_trait]
pub trait TopicSource: Send + Sync {
    async fn topics(&self) -> Vec<String>;
}

/// One page to scrape and how to pull snippets out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSource {
    pub name: String,
    pub url: String,
    pub selector: String,
    pub strip_prefix: Option<String>,
    pub limit: usize,
}

impl PageSource {
    /// Recent papers in arXiv's cs.AI listing.
    pub fn arxiv() -> Self {
        Self {
            name: "arxiv".into(),
            url: "https://arxiv.org/list/cs.AI/recent".into(),
            selector: "div.list-title".into(),
            strip_prefix: Some("Title:".into()),
            limit: 5,
        }
    }

    /// TechCrunch's AI category headlines.
    pub fn techcrunch() -> Self {
        Self {
            name: "techcrunch".into(),
            url: "https://techcrunch.com/category/artificial-intelligence/".into(),
            selector: "h2.post-block__title a".into(),
            strip_prefix: None,
            limit: 5,
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::arxiv(), Self::techcrunch()]
    }
}

/// Scrapes every configured [`PageSource`] in order.
pub struct TopicScraper {
    sources: Vec<PageSource>,
}

impl TopicScraper {
    pub fn new(sources: Vec<PageSource>) -> Self {
        Self { sources }
    }

    async fn fetch(&self, source: &PageSource) -> Result<Vec<String>> {
        let url = Url::parse(&source.url)
            .map_err(|e| ThreadcastError::SourceFetch(format!("{}: {e}", source.url)))?;
        let http = HttpClient::new(&url.origin().ascii_serialization())
            .map_err(|e| ThreadcastError::SourceFetch(e.to_string()))?
            .with_timeout(PAGE_TIMEOUT);
        let html = http
            .get_text(url.as_str(), RequestOpts {
                allow_absolute: true,
                ..Default::default()
            })
            .await
            .map_err(|e| ThreadcastError::SourceFetch(e.to_string()))?;
        extract_snippets(
            &html,
            &source.selector,
            source.strip_prefix.as_deref(),
            source.limit,
        )
    }
}

#[async_trait]
impl TopicSource for TopicScraper {
    async fn topics(&self) -> Vec<String> {
        let mut topics = Vec::new();
        for source in &self.sources {
            match self.fetch(source).await {
                Ok(found) => {
                    tracing::debug!(source = %source.name, count = found.len(), "topics.source.ok");
                    topics.extend(found);
                }
                Err(e) => {
                    tracing::warn!(source = %source.name, error = %e, "topics.source.skipped");
                }
            }
        }

        if topics.is_empty() {
            tracing::info!("no topics scraped, using built-in list");
            return FALLBACK_TOPICS.iter().map(|t| t.to_string()).collect();
        }
        tracing::info!(count = topics.len(), "found trending AI topics");
        topics
    }
}
