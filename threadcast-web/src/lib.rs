//! Topic discovery for Threadcast.
//!
//! - Page fetch + CSS-selector extraction of headline snippets (`extract`)
//! - The [`topics::TopicSource`] seam and its scraping implementation (`topics`)
//!
//! A source that cannot be fetched or parsed is skipped; when every source
//! comes back empty the built-in topic list is used instead.

pub mod extract;
pub mod topics;

pub use topics::{FALLBACK_TOPICS, PageSource, TopicScraper, TopicSource};
