//! Text-generation integration for Threadcast.
//!
//! This crate exposes the [`traits::LlmClient`] interface the content
//! generator talks to and an OpenAI-compatible chat-completions
//! implementation. A missing credential is not an error here: [`client_from_key`]
//! simply returns `None` and the caller takes its template path.
//!
//! # Examples
//! ```no_run
//! use threadcast_llm::{client_from_key, DEFAULT_OPENAI_MODEL};
//!
//! # fn main() -> threadcast_common::Result<()> {
//! let client = client_from_key(None, DEFAULT_OPENAI_MODEL, threadcast_llm::openai::OPENAI_API_BASE)?;
//! assert!(client.is_none());
//! # Ok(())
//! # }
//! ```
pub mod openai;
pub mod traits;

use openai::OpenAiClient;
use std::sync::Arc;
use threadcast_common::Result;
use traits::LlmClient;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";

/// Build a client when an API key is configured; `Ok(None)` otherwise.
pub fn client_from_key(
    api_key: Option<&str>,
    model: &str,
    endpoint: &str,
) -> Result<Option<Arc<dyn LlmClient + Send + Sync + 'static>>> {
    let Some(key) = api_key.map(str::trim).filter(|k| !k.is_empty()) else {
        tracing::warn!("OpenAI API key not found, template-based generation will be used");
        return Ok(None);
    };
    let client = OpenAiClient::with_endpoint(key.to_string(), model.to_string(), endpoint)?;
    Ok(Some(Arc::new(client)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_disable_the_client() {
        assert!(client_from_key(Some("   "), DEFAULT_OPENAI_MODEL, openai::OPENAI_API_BASE)
            .unwrap()
            .is_none());
    }

    #[test]
    fn present_key_builds_a_client_for_the_model() {
        let client = client_from_key(Some("sk-test"), "gpt-4o-mini", openai::OPENAI_API_BASE)
            .unwrap()
            .expect("client");
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn malformed_endpoint_is_a_config_error() {
        let err = client_from_key(Some("sk-test"), DEFAULT_OPENAI_MODEL, "not a url")
            .err()
            .expect("error");
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
