//! X/Twitter API integration.
//!
//! `client` wraps the v2 endpoints on top of the shared HTTP helper, `oauth`
//! signs user-context requests with OAuth 1.0a, and `types` holds the wire
//! models. The [`Poster`] trait is the seam the publisher depends on.
pub mod client;
pub mod oauth;
pub mod types;

pub use client::{PostingAuth, Poster, TwitterApi};
pub use oauth::OAuthCredentials;
