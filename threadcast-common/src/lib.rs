//! Common types and utilities shared across Threadcast crates.
//!
//! This crate defines the shared error type, the randomness seam used by
//! every component that makes a random choice, and the observability
//! helpers that binaries call once at startup. It stays small so that all
//! crates can depend on it without pulling in heavy transitive costs.
//!
//! # Overview
//!
//! - [`ThreadcastError`] and [`Result`]: Shared error handling
//! - [`random`]: The [`random::RandomSource`] trait, a system-backed source
//!   and a scripted source for deterministic tests
//! - [`observability`]: Centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use threadcast_common::random::{RandomSource, ScriptedRandom};
//!
//! let mut rng = ScriptedRandom::new().with_choices([2]);
//! assert_eq!(rng.pick_index(8), 2);
//! ```

pub mod observability;
pub mod random;

/// Error types used across the Threadcast system.
///
/// The variants follow the failure taxonomy of a posting run: only
/// [`ThreadcastError::Authentication`] and [`ThreadcastError::Posting`] reach
/// callers in practice, the rest are recovered close to where they happen.
#[derive(thiserror::Error, Debug)]
pub enum ThreadcastError {
    /// Social-network credentials were rejected.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A topic source could not be fetched or parsed.
    #[error("Source fetch failed: {0}")]
    SourceFetch(String),

    /// The text-generation service failed or returned something unusable.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// A post or reply could not be created.
    #[error("Posting failed: {0}")]
    Posting(String),

    /// Transport-level failure reported by the HTTP helper.
    #[error("HTTP error: {0}")]
    Http(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenient alias for results that use [`ThreadcastError`].
pub type Result<T> = std::result::Result<T, ThreadcastError>;
