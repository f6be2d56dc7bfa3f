//! The posting pipeline: pick a topic, generate a thread, format the primary
//! message and publish it with paced replies.
//!
//! - [`generator`]: prompt construction, response parsing, template fallback
//! - [`format`]: length budget, call-to-action and link handling
//! - [`publish`]: posts the primary message and its replies
//! - [`pipeline`]: [`pipeline::Drafter`] (topic + generation) and
//!   [`pipeline::Agent`] (drafter + publisher)
//! - [`invoke`]: the `{ status_code, body }` entry point
//! - [`schedule`]: repeats a cycle every N hours until interrupted
pub mod format;
pub mod generator;
pub mod invoke;
pub mod pipeline;
pub mod publish;
pub mod schedule;

use std::sync::{Arc, Mutex};
use threadcast_common::random::RandomSource;

pub use generator::{ContentGenerator, GeneratedContent, PromptStyle};
pub use invoke::{InvocationRequest, InvocationResponse, Task};
pub use pipeline::{Agent, Drafter};
pub use publish::{PublishFailure, PublishReport, PublishStage, Publisher, ReplyDelay};

/// One random source shared by every component of a run.
pub type SharedRandom = Arc<Mutex<dyn RandomSource>>;

pub fn shared_random<R: RandomSource + 'static>(rng: R) -> SharedRandom {
    Arc::new(Mutex::new(rng))
}

pub(crate) fn with_rng<T>(rng: &SharedRandom, f: impl FnOnce(&mut dyn RandomSource) -> T) -> T {
    let mut guard = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut *guard)
}
