//! Final shaping of the primary message.
//!
//! All lengths are counted in Unicode scalar values (`char`s).
use threadcast_common::random::RandomSource;

pub const MAX_MESSAGE_CHARS: usize = 280;

pub const CALL_TO_ACTION_PHRASES: [&str; 8] = [
    "Check this out: ",
    "Learn more here: ",
    "Read the full article: ",
    "Dive deeper: ",
    "More details here: ",
    "Fascinating read: ",
    "👉 ",
    "Explore this: ",
];

/// Phrases that already count as a call to action (matched case-insensitively).
const EXISTING_CALLS_TO_ACTION: [&str; 3] = ["check this", "check it out", "learn more"];

const ELLIPSIS: &str = "...";

/// Posted when generation produced no follow-ups.
pub const GENERIC_FOLLOW_UP: &str = "What do you think about this? Let me know in the replies! 💬";

pub fn has_call_to_action(message: &str) -> bool {
    let lower = message.to_lowercase();
    EXISTING_CALLS_TO_ACTION
        .iter()
        .any(|phrase| lower.contains(phrase))
}

/// Join `message` and `link`, adding a random call to action when the
/// message has none, and keep the result within [`MAX_MESSAGE_CHARS`].
pub fn format_message(message: &str, link: &str, rng: &mut dyn RandomSource) -> String {
    let call_to_action = if has_call_to_action(message) {
        ""
    } else {
        CALL_TO_ACTION_PHRASES[rng.pick_index(CALL_TO_ACTION_PHRASES.len())]
    };

    let budget = MAX_MESSAGE_CHARS
        .saturating_sub(link.chars().count())
        .saturating_sub(1)
        .saturating_sub(call_to_action.chars().count());
    let body = truncate_with_ellipsis(message, budget);

    let joined = format!("{body} {call_to_action}{link}").replace('"', "");
    match joined.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((cut, _)) => joined[..cut].to_string(),
        None => joined,
    }
}

fn truncate_with_ellipsis(message: &str, budget: usize) -> String {
    if message.chars().count() <= budget {
        return message.to_string();
    }
    let kept: String = message
        .chars()
        .take(budget.saturating_sub(ELLIPSIS.len()))
        .collect();
    kept + ELLIPSIS
}

/// Never hand the publisher an empty reply list.
pub fn ensure_follow_up(follow_ups: Vec<String>) -> Vec<String> {
    if follow_ups.is_empty() {
        vec![GENERIC_FOLLOW_UP.to_string()]
    } else {
        follow_ups
    }
}
