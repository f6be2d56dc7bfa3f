mod common;

use common::{init_test_tracing, scripted, ScriptedLlm};
use std::sync::Arc;
use threadcast_agent::format::GENERIC_FOLLOW_UP;
use threadcast_agent::generator::{CUSTOM_FOLLOW_UP, FALLBACK_LINK, PERSONA};
use threadcast_agent::{ContentGenerator, PromptStyle};
use threadcast_llm::traits::LlmClient;

fn generator(llm: &Arc<ScriptedLlm>, choices: &[usize]) -> ContentGenerator {
    let llm: Arc<dyn LlmClient + Send + Sync> = llm.clone();
    ContentGenerator::new(Some(llm), scripted(choices, &[]))
}

#[tokio::test]
async fn full_reply_is_formatted_and_split() {
    init_test_tracing();
    let llm = Arc::new(ScriptedLlm::replying(
        "TWEET: \"Small\" models keep closing the gap 🤯 #AI\n\
         LINK: https://example.com/small-models\n\
         COMMENT1: Distillation does a lot of the work.\n\
         COMMENT2: Which benchmark do you trust?",
    ));
    // k = 1 + 1, then call-to-action index 3.
    let content = generator(&llm, &[1, 3])
        .generate("Small language models", PromptStyle::Trending)
        .await;

    assert_eq!(
        content.primary_message,
        "Small models keep closing the gap 🤯 #AI Dive deeper: https://example.com/small-models"
    );
    assert_eq!(
        content.follow_ups,
        vec!["Distillation does a lot of the work.", "Which benchmark do you trust?"]
    );

    let seen = llm.seen.lock().unwrap();
    let (prompt, system, max_tokens, temperature) = &seen[0];
    assert!(prompt.contains("\"Small language models\""));
    assert!(prompt.contains("include 4 parts"));
    assert_eq!(system.as_deref(), Some(PERSONA));
    assert_eq!(*max_tokens, Some(500));
    assert_eq!(*temperature, Some(0.7));
}

#[tokio::test]
async fn reply_without_link_uses_the_fallback_url() {
    init_test_tracing();
    let llm = Arc::new(ScriptedLlm::replying(
        "TWEET: Want to learn more about RLHF? #AI\nCOMMENT1: It is everywhere now.",
    ));
    let content = generator(&llm, &[0])
        .generate("Reinforcement learning from human feedback", PromptStyle::Trending)
        .await;
    assert_eq!(
        content.primary_message,
        format!("Want to learn more about RLHF? #AI {FALLBACK_LINK}")
    );
    assert_eq!(content.follow_ups, vec!["It is everywhere now."]);
}

#[tokio::test]
async fn reply_without_comments_is_backfilled() {
    init_test_tracing();
    let llm = Arc::new(ScriptedLlm::replying(
        "TWEET: Check this out #AI\nLINK: https://example.com/x",
    ));
    let content = generator(&llm, &[2])
        .generate("Computer vision breakthroughs", PromptStyle::Trending)
        .await;
    assert_eq!(content.primary_message, "Check this out #AI https://example.com/x");
    assert_eq!(content.follow_ups, vec![GENERIC_FOLLOW_UP]);
}

#[tokio::test]
async fn failing_service_degrades_to_the_template() {
    init_test_tracing();
    let llm = Arc::new(ScriptedLlm::failing());
    let content = generator(&llm, &[])
        .generate("Multimodal AI systems", PromptStyle::Trending)
        .await;
    assert_eq!(
        content.primary_message,
        "Interesting thoughts on Multimodal AI systems. What's your take on this topic? #Discussion"
    );
    assert_eq!(content.follow_ups, vec![GENERIC_FOLLOW_UP]);
    assert_eq!(llm.seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_client_degrades_to_the_template() {
    init_test_tracing();
    let generator = ContentGenerator::new(None, scripted(&[], &[]));
    let content = generator
        .generate("AI for climate change solutions", PromptStyle::Trending)
        .await;
    assert!(content.primary_message.starts_with("Interesting thoughts on AI for climate"));
    assert_eq!(content.follow_ups.len(), 1);
}

#[tokio::test]
async fn custom_topics_use_their_own_cap_and_fallback() {
    init_test_tracing();
    let ok = Arc::new(ScriptedLlm::replying("TWEET: hi\nLINK: https://example.com"));
    generator(&ok, &[])
        .generate("MCP as a USB-C port for AI apps", PromptStyle::Custom)
        .await;
    let seen = ok.seen.lock().unwrap();
    assert_eq!(seen[0].2, Some(400));
    assert!(seen[0].0.starts_with("Create a tweet about this topic:"));
    drop(seen);

    let failing = Arc::new(ScriptedLlm::failing());
    let content = generator(&failing, &[])
        .generate("MCP as a USB-C port for AI apps", PromptStyle::Custom)
        .await;
    assert_eq!(content.follow_ups, vec![CUSTOM_FOLLOW_UP]);
}
