use serde_json::json;
use threadcast_common::ThreadcastError;
use threadcast_social::twitter::{OAuthCredentials, PostingAuth, Poster, TwitterApi};
use wiremock::matchers::{body_json, header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> OAuthCredentials {
    OAuthCredentials {
        consumer_key: "ck".into(),
        consumer_secret: "cs".into(),
        access_token: "at".into(),
        access_token_secret: "ats".into(),
    }
}

fn api_for(server: &MockServer) -> TwitterApi {
    TwitterApi::with_base_url(credentials(), &server.uri()).expect("api")
}

#[tokio::test]
async fn root_post_is_signed_with_oauth1() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(header_regex(
            "authorization",
            r#"^OAuth oauth_consumer_key="ck", oauth_nonce="[A-Za-z0-9]{32}", oauth_signature="[^"]+", oauth_signature_method="HMAC-SHA1", oauth_timestamp="\d+", oauth_token="at", oauth_version="1.0"$"#,
        ))
        .and(body_json(json!({ "text": "Big news in AI" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "1001", "text": "Big news in AI" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = api_for(&server)
        .post("Big news in AI", None)
        .await
        .expect("posted");
    assert_eq!(id, "1001");
}

#[tokio::test]
async fn replies_reference_their_parent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(body_json(json!({
            "text": "What do you think?",
            "reply": { "in_reply_to_tweet_id": "1001" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "1002", "text": "What do you think?" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let id = api_for(&server)
        .create_tweet("What do you think?", Some("1001"))
        .await
        .expect("reply posted");
    assert_eq!(id, "1002");
}

#[tokio::test]
async fn rejected_posts_are_posting_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "You are not allowed to create a Tweet with duplicate content.",
            "title": "Forbidden",
            "status": 403
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = api_for(&server).post("dup", None).await.unwrap_err();
    match err {
        ThreadcastError::Posting(msg) => assert!(msg.contains("duplicate content"), "{msg}"),
        other => panic!("expected posting failure, got {other:?}"),
    }
}

#[tokio::test]
async fn bad_credentials_fail_verification() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "title": "Unauthorized",
            "detail": "Unauthorized",
            "status": 401
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = api_for(&server).verify_credentials().await.unwrap_err();
    assert!(matches!(err, ThreadcastError::Authentication(_)), "{err:?}");
}

#[tokio::test]
async fn verification_returns_the_account() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": "42", "username": "ai_news_bot", "name": "AI News" }
        })))
        .mount(&server)
        .await;

    let me = api_for(&server).verify_credentials().await.expect("verified");
    assert_eq!(me.username, "ai_news_bot");
}

#[tokio::test]
async fn bearer_path_uses_the_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(header("authorization", "Bearer bt-123"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "id": "2001", "text": "hi" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server)
        .with_bearer(Some("bt-123".into()))
        .with_posting_auth(PostingAuth::Bearer);
    assert_eq!(api.post("hi", None).await.expect("posted"), "2001");
}

#[tokio::test]
async fn bearer_path_without_token_is_a_config_error() {
    let server = MockServer::start().await;
    let api = api_for(&server)
        .with_bearer(Some("  ".into()))
        .with_posting_auth(PostingAuth::Bearer);
    let err = api.post("hi", None).await.unwrap_err();
    assert!(matches!(err, ThreadcastError::Config(_)), "{err:?}");
}
