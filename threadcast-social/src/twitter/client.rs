//! Wrapper around the X/Twitter v2 posting endpoints.
//!
//! Every call is attempted once. User-context calls are signed with OAuth
//! 1.0a; the optional bearer token drives the raw bearer posting path.
use crate::twitter::oauth::{self, OAuthCredentials};
use crate::twitter::types::{CreateTweetRequest, CreateTweetResponse, MeResponse, User};
use async_trait::async_trait;
use threadcast_common::{Result, ThreadcastError};
use threadcast_http::header::{AUTHORIZATION, HeaderValue};
use threadcast_http::{Auth, HttpClient, HttpError, RequestOpts};

pub const TWITTER_API_BASE: &str = "https://api.twitter.com";

const TWEETS_PATH: &str = "2/tweets";
const ME_PATH: &str = "2/users/me";

/// Which credential signs post requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostingAuth {
    /// OAuth 1.0a user context (the four credential values).
    #[default]
    OAuth1,
    /// `Authorization: Bearer` with the configured bearer token.
    Bearer,
}

/// Anything that can create a post, optionally as a reply. Returns the new post id.
#[async_trait]
pub trait Poster: Send + Sync {
    async fn post(&self, text: &str, in_reply_to: Option<&str>) -> Result<String>;
}

#[derive(Clone)]
pub struct TwitterApi {
    http: HttpClient,
    credentials: OAuthCredentials,
    bearer: Option<String>,
    posting: PostingAuth,
}

impl TwitterApi {
    pub fn new(credentials: OAuthCredentials) -> Result<Self> {
        Self::with_base_url(credentials, TWITTER_API_BASE)
    }

    pub fn with_base_url(credentials: OAuthCredentials, base: &str) -> Result<Self> {
        let http = HttpClient::new(base)
            .map_err(|e| ThreadcastError::Config(format!("twitter base url: {e}")))?;
        Ok(Self {
            http,
            credentials,
            bearer: None,
            posting: PostingAuth::OAuth1,
        })
    }

    pub fn with_bearer(mut self, bearer_token: Option<String>) -> Self {
        self.bearer = bearer_token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_posting_auth(mut self, posting: PostingAuth) -> Self {
        self.posting = posting;
        self
    }

    /// Confirm the credentials belong to a usable account.
    ///
    /// A failure here is fatal for the process: nothing can be posted.
    pub async fn verify_credentials(&self) -> Result<User> {
        let auth = self
            .oauth_header("GET", ME_PATH)
            .map_err(|e| ThreadcastError::Authentication(e.to_string()))?;
        let me: MeResponse = self
            .http
            .get_json(ME_PATH, RequestOpts {
                auth: Some(auth),
                ..Default::default()
            })
            .await
            .map_err(|e| ThreadcastError::Authentication(e.to_string()))?;
        tracing::info!(user_id = %me.data.id, username = %me.data.username, "twitter.auth.ok");
        Ok(me.data)
    }

    /// Create a post signed with OAuth 1.0a.
    pub async fn create_tweet(&self, text: &str, in_reply_to: Option<&str>) -> Result<String> {
        let auth = self.oauth_header("POST", TWEETS_PATH)?;
        self.send_tweet(text, in_reply_to, auth).await
    }

    /// Create a post with the bearer token instead of the user-context signature.
    pub async fn create_tweet_with_bearer(
        &self,
        text: &str,
        in_reply_to: Option<&str>,
    ) -> Result<String> {
        let bearer = self.bearer.as_deref().ok_or_else(|| {
            ThreadcastError::Config("bearer posting requires TWITTER_BEARER_TOKEN".into())
        })?;
        self.send_tweet(text, in_reply_to, Auth::Bearer(bearer)).await
    }

    async fn send_tweet(
        &self,
        text: &str,
        in_reply_to: Option<&str>,
        auth: Auth<'_>,
    ) -> Result<String> {
        let body = CreateTweetRequest::new(text, in_reply_to);
        let resp: CreateTweetResponse = self
            .http
            .post_json(TWEETS_PATH, &body, RequestOpts {
                auth: Some(auth),
                ..Default::default()
            })
            .await
            .map_err(http_to_posting)?;
        tracing::info!(
            tweet_id = %resp.data.id,
            in_reply_to = ?in_reply_to,
            chars = text.chars().count(),
            "twitter.post.created"
        );
        Ok(resp.data.id)
    }

    fn oauth_header(&self, method: &str, path: &str) -> Result<Auth<'static>> {
        let url = self
            .http
            .url_for(path)
            .map_err(|e| ThreadcastError::Config(e.to_string()))?;
        let value = oauth::authorization_header(method, &url, &self.credentials, &[])?;
        let value = HeaderValue::from_str(&value)
            .map_err(|e| ThreadcastError::Authentication(format!("invalid OAuth header: {e}")))?;
        Ok(Auth::Header {
            name: AUTHORIZATION,
            value,
        })
    }
}

#[async_trait]
impl Poster for TwitterApi {
    async fn post(&self, text: &str, in_reply_to: Option<&str>) -> Result<String> {
        match self.posting {
            PostingAuth::OAuth1 => self.create_tweet(text, in_reply_to).await,
            PostingAuth::Bearer => self.create_tweet_with_bearer(text, in_reply_to).await,
        }
    }
}

fn http_to_posting(e: HttpError) -> ThreadcastError {
    ThreadcastError::Posting(e.to_string())
}
