use serde::{Deserialize, Serialize};

/// Body of `POST /2/tweets`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTweetRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplySettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplySettings {
    pub in_reply_to_tweet_id: String,
}

impl CreateTweetRequest {
    pub fn new(text: &str, in_reply_to: Option<&str>) -> Self {
        Self {
            text: text.to_string(),
            reply: in_reply_to.map(|id| ReplySettings {
                in_reply_to_tweet_id: id.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTweetResponse {
    pub data: CreatedTweet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedTweet {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

/// Body of `GET /2/users/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub data: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
}
