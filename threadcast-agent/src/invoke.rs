//! Single entry point returning `{ status_code, body }`.
//!
//! Status codes: 200 when everything was posted, 400 for a bad request,
//! 500 when the agent could not be set up, 502 when the social network
//! rejected a post (with whatever ids were created before the failure).
use crate::pipeline::Agent;
use crate::publish::PublishReport;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use threadcast_common::ThreadcastError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Generate a thread (trending or custom topic) and post it.
    PostWithComments,
    /// Post caller-supplied text verbatim.
    PostText,
}

impl Task {
    pub const DEFAULT_NAME: &'static str = "post_with_comments";
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "post_with_comments" | "post_tweet_with_comments" => Ok(Task::PostWithComments),
            "post_text" => Ok(Task::PostText),
            other => Err(format!("Unknown task: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvocationRequest {
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub custom_topic: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: Value,
}

impl InvocationResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status_code: 400,
            body: json!({ "error": message.into() }),
        }
    }

    /// The agent could not be built (missing credentials, rejected login).
    pub fn setup_failure(err: &ThreadcastError) -> Self {
        Self {
            status_code: 500,
            body: json!({ "error": err.to_string() }),
        }
    }

    fn from_report(report: &PublishReport) -> Self {
        match &report.failure {
            None => Self {
                status_code: 200,
                body: json!({
                    "message": "Tweet and comments posted successfully",
                    "tweet_id": report.primary_id,
                    "comment_ids": report.follow_up_ids,
                }),
            },
            Some(failure) => Self {
                status_code: 502,
                body: json!({
                    "error": failure.message,
                    "failure": failure,
                    "tweet_id": report.primary_id,
                    "comment_ids": report.follow_up_ids,
                }),
            },
        }
    }
}

/// Run one request against `agent`. Never panics or returns an error; every
/// outcome is encoded in the response.
pub async fn invoke(agent: &Agent, request: InvocationRequest) -> InvocationResponse {
    let name = request.task.as_deref().unwrap_or(Task::DEFAULT_NAME);
    let task = match name.parse::<Task>() {
        Ok(task) => task,
        Err(message) => {
            tracing::warn!(task = name, "unknown task requested");
            return InvocationResponse::bad_request(message);
        }
    };
    tracing::info!(?task, "invocation.start");

    let report = match task {
        Task::PostWithComments => {
            agent
                .post_with_comments(request.custom_topic.as_deref())
                .await
        }
        Task::PostText => match request.text.as_deref() {
            Some(text) if !text.trim().is_empty() => agent.post_text(text).await,
            _ => return InvocationResponse::bad_request("post_text requires a non-empty text"),
        },
    };

    let response = InvocationResponse::from_report(&report);
    tracing::info!(status = response.status_code, "invocation.done");
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_names_and_alias() {
        assert_eq!("post_with_comments".parse::<Task>(), Ok(Task::PostWithComments));
        assert_eq!("post_tweet_with_comments".parse::<Task>(), Ok(Task::PostWithComments));
        assert_eq!("post_text".parse::<Task>(), Ok(Task::PostText));
        assert_eq!(
            "delete_everything".parse::<Task>(),
            Err("Unknown task: delete_everything".to_string())
        );
    }

    #[test]
    fn request_fields_are_optional() {
        let req: InvocationRequest = serde_json::from_str("{}").unwrap();
        assert!(req.task.is_none() && req.custom_topic.is_none() && req.text.is_none());
    }

    #[test]
    fn follow_up_failure_keeps_partial_ids() {
        use crate::publish::{PublishFailure, PublishStage};
        let report = PublishReport {
            primary_id: Some("1".into()),
            follow_up_ids: vec![],
            failure: Some(PublishFailure {
                stage: PublishStage::FollowUp { index: 0 },
                message: "Posting failed: 403".into(),
            }),
        };
        let resp = InvocationResponse::from_report(&report);
        assert_eq!(resp.status_code, 502);
        assert!(!resp.is_success());
        assert_eq!(resp.body["tweet_id"], "1");
        assert_eq!(resp.body["failure"]["stage"], "follow_up");
        assert_eq!(resp.body["failure"]["index"], 0);
        assert_eq!(resp.body["comment_ids"], json!([]));
    }

    #[test]
    fn setup_failures_are_500() {
        let err = ThreadcastError::Authentication("401 Unauthorized".into());
        let resp = InvocationResponse::setup_failure(&err);
        assert_eq!(resp.status_code, 500);
        assert_eq!(resp.body["error"], "Authentication failed: 401 Unauthorized");
    }
}
