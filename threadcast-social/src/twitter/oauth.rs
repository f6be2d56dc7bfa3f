//! OAuth 1.0a request signing (HMAC-SHA1) for user-context endpoints.
//!
//! JSON request bodies are not part of the signature; only the query string
//! and the `oauth_*` protocol parameters are.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sha1::Sha1;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use threadcast_common::{Result, ThreadcastError};
use url::Url;

type HmacSha1 = Hmac<Sha1>;

const NONCE_LEN: usize = 32;

/// The four user-context credential values issued for an X app.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &"<redacted>")
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

/// Build the `Authorization` header value for a request, with a fresh nonce
/// and the current timestamp.
pub fn authorization_header(
    method: &str,
    url: &Url,
    creds: &OAuthCredentials,
    extra_params: &[(&str, &str)],
) -> Result<String> {
    let nonce: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect();
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    authorization_header_with(method, url, creds, extra_params, &nonce, timestamp)
}

pub(crate) fn authorization_header_with(
    method: &str,
    url: &Url,
    creds: &OAuthCredentials,
    extra_params: &[(&str, &str)],
    nonce: &str,
    timestamp: u64,
) -> Result<String> {
    let timestamp = timestamp.to_string();
    let mut oauth_params = vec![
        ("oauth_consumer_key", creds.consumer_key.as_str()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_token", creds.access_token.as_str()),
        ("oauth_version", "1.0"),
    ];

    let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let mut all: Vec<(&str, &str)> = oauth_params.clone();
    all.extend(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    all.extend_from_slice(extra_params);

    let base = signature_base_string(method, url, &all);
    let signature = sign(&base, &creds.consumer_secret, &creds.access_token_secret)?;

    oauth_params.push(("oauth_signature", signature.as_str()));
    oauth_params.sort_by(|a, b| a.0.cmp(b.0));

    let fields = oauth_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("OAuth {fields}"))
}

fn signature_base_string(method: &str, url: &Url, params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();
    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(&base_url(url)),
        encode(&param_string)
    )
}

/// Scheme, host, non-default port and path; no query or fragment.
fn base_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> Result<String> {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| ThreadcastError::Authentication(format!("signing key rejected: {e}")))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// RFC 3986 percent-encoding (everything but `A-Za-z0-9-._~`).
fn encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}
