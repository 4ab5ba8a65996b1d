//! Open Calais HTTP client
//!
//! One POST per batch: the raw text is the body and the license key,
//! content type and metadata switches travel as headers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tagscope_core::{CalaisConfig, Result, TagscopeError};

use crate::model::parse_response;
use crate::{RemoteTagger, TagOutcome};

/// Open Calais API client
pub struct CalaisClient {
    client: Client,
    api_key: String,
    api_url: String,
    content_type: String,
    social_tags: bool,
    max_payload_chars: Option<usize>,
}

impl CalaisClient {
    /// Create a new client with default settings
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_url: api_url.into(),
            content_type: "text/txt".to_string(),
            social_tags: true,
            max_payload_chars: None,
        }
    }

    /// Create from config
    pub fn from_config(config: &CalaisConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            tracing::warn!("no Calais license key configured; the service will reject requests");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TagscopeError::Remote(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            content_type: config.content_type.clone(),
            social_tags: config.social_tags,
            max_payload_chars: config.max_payload_chars,
        })
    }

    /// Set the content type of submitted text
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Enable or disable social tag extraction
    pub fn with_social_tags(mut self, enabled: bool) -> Self {
        self.social_tags = enabled;
        self
    }

    /// Cap the characters sent per request
    pub fn with_max_payload_chars(mut self, max: Option<usize>) -> Self {
        self.max_payload_chars = max;
        self
    }

    /// Request headers for every call
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("x-calais-licenseID", self.api_key.clone()),
            ("content-type", self.content_type.clone()),
            ("accept", "application/json".to_string()),
        ];
        if self.social_tags {
            headers.push(("enableMetadataType", "SocialTags".to_string()));
        }
        headers
    }

    /// Apply the payload cap, cutting on a character boundary
    pub fn payload<'a>(&self, text: &'a str) -> &'a str {
        let Some(max) = self.max_payload_chars else {
            return text;
        };

        match text.char_indices().nth(max) {
            Some((cut, _)) => {
                tracing::warn!(
                    "payload truncated to {} characters (dropped {} bytes)",
                    max,
                    text.len() - cut
                );
                &text[..cut]
            }
            None => text,
        }
    }
}

#[async_trait]
impl RemoteTagger for CalaisClient {
    async fn tag(&self, text: &str) -> Result<TagOutcome> {
        if text.is_empty() {
            return Ok(TagOutcome::Skipped);
        }

        let body = self.payload(text).to_string();
        let mut request = self.client.post(&self.api_url).body(body);
        for (name, value) in self.headers() {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TagscopeError::Remote(format!("Request failed: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TagscopeError::Remote(format!("Failed to read response: {e}")))?;
        let text = String::from_utf8_lossy(&bytes);

        if !status.is_success() {
            return Ok(TagOutcome::NoData {
                reason: format!("HTTP {status}: {}", snippet(&text)),
            });
        }

        Ok(match parse_response(&text) {
            Ok(items) => TagOutcome::Tagged(items),
            Err(e) => TagOutcome::NoData {
                reason: format!("unreadable response ({e}): {}", snippet(&text)),
            },
        })
    }
}

/// First line of a response body, shortened for logs
fn snippet(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    match line.char_indices().nth(120) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CalaisClient::new("test-key", "http://localhost:9/enrich");
        assert_eq!(client.api_url, "http://localhost:9/enrich");
        assert_eq!(client.content_type, "text/txt");
    }

    #[test]
    fn test_headers_with_social_tags() {
        let client = CalaisClient::new("key-1", "http://localhost:9/enrich");
        let headers = client.headers();

        assert!(headers.contains(&("x-calais-licenseID", "key-1".to_string())));
        assert!(headers.contains(&("accept", "application/json".to_string())));
        assert!(headers.contains(&("enableMetadataType", "SocialTags".to_string())));
    }

    #[test]
    fn test_headers_without_social_tags() {
        let client = CalaisClient::new("key-1", "http://localhost:9/enrich")
            .with_social_tags(false)
            .with_content_type("text/html");
        let headers = client.headers();

        assert!(!headers.iter().any(|(name, _)| *name == "enableMetadataType"));
        assert!(headers.contains(&("content-type", "text/html".to_string())));
    }

    #[test]
    fn test_payload_uncapped_by_default() {
        let client = CalaisClient::new("k", "http://localhost:9/enrich");
        let text = "x".repeat(200_000);
        assert_eq!(client.payload(&text).len(), 200_000);
    }

    #[test]
    fn test_payload_cap_on_char_boundary() {
        let client =
            CalaisClient::new("k", "http://localhost:9/enrich").with_max_payload_chars(Some(3));
        assert_eq!(client.payload("ééééé"), "ééé");
        assert_eq!(client.payload("ab"), "ab");
    }

    #[test]
    fn test_from_config() {
        let config = CalaisConfig {
            api_key: "abc".to_string(),
            social_tags: false,
            max_payload_chars: Some(90_000),
            ..Default::default()
        };
        let client = CalaisClient::from_config(&config).unwrap();
        assert_eq!(client.api_key, "abc");
        assert!(!client.social_tags);
        assert_eq!(client.max_payload_chars, Some(90_000));
    }

    #[tokio::test]
    async fn test_empty_text_skips_request() {
        // Nothing listens on this port; a request would fail
        let client = CalaisClient::new("k", "http://127.0.0.1:9/enrich");
        let outcome = client.tag("").await.unwrap();
        assert!(matches!(outcome, TagOutcome::Skipped));
    }

    #[tokio::test]
    async fn test_whitespace_text_is_sent() {
        let client = CalaisClient::new("k", "http://127.0.0.1:9/enrich");
        let err = client.tag("  \n ").await.unwrap_err();
        assert!(matches!(err, TagscopeError::Remote(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_is_error() {
        let client = CalaisClient::new("k", "http://127.0.0.1:9/enrich");
        let err = client.tag("Paris").await.unwrap_err();
        assert!(matches!(err, TagscopeError::Remote(_)));
    }

    #[test]
    fn test_snippet_shortens() {
        let long = "a".repeat(500);
        assert_eq!(snippet(&long).len(), 123);
        assert_eq!(snippet("one\ntwo"), "one");
    }
}
