use crate::error::ServiceError;
use crate::FlaggedMatch;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://api.languagetool.org/v2/check";

/// Text sent when probing whether the service is reachable
const PROBE_TEXT: &str = "test";

/// Remote grammar and spelling detection
#[async_trait]
pub trait GrammarService: Send + Sync {
    /// Cheap reachability check, run once per engine
    async fn probe(&self) -> Result<(), ServiceError>;

    /// Raw matches for `text`, in char offsets of `text`
    async fn check(&self, text: &str) -> Result<Vec<FlaggedMatch>, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
struct ApiMatch {
    offset: usize,
    length: usize,
    #[serde(default)]
    replacements: Vec<Replacement>,
    #[serde(default)]
    message: String,
    rule: Option<ApiRule>,
}

#[derive(Debug, Deserialize)]
struct Replacement {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ApiRule {
    id: Option<String>,
    category: Option<ApiCategory>,
}

#[derive(Debug, Deserialize)]
struct ApiCategory {
    id: Option<String>,
}

/// Client for a LanguageTool-compatible `/v2/check` endpoint
pub struct LanguageToolClient {
    client: Client,
    endpoint: String,
    language: String,
    max_suggestions: usize,
}

impl LanguageToolClient {
    pub fn new(
        endpoint: impl Into<String>,
        language: impl Into<String>,
        timeout: Duration,
        max_suggestions: usize,
    ) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            language: language.into(),
            max_suggestions,
        })
    }

    async fn post(&self, form: &[(&str, &str)]) -> Result<reqwest::Response, ServiceError> {
        let response = self.client.post(&self.endpoint).form(form).send().await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }

        Ok(response)
    }

    fn to_flagged(&self, text: &str, api_match: ApiMatch) -> FlaggedMatch {
        let start = utf16_to_char_offset(text, api_match.offset);
        let end = utf16_to_char_offset(text, api_match.offset + api_match.length);
        let (rule_id, category) = match api_match.rule {
            Some(rule) => (rule.id, rule.category.and_then(|c| c.id)),
            None => (None, None),
        };

        FlaggedMatch {
            word: crate::parser::char_slice(text, start, end).to_string(),
            start,
            end,
            suggestions: api_match
                .replacements
                .into_iter()
                .take(self.max_suggestions)
                .map(|r| r.value)
                .collect(),
            message: api_match.message,
            category,
            rule_id,
        }
    }
}

#[async_trait]
impl GrammarService for LanguageToolClient {
    async fn probe(&self) -> Result<(), ServiceError> {
        self.post(&[("text", PROBE_TEXT), ("language", self.language.as_str())])
            .await?;
        debug!(endpoint = %self.endpoint, "grammar service reachable");
        Ok(())
    }

    async fn check(&self, text: &str) -> Result<Vec<FlaggedMatch>, ServiceError> {
        let response = self
            .post(&[
                ("text", text),
                ("language", self.language.as_str()),
                ("enabledOnly", "false"),
            ])
            .await?;

        let body: CheckResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Malformed(e.to_string()))?;

        Ok(body
            .matches
            .into_iter()
            .map(|m| self.to_flagged(text, m))
            .collect())
    }
}

/// LanguageTool reports offsets in UTF-16 code units
pub fn utf16_to_char_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0;
    for (index, ch) in text.chars().enumerate() {
        if units >= utf16_offset {
            return index;
        }
        units += ch.len_utf16();
    }
    text.chars().count()
}
