use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use quiz_core::model::{QuestionRecord, QuizSettings, QuizSettingsDraft, SessionSize};
use storage::repository::{QuestionRow, QuestionSource, SourceError, records_from_rows};

use crate::error::RemoteSourceError;

const DEFAULT_RPC: &str = "get_random_questions";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Connection details for a hosted question store exposing a PostgREST RPC.
#[derive(Clone, Debug)]
pub struct RemoteSourceConfig {
    pub base_url: String,
    pub api_key: String,
    pub rpc: String,
    pub timeout: Duration,
}

impl RemoteSourceConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            rpc: DEFAULT_RPC.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Config for the store named by `settings`; `None` without a base URL
    /// or with a blank key.
    #[must_use]
    pub fn from_settings(settings: &QuizSettings, api_key: impl Into<String>) -> Option<Self> {
        let api_key: String = api_key.into();
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return None;
        }
        settings
            .source_base_url()
            .map(|base_url| Self::new(base_url, api_key))
    }

    /// Reads `QUIZ_SOURCE_URL` and `QUIZ_SOURCE_KEY`; `Ok(None)` if either is
    /// missing or blank. `QUIZ_SOURCE_RPC` and `QUIZ_SOURCE_TIMEOUT_SECS` fall
    /// back to their defaults when blank or zero.
    ///
    /// # Errors
    ///
    /// Returns `RemoteSourceError::Settings` if `QUIZ_SOURCE_URL` is not a URL.
    pub fn from_env() -> Result<Option<Self>, RemoteSourceError> {
        let settings = QuizSettingsDraft {
            source_base_url: env::var("QUIZ_SOURCE_URL").ok(),
            ..QuizSettingsDraft::default()
        }
        .validate()?;
        let Ok(api_key) = env::var("QUIZ_SOURCE_KEY") else {
            return Ok(None);
        };
        Ok(Self::from_settings(&settings, api_key).map(|config| {
            config
                .with_rpc(env::var("QUIZ_SOURCE_RPC").ok())
                .with_timeout_secs(env::var("QUIZ_SOURCE_TIMEOUT_SECS").ok())
        }))
    }

    /// Override the procedure name; blank values keep the current one.
    #[must_use]
    pub fn with_rpc(mut self, rpc: Option<String>) -> Self {
        if let Some(rpc) = rpc.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            self.rpc = rpc;
        }
        self
    }

    /// Override the request timeout; blank, non-numeric or zero values keep
    /// the current one.
    #[must_use]
    pub fn with_timeout_secs(mut self, raw: Option<String>) -> Self {
        if let Some(secs) = raw
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
        {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Endpoint of the random-questions procedure.
    ///
    /// # Errors
    ///
    /// Returns `RemoteSourceError::InvalidBaseUrl` if the result is not a valid URL.
    pub fn rpc_url(&self) -> Result<Url, RemoteSourceError> {
        let raw = format!(
            "{}/rest/v1/rpc/{}",
            self.base_url.trim_end_matches('/'),
            self.rpc
        );
        Url::parse(&raw).map_err(|_| RemoteSourceError::InvalidBaseUrl(self.base_url.clone()))
    }
}

/// Question source backed by the hosted store's `get_random_questions` RPC.
///
/// The store picks the random subset; rows come back with the correct answer
/// in `answer1`.
#[derive(Clone)]
pub struct RemoteQuestionSource {
    client: Client,
    config: RemoteSourceConfig,
    endpoint: Url,
}

impl RemoteQuestionSource {
    /// # Errors
    ///
    /// Returns `RemoteSourceError` if the endpoint URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: RemoteSourceConfig) -> Result<Self, RemoteSourceError> {
        let endpoint = config.rpc_url()?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    /// Build from environment, if configured.
    ///
    /// # Errors
    ///
    /// Returns `RemoteSourceError` if the configured URL is invalid or the
    /// HTTP client cannot be built.
    pub fn from_env() -> Result<Option<Self>, RemoteSourceError> {
        RemoteSourceConfig::from_env()?.map(Self::new).transpose()
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Call the RPC and decode its rows.
    ///
    /// # Errors
    ///
    /// Returns `RemoteSourceError` for transport failures, non-success status
    /// or an undecodable body. Rows that fail validation are skipped.
    pub async fn request(&self, count: SessionSize) -> Result<Vec<QuestionRecord>, RemoteSourceError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .json(&RpcRequest {
                limit_num: count.get(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RemoteSourceError::HttpStatus(response.status()));
        }

        let body = response.text().await?;
        decode_rows(&body)
    }
}

#[async_trait]
impl QuestionSource for RemoteQuestionSource {
    async fn fetch(&self, count: SessionSize) -> Result<Vec<QuestionRecord>, SourceError> {
        let records = self.request(count).await?;
        tracing::debug!(
            requested = count.get(),
            returned = records.len(),
            "fetched questions from remote store"
        );
        Ok(records)
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest {
    limit_num: u32,
}

/// Decode an RPC body; `null` means no questions.
fn decode_rows(body: &str) -> Result<Vec<QuestionRecord>, RemoteSourceError> {
    let rows: Option<Vec<QuestionRow>> = serde_json::from_str(body)?;
    Ok(records_from_rows(rows.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::QuizSession;
    use quiz_core::model::SlotTag;
    use quiz_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn rpc_url_joins_base_and_procedure() {
        let config = RemoteSourceConfig::new("https://demo.supabase.co/", "key");
        assert_eq!(
            config.rpc_url().unwrap().as_str(),
            "https://demo.supabase.co/rest/v1/rpc/get_random_questions"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = RemoteSourceConfig::new("not a url", "key");
        assert!(matches!(
            RemoteQuestionSource::new(config),
            Err(RemoteSourceError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn request_body_uses_limit_num() {
        let body = serde_json::to_string(&RpcRequest { limit_num: 40 }).unwrap();
        assert_eq!(body, r#"{"limit_num":40}"#);
    }

    #[test]
    fn decodes_rows_in_store_order() {
        let body = r#"[
            {"id":"b7","question":"Q1","answer1":"yes","answer2":"no","answer3":"maybe"},
            {"id":"a2","question":"Q2","answer1":"up","answer2":"down","answer3":"left"}
        ]"#;
        let records = decode_rows(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id().as_str(), "b7");
        assert_eq!(records[1].answer(SlotTag::Answer1), "up");
    }

    #[test]
    fn invalid_row_is_skipped_and_session_uses_the_rest() {
        let body = r#"[
            {"id":"1","question":"Q1","answer1":"yes","answer2":"no","answer3":"maybe"},
            {"id":"2","question":"Q2","answer1":"up","answer2":"","answer3":"left"},
            {"id":"3","question":"Q3","answer1":"hot","answer2":"cold","answer3":"warm"}
        ]"#;
        let records = decode_rows(body).unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id().as_str().to_owned()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let mut session = QuizSession::loading(fixed_now());
        session
            .resolve(Ok(records), &mut StdRng::seed_from_u64(3), fixed_now())
            .unwrap();
        assert_eq!(session.effective_size(), 2);
        assert!(session.load_failure().is_none());
    }

    #[test]
    fn config_follows_settings_base_url() {
        let settings = QuizSettingsDraft {
            source_base_url: Some(" https://demo.supabase.co ".into()),
            ..QuizSettingsDraft::default()
        }
        .validate()
        .unwrap();

        let config = RemoteSourceConfig::from_settings(&settings, "key").unwrap();
        assert_eq!(
            config.rpc_url().unwrap().as_str(),
            "https://demo.supabase.co/rest/v1/rpc/get_random_questions"
        );
        assert!(RemoteSourceConfig::from_settings(&settings, "  ").is_none());
        assert!(RemoteSourceConfig::from_settings(&QuizSettings::default(), "key").is_none());
    }

    #[test]
    fn blank_rpc_and_zero_timeout_keep_defaults() {
        let config = RemoteSourceConfig::new("https://demo.supabase.co", "key")
            .with_rpc(Some("   ".into()))
            .with_timeout_secs(Some("0".into()));
        assert_eq!(config.rpc, DEFAULT_RPC);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let config = config
            .with_rpc(Some(" other_rpc ".into()))
            .with_timeout_secs(Some("not a number".into()));
        assert_eq!(config.rpc, "other_rpc");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let config = config.with_timeout_secs(Some(" 5 ".into()));
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn null_body_is_an_empty_pool() {
        assert!(decode_rows("null").unwrap().is_empty());
    }

    #[test]
    fn malformed_body_maps_to_serialization_error() {
        let err = decode_rows("{\"message\":\"boom\"}").unwrap_err();
        assert!(matches!(err, RemoteSourceError::Decode(_)));
        assert!(matches!(SourceError::from(err), SourceError::Serialization(_)));
    }

    #[test]
    fn status_errors_surface_as_unavailable() {
        let err = RemoteSourceError::HttpStatus(reqwest::StatusCode::SERVICE_UNAVAILABLE);
        assert!(SourceError::from(err).is_unavailable());
    }
}
