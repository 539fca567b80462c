//! Message fetcher: gets the full message mapping for a resolved locale.
//!
//! Mappings come from one of two sources:
//!
//! - `Remote`: `GET {base_url}/{locale}` against the message API
//! - `Bundled`: `{dir}/{locale}.json` shipped with the deployment
//!
//! Both go through `MessageMapping::from_value` and fail with the same
//! `MessageFetchError`. A failure is terminal for the request: there is no
//! retry and no fallback to another locale's messages.

use crate::i18n::{FetchMetrics, Locale, MessageCache, MessageMapping, MessageMappingError};
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a message fetch failed.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("message source returned {0}")]
    Status(StatusCode),

    #[error("response body is not JSON: {0}")]
    Decode(reqwest::Error),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("bundled messages are not JSON: {0}")]
    Parse(serde_json::Error),

    #[error(transparent)]
    InvalidMapping(MessageMappingError),
}

impl FetchFailure {
    /// True when the failure came from the remote message API rather than
    /// from data shipped with the deployment.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            FetchFailure::Transport(_) | FetchFailure::Status(_) | FetchFailure::Decode(_)
        )
    }
}

#[derive(Debug, Error)]
#[error("Failed to fetch messages for locale '{locale}': {cause}")]
pub struct MessageFetchError {
    pub locale: Locale,
    pub cause: FetchFailure,
}

impl MessageFetchError {
    fn new(locale: Locale, cause: FetchFailure) -> Self {
        Self { locale, cause }
    }

    /// Upstream status, when the source answered with a non-2xx response
    pub fn status(&self) -> Option<StatusCode> {
        match self.cause {
            FetchFailure::Status(status) => Some(status),
            _ => None,
        }
    }
}

/// Where message mappings are loaded from.
#[derive(Debug, Clone)]
pub enum MessageSource {
    Remote {
        client: reqwest::Client,
        base_url: String,
    },
    Bundled {
        dir: PathBuf,
    },
}

impl MessageSource {
    /// # Arguments
    /// * `client` - Shared HTTP client
    /// * `base_url` - Prefix the locale code is appended to; a trailing `/` is ignored
    pub fn remote(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        MessageSource::Remote {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// # Arguments
    /// * `dir` - Directory holding one `{locale}.json` file per registered locale
    pub fn bundled(dir: impl Into<PathBuf>) -> Self {
        MessageSource::Bundled { dir: dir.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MessageSource::Remote { .. } => "remote",
            MessageSource::Bundled { .. } => "bundled",
        }
    }

    /// Human-readable location, for logs
    pub fn location(&self) -> String {
        match self {
            MessageSource::Remote { base_url, .. } => base_url.clone(),
            MessageSource::Bundled { dir } => dir.display().to_string(),
        }
    }
}

/// Retrieves message mappings, through the cache when one is configured.
#[derive(Debug)]
pub struct MessageFetcher {
    source: MessageSource,
    cache: Option<Arc<MessageCache>>,
    metrics: FetchMetrics,
}

impl MessageFetcher {
    pub fn new(source: MessageSource, cache: Option<Arc<MessageCache>>) -> Self {
        Self {
            source,
            cache,
            metrics: FetchMetrics::default(),
        }
    }

    pub fn source(&self) -> &MessageSource {
        &self.source
    }

    pub fn metrics(&self) -> &FetchMetrics {
        &self.metrics
    }

    pub fn cache(&self) -> Option<&MessageCache> {
        self.cache.as_deref()
    }

    /// Get the full message mapping for `locale`.
    ///
    /// # Returns
    /// * `Ok(mapping)` from the cache if a fresh entry exists, otherwise from the source
    /// * `Err(MessageFetchError)` if the source fails; nothing is cached in that case
    ///
    /// Concurrent first requests for the same locale may each hit the source;
    /// the last one to finish wins the cache slot.
    pub async fn fetch(&self, locale: Locale) -> Result<Arc<MessageMapping>, MessageFetchError> {
        if let Some(cache) = &self.cache {
            if let Some(mapping) = cache.get(locale).await {
                self.metrics.record_cache_hit();
                debug!("Messages for '{}' served from cache", locale);
                return Ok(mapping);
            }
            self.metrics.record_cache_miss();
            debug!("Messages for '{}' not cached, fetching", locale);
        }

        self.metrics.record_request();
        let loaded = match &self.source {
            MessageSource::Remote { client, base_url } => {
                fetch_remote(client, base_url, locale).await
            }
            MessageSource::Bundled { dir } => load_bundled(dir, locale).await,
        };

        let mapping = match loaded {
            Ok(mapping) if mapping.is_empty() => {
                warn!("Message mapping for '{}' is empty", locale);
                Arc::new(mapping)
            }
            Ok(mapping) => {
                debug!(
                    "Fetched messages for '{}' ({} namespaces)",
                    locale,
                    mapping.top_level_keys().count()
                );
                Arc::new(mapping)
            }
            Err(e) => {
                self.metrics.record_failure();
                warn!("{}", e);
                return Err(e);
            }
        };

        if let Some(cache) = &self.cache {
            cache.insert(locale, Arc::clone(&mapping)).await;
        }

        Ok(mapping)
    }
}

async fn fetch_remote(
    client: &reqwest::Client,
    base_url: &str,
    locale: Locale,
) -> Result<MessageMapping, MessageFetchError> {
    let url = format!("{}/{}", base_url, locale.code());

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| MessageFetchError::new(locale, FetchFailure::Transport(e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MessageFetchError::new(locale, FetchFailure::Status(status)));
    }

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| MessageFetchError::new(locale, FetchFailure::Decode(e)))?;

    MessageMapping::from_value(body)
        .map_err(|e| MessageFetchError::new(locale, FetchFailure::InvalidMapping(e)))
}

async fn load_bundled(dir: &Path, locale: Locale) -> Result<MessageMapping, MessageFetchError> {
    // Locale codes come from the registry, so this never leaves `dir`
    let path = dir.join(format!("{}.json", locale.code()));

    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(source) => {
            return Err(MessageFetchError::new(
                locale,
                FetchFailure::Read { path, source },
            ))
        }
    };

    let body: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|e| MessageFetchError::new(locale, FetchFailure::Parse(e)))?;

    MessageMapping::from_value(body)
        .map_err(|e| MessageFetchError::new(locale, FetchFailure::InvalidMapping(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn fetcher(server: &MockServer, cache: Option<Arc<MessageCache>>) -> MessageFetcher {
        MessageFetcher::new(
            MessageSource::remote(reqwest::Client::new(), format!("{}/messages", server.uri())),
            cache,
        )
    }

    fn english_messages() -> serde_json::Value {
        json!({
            "header": { "about": "About", "contact": "Contact" },
            "about": { "title": "About me" }
        })
    }

    /// A bundled messages directory with `en.json` only
    fn create_messages_dir() -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(
            temp_dir.path().join("en.json"),
            serde_json::to_string(&english_messages()).unwrap(),
        )
        .unwrap();
        temp_dir
    }

    // ==================== Remote Source Tests ====================

    #[tokio::test]
    async fn test_fetch_returns_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(english_messages()))
            .expect(1)
            .mount(&server)
            .await;

        let messages = fetcher(&server, None).fetch(Locale::ENGLISH).await.unwrap();

        assert!(!messages.is_empty());
        assert!(messages.top_level_keys().all(|k| !k.is_empty()));
        assert_eq!(messages.text("about.title"), Some("About me"));
    }

    #[tokio::test]
    async fn test_trailing_slash_in_base_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/es"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"a": "b"})))
            .expect(1)
            .mount(&server)
            .await;

        let source =
            MessageSource::remote(reqwest::Client::new(), format!("{}/messages/", server.uri()));
        assert_eq!(source.location(), format!("{}/messages", server.uri()));

        let fetcher = MessageFetcher::new(source, None);
        assert!(fetcher.fetch(Locale::SPANISH).await.is_ok());
    }

    #[tokio::test]
    async fn test_non_success_status_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/es"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = fetcher(&server, None);
        let err = fetcher.fetch(Locale::SPANISH).await.unwrap_err();

        assert_eq!(err.locale, Locale::SPANISH);
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.cause.is_upstream());
        assert!(err.to_string().contains("'es'"));
        assert_eq!(fetcher.metrics().report().failures, 1);
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/en"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetcher(&server, None).fetch(Locale::ENGLISH).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_invalid_json_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/en"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = fetcher(&server, None).fetch(Locale::ENGLISH).await.unwrap_err();
        assert!(matches!(err.cause, FetchFailure::Decode(_)));
    }

    #[tokio::test]
    async fn test_non_object_body_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "a", "map"])))
            .mount(&server)
            .await;

        let err = fetcher(&server, None).fetch(Locale::ENGLISH).await.unwrap_err();
        assert!(matches!(err.cause, FetchFailure::InvalidMapping(_)));
    }

    #[tokio::test]
    async fn test_unreachable_source_is_transport_failure() {
        // Nothing listens on port 9 (discard) in the test environment
        let source = MessageSource::remote(reqwest::Client::new(), "http://127.0.0.1:9/messages");
        let err = MessageFetcher::new(source, None)
            .fetch(Locale::ENGLISH)
            .await
            .unwrap_err();

        assert!(matches!(err.cause, FetchFailure::Transport(_)));
        assert!(err.status().is_none());
    }

    // ==================== Bundled Source Tests ====================

    #[tokio::test]
    async fn test_bundled_source_reads_locale_file() {
        let dir = create_messages_dir();
        let fetcher = MessageFetcher::new(MessageSource::bundled(dir.path()), None);

        let messages = fetcher.fetch(Locale::ENGLISH).await.unwrap();

        assert_eq!(messages.text("header.contact"), Some("Contact"));
        assert_eq!(fetcher.source().kind(), "bundled");
        assert_eq!(fetcher.metrics().requests(), 1);
    }

    #[tokio::test]
    async fn test_bundled_source_missing_file_fails() {
        let dir = create_messages_dir();
        let fetcher = MessageFetcher::new(MessageSource::bundled(dir.path()), None);

        let err = fetcher.fetch(Locale::SPANISH).await.unwrap_err();

        assert_eq!(err.locale, Locale::SPANISH);
        assert!(matches!(err.cause, FetchFailure::Read { .. }));
        assert!(!err.cause.is_upstream());
        assert!(err.to_string().contains("es.json"));
        assert_eq!(fetcher.metrics().report().failures, 1);
    }

    #[tokio::test]
    async fn test_bundled_source_rejects_bad_files() {
        let dir = create_messages_dir();
        std::fs::write(dir.path().join("es.json"), "{ not json").unwrap();
        let fetcher = MessageFetcher::new(MessageSource::bundled(dir.path()), None);

        let err = fetcher.fetch(Locale::SPANISH).await.unwrap_err();
        assert!(matches!(err.cause, FetchFailure::Parse(_)));

        std::fs::write(dir.path().join("es.json"), "\"just a string\"").unwrap();
        let err = fetcher.fetch(Locale::SPANISH).await.unwrap_err();
        assert!(matches!(err.cause, FetchFailure::InvalidMapping(_)));
    }

    #[tokio::test]
    async fn test_bundled_source_is_cached() {
        let dir = create_messages_dir();
        let cache = Arc::new(MessageCache::new(Duration::from_secs(3600)));
        let fetcher = MessageFetcher::new(MessageSource::bundled(dir.path()), Some(cache));

        fetcher.fetch(Locale::ENGLISH).await.unwrap();
        // Served from cache even after the file is gone
        std::fs::remove_file(dir.path().join("en.json")).unwrap();
        fetcher.fetch(Locale::ENGLISH).await.unwrap();

        assert_eq!(fetcher.metrics().requests(), 1);
    }

    // ==================== Cache Tests ====================

    #[tokio::test]
    async fn test_cached_fetch_does_not_hit_network_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(english_messages()))
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(MessageCache::new(Duration::from_secs(3600)));
        let fetcher = fetcher(&server, Some(cache));

        let first = fetcher.fetch(Locale::ENGLISH).await.unwrap();
        let second = fetcher.fetch(Locale::ENGLISH).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        let report = fetcher.metrics().report();
        assert_eq!(report.requests, 1);
        assert_eq!(report.cache_hits, 1);
        assert_eq!(report.cache_misses, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(english_messages()))
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(MessageCache::new(Duration::from_secs(3600)));
        let stale =
            Arc::new(MessageMapping::from_value(json!({"about": {"title": "Stale"}})).unwrap());
        cache
            .insert_at(Locale::ENGLISH, stale, Utc::now() - TimeDelta::hours(2))
            .await;
        let fetcher = fetcher(&server, Some(Arc::clone(&cache)));

        let messages = fetcher.fetch(Locale::ENGLISH).await.unwrap();

        assert_eq!(messages.text("about.title"), Some("About me"));
        assert_eq!(fetcher.metrics().report().cache_misses, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_without_cache_every_fetch_hits_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(english_messages()))
            .expect(2)
            .mount(&server)
            .await;

        let fetcher = fetcher(&server, None);
        fetcher.fetch(Locale::ENGLISH).await.unwrap();
        fetcher.fetch(Locale::ENGLISH).await.unwrap();

        assert_eq!(fetcher.metrics().requests(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages/en"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/messages/en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(english_messages()))
            .mount(&server)
            .await;

        let cache = Arc::new(MessageCache::new(Duration::from_secs(3600)));
        let fetcher = fetcher(&server, Some(Arc::clone(&cache)));

        assert!(fetcher.fetch(Locale::ENGLISH).await.is_err());
        assert_eq!(cache.len().await, 0);

        assert!(fetcher.fetch(Locale::ENGLISH).await.is_ok());
        assert_eq!(cache.len().await, 1);
    }
}
