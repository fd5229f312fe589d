//! Network transport for the offline cache.
//!
//! ### Outcome model
//! - Any HTTP status, including 4xx/5xx, is a successful fetch.
//! - Only transport-level failures (connect, DNS, TLS, timeout, body read)
//!   are errors; these are what trigger the offline fallback.
//!
//! ### Limits
//! - Max redirects: 5
//! - Max body bytes: configurable (default 10MB)

pub mod url;

use bytes::Bytes;
use noor_core::{AppConfig, CapturedResponse, Error};
use reqwest::Url;
use reqwest::{Client, StatusCode, header};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use self::url::{UrlError, resolve};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "noor/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 10MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: 5,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The original URL requested
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Response body bytes
    pub bytes: Bytes,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Duplicate the response into its storable form.
    ///
    /// Headers whose values are not valid visible ASCII are dropped.
    pub fn capture(&self) -> CapturedResponse {
        let headers = self
            .headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect();

        CapturedResponse {
            url: self.final_url.to_string(),
            status: self.status.as_u16(),
            headers,
            body: self.bytes.to_vec(),
        }
    }
}

/// Something that can fetch a URL over the network.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Perform a GET request.
    ///
    /// Resolves with any HTTP status; errors only when no response was obtained.
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        (**self).fetch(url).await
    }
}

/// reqwest-backed transport.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::InvalidInput(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn transport_error(&self, url: &Url, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::FetchTimeout(format!("{url} after {}ms", self.config.timeout.as_millis()))
        } else {
            Error::Transport(format!("{url}: {err}"))
        }
    }
}

#[async_trait::async_trait]
impl Transport for FetchClient {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{len} bytes exceeds {}", self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let bytes = response.bytes().await.map_err(|e| self.transport_error(url, e))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "fetched {} -> {} status {} in {}ms ({} bytes)",
            url,
            final_url,
            status.as_u16(),
            fetch_ms,
            bytes.len()
        );

        Ok(FetchResponse { url: url.clone(), final_url, status, bytes, headers, fetch_ms })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "noor/0.1");
        assert_eq!(config.max_bytes, 10 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_capture_copies_status_headers_body() {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "text/css".parse().unwrap());
        let response = FetchResponse {
            url: Url::parse("http://127.0.0.1:5000/static/css/main.css").unwrap(),
            final_url: Url::parse("http://127.0.0.1:5000/static/css/main.css").unwrap(),
            status: StatusCode::OK,
            bytes: Bytes::from_static(b"body{}"),
            headers,
            fetch_ms: 3,
        };

        let captured = response.capture();
        assert_eq!(captured.status, 200);
        assert_eq!(captured.content_type(), Some("text/css"));
        assert_eq!(captured.body, b"body{}");
        assert_eq!(captured.url, "http://127.0.0.1:5000/static/css/main.css");
    }

    #[tokio::test]
    async fn test_error_status_is_a_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/missing");
                then.status(404).header("content-type", "application/json").body("{\"code\":404}");
            })
            .await;

        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let url = Url::parse(&server.url("/api/missing")).unwrap();
        let response = client.fetch(&url).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.bytes.as_ref(), b"{\"code\":404}");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let url = Url::parse("http://127.0.0.1:1/api/x").unwrap();

        let err = client.fetch(&url).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "got {err:?}");
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200).delay(Duration::from_millis(1500)).body("late");
            })
            .await;

        let config = FetchConfig { timeout: Duration::from_millis(200), ..Default::default() };
        let client = FetchClient::new(config).unwrap();
        let url = Url::parse(&server.url("/slow")).unwrap();

        let err = client.fetch(&url).await.unwrap_err();
        assert!(matches!(err, Error::FetchTimeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/big");
                then.status(200).body("0123456789");
            })
            .await;

        let config = FetchConfig { max_bytes: 4, ..Default::default() };
        let client = FetchClient::new(config).unwrap();
        let url = Url::parse(&server.url("/big")).unwrap();

        let err = client.fetch(&url).await.unwrap_err();
        assert!(matches!(err, Error::FetchTooLarge(_)));
    }
}
