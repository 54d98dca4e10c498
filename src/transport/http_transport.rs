use std::time::Duration;

use crate::config::ServerConfig;
use crate::error::GatewayError;

fn build_reqwest_client(
    pool_max_idle_per_host: usize,
    pool_idle_timeout: Option<Duration>,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<reqwest::Client, GatewayError> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(pool_max_idle_per_host)
        .pool_idle_timeout(pool_idle_timeout)
        .tcp_nodelay(true)
        .connect_timeout(connect_timeout)
        .read_timeout(read_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .map_err(|err| GatewayError::Config(format!("Failed to build HTTP client: {err}")))
}

/// HTTP client used for both upstream calls.
///
/// Streaming bodies can run for minutes, so there is no total request timeout; a
/// stalled upstream is caught by the per-read timeout instead.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with connection pooling and timeouts from the server config.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Config` when the TLS backend cannot be initialised.
    pub fn new(config: &ServerConfig) -> Result<Self, GatewayError> {
        let pool_idle_timeout = if config.http_pool_idle_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(config.http_pool_idle_timeout_secs))
        };

        let client = build_reqwest_client(
            config.http_pool_max_idle_per_host.max(1),
            pool_idle_timeout,
            Duration::from_secs(config.connect_timeout),
            Duration::from_secs(config.timeout),
        )?;
        Ok(Self { client })
    }

    /// Send a JSON `POST`. Only connection-level failures are errors here; the
    /// caller decides what a non-success status means.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::UpstreamUnavailable` when the request cannot be sent,
    /// or `GatewayError::Internal` if `body` fails to serialize.
    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &url::Url,
        headers: &http::HeaderMap,
        body: &T,
    ) -> Result<reqwest::Response, GatewayError> {
        let body = serde_json::to_vec(body)
            .map_err(|err| GatewayError::Internal(format!("Failed to encode request: {err}")))?;

        self.client
            .post(url.clone())
            .headers(headers.clone())
            .body(body)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(url = %url, error = %err, "upstream request failed");
                GatewayError::UpstreamUnavailable(format!("{}: {err}", url.path()))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_with_default_config() {
        assert!(HttpTransport::new(&ServerConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_idle_timeout_disables_idle_expiry() {
        let config = ServerConfig {
            http_pool_idle_timeout_secs: 0,
            http_pool_max_idle_per_host: 0,
            ..ServerConfig::default()
        };
        assert!(HttpTransport::new(&config).is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_is_upstream_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(&ServerConfig::default()).unwrap();
        let url = url::Url::parse(&format!("http://{addr}/session/create")).unwrap();
        let err = transport
            .post_json(&url, &http::HeaderMap::new(), &serde_json::json!({"title": "t"}))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UpstreamUnavailable(_)));
    }
}
