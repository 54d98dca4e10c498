use crate::config::UpstreamConfig;
use crate::error::GatewayError;

const SESSION_CREATE_PATH: &str = "session/create";
const CHAT_PATH: &str = "chat";

/// Upstream endpoints and headers resolved once at startup.
#[derive(Debug, Clone)]
pub struct PreparedUpstream {
    session_url: url::Url,
    chat_url: url::Url,
    headers: http::HeaderMap,
    language: String,
}

impl PreparedUpstream {
    /// Parse the configured base URL and header template.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Config` for an unparseable base URL or an invalid header.
    pub fn new(upstream: &UpstreamConfig) -> Result<Self, GatewayError> {
        let base = format!("{}/", upstream.base_url.trim_end_matches('/'));
        let base = url::Url::parse(&base)
            .map_err(|err| GatewayError::Config(format!("upstream.base_url: {err}")))?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|err| GatewayError::Config(format!("upstream.base_url: {err}")))
        };

        Ok(Self {
            session_url: join(SESSION_CREATE_PATH)?,
            chat_url: join(CHAT_PATH)?,
            headers: build_upstream_headers(upstream)?,
            language: upstream.language.clone(),
        })
    }

    #[must_use]
    pub fn session_url(&self) -> &url::Url {
        &self.session_url
    }

    #[must_use]
    pub fn chat_url(&self) -> &url::Url {
        &self.chat_url
    }

    #[must_use]
    pub fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }
}

/// Build the static header template sent with every upstream call.
///
/// `Content-Type: application/json` is always set; configured headers are added on top.
///
/// # Errors
///
/// Returns `GatewayError::Config` for a header name or value that is not valid HTTP.
pub fn build_upstream_headers(upstream: &UpstreamConfig) -> Result<http::HeaderMap, GatewayError> {
    let mut headers = http::HeaderMap::with_capacity(upstream.headers.len() + 1);
    headers.insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    for (name, value) in &upstream.headers {
        let header_name = http::HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| GatewayError::Config(format!("invalid upstream header name: {name}")))?;
        let header_value = http::HeaderValue::from_str(value)
            .map_err(|_| GatewayError::Config(format!("invalid value for upstream header {name}")))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}
