use crate::protocol::error_shapes::openai_error_payload;

/// Error type shared by the request pipeline.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Auth error: {0}")]
    Auth(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Upstream error: status={status}, message={message}")]
    Upstream { status: u16, message: String },
    #[error("Stream Error: {0}")]
    Stream(String),
    #[error("Malformed upstream payload: {0}")]
    MalformedUpstreamPayload(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Broad error category for status code and error type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    InvalidRequest,
    Authentication,
    NotFound,
    MethodNotAllowed,
    BadGateway,
    ServerError,
}

impl GatewayError {
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            GatewayError::InvalidRequest(_) => ErrorCategory::InvalidRequest,
            GatewayError::Auth(_) => ErrorCategory::Authentication,
            GatewayError::NotFound(_) => ErrorCategory::NotFound,
            GatewayError::MethodNotAllowed(_) => ErrorCategory::MethodNotAllowed,
            GatewayError::UpstreamUnavailable(_)
            | GatewayError::Upstream { .. }
            | GatewayError::Stream(_)
            | GatewayError::MalformedUpstreamPayload(_) => ErrorCategory::BadGateway,
            GatewayError::Config(_) | GatewayError::Internal(_) => ErrorCategory::ServerError,
        }
    }

    /// HTTP status used when the error is reported before any stream bytes went out.
    ///
    /// Upstream chat failures pass the upstream status through; an out-of-range
    /// status falls back to `502`.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        if let GatewayError::Upstream { status, .. } = self {
            return http::StatusCode::from_u16(*status)
                .ok()
                .filter(|code| code.is_client_error() || code.is_server_error())
                .unwrap_or(http::StatusCode::BAD_GATEWAY);
        }
        http_status_for_category(self.category())
    }
}

// ---------------------------------------------------------------------------
// Category -> HTTP status code
// ---------------------------------------------------------------------------

fn http_status_for_category(cat: ErrorCategory) -> http::StatusCode {
    match cat {
        ErrorCategory::InvalidRequest => http::StatusCode::BAD_REQUEST,
        ErrorCategory::Authentication => http::StatusCode::UNAUTHORIZED,
        ErrorCategory::NotFound => http::StatusCode::NOT_FOUND,
        ErrorCategory::MethodNotAllowed => http::StatusCode::METHOD_NOT_ALLOWED,
        ErrorCategory::BadGateway => http::StatusCode::BAD_GATEWAY,
        ErrorCategory::ServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Format an error as (`status_code`, OpenAI-shaped JSON body).
#[must_use]
pub fn format_error(err: &GatewayError) -> (http::StatusCode, serde_json::Value) {
    let status = err.status_code();
    let body = openai_error_payload(err.category(), &err.to_string());
    (status, body)
}

// ---------------------------------------------------------------------------
// Axum integration
// ---------------------------------------------------------------------------

/// Convert a `GatewayError` into a non-streaming JSON error response.
#[must_use]
pub fn into_axum_response(err: &GatewayError) -> axum::response::Response {
    use axum::response::IntoResponse;
    let (status, body) = format_error(err);
    (status, axum::Json(body)).into_response()
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        into_axum_response(&self)
    }
}
