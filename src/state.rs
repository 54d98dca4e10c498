mod request_id;

use bytes::Bytes;

use crate::auth::{authenticate, build_allowed_key_set, AllowedClientKeys};
use crate::config::AppConfig;
use crate::error::GatewayError;
use crate::routing::ModelRouter;
use crate::transport::{HttpTransport, PreparedUpstream};
use crate::util::unix_now_secs;

use request_id::RequestIdGenerator;

/// Shared application state accessible to all handlers. Read-only after startup.
pub struct AppState {
    pub config: AppConfig,
    pub transport: HttpTransport,
    pub model_router: ModelRouter,
    pub upstream: PreparedUpstream,
    allowed_client_keys: AllowedClientKeys,
    request_ids: RequestIdGenerator,
    models_response_body: Bytes,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: AppConfig,
        transport: HttpTransport,
        model_router: ModelRouter,
        upstream: PreparedUpstream,
        allowed_client_keys: AllowedClientKeys,
    ) -> Self {
        let models_response_body =
            build_models_response_body(&model_router, &config.models.owned_by);
        Self {
            config,
            transport,
            model_router,
            upstream,
            allowed_client_keys,
            request_ids: RequestIdGenerator::new(),
            models_response_body,
        }
    }

    /// Build every piece of state from a validated config.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Config` when the HTTP client or upstream endpoints cannot
    /// be prepared.
    pub fn from_config(config: AppConfig) -> Result<Self, GatewayError> {
        let transport = HttpTransport::new(&config.server)?;
        let upstream = PreparedUpstream::new(&config.upstream)?;
        let model_router = ModelRouter::new(&config);
        let allowed_client_keys = build_allowed_key_set(&config);
        Ok(Self::new(
            config,
            transport,
            model_router,
            upstream,
            allowed_client_keys,
        ))
    }

    /// Authenticate a request using the prebuilt key index.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Auth` when the API key is missing or invalid.
    pub fn authenticate(&self, headers: &http::HeaderMap) -> Result<(), GatewayError> {
        authenticate(headers, &self.allowed_client_keys)
    }

    #[must_use]
    pub fn next_request_id(&self) -> String {
        self.request_ids.next_request_id()
    }

    #[must_use]
    pub fn models_response_body(&self) -> Bytes {
        self.models_response_body.clone()
    }
}

/// Encoded once at startup, so every listed model shares the startup `created` stamp.
fn build_models_response_body(router: &ModelRouter, owned_by: &str) -> Bytes {
    let list = router.model_list(unix_now_secs(), owned_by);
    match serde_json::to_vec(&list) {
        Ok(body) => Bytes::from(body),
        Err(err) => {
            tracing::error!(error = %err, "failed to encode model list");
            Bytes::from_static(br#"{"object":"list","data":[]}"#)
        }
    }
}
