use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::state::AppState;

/// Health check handler.
/// Returns JSON with status and a short config summary.
pub fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let config = &state.config;
    Json(json!({
        "status": "heck-gateway is running",
        "version": env!("CARGO_PKG_VERSION"),
        "config": {
            "models_count": state.model_router.aliases().len(),
            "default_model": config.models.default_alias,
            "client_keys_count": config.client_authentication.allowed_keys.len(),
            "log_level": config.features.log_level,
        }
    }))
}
