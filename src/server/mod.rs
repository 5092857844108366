// SPDX-License-Identifier: MIT

//! HTTP surface
//!
//! - `GET /` - service description
//! - `GET /models` - the model catalog
//! - `POST /blogs` - generate a blog, optionally translated

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::blog::{BlogPipeline, BlogRequest};
use crate::config::Settings;
use crate::error::QuillError;
use crate::llm::catalog::{self, PROVIDER};
use crate::llm::ModelFactory;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    settings: Arc<Settings>,
    factory: Arc<dyn ModelFactory>,
}

impl AppState {
    pub fn new(settings: Settings, factory: Arc<dyn ModelFactory>) -> Self {
        Self {
            settings: Arc::new(settings),
            factory,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/models", get(list_models))
        .route("/blogs", post(create_blog))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(settings: Settings, factory: Arc<dyn ModelFactory>) -> Result<(), QuillError> {
    let addr = settings.bind_addr();
    let app = router(AppState::new(settings, factory));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Quill blog generator API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/blogs": "POST - Generate blog posts",
            "/models": "GET - List available models"
        }
    }))
}

async fn list_models() -> Json<Value> {
    Json(json!({ "models": catalog::available_models() }))
}

#[derive(Debug, Default, Deserialize)]
pub struct BlogBody {
    #[serde(default)]
    pub topic: String,
    pub language: Option<String>,
    pub model: Option<String>,
    pub provider: Option<String>,
    pub temperature: Option<f32>,
}

type Reply = (StatusCode, Json<Value>);

fn error_reply(status: StatusCode, error: impl ToString, model_used: &str) -> Reply {
    (
        status,
        Json(json!({ "error": error.to_string(), "model_used": model_used })),
    )
}

async fn create_blog(State(state): State<AppState>, Json(body): Json<BlogBody>) -> Reply {
    let model_used = body.model.unwrap_or_else(|| state.settings.model.clone());
    let provider = body.provider.as_deref().unwrap_or(PROVIDER);
    log::info!(
        "Generating blog with model: {}, provider: {}, language: {}",
        catalog::display_name(&model_used),
        provider,
        body.language.as_deref().unwrap_or("-")
    );

    if !catalog::is_supported_provider(provider) {
        let err = QuillError::UnsupportedProvider(provider.to_string());
        return error_reply(StatusCode::BAD_REQUEST, err, &model_used);
    }

    let request = match BlogRequest::new(body.topic, body.language.as_deref()) {
        Ok(request) => request,
        Err(e) => return error_reply(StatusCode::BAD_REQUEST, e, &model_used),
    };

    let temperature = body.temperature.unwrap_or(state.settings.temperature);
    let model = match state.factory.create(&model_used, temperature) {
        Ok(model) => model,
        Err(e) => {
            log::error!("Failed to initialize model {}: {}", model_used, e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": format!("Failed to initialize LLM: {}", e),
                    "message": "Please check your OPENAI_API_KEY in .env file",
                    "model_used": model_used
                })),
            );
        }
    };

    let pipeline = BlogPipeline::from_settings(model, &state.settings);
    match pipeline.generate(&request).await {
        Ok(final_state) => (
            StatusCode::OK,
            Json(json!({
                "data": final_state.to_json(),
                "model_used": model_used,
                "provider": PROVIDER
            })),
        ),
        Err(e) => {
            log::error!("Blog generation failed: {}", e);
            let status = if e.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            error_reply(status, e, &model_used)
        }
    }
}
