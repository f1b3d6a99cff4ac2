//! HTTP transport for the research agent
//!
//! Accepts conversation envelopes, routes addressed events to the query
//! pipeline and answers with an envelope of outbound events.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::envelope::{
    DialogEvent, Envelope, Event, Manifest, Payload, EVENT_GET_MANIFESTS, EVENT_UTTERANCE,
};
use crate::models::ResearchQuery;
use crate::pipeline::QueryPipeline;

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<QueryPipeline>,
    pub manifest: Arc<Manifest>,
}

impl ApiState {
    pub fn new(pipeline: Arc<QueryPipeline>, manifest: Manifest) -> Self {
        Self {
            pipeline,
            manifest: Arc::new(manifest),
        }
    }

    fn speaker_uri(&self) -> &str {
        &self.manifest.identification.speaker_uri
    }

    fn service_url(&self) -> &str {
        &self.manifest.identification.service_url
    }
}

/// =============================
/// Health & Manifest Endpoints
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn manifest(State(state): State<ApiState>) -> Json<Manifest> {
    Json(state.manifest.as_ref().clone())
}

/// =============================
/// Envelope Endpoint
/// =============================

async fn handle_envelope(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<Payload>, JsonRejection>,
) -> Response {
    let envelope = match payload {
        Ok(Json(payload)) => payload.open_floor,
        Err(rejection) => {
            warn!("Rejected malformed envelope: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    if let Err(e) = envelope.validate() {
        warn!("Rejected invalid envelope: {}", e);
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    info!(
        conversation_id = %envelope.conversation.id,
        sender = %envelope.sender.speaker_uri,
        events = envelope.events.len(),
        "Received envelope"
    );

    // Run the core in its own task so a panic surfaces as a JoinError
    let task_state = state.clone();
    let outbound = tokio::spawn(async move { process_envelope(&task_state, &envelope).await }).await;

    match outbound {
        Ok(reply) => (StatusCode::OK, Json(Payload { open_floor: reply })).into_response(),
        Err(e) => {
            error!("Envelope processing aborted: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error while processing the request",
            )
        }
    }
}

/// Build the reply envelope for every event addressed to this agent.
pub async fn process_envelope(state: &ApiState, envelope: &Envelope) -> Envelope {
    let sender = envelope.sender.speaker_uri.as_str();
    let mut events = Vec::new();

    for event in &envelope.events {
        if !event.is_addressed_to(state.speaker_uri(), state.service_url()) {
            debug!(event_type = %event.event_type, "Skipping event addressed elsewhere");
            continue;
        }

        match event.event_type.as_str() {
            EVENT_GET_MANIFESTS => {
                info!("Publishing manifest");
                events.push(Event::publish_manifests(sender, &state.manifest));
            }
            EVENT_UTTERANCE => {
                let Some(dialog) = event.dialog_event() else {
                    continue;
                };
                let query = ResearchQuery::new(dialog.plain_text());
                let text = state.pipeline.answer(&query).await;
                events.push(Event::utterance(
                    sender,
                    DialogEvent::text(state.speaker_uri(), &text),
                ));
            }
            other => {
                debug!(event_type = %other, "Ignoring unsupported event");
            }
        }
    }

    envelope.reply(state.speaker_uri(), state.service_url(), events)
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/manifest", get(manifest))
        .route("/", post(handle_envelope))
        .route("/openfloor", post(handle_envelope))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Research agent listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
