use crate::badge::{BadgeSummary, NewBadge};
use crate::badge_service::{BadgeService, CreatedBadge};
use crate::config::ApiConfig;
use crate::error::BadgeError;
use crate::pages;
use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub badge_service: Arc<BadgeService>,
}

/// Error response envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Create the API router
pub fn create_router(state: AppState, config: &ApiConfig) -> Router {
    let cors = if config.cors_enabled {
        if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/", get(submission_form))
        .route("/badges", post(create_badge))
        .route("/badges/:id", get(get_badge))
        .route("/profile/:id", get(profile_page))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "lanyard"
    }))
}

/// Serve the attendee submission form
async fn submission_form() -> Html<String> {
    Html(pages::submission_form())
}

/// Create a badge from an attendee submission
#[instrument(skip(state, submission), fields(name = %submission.name))]
async fn create_badge(
    State(state): State<AppState>,
    Json(submission): Json<NewBadge>,
) -> Result<Json<CreatedBadge>, ApiError> {
    let created = state
        .badge_service
        .create(submission)
        .await
        .map_err(|e| api_error(e, "Failed to create badge"))?;

    Ok(Json(created))
}

/// Get a badge by identifier, projected to the public subset
#[instrument(skip(state))]
async fn get_badge(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BadgeSummary>, ApiError> {
    let summary = state
        .badge_service
        .lookup(&id)
        .await
        .map_err(|e| api_error(e, "Failed to retrieve badge"))?;

    Ok(Json(summary))
}

/// Render the public profile page for an identifier
#[instrument(skip(state))]
async fn profile_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, Html<String>) {
    match state.badge_service.fetch_record(&id).await {
        Ok(record) => (StatusCode::OK, Html(pages::profile(&record))),
        Err(BadgeError::NotFound) => {
            (StatusCode::NOT_FOUND, Html(pages::profile_not_found(&id)))
        }
        Err(e) => {
            error!(error = %e, id = %id, "Failed to render profile");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::profile_not_found(&id)),
            )
        }
    }
}

/// Map a service error to the API error envelope.
///
/// Client-facing errors carry their own message; store and encoding
/// failures are logged and replaced with an opaque one.
fn api_error(err: BadgeError, opaque_message: &str) -> ApiError {
    let status = match &err {
        BadgeError::MissingField(_) | BadgeError::DuplicateSubmission => StatusCode::BAD_REQUEST,
        BadgeError::NotFound => StatusCode::NOT_FOUND,
        BadgeError::Store(_) | BadgeError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "Request failed");
        opaque_message.to_string()
    } else {
        err.to_string()
    };

    (
        status,
        Json(ErrorResponse {
            error: message,
            code: err.code().to_string(),
        }),
    )
}

/// Start the HTTP server
pub async fn start_api_server(state: AppState, config: &ApiConfig) -> Result<()> {
    let router = create_router(state, config);
    let addr = format!("{}:{}", config.host, config.port);

    info!(address = %addr, "Starting badge API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, router)
        .await
        .context("API server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet_store::MemoryStore;

    fn state(store: MemoryStore) -> AppState {
        AppState {
            badge_service: Arc::new(BadgeService::new(
                Arc::new(store),
                "http://localhost:8080",
            )),
        }
    }

    fn submission() -> NewBadge {
        NewBadge {
            name: "Ada".to_string(),
            university: "X".to_string(),
            major: "CS".to_string(),
            graduation_date: "2025-05".to_string(),
            github: Some("ada".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_then_fetch_round_trip() {
        let state = state(MemoryStore::new(Vec::new()));

        let Json(created) = create_badge(State(state.clone()), Json(submission()))
            .await
            .unwrap();
        assert!(created.profile_url.ends_with(&format!("/profile/{}", created.id)));

        let Json(summary) = get_badge(State(state.clone()), Path(created.id.clone()))
            .await
            .unwrap();
        assert_eq!(summary.name, "Ada");
        assert_eq!(summary.profile_url, created.profile_url);

        let (status, Html(html)) = profile_page(State(state), Path(created.id)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Ada"));
    }

    #[tokio::test]
    async fn test_duplicate_submission_maps_to_400() {
        let state = state(MemoryStore::new(Vec::new()));

        create_badge(State(state.clone()), Json(submission()))
            .await
            .unwrap();
        let (status, Json(body)) = create_badge(State(state), Json(submission()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "DUPLICATE_SUBMISSION");
        assert_eq!(body.error, "User has already generated a badge");
    }

    #[tokio::test]
    async fn test_validation_failure_maps_to_400() {
        let state = state(MemoryStore::new(Vec::new()));

        let invalid = NewBadge {
            name: String::new(),
            ..submission()
        };
        let (status, Json(body)) = create_badge(State(state), Json(invalid))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_badge_maps_to_404() {
        let state = state(MemoryStore::new(Vec::new()));

        let (status, Json(body)) = get_badge(State(state.clone()), Path("999".to_string()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "NOT_FOUND");

        let (status, Html(html)) = profile_page(State(state), Path("999".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("Profile not found"));
    }

    #[tokio::test]
    async fn test_store_failure_is_opaque_500() {
        let state = state(MemoryStore::unavailable());

        let (status, Json(body)) = create_badge(State(state), Json(submission()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "Failed to create badge");
        assert_eq!(body.code, "STORE_ERROR");
    }
}
