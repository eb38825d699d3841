use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::models::{ChatMessage, ChatRole};
use common::services::assistant::{ComponentAnalysis, GeneratedComponent, GenerationRequest};

use crate::models::{error_response, service_error, ApiError, ApiResponse};
use crate::AppState;

const MAX_DESIGN_SCREENSHOTS: usize = 5;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(chat))
        .route("/analyze-codebase", post(analyze_codebase))
        .route("/generate-code", post(generate_code))
        .route("/upload-design", post(upload_design))
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatResponse>>, ApiError> {
    if request.messages.is_empty() {
        return Err(error_response(400, "Messages array is required"));
    }

    let reply = state
        .assistant
        .chat(&request.messages, request.context.as_deref())
        .await
        .map_err(service_error)?;

    // Persist the exchange when the chat belongs to a project.
    if let Some(project_id) = request.project_id {
        let mut messages = request.messages;
        messages.push(ChatMessage {
            role: ChatRole::Assistant,
            content: reply.clone(),
            timestamp: Utc::now(),
        });
        state.projects.record_conversation(project_id, messages).await;
    }

    Ok(Json(ApiResponse::success(ChatResponse { response: reply })))
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub codebase: String,
}

async fn analyze_codebase(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<ComponentAnalysis>>, ApiError> {
    if request.codebase.trim().is_empty() {
        return Err(error_response(400, "Codebase is required"));
    }

    let analysis = state
        .assistant
        .analyze_codebase(&request.codebase)
        .await
        .map_err(service_error)?;
    Ok(Json(ApiResponse::success(analysis)))
}

async fn generate_code(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<ApiResponse<GeneratedComponent>>, ApiError> {
    if request.description.trim().is_empty() || request.target_components.is_empty() {
        return Err(error_response(
            400,
            "Description and target components are required",
        ));
    }

    let generated = state
        .assistant
        .generate_component(&request)
        .await
        .map_err(service_error)?;
    Ok(Json(ApiResponse::success(generated)))
}

#[derive(Serialize)]
pub struct DesignUploadResponse {
    pub analyses: Vec<String>,
    pub base64_images: Vec<String>,
    pub message: String,
}

async fn upload_design(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<DesignUploadResponse>>, ApiError> {
    let mut encoded = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| error_response(400, format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("screenshots") {
            continue;
        }
        if encoded.len() >= MAX_DESIGN_SCREENSHOTS {
            return Err(error_response(
                400,
                format!("at most {} screenshots are accepted", MAX_DESIGN_SCREENSHOTS),
            ));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| error_response(400, format!("failed to read screenshot: {}", e)))?;
        if bytes.len() as u64 > state.settings.upload.max_upload_bytes {
            return Err(error_response(413, "screenshot is too large"));
        }
        encoded.push(STANDARD.encode(&bytes));
    }

    if encoded.is_empty() {
        return Err(error_response(400, "At least one image file is required"));
    }

    let mut analyses = Vec::with_capacity(encoded.len());
    for image in &encoded {
        let analysis = state
            .assistant
            .describe_design(image)
            .await
            .map_err(service_error)?;
        analyses.push(analysis);
    }

    let message = format!("Successfully analyzed {} design image(s)", encoded.len());
    Ok(Json(ApiResponse::success(DesignUploadResponse {
        analyses,
        base64_images: encoded,
        message,
    })))
}
