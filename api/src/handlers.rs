use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::domain::tree::TreeNode;
use common::domain::view::{TreeView, ViewState};
use common::models::{ChatMessage, DesignInput, Project};
use common::services::codebase::TreeSource;
use common::services::projects::{NewDesignInput, NewProject, ProjectUpdate};

use crate::models::{error_response, service_error, ApiError, ApiResponse};
use crate::AppState;

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<Vec<Project>>> {
    Json(ApiResponse::success(state.projects.list_projects().await))
}

pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewProject>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state
        .projects
        .create_project(new)
        .await
        .map_err(service_error)?;
    Ok(Json(ApiResponse::success(project)))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state.projects.get_project(id).await.map_err(service_error)?;
    Ok(Json(ApiResponse::success(project)))
}

pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(update): Json<ProjectUpdate>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state
        .projects
        .update_project(id, update)
        .await
        .map_err(service_error)?;
    Ok(Json(ApiResponse::success(project)))
}

pub async fn upload_codebase(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| error_response(400, format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some("codebase") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("codebase.txt").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| error_response(400, format!("failed to read upload: {}", e)))?;
        upload = Some((file_name, bytes.to_vec()));
        break;
    }

    let Some((file_name, bytes)) = upload else {
        return Err(error_response(400, "a 'codebase' file field is required"));
    };
    if bytes.len() as u64 > state.settings.upload.max_upload_bytes {
        return Err(error_response(413, "uploaded file is too large"));
    }

    let project = state
        .projects
        .attach_codebase(id, &file_name, bytes)
        .await
        .map_err(service_error)?;
    Ok(Json(ApiResponse::success(project)))
}

#[derive(Serialize)]
pub struct TreeResponse {
    pub source: TreeSource,
    pub tree: Vec<TreeNode>,
}

pub async fn project_tree(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<TreeResponse>>, ApiError> {
    let (tree, source) = state
        .projects
        .project_tree(id)
        .await
        .map_err(service_error)?;
    Ok(Json(ApiResponse::success(TreeResponse { source, tree })))
}

#[derive(Deserialize)]
pub struct RowsQuery {
    #[serde(default)]
    pub filter: String,
    /// Comma-separated folder paths the client currently has open.
    #[serde(default)]
    pub expanded: String,
}

#[derive(Serialize)]
pub struct TreeRow {
    pub path: String,
    pub name: String,
    pub depth: usize,
    pub is_folder: bool,
}

/// Flattened visible rows. View state is client-owned and passed per
/// request; nothing about it is stored server-side.
pub async fn tree_rows(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<RowsQuery>,
) -> Result<Json<ApiResponse<Vec<TreeRow>>>, ApiError> {
    let (tree, _) = state
        .projects
        .project_tree(id)
        .await
        .map_err(service_error)?;

    let expanded: BTreeSet<String> = query
        .expanded
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();
    let view = TreeView::with_state(
        &tree,
        ViewState {
            expanded,
            selected: None,
            filter: query.filter,
        },
    );

    let rows = view
        .visible_nodes()
        .map(|row| TreeRow {
            name: row.node.name().to_string(),
            is_folder: row.node.is_folder(),
            path: row.path,
            depth: row.depth,
        })
        .collect();
    Ok(Json(ApiResponse::success(rows)))
}

pub async fn download_codebase(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let (name, bytes) = state
        .projects
        .download_codebase(id)
        .await
        .map_err(service_error)?;

    let file_name = name.strip_suffix(".zip").unwrap_or(&name);
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.zip\"", file_name),
            ),
        ],
        bytes,
    ))
}

#[derive(Serialize)]
pub struct ConversationResponse {
    pub messages: Vec<ChatMessage>,
}

pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Json<ApiResponse<ConversationResponse>> {
    let messages = state.projects.conversation_messages(project_id).await;
    Json(ApiResponse::success(ConversationResponse { messages }))
}

pub async fn create_design_input(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewDesignInput>,
) -> Result<Json<ApiResponse<DesignInput>>, ApiError> {
    let created = state
        .projects
        .create_design_input(input)
        .await
        .map_err(service_error)?;
    Ok(Json(ApiResponse::success(created)))
}

pub async fn list_design_inputs(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Json<ApiResponse<Vec<DesignInput>>> {
    Json(ApiResponse::success(
        state.projects.list_design_inputs(project_id).await,
    ))
}
