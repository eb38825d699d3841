mod assistant;
mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::openai::OpenAiClient;
use common::repositories::{
    InMemoryConversationRepository, InMemoryDesignInputRepository, InMemoryProjectRepository,
};
use common::services::assistant::{AssistantService, OpenAiAssistant};
use common::services::codebase::CodebaseService;
use common::services::projects::{ProjectService, ProjectServiceImpl};
use common::settings::Settings;

pub struct AppState {
    pub settings: Settings,
    pub projects: Arc<dyn ProjectService>,
    pub assistant: Arc<dyn AssistantService>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::new().expect("Failed to load configuration");

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "api=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let projects = Arc::new(InMemoryProjectRepository::new());
    let conversations = Arc::new(InMemoryConversationRepository::new());
    let design_inputs = Arc::new(InMemoryDesignInputRepository::new());
    common::sample::seed(projects.as_ref(), conversations.as_ref()).await;

    let codebase = CodebaseService::new(&settings);
    let project_service = Arc::new(ProjectServiceImpl::new(
        projects,
        conversations,
        design_inputs,
        codebase,
    ));

    let openai = OpenAiClient::new(&settings.ai)?;
    let assistant_service = Arc::new(OpenAiAssistant::new(openai));

    let state = Arc::new(AppState {
        settings: settings.clone(),
        projects: project_service,
        assistant: assistant_service,
    });

    let cors = build_cors(&settings);
    let app = app(state).layer(cors).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn app(state: Arc<AppState>) -> Router {
    let body_limit = state.settings.upload.max_upload_bytes as usize;

    Router::new()
        .route("/", get(|| async { "Webcraft API" }))
        .route(
            "/api/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/api/projects/:id",
            get(handlers::get_project).patch(handlers::update_project),
        )
        .route("/api/projects/:id/codebase", post(handlers::upload_codebase))
        .route("/api/projects/:id/tree", get(handlers::project_tree))
        .route("/api/projects/:id/tree/rows", get(handlers::tree_rows))
        .route(
            "/api/projects/:id/download",
            get(handlers::download_codebase),
        )
        .route(
            "/api/projects/:id/design-inputs",
            get(handlers::list_design_inputs),
        )
        .route(
            "/api/conversations/:project_id",
            get(handlers::get_conversation),
        )
        .route("/api/design-inputs", post(handlers::create_design_input))
        .nest("/api", assistant::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

fn build_cors(settings: &Settings) -> CorsLayer {
    let origin = settings
        .frontend_origin
        .as_ref()
        .and_then(|s| HeaderValue::from_str(s).ok());

    match (settings.debug, origin) {
        (false, Some(origin)) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
            ])
            .allow_methods([Method::GET, Method::POST, Method::PATCH]),
        _ => CorsLayer::permissive(),
    }
}
