pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
pub mod utils;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Larkhub API",
        version = "1.0.0",
        description = "Workspace collaboration API: workspaces, tasks, files, documents, comments"
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::auth::update_profile,
        handlers::workspace::list_workspaces,
        handlers::workspace::get_workspace,
        handlers::workspace::create_workspace,
        handlers::workspace::update_workspace,
        handlers::workspace::delete_workspace,
        handlers::workspace::workspace_stats,
        handlers::task::list_tasks,
        handlers::task::calendar_tasks,
        handlers::task::get_task,
        handlers::task::create_task,
        handlers::task::update_task,
        handlers::task::delete_task,
        handlers::file::list_files,
        handlers::file::get_file,
        handlers::file::upload_file,
        handlers::file::download_file,
        handlers::file::update_file,
        handlers::file::delete_file,
        handlers::document::list_documents,
        handlers::document::get_document,
        handlers::document::create_document,
        handlers::document::update_document,
        handlers::document::delete_document,
        handlers::document::search_documents,
        handlers::comment::list_comments,
        handlers::comment::create_comment,
        handlers::comment::update_comment,
        handlers::comment::delete_comment,
        handlers::ai::generate,
        handlers::ai::summarize,
        handlers::ai::answer,
        handlers::ai::suggest_tasks,
        handlers::ai::tag_file,
        handlers::ai::status,
    ),
    tags(
        (name = "Auth", description = "Authentication and profile management"),
        (name = "Workspaces", description = "Workspace CRUD and statistics"),
        (name = "Tasks", description = "Task CRUD with filters"),
        (name = "Files", description = "File upload, download, and metadata"),
        (name = "Documents", description = "Versioned documents and search"),
        (name = "Comments", description = "Threaded task comments"),
        (name = "AI", description = "Stateless AI proxy"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(config: &config::CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(config.max_age));

    if config.allow_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allow_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);
    let api = ApiDoc::openapi();

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}
