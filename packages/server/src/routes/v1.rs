use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/workspaces", workspace_routes())
        .nest("/tasks", task_routes())
        .nest("/files", file_routes())
        .nest("/documents", document_routes())
        .nest("/comments", comment_routes())
        .nest("/ai", ai_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me))
        .route("/profile", axum::routing::put(handlers::auth::update_profile))
}

fn workspace_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::workspace::list_workspaces).post(handlers::workspace::create_workspace),
        )
        .route(
            "/{id}",
            get(handlers::workspace::get_workspace)
                .put(handlers::workspace::update_workspace)
                .delete(handlers::workspace::delete_workspace),
        )
        .route("/{id}/stats", get(handlers::workspace::workspace_stats))
}

fn task_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::task::list_tasks).post(handlers::task::create_task),
        )
        .route(
            "/calendar/{year}/{month}",
            get(handlers::task::calendar_tasks),
        )
        .route(
            "/{id}",
            get(handlers::task::get_task)
                .put(handlers::task::update_task)
                .delete(handlers::task::delete_task),
        )
}

fn file_routes() -> Router<AppState> {
    let upload = Router::new()
        .route("/upload", post(handlers::file::upload_file))
        .layer(handlers::file::file_upload_body_limit());

    Router::new()
        .route("/", get(handlers::file::list_files))
        .route(
            "/{id}",
            get(handlers::file::get_file)
                .patch(handlers::file::update_file)
                .delete(handlers::file::delete_file),
        )
        .route("/{id}/download", get(handlers::file::download_file))
        .merge(upload)
}

fn document_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::document::list_documents).post(handlers::document::create_document),
        )
        .route(
            "/{id}",
            get(handlers::document::get_document)
                .put(handlers::document::update_document)
                .delete(handlers::document::delete_document),
        )
        .route("/search/{query}", get(handlers::document::search_documents))
}

fn comment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::comment::list_comments).post(handlers::comment::create_comment),
        )
        .route(
            "/{id}",
            axum::routing::put(handlers::comment::update_comment)
                .delete(handlers::comment::delete_comment),
        )
}

fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/generate", post(handlers::ai::generate))
        .route("/summarize", post(handlers::ai::summarize))
        .route("/answer", post(handlers::ai::answer))
        .route("/suggest-tasks", post(handlers::ai::suggest_tasks))
        .route("/tag-file", post(handlers::ai::tag_file))
        .route("/status", get(handlers::ai::status))
}
