use axum::{Json, extract::State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::ai::{
    AiStatusResponse, AiTagsResponse, AiTextResponse, AnswerRequest, GenerateRequest,
    SuggestTasksRequest, SummarizeRequest, TagFileRequest, TaskSuggestionsResponse,
    parse_tag_line, parse_task_suggestions, validate_answer_request, validate_generate_request,
    validate_suggest_tasks_request, validate_summarize_request, validate_tag_file_request,
};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/v1/ai/generate",
    tag = "AI",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated text", body = AiTextResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upstream failure (UPSTREAM_ERROR)", body = ErrorBody),
        (status = 503, description = "No API key configured (AI_UNAVAILABLE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn generate(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<GenerateRequest>,
) -> Result<Json<AiTextResponse>, AppError> {
    validate_generate_request(&payload)?;

    let text = state.ai.generate(&payload.topic, payload.max_tokens).await?;

    Ok(Json(AiTextResponse {
        text,
        model: state.ai.model().to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/summarize",
    tag = "AI",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Summary", body = AiTextResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upstream failure (UPSTREAM_ERROR)", body = ErrorBody),
        (status = 503, description = "No API key configured (AI_UNAVAILABLE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn summarize(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SummarizeRequest>,
) -> Result<Json<AiTextResponse>, AppError> {
    validate_summarize_request(&payload)?;

    let text = state
        .ai
        .summarize(
            &payload.content,
            payload.title.as_deref(),
            payload.max_length,
        )
        .await?;

    Ok(Json(AiTextResponse {
        text,
        model: state.ai.model().to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/answer",
    tag = "AI",
    request_body = AnswerRequest,
    responses(
        (status = 200, description = "Answer grounded in the provided content", body = AiTextResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upstream failure (UPSTREAM_ERROR)", body = ErrorBody),
        (status = 503, description = "No API key configured (AI_UNAVAILABLE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn answer(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<AnswerRequest>,
) -> Result<Json<AiTextResponse>, AppError> {
    validate_answer_request(&payload)?;

    let text = state.ai.answer(&payload.content, &payload.question).await?;

    Ok(Json(AiTextResponse {
        text,
        model: state.ai.model().to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/suggest-tasks",
    tag = "AI",
    request_body = SuggestTasksRequest,
    responses(
        (status = 200, description = "Parsed task suggestions plus the raw model output", body = TaskSuggestionsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upstream failure (UPSTREAM_ERROR)", body = ErrorBody),
        (status = 503, description = "No API key configured (AI_UNAVAILABLE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn suggest_tasks(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SuggestTasksRequest>,
) -> Result<Json<TaskSuggestionsResponse>, AppError> {
    validate_suggest_tasks_request(&payload)?;

    let raw = state
        .ai
        .suggest_tasks(
            &payload.project_description,
            payload.workspace_context.as_deref(),
        )
        .await?;

    Ok(Json(TaskSuggestionsResponse {
        suggestions: parse_task_suggestions(&raw),
        raw_response: raw,
        model: state.ai.model().to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/ai/tag-file",
    tag = "AI",
    request_body = TagFileRequest,
    responses(
        (status = 200, description = "Suggested tags", body = AiTagsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 502, description = "Upstream failure (UPSTREAM_ERROR)", body = ErrorBody),
        (status = 503, description = "No API key configured (AI_UNAVAILABLE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn tag_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<TagFileRequest>,
) -> Result<Json<AiTagsResponse>, AppError> {
    validate_tag_file_request(&payload)?;

    let raw = state
        .ai
        .tag_file(
            &payload.file_name,
            payload.file_type.as_deref(),
            payload.content.as_deref(),
        )
        .await?;

    Ok(Json(AiTagsResponse {
        tags: parse_tag_line(&raw),
        model: state.ai.model().to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/ai/status",
    tag = "AI",
    responses(
        (status = 200, description = "AI proxy availability", body = AiStatusResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn status(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AiStatusResponse>, AppError> {
    Ok(Json(AiStatusResponse {
        available: state.ai.is_available(),
        model: state.ai.model().to_string(),
    }))
}
