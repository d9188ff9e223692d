use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct GenerateRequest {
    /// Topic or free-form prompt to generate text for.
    pub topic: String,
    pub max_tokens: Option<u32>,
}

pub fn validate_generate_request(payload: &GenerateRequest) -> Result<(), AppError> {
    if payload.topic.trim().is_empty() {
        return Err(AppError::Validation("Topic is required".into()));
    }
    if let Some(max_tokens) = payload.max_tokens
        && !(1..=4096).contains(&max_tokens)
    {
        return Err(AppError::Validation(
            "max_tokens must be between 1 and 4096".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SummarizeRequest {
    pub content: String,
    pub title: Option<String>,
    /// Target summary length in characters.
    pub max_length: Option<u32>,
}

pub fn validate_summarize_request(payload: &SummarizeRequest) -> Result<(), AppError> {
    if payload.content.trim().is_empty() {
        return Err(AppError::Validation("Content is required".into()));
    }
    if let Some(max_length) = payload.max_length
        && !(1..=10_000).contains(&max_length)
    {
        return Err(AppError::Validation(
            "max_length must be between 1 and 10000".into(),
        ));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct AnswerRequest {
    /// Document content to answer from.
    pub content: String,
    pub question: String,
}

pub fn validate_answer_request(payload: &AnswerRequest) -> Result<(), AppError> {
    if payload.content.trim().is_empty() {
        return Err(AppError::Validation("Content is required".into()));
    }
    if payload.question.trim().is_empty() {
        return Err(AppError::Validation("Question is required".into()));
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SuggestTasksRequest {
    /// Project description to derive tasks from.
    pub project_description: String,
    pub workspace_context: Option<String>,
}

pub fn validate_suggest_tasks_request(payload: &SuggestTasksRequest) -> Result<(), AppError> {
    if payload.project_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Project description is required".into(),
        ));
    }
    Ok(())
}

/// One suggested task parsed out of the model's response. Fields beyond
/// the title are best-effort.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct TaskSuggestion {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TaskSuggestionsResponse {
    pub suggestions: Vec<TaskSuggestion>,
    /// Unparsed model output, kept so clients can recover when the
    /// suggestion array comes back empty.
    pub raw_response: String,
    pub model: String,
}

/// Extract the first JSON array from free-form model output. Anything
/// unparseable yields an empty list, never an error.
pub fn parse_task_suggestions(raw: &str) -> Vec<TaskSuggestion> {
    let Some(start) = raw.find('[') else {
        return Vec::new();
    };
    let Some(end) = raw.rfind(']') else {
        return Vec::new();
    };
    if end < start {
        return Vec::new();
    }
    serde_json::from_str(&raw[start..=end]).unwrap_or_default()
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct TagFileRequest {
    pub file_name: String,
    pub file_type: Option<String>,
    /// Optional excerpt of the file's content.
    pub content: Option<String>,
}

pub fn validate_tag_file_request(payload: &TagFileRequest) -> Result<(), AppError> {
    if payload.file_name.trim().is_empty() {
        return Err(AppError::Validation("File name is required".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AiTagsResponse {
    pub tags: Vec<String>,
    pub model: String,
}

/// Split a comma-separated tag line, dropping blanks.
pub fn parse_tag_line(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AiTextResponse {
    pub text: String,
    pub model: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AiStatusResponse {
    /// Whether an API key is configured.
    pub available: bool,
    pub model: String,
}
