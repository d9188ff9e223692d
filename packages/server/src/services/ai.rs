//! Thin client for an OpenRouter-compatible chat-completions API.
//!
//! The proxy is stateless: no conversation history is stored, and upstream
//! failures never touch database or storage state.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::config::AiConfig;
use crate::error::AppError;

#[derive(Clone)]
pub struct AiClient {
    http: reqwest::Client,
    config: AiConfig,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl AiClient {
    pub fn new(config: AiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    /// Whether an API key is configured.
    pub fn is_available(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send one system + user prompt pair and return the first choice's text.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<String, AppError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(AppError::AiUnavailable)?;

        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "max_tokens": max_tokens,
        });

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("AI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "AI service returned status {status}"
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Malformed AI response: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Upstream("AI response contained no choices".into()))
    }

    pub async fn generate(&self, topic: &str, max_tokens: Option<u32>) -> Result<String, AppError> {
        self.complete(
            "You are a helpful writing assistant. Produce clear, well-structured \
             content for the given topic.",
            topic,
            max_tokens.unwrap_or(1024),
        )
        .await
    }

    pub async fn summarize(
        &self,
        content: &str,
        title: Option<&str>,
        max_length: Option<u32>,
    ) -> Result<String, AppError> {
        let target = max_length.unwrap_or(500);
        let prompt = match title {
            Some(title) => format!("Summarize the document \"{title}\":\n\n{content}"),
            None => format!("Summarize the following document:\n\n{content}"),
        };
        self.complete(
            &format!(
                "You are a summarization assistant. Summarize the user's document \
                 in roughly {target} characters or fewer."
            ),
            &prompt,
            1024,
        )
        .await
    }

    /// Ask for a JSON array of task suggestions. The caller parses the
    /// array out of the returned text.
    pub async fn suggest_tasks(
        &self,
        project_description: &str,
        workspace_context: Option<&str>,
    ) -> Result<String, AppError> {
        let context = workspace_context.unwrap_or("General project");
        let prompt = format!("Project: {project_description}\nContext: {context}");
        self.complete(
            "You are a project planning assistant. Derive 5-8 concrete tasks from \
             the user's project description. Respond with only a JSON array of \
             objects with keys \"title\", \"description\", \"priority\" (one of \
             low, medium, high, urgent), and \"estimated_hours\".",
            &prompt,
            800,
        )
        .await
    }

    /// Ask for a comma-separated tag line for a file.
    pub async fn tag_file(
        &self,
        file_name: &str,
        file_type: Option<&str>,
        content: Option<&str>,
    ) -> Result<String, AppError> {
        let mut prompt = format!("Filename: {file_name}");
        if let Some(file_type) = file_type {
            prompt.push_str(&format!("\nType: {file_type}"));
        }
        if let Some(content) = content {
            let excerpt: String = content.chars().take(500).collect();
            prompt.push_str(&format!("\nContent: {excerpt}"));
        }
        self.complete(
            "You are a file organization assistant. Suggest 3-5 short tags for \
             the described file. Respond with only the tags, separated by commas.",
            &prompt,
            100,
        )
        .await
    }

    pub async fn answer(&self, content: &str, question: &str) -> Result<String, AppError> {
        let prompt = format!("Document:\n\n{content}\n\nQuestion: {question}");
        self.complete(
            "You are a question answering assistant. Answer the question using only \
             the provided document. Say so when the document does not contain the answer.",
            &prompt,
            1024,
        )
        .await
    }
}
