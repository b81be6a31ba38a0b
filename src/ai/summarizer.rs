use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{SummaryLength, SummaryOptions, SummaryType};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-3.5-turbo";
const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 12_000;
const TRUNCATION_MARKER: &str = "...[content truncated]";
const NO_SUMMARY: &str = "No summary generated";

const SYSTEM_PROMPT: &str = "You are a helpful assistant that creates clear, accurate summaries of web page content. Focus on the main ideas and important information while maintaining readability.";

/// Words in an API error that mean the user has to fix their settings.
const CREDENTIAL_ERROR_KEYWORDS: [&str; 8] = [
    "api key",
    "authentication",
    "401",
    "invalid",
    "quota",
    "limit",
    "unauthorized",
    "forbidden",
];

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct Summarizer {
    client: Client,
    endpoint: String,
    max_content_chars: usize,
}

impl Summarizer {
    pub fn new(timeout: Duration, max_content_chars: usize) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: OPENAI_API_URL.to_string(),
            max_content_chars,
        })
    }

    pub async fn summarize(
        &self,
        content: &str,
        api_key: &str,
        options: &SummaryOptions,
    ) -> Result<String> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::SummaryApi(
                "No content provided for summarization".to_string(),
            ));
        }
        if !api_key.starts_with("sk-") {
            return Err(AppError::SummaryApi(
                "Valid OpenAI API key is required".to_string(),
            ));
        }

        let content = truncate_content(content, self.max_content_chars);
        let request = ChatRequest {
            model: OPENAI_MODEL.to_string(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: build_prompt(&content, options),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        tracing::debug!("Requesting summary of {} chars", content.len());
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("API request failed: {}", status.as_u16()));
            return Err(AppError::SummaryApi(message));
        }

        let chat: ChatResponse = response.json().await?;
        let summary = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| NO_SUMMARY.to_string());

        Ok(summary)
    }

    pub fn model_version(&self) -> &'static str {
        OPENAI_MODEL
    }
}

/// Keep at most `max_chars` characters, marking the cut.
fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}

fn build_prompt(content: &str, options: &SummaryOptions) -> String {
    let length = match options.length {
        SummaryLength::Short => "1-2 paragraphs",
        SummaryLength::Medium => "3-4 paragraphs",
        SummaryLength::Detailed => "5 or more paragraphs",
    };
    let style = match options.summary_type {
        SummaryType::KeyPoints => "a list of key points and takeaways.",
        SummaryType::Narrative => "a smooth, narrative-style summary.",
        SummaryType::Technical => "a detailed, technical summary focusing on data and facts.",
    };

    format!(
        "Summarize the following content in about {}.\nProvide the summary as {}\nThe summary must be in {}.\n\nContent to summarize:\n---\n{}\n---",
        length, style, options.language, content
    )
}

/// Whether an error points at the API key or account rather than the page.
pub fn is_credential_error(err: &AppError) -> bool {
    let message = err.to_string().to_lowercase();
    CREDENTIAL_ERROR_KEYWORDS
        .iter()
        .any(|keyword| message.contains(keyword))
}
