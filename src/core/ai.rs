//! Language-model summaries of a diff: analysis, commit messages, PR
//! descriptions, improvement suggestions and explanations.
//!
//! Every action is one blocking chat-completion request bounded by
//! [`AiConfig::timeout`]. The transport sits behind [`Completion`] so the
//! service can be driven without a network.

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::core::{FileDiff, LineKind};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the model.
pub const MODEL_ENV: &str = "OPENAI_MODEL";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-5-nano-2025-08-07";
/// API base used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Wall-clock bound on one request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_COMPLETION_TOKENS: u32 = 4000;

/// Errors from AI requests.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AiError {
    /// No API key in the environment.
    #[error("OPENAI_API_KEY environment variable not set")]
    MissingApiKey,
    /// The request did not finish in time.
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    /// The API answered with an error status.
    #[error("API returned HTTP {0}")]
    Status(u16),
    /// Connection or transfer failure.
    #[error("request failed: {0}")]
    Request(String),
    /// The response body was not a chat completion.
    #[error("invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
    /// The completion had no choices or blank content.
    #[error("no response from AI service")]
    EmptyResponse,
}

/// Connection settings for the chat-completion API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiConfig {
    /// Bearer token.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// API base URL without a trailing slash.
    pub base_url: String,
    /// Cap on generated tokens.
    pub max_completion_tokens: u32,
    /// Bound on each request.
    pub timeout: Duration,
}

impl AiConfig {
    /// Read settings from `OPENAI_API_KEY`, `OPENAI_MODEL` and
    /// `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self, AiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AiError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get(API_KEY_ENV).ok_or(AiError::MissingApiKey)?;
        let base_url = get(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            model: get(MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_completion_tokens: MAX_COMPLETION_TOKENS,
            timeout: REQUEST_TIMEOUT,
        })
    }
}

/// Sends one prompt and returns the model's reply.
pub trait Completion: Send + Sync {
    /// Complete `prompt`.
    fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_completion_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAiClient {
    agent: ureq::Agent,
    config: AiConfig,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl OpenAiClient {
    /// Client with a global timeout of `config.timeout`.
    pub fn new(config: AiConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .build()
            .into();
        Self { agent, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }
}

impl Completion for OpenAiClient {
    fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let _timer = crate::metrics::Timer::start("ai_request");

        let body = serde_json::to_string(&ChatRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_completion_tokens: self.config.max_completion_tokens,
        })?;
        let auth = format!("Bearer {}", self.config.api_key);

        let mut response = self
            .agent
            .post(self.endpoint().as_str())
            .header("Authorization", auth.as_str())
            .header("Content-Type", "application/json")
            .send(body.as_bytes())
            .map_err(|e| self.map_error(e))?;
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| self.map_error(e))?;

        parse_completion(&text)
    }
}

impl OpenAiClient {
    fn map_error(&self, err: ureq::Error) -> AiError {
        match err {
            ureq::Error::Timeout(_) => AiError::Timeout(self.config.timeout),
            ureq::Error::StatusCode(code) => AiError::Status(code),
            other => AiError::Request(other.to_string()),
        }
    }
}

/// First choice's message text from a chat-completion response body.
fn parse_completion(body: &str) -> Result<String, AiError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(AiError::EmptyResponse)
}

/// Structured result of [`AiService::analyze_diff`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Short overview.
    pub summary: String,
    /// Suggested improvements.
    pub improvements: Vec<String>,
    /// Suspected bugs.
    pub issues: Vec<String>,
    /// Notes on complex changes.
    pub explanations: Vec<String>,
    /// Suggested commit message.
    pub commit_message: String,
    /// Suggested PR description.
    pub pr_description: String,
    /// Overall quality assessment.
    pub code_quality: String,
    /// Security observations.
    pub security_notes: Vec<String>,
    /// Performance observations.
    pub performance_notes: Vec<String>,
}

impl AnalysisResult {
    /// Result for a reply that carried no usable JSON object.
    fn from_plain(response: &str) -> Self {
        Self {
            summary: response.to_string(),
            explanations: vec![response.to_string()],
            commit_message: "Update code".to_string(),
            pr_description: response.to_string(),
            code_quality: "Unknown".to_string(),
            ..Default::default()
        }
    }

    /// Plain-text report, sections in a fixed order, empty ones left out.
    pub fn report(&self) -> String {
        let mut out = String::new();
        push_section(&mut out, "Summary", &self.summary);
        push_section(&mut out, "Code Quality", &self.code_quality);
        push_list(&mut out, "Issues Found", &self.issues);
        push_list(&mut out, "Improvement Suggestions", &self.improvements);
        push_list(&mut out, "Security Notes", &self.security_notes);
        push_list(&mut out, "Performance Notes", &self.performance_notes);
        push_section(&mut out, "Suggested Commit Message", &self.commit_message);
        push_section(&mut out, "PR Description", &self.pr_description);
        out.trim_end().to_string()
    }
}

fn push_section(out: &mut String, title: &str, body: &str) {
    if !body.is_empty() {
        let _ = writeln!(out, "{title}:\n{body}\n");
    }
}

fn push_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title}:");
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "  {}. {item}", i + 1);
    }
    out.push('\n');
}

/// One AI action, as offered in the interactive menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiTask {
    /// Full analysis.
    Analyze,
    /// Conventional commit message.
    CommitMessage,
    /// Pull request description.
    PrDescription,
    /// Improvement suggestions.
    Improvements,
    /// Explanation of the changes.
    Explain,
}

impl AiTask {
    /// Every task, in menu order.
    pub const ALL: [AiTask; 5] = [
        Self::Analyze,
        Self::CommitMessage,
        Self::PrDescription,
        Self::Improvements,
        Self::Explain,
    ];

    /// Menu key.
    pub fn key(self) -> char {
        match self {
            Self::Analyze => 'a',
            Self::CommitMessage => 'c',
            Self::PrDescription => 'p',
            Self::Improvements => 'i',
            Self::Explain => 'e',
        }
    }

    /// Task bound to `key`.
    pub fn from_key(key: char) -> Option<Self> {
        Self::ALL.into_iter().find(|task| task.key() == key)
    }

    /// Human-readable title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Analyze => "Analysis",
            Self::CommitMessage => "Commit message",
            Self::PrDescription => "PR description",
            Self::Improvements => "Improvements",
            Self::Explain => "Explanation",
        }
    }

    /// Run the task and render its result as text.
    pub fn run(self, service: &AiService, files: &[FileDiff]) -> Result<String, AiError> {
        match self {
            Self::Analyze => service.analyze_diff(files).map(|r| r.report()),
            Self::CommitMessage => service.generate_commit_message(files),
            Self::PrDescription => service.generate_pr_description(files),
            Self::Improvements => service.suggest_improvements(files).map(|items| {
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| format!("{}. {item}", i + 1))
                    .collect::<Vec<_>>()
                    .join("\n")
            }),
            Self::Explain => service.explain_changes(files),
        }
    }
}

/// AI actions over parsed diffs.
pub struct AiService {
    client: Box<dyn Completion>,
}

impl std::fmt::Debug for AiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiService").finish_non_exhaustive()
    }
}

impl AiService {
    /// Service over any completion backend.
    pub fn new(client: impl Completion + 'static) -> Self {
        Self {
            client: Box::new(client),
        }
    }

    /// Service talking to the configured OpenAI-compatible API.
    pub fn from_config(config: AiConfig) -> Self {
        Self::new(OpenAiClient::new(config))
    }

    /// Structured analysis. A reply without a JSON object still yields a
    /// result carrying the raw text.
    pub fn analyze_diff(&self, files: &[FileDiff]) -> Result<AnalysisResult, AiError> {
        if files.is_empty() {
            return Ok(AnalysisResult::default());
        }
        let prompt = analysis_prompt(&diff_content(files));
        let response = self.client.complete(&prompt)?;
        Ok(parse_analysis_response(&response))
    }

    /// Conventional commit message for the changes.
    pub fn generate_commit_message(&self, files: &[FileDiff]) -> Result<String, AiError> {
        if files.is_empty() {
            return Ok("No changes to commit".to_string());
        }
        self.ask(commit_prompt(&diff_content(files)))
    }

    /// PR description for the changes.
    pub fn generate_pr_description(&self, files: &[FileDiff]) -> Result<String, AiError> {
        if files.is_empty() {
            return Ok("No changes to describe".to_string());
        }
        self.ask(pr_prompt(&diff_content(files)))
    }

    /// PR description for raw branch diff text, naming both branches.
    pub fn generate_pr_description_with_branches(
        &self,
        diff: &str,
        source: &str,
        target: &str,
    ) -> Result<String, AiError> {
        if diff.is_empty() {
            return Ok("No changes to describe".to_string());
        }
        self.ask(branch_pr_prompt(diff, source, target))
    }

    /// One suggestion per non-empty reply line. Lines starting with `-`
    /// are dropped.
    pub fn suggest_improvements(&self, files: &[FileDiff]) -> Result<Vec<String>, AiError> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .complete(&improvements_prompt(&diff_content(files)))?;
        Ok(response
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('-'))
            .map(str::to_string)
            .collect())
    }

    /// Prose explanation of the changes.
    pub fn explain_changes(&self, files: &[FileDiff]) -> Result<String, AiError> {
        if files.is_empty() {
            return Ok("No changes to explain".to_string());
        }
        self.ask(explain_prompt(&diff_content(files)))
    }

    fn ask(&self, prompt: String) -> Result<String, AiError> {
        Ok(self.client.complete(&prompt)?.trim().to_string())
    }
}

/// Readable rendering of parsed diffs sent along with each prompt.
pub fn diff_content(files: &[FileDiff]) -> String {
    let mut out = String::new();
    for file in files {
        let _ = writeln!(out, "File: {}", file.new_path);
        let status = if file.is_new {
            "New file".to_string()
        } else if file.is_deleted {
            "Deleted file".to_string()
        } else if file.is_renamed {
            format!("Renamed from {}", file.old_path)
        } else {
            "Modified".to_string()
        };
        let _ = writeln!(out, "Status: {status}\n");

        for hunk in &file.hunks {
            let _ = writeln!(
                out,
                "@@ -{},{} +{},{} @@",
                hunk.old_start, hunk.old_line_count, hunk.new_start, hunk.new_line_count
            );
            for line in &hunk.lines {
                let prefix = match line.kind {
                    LineKind::Added => "+",
                    LineKind::Deleted => "-",
                    LineKind::Unchanged => " ",
                    LineKind::Context => "",
                };
                let _ = writeln!(out, "{prefix}{}", line.content);
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn analysis_prompt(diff: &str) -> String {
    format!(
        "Analyze this git diff. Reply with a JSON object with the keys summary, \
         improvements, issues, explanations, commit_message, pr_description, \
         code_quality, security_notes and performance_notes.\n\n{diff}"
    )
}

fn commit_prompt(diff: &str) -> String {
    format!("Write a conventional commit message for this git diff.\n\n{diff}")
}

fn pr_prompt(diff: &str) -> String {
    format!("Write a pull request description for this git diff.\n\n{diff}")
}

fn branch_pr_prompt(diff: &str, source: &str, target: &str) -> String {
    format!(
        "Write a pull request description for merging \"{source}\" into \"{target}\".\n\n\
         Git diff from {source} to {target}:\n{diff}"
    )
}

fn improvements_prompt(diff: &str) -> String {
    format!("List improvement suggestions for this git diff, one per line.\n\n{diff}")
}

fn explain_prompt(diff: &str) -> String {
    format!("Explain the changes in this git diff.\n\n{diff}")
}

/// Parse an analysis reply. The outermost `{...}` is read as JSON; string
/// fields that themselves hold JSON are reduced to a readable message.
pub fn parse_analysis_response(response: &str) -> AnalysisResult {
    let trimmed = response.trim();
    let object = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => return AnalysisResult::from_plain(response),
    };
    let map = match serde_json::from_str::<Value>(object) {
        Ok(Value::Object(map)) => map,
        _ => return AnalysisResult::from_plain(response),
    };

    AnalysisResult {
        summary: sanitize_field(&string_field(&map, "summary"), "Summary"),
        improvements: list_field(&map, "improvements"),
        issues: list_field(&map, "issues"),
        explanations: list_field(&map, "explanations"),
        commit_message: string_field(&map, "commit_message"),
        pr_description: sanitize_field(&string_field(&map, "pr_description"), "PR Description"),
        code_quality: string_field(&map, "code_quality"),
        security_notes: list_field(&map, "security_notes"),
        performance_notes: list_field(&map, "performance_notes"),
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// String entries of an array field; other entries are skipped.
fn list_field(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Reduce a field that holds a JSON object to its most useful string.
fn sanitize_field(field: &str, name: &str) -> String {
    if !field.trim_start().starts_with('{') {
        return field.to_string();
    }
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(field) {
        for key in ["summary", "description", "message", "content", "text"] {
            if let Some(text) = map.get(key).and_then(Value::as_str) {
                if !text.is_empty() {
                    return text.to_string();
                }
            }
        }
    }
    format!("{name} generated successfully")
}
