//! OpenAI-compatible chat-completions provider.
//!
//! Every contract is driven through the same chat endpoint with a JSON
//! response instruction; replies are parsed out of the message content, code
//! fences and all.

use crate::{
    ActionPlanner, ActionVerb, CandidateDoc, Classifier, FileMetadata, PlannedAction,
    ProviderError, Recommendation, RelevanceJudge,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
    pub summary_model: String,
}

#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    cfg: Arc<OpenAiConfig>,
}

impl OpenAiProvider {
    pub fn new(cfg: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            cfg: Arc::new(cfg),
        }
    }

    async fn chat(&self, model: &str, system: &str, user: &str) -> Result<String, ProviderError> {
        #[derive(serde::Serialize)]
        struct ChatMessage<'a> {
            role: &'static str,
            content: &'a str,
        }
        #[derive(serde::Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
        }
        #[derive(Deserialize)]
        struct ChatMessageResp {
            content: String,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChatMessageResp,
        }
        #[derive(Deserialize)]
        struct ChatApiResponse {
            choices: Vec<Choice>,
        }

        let body = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.cfg.base_url))
            .bearer_auth(&self.cfg.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let parsed: ChatApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::MalformedResponse("empty choices".into()))
    }
}

/// Pulls a JSON object out of a chat reply, tolerating code fences and prose
/// around it.
fn extract_json<T: DeserializeOwned>(content: &str) -> Result<T, ProviderError> {
    let trimmed = content.trim();
    let body = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => &trimmed[start..=end],
        _ => trimmed,
    };
    serde_json::from_str(body).map_err(|e| {
        debug!(content, "unparseable collaborator reply");
        ProviderError::MalformedResponse(e.to_string())
    })
}

fn candidate_listing(candidates: &[CandidateDoc]) -> String {
    candidates
        .iter()
        .map(|doc| format!("Description: {}, Filepath: \"{}\"", doc.description, doc.path))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Deserialize)]
struct KeywordPayload {
    word: Vec<String>,
}

#[derive(Deserialize)]
struct DocsPayload {
    docs: Vec<CandidateDoc>,
}

#[derive(Deserialize)]
struct PlanPayload {
    actions: Vec<PlannedAction>,
}

#[async_trait::async_trait]
impl Classifier for OpenAiProvider {
    async fn keywords(
        &self,
        text: &str,
        vocabulary: &[String],
    ) -> Result<Vec<String>, ProviderError> {
        let system = format!(
            "Infer what the user intends to do and select the key words from these tags: {}. \
             Do not generate your own tags; you must use the tags given and recommend relevant \
             ones for output. Respond only with JSON of the form {{\"word\": [\"tag\"]}}.",
            vocabulary.join(", ")
        );
        let content = self.chat(&self.cfg.chat_model, &system, text).await?;
        let payload: KeywordPayload = extract_json(&content)?;
        Ok(payload.word)
    }

    async fn file_metadata(
        &self,
        file_name: &str,
        vocabulary: &[String],
    ) -> Result<FileMetadata, ProviderError> {
        let system = "You are a smart file indexing assistant that classifies files for \
                      university students and researchers. Analyze the file name and infer what \
                      it represents. Use the list of known tags to stay consistent, but you may \
                      add new relevant ones. Respond only with JSON containing \"tags\" and \
                      \"description\" fields.";
        let user = format!(
            "Filename: \"{}\"\nExisting tags across all files: {}\n\nGenerate metadata now.",
            file_name,
            vocabulary.join(", ")
        );
        let content = self.chat(&self.cfg.chat_model, system, &user).await?;
        extract_json(&content)
    }

    async fn summarize(&self, text: &str) -> Result<String, ProviderError> {
        let system = "Generate exactly 5 words that summarize the following text. \
                      Be concise and descriptive.";
        let content = self.chat(&self.cfg.summary_model, system, text).await?;
        Ok(content.trim().to_string())
    }
}

#[async_trait::async_trait]
impl RelevanceJudge for OpenAiProvider {
    async fn select(
        &self,
        text: &str,
        candidates: &[CandidateDoc],
    ) -> Result<Vec<CandidateDoc>, ProviderError> {
        let system = format!(
            "You are selecting file paths that are relevant to what the user asked for. \
             Use the request to infer what other file paths the user will probably need to \
             finish the action. A file is related if its description or name includes topics, \
             keywords, or terms from the request, if it is from the same course, subject, or \
             semester, or if it represents materials that would logically accompany the request. \
             File paths are listed below; each line includes a description and its absolute path \
             in quotes. Only use these files; never invent or alter a path. Respond only with \
             JSON of the form {{\"docs\": [{{\"path\": \"...\", \"description\": \"...\"}}]}}.\n\n\
             The file paths are:\n{}",
            candidate_listing(candidates)
        );
        let content = self.chat(&self.cfg.chat_model, &system, text).await?;
        let payload: DocsPayload = extract_json(&content)?;
        Ok(payload.docs)
    }

    async fn recommend(
        &self,
        text: &str,
        candidates: &[CandidateDoc],
    ) -> Result<Recommendation, ProviderError> {
        let system = format!(
            "You are an intelligent file recommendation assistant analyzing text extracted from \
             the user's current screen. Use the text and the provided file paths to determine \
             what the user is working on and recommend files that would help them complete their \
             task. If the user is viewing an assignment, also suggest related lecture notes or \
             coursework; if viewing a lecture note, suggest a corresponding assignment. If no \
             file is clearly relevant, set output to: \"I couldn't find any files on your current \
             tab. Please try switching tabs.\" and filePaths to []. Provide a short 2 to 3 \
             sentence summary explaining what you recommended and why. Only use the file paths \
             listed below; do not invent new ones. Respond only with JSON of the form \
             {{\"output\": \"...\", \"filePaths\": [\"...\"]}}.\n\n{}",
            candidate_listing(candidates)
        );
        let content = self.chat(&self.cfg.chat_model, &system, text).await?;
        extract_json(&content)
    }
}

#[async_trait::async_trait]
impl ActionPlanner for OpenAiProvider {
    async fn plan(
        &self,
        text: &str,
        candidates: &[CandidateDoc],
    ) -> Result<Vec<PlannedAction>, ProviderError> {
        let system = format!(
            "You are a file operations planner with two verbs: \"open\" (open a file path with \
             its default application) and \"delete\" (remove a file path). You may only plan \
             actions on file paths explicitly listed below. Rules: only act on file paths that \
             appear exactly, verbatim, in the list; never invent, modify, guess, or generate \
             file paths; for requests like delete, remove, erase, or trash plan \"delete\"; for \
             requests like open, show, or view plan \"open\"; plan multiple actions if multiple \
             valid paths match; if no listed path matches the request, return an empty list. \
             Respond only with JSON of the form \
             {{\"actions\": [{{\"verb\": \"open\", \"path\": \"...\"}}]}}.\n\n\
             The file paths are:\n{}",
            candidate_listing(candidates)
        );
        let content = self.chat(&self.cfg.chat_model, &system, text).await?;
        let payload: PlanPayload = extract_json(&content)?;
        Ok(payload.actions)
    }
}
