//! Collaborator contracts for the language-model services the agent calls.
//!
//! Three narrow interfaces: a [`Classifier`] that stays inside a given tag
//! vocabulary, a [`RelevanceJudge`] that may only echo candidate paths back
//! verbatim, and an [`ActionPlanner`] that maps a request's verb intent onto
//! those paths. Implementations are looked up by name through the
//! [`ProviderRegistry`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

pub mod noop;
pub mod openai;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not implemented")]
    NotImplemented,
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
}

/// A file surfaced by a tag match, shown to the judge as path + description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDoc {
    pub path: String,
    pub description: String,
}

/// Classifier output for one file name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileMetadata {
    pub tags: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionVerb {
    Open,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedAction {
    pub verb: ActionVerb,
    pub path: String,
}

/// Recommend-only result for the screen-text flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub output: String,
    #[serde(rename = "filePaths")]
    pub file_paths: Vec<String>,
}

#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    /// Picks keywords for a request, drawn only from the given vocabulary.
    async fn keywords(
        &self,
        text: &str,
        vocabulary: &[String],
    ) -> Result<Vec<String>, ProviderError>;

    /// Generates tags and a description for a file name.
    async fn file_metadata(
        &self,
        file_name: &str,
        vocabulary: &[String],
    ) -> Result<FileMetadata, ProviderError>;

    /// Compresses text into a five-word summary.
    async fn summarize(&self, text: &str) -> Result<String, ProviderError>;
}

#[async_trait::async_trait]
pub trait RelevanceJudge: Send + Sync {
    /// Selects the candidates relevant to `text`. Returned paths must be
    /// copied verbatim from the candidate list; callers drop anything else.
    async fn select(
        &self,
        text: &str,
        candidates: &[CandidateDoc],
    ) -> Result<Vec<CandidateDoc>, ProviderError>;

    /// Produces a recommendation message plus the candidate paths backing it.
    async fn recommend(
        &self,
        text: &str,
        candidates: &[CandidateDoc],
    ) -> Result<Recommendation, ProviderError>;
}

#[async_trait::async_trait]
pub trait ActionPlanner: Send + Sync {
    /// Maps the request's verb intent onto candidate paths. An empty plan
    /// means no listed path matched the request.
    async fn plan(
        &self,
        text: &str,
        candidates: &[CandidateDoc],
    ) -> Result<Vec<PlannedAction>, ProviderError>;
}

#[derive(Default, Clone)]
pub struct ProviderRegistry {
    classifiers: HashMap<String, Arc<dyn Classifier>>,
    judges: HashMap<String, Arc<dyn RelevanceJudge>>,
    planners: HashMap<String, Arc<dyn ActionPlanner>>,
    pub preferred: Option<String>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classifier(mut self, name: &str, provider: Arc<dyn Classifier>) -> Self {
        self.classifiers.insert(name.to_string(), provider);
        self
    }

    pub fn with_judge(mut self, name: &str, provider: Arc<dyn RelevanceJudge>) -> Self {
        self.judges.insert(name.to_string(), provider);
        self
    }

    pub fn with_planner(mut self, name: &str, provider: Arc<dyn ActionPlanner>) -> Self {
        self.planners.insert(name.to_string(), provider);
        self
    }

    pub fn set_preferred(mut self, name: &str) -> Self {
        self.preferred = Some(name.to_string());
        self
    }

    pub fn classifier(&self, name: Option<&str>) -> Result<Arc<dyn Classifier>, ProviderError> {
        let key = self.resolve_key(name, "no classifier configured")?;
        self.classifiers
            .get(&key)
            .cloned()
            .ok_or(ProviderError::UnknownProvider(key))
    }

    pub fn judge(&self, name: Option<&str>) -> Result<Arc<dyn RelevanceJudge>, ProviderError> {
        let key = self.resolve_key(name, "no relevance judge configured")?;
        self.judges
            .get(&key)
            .cloned()
            .ok_or(ProviderError::UnknownProvider(key))
    }

    pub fn planner(&self, name: Option<&str>) -> Result<Arc<dyn ActionPlanner>, ProviderError> {
        let key = self.resolve_key(name, "no action planner configured")?;
        self.planners
            .get(&key)
            .cloned()
            .ok_or(ProviderError::UnknownProvider(key))
    }

    fn resolve_key(&self, name: Option<&str>, missing: &str) -> Result<String, ProviderError> {
        name.map(str::to_string)
            .or_else(|| self.preferred.clone())
            .ok_or_else(|| ProviderError::UnknownProvider(missing.into()))
    }
}
