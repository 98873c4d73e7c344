#![allow(dead_code)]

use agent_core::ops::AppLauncher;
use providers::{
    ActionPlanner, ActionVerb, CandidateDoc, Classifier, FileMetadata, PlannedAction,
    ProviderError, Recommendation, RelevanceJudge,
};
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared in-memory database, one per test, so every connection sees the
/// same data.
pub async fn test_pool(name: &str) -> SqlitePool {
    let url = format!("sqlite://file:{name}?mode=memory&cache=shared");
    let pool = storage::connect(&url).await.unwrap();
    storage::migrate(&pool).await.unwrap();
    pool
}

/// Classifier with canned replies and a call counter.
#[derive(Default)]
pub struct MockClassifier {
    pub keyword_reply: Vec<String>,
    pub metadata_reply: FileMetadata,
    pub summary_reply: Option<String>,
    pub fail_keywords: bool,
    pub fail_metadata: bool,
    pub metadata_calls: AtomicUsize,
}

impl MockClassifier {
    pub fn metadata_call_count(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Classifier for MockClassifier {
    async fn keywords(
        &self,
        _text: &str,
        _vocabulary: &[String],
    ) -> Result<Vec<String>, ProviderError> {
        if self.fail_keywords {
            return Err(ProviderError::RequestFailed("mock failure".into()));
        }
        Ok(self.keyword_reply.clone())
    }

    async fn file_metadata(
        &self,
        _file_name: &str,
        _vocabulary: &[String],
    ) -> Result<FileMetadata, ProviderError> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_metadata {
            return Err(ProviderError::RequestFailed("mock failure".into()));
        }
        Ok(self.metadata_reply.clone())
    }

    async fn summarize(&self, _text: &str) -> Result<String, ProviderError> {
        match &self.summary_reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(ProviderError::NotImplemented),
        }
    }
}

/// Judge that either echoes the shown candidates or returns a canned reply.
#[derive(Default)]
pub struct MockJudge {
    pub echo: bool,
    pub select_reply: Vec<CandidateDoc>,
    pub recommend_reply: Option<Recommendation>,
}

#[async_trait::async_trait]
impl RelevanceJudge for MockJudge {
    async fn select(
        &self,
        _text: &str,
        candidates: &[CandidateDoc],
    ) -> Result<Vec<CandidateDoc>, ProviderError> {
        if self.echo {
            Ok(candidates.to_vec())
        } else {
            Ok(self.select_reply.clone())
        }
    }

    async fn recommend(
        &self,
        _text: &str,
        _candidates: &[CandidateDoc],
    ) -> Result<Recommendation, ProviderError> {
        self.recommend_reply
            .clone()
            .ok_or(ProviderError::NotImplemented)
    }
}

/// Planner that either plans one verb over every candidate or returns a
/// canned plan.
#[derive(Default)]
pub struct MockPlanner {
    pub echo_verb: Option<ActionVerb>,
    pub plan_reply: Vec<PlannedAction>,
}

#[async_trait::async_trait]
impl ActionPlanner for MockPlanner {
    async fn plan(
        &self,
        _text: &str,
        candidates: &[CandidateDoc],
    ) -> Result<Vec<PlannedAction>, ProviderError> {
        match self.echo_verb {
            Some(verb) => Ok(candidates
                .iter()
                .map(|c| PlannedAction {
                    verb,
                    path: c.path.clone(),
                })
                .collect()),
            None => Ok(self.plan_reply.clone()),
        }
    }
}

/// Launcher that records nothing and never spawns a process.
#[derive(Debug, Default)]
pub struct NullLauncher;

impl AppLauncher for NullLauncher {
    fn launch(&self, _path: &Path) -> std::io::Result<()> {
        Ok(())
    }
}
