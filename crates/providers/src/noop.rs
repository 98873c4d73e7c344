use crate::{
    ActionPlanner, CandidateDoc, Classifier, FileMetadata, PlannedAction, ProviderError,
    Recommendation, RelevanceJudge,
};

/// Offline fallback: indexes files without metadata and never selects or
/// plans anything.
#[derive(Debug, Default)]
pub struct NoopProvider;

#[async_trait::async_trait]
impl Classifier for NoopProvider {
    async fn keywords(
        &self,
        _text: &str,
        _vocabulary: &[String],
    ) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    async fn file_metadata(
        &self,
        _file_name: &str,
        _vocabulary: &[String],
    ) -> Result<FileMetadata, ProviderError> {
        Ok(FileMetadata::default())
    }

    async fn summarize(&self, _text: &str) -> Result<String, ProviderError> {
        Err(ProviderError::NotImplemented)
    }
}

#[async_trait::async_trait]
impl RelevanceJudge for NoopProvider {
    async fn select(
        &self,
        _text: &str,
        _candidates: &[CandidateDoc],
    ) -> Result<Vec<CandidateDoc>, ProviderError> {
        Ok(Vec::new())
    }

    async fn recommend(
        &self,
        _text: &str,
        _candidates: &[CandidateDoc],
    ) -> Result<Recommendation, ProviderError> {
        Err(ProviderError::NotImplemented)
    }
}

#[async_trait::async_trait]
impl ActionPlanner for NoopProvider {
    async fn plan(
        &self,
        _text: &str,
        _candidates: &[CandidateDoc],
    ) -> Result<Vec<PlannedAction>, ProviderError> {
        Ok(Vec::new())
    }
}
