//! Two-stage retrieval state machine.
//!
//! `Start → KeywordExtraction → CandidateFetch → CandidateFilter → Done`.
//! Stage A narrows free text to keywords drawn from the existing tag
//! vocabulary; stage B fetches tag matches and has the relevance judge pick
//! a verbatim subset. Any collaborator failure fails the whole run.

use crate::error::Error;
use crate::index::TagIndex;
use providers::{CandidateDoc, Classifier, RelevanceJudge};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Pipeline states; each carries exactly what its transition needs.
#[derive(Debug)]
pub enum PipelineState {
    Start,
    KeywordExtraction,
    CandidateFetch { keywords: Vec<String> },
    CandidateFilter { candidates: Vec<CandidateDoc> },
    Done { selected: Vec<CandidateDoc> },
}

pub struct RetrievalPipeline {
    index: TagIndex,
    classifier: Arc<dyn Classifier>,
    judge: Arc<dyn RelevanceJudge>,
}

impl RetrievalPipeline {
    pub fn new(
        index: TagIndex,
        classifier: Arc<dyn Classifier>,
        judge: Arc<dyn RelevanceJudge>,
    ) -> Self {
        Self {
            index,
            classifier,
            judge,
        }
    }

    /// Runs the state machine to completion. No retries, no partial results.
    pub async fn run(&self, query: &str) -> Result<Vec<CandidateDoc>, Error> {
        let mut state = PipelineState::Start;
        loop {
            state = self.step(query, state).await?;
            if let PipelineState::Done { selected } = state {
                return Ok(selected);
            }
        }
    }

    async fn step(&self, query: &str, state: PipelineState) -> Result<PipelineState, Error> {
        match state {
            PipelineState::Start => Ok(PipelineState::KeywordExtraction),

            PipelineState::KeywordExtraction => {
                let vocabulary = self.index.all_tags().await?;
                let raw = self.classifier.keywords(query, &vocabulary).await?;
                // The classifier is told to stay inside the vocabulary;
                // anything it invents anyway is discarded here.
                let known: HashSet<&str> = vocabulary.iter().map(String::as_str).collect();
                let mut seen = HashSet::new();
                let keywords: Vec<String> = raw
                    .into_iter()
                    .filter(|word| known.contains(word.as_str()) && seen.insert(word.clone()))
                    .collect();
                debug!(?keywords, "keywords extracted");
                Ok(PipelineState::CandidateFetch { keywords })
            }

            PipelineState::CandidateFetch { keywords } => {
                // Zero keywords necessarily fetches zero candidates; there is
                // no fallback to full enumeration.
                let records = self.index.find_by_tags(&keywords).await?;
                let candidates: Vec<CandidateDoc> = records
                    .into_iter()
                    .map(|r| CandidateDoc {
                        path: r.path,
                        description: r.description,
                    })
                    .collect();
                debug!(count = candidates.len(), "candidates fetched");
                Ok(PipelineState::CandidateFilter { candidates })
            }

            PipelineState::CandidateFilter { candidates } => {
                let shown: HashSet<String> =
                    candidates.iter().map(|c| c.path.clone()).collect();
                let mut selected = self.judge.select(query, &candidates).await?;
                // Verbatim filter: only paths byte-identical to a shown
                // candidate survive.
                selected.retain(|doc| shown.contains(&doc.path));
                info!(selected = selected.len(), "retrieval complete");
                Ok(PipelineState::Done { selected })
            }

            PipelineState::Done { selected } => Ok(PipelineState::Done { selected }),
        }
    }
}
