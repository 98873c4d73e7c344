//! Guarded action execution over a verified candidate set.
//!
//! The candidate list is the only trust boundary between free-form request
//! text and filesystem mutation: no operation ever targets a path that is
//! not byte-for-byte present in it.

use crate::error::Error;
use crate::history::HistoryStore;
use crate::ops::OperationExecutor;
use providers::{ActionPlanner, ActionVerb, CandidateDoc, Classifier, PlannedAction};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Summary stored when the summarizer collaborator fails.
pub const FALLBACK_SUMMARY: &str = "Agent performed file operations";
/// Reply when no planned action survives the candidate check.
pub const NO_MATCH_REPLY: &str = "I couldn't find a matching file to perform that action.";

#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub summary: String,
    pub touched_paths: Vec<String>,
}

pub struct ActionExecutor {
    ops: Arc<OperationExecutor>,
    planner: Arc<dyn ActionPlanner>,
    classifier: Arc<dyn Classifier>,
    history: HistoryStore,
}

impl ActionExecutor {
    pub fn new(
        ops: Arc<OperationExecutor>,
        planner: Arc<dyn ActionPlanner>,
        classifier: Arc<dyn Classifier>,
        history: HistoryStore,
    ) -> Self {
        Self {
            ops,
            planner,
            classifier,
            history,
        }
    }

    /// Plans and performs operations for `request`, touching only candidate
    /// paths. Always writes one history row, even on partial failure.
    pub async fn execute(
        &self,
        request: &str,
        candidates: &[CandidateDoc],
    ) -> Result<ActionOutcome, Error> {
        let allowed: HashSet<&str> = candidates.iter().map(|c| c.path.as_str()).collect();
        let planned = self.planner.plan(request, candidates).await?;

        let mut actions = Vec::new();
        for action in planned {
            if allowed.contains(action.path.as_str()) {
                actions.push(action);
            } else {
                // A fabricated or altered path is dropped, not surfaced.
                warn!(path = %action.path, "planner named a non-candidate path, dropping");
            }
        }

        if actions.is_empty() {
            let summary = NO_MATCH_REPLY.to_string();
            self.history.append(&summary, &[]).await?;
            return Ok(ActionOutcome {
                summary,
                touched_paths: Vec::new(),
            });
        }

        let mut touched = Vec::new();
        let mut failed = Vec::new();
        for action in &actions {
            let result = match action.verb {
                ActionVerb::Open => self
                    .ops
                    .open_with_default_app(&action.path)
                    .await
                    .map(|_| ()),
                ActionVerb::Delete => self.ops.delete(&action.path).await,
            };
            match result {
                Ok(()) => touched.push(action.path.clone()),
                Err(err) => {
                    warn!(path = %action.path, error = %err, "operation failed");
                    failed.push(format!("{} ({err})", action.path));
                }
            }
        }

        let report = outcome_report(&actions, &touched, &failed);
        let summary = match self.classifier.summarize(&report).await {
            Ok(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => FALLBACK_SUMMARY.to_string(),
        };
        self.history.append(&summary, &touched).await?;
        info!(
            touched = touched.len(),
            failed = failed.len(),
            "action run recorded"
        );
        Ok(ActionOutcome {
            summary: report,
            touched_paths: touched,
        })
    }
}

fn outcome_report(actions: &[PlannedAction], touched: &[String], failed: &[String]) -> String {
    let mut report = format!(
        "Performed {} of {} requested file operations.",
        touched.len(),
        actions.len()
    );
    if !touched.is_empty() {
        report.push_str(&format!(" Completed: {}.", touched.join(", ")));
    }
    if !failed.is_empty() {
        report.push_str(&format!(" Failed: {}.", failed.join(", ")));
    }
    report
}
