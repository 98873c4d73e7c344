//! Wires configuration, storage, and collaborators into the request flows.

use crate::action::{ActionExecutor, ActionOutcome};
use crate::audit::{AuditLog, Operation};
use crate::config::AppConfig;
use crate::error::Error;
use crate::history::HistoryStore;
use crate::index::TagIndex;
use crate::indexer::Indexer;
use crate::ops::OperationExecutor;
use crate::pipeline::RetrievalPipeline;
use crate::sandbox::Sandbox;
use anyhow::Context;
use providers::noop::NoopProvider;
use providers::openai::{OpenAiConfig, OpenAiProvider};
use providers::{ProviderRegistry, Recommendation, RelevanceJudge};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::{connect, migrate};

pub struct Agent {
    pub index: TagIndex,
    pub history: HistoryStore,
    pub audit: Arc<AuditLog>,
    pub ops: Arc<OperationExecutor>,
    indexer: Indexer,
    pipeline: RetrievalPipeline,
    executor: ActionExecutor,
    judge: Arc<dyn RelevanceJudge>,
    sandbox_root: PathBuf,
}

impl Agent {
    pub async fn new(cfg: &AppConfig, registry: &ProviderRegistry) -> anyhow::Result<Self> {
        let pool = connect(&cfg.database.path).await.context("db connect")?;
        migrate(&pool).await.context("db migrate")?;

        std::fs::create_dir_all(&cfg.sandbox.root).context("create sandbox root")?;
        let root = std::fs::canonicalize(&cfg.sandbox.root).context("resolve sandbox root")?;

        let sandbox = Sandbox::new(root.clone());
        let audit = Arc::new(AuditLog::new(&root.join("logs"))?);
        let index = TagIndex::new(pool.clone());
        let history = HistoryStore::new(pool);

        let classifier = registry.classifier(None)?;
        let judge = registry.judge(None)?;
        let planner = registry.planner(None)?;

        let ops = Arc::new(OperationExecutor::new(
            sandbox,
            audit.clone(),
            index.clone(),
        ));
        let indexer = Indexer::new(index.clone(), classifier.clone(), &cfg.sandbox.exclude)?;
        let pipeline = RetrievalPipeline::new(index.clone(), classifier.clone(), judge.clone());
        let executor = ActionExecutor::new(ops.clone(), planner, classifier, history.clone());

        Ok(Self {
            index,
            history,
            audit,
            ops,
            indexer,
            pipeline,
            executor,
            judge,
            sandbox_root: root,
        })
    }

    pub fn sandbox_root(&self) -> &Path {
        &self.sandbox_root
    }

    /// Full request flow: retrieval pipeline, then guarded action execution.
    pub async fn ask(&self, query: &str) -> Result<ActionOutcome, Error> {
        let candidates = self.pipeline.run(query).await?;
        self.executor.execute(query, &candidates).await
    }

    /// Recommend-only flow for extracted screen text. No filesystem
    /// mutation, no history write.
    pub async fn recommend(&self, text: &str) -> Result<Recommendation, Error> {
        self.audit.append(Operation::ScreenAgent, None)?;
        let candidates = self.pipeline.run(text).await?;
        let mut recommendation = self.judge.recommend(text, &candidates).await?;
        let shown: HashSet<&str> = candidates.iter().map(|c| c.path.as_str()).collect();
        recommendation
            .file_paths
            .retain(|p| shown.contains(p.as_str()));
        Ok(recommendation)
    }

    /// Indexes files added to the sandbox since the last run.
    pub async fn reindex(&self) -> Result<u64, Error> {
        self.indexer.reindex(&self.sandbox_root).await
    }
}

/// Builds the provider set from config and environment; without an API
/// endpoint configured only the noop set is available.
pub fn build_registry(cfg: &AppConfig) -> ProviderRegistry {
    let noop = Arc::new(NoopProvider);
    let mut registry = ProviderRegistry::new()
        .with_classifier("noop", noop.clone())
        .with_judge("noop", noop.clone())
        .with_planner("noop", noop);

    if let (Ok(key), Ok(base)) = (
        std::env::var("OPENAI_API_KEY"),
        std::env::var("OPENAI_BASE_URL"),
    ) {
        let provider = Arc::new(OpenAiProvider::new(OpenAiConfig {
            api_key: key,
            base_url: base,
            chat_model: cfg.provider.chat_model.clone(),
            summary_model: cfg.provider.summary_model.clone(),
        }));
        registry = registry
            .with_classifier("openai", provider.clone())
            .with_judge("openai", provider.clone())
            .with_planner("openai", provider);
    }

    registry.set_preferred(&cfg.provider.name)
}
