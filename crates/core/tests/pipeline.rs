mod common;

use agent_core::error::Error;
use agent_core::index::TagIndex;
use agent_core::models::NewFileRecord;
use agent_core::pipeline::RetrievalPipeline;
use providers::CandidateDoc;
use std::sync::Arc;

fn record(path: &str, tags: &[&str], description: &str) -> NewFileRecord {
    NewFileRecord {
        path: path.to_string(),
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        file_type: "pdf".to_string(),
        description: description.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        size: 0,
        last_modified: None,
    }
}

#[tokio::test]
async fn keywords_are_constrained_to_the_vocabulary() {
    let index = TagIndex::new(common::test_pool("pipeline_vocab").await);
    index
        .insert(&record("/sb/calc.pdf", &["math"], "calculus notes"))
        .await
        .unwrap();

    // "shopping" is not in the vocabulary; only "math" survives extraction.
    let classifier = Arc::new(common::MockClassifier {
        keyword_reply: vec!["math".to_string(), "shopping".to_string()],
        ..Default::default()
    });
    let judge = Arc::new(common::MockJudge {
        echo: true,
        ..Default::default()
    });
    let pipeline = RetrievalPipeline::new(index, classifier, judge);

    let selected = pipeline.run("find my math notes").await.unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].path, "/sb/calc.pdf");
}

#[tokio::test]
async fn zero_keywords_yield_zero_candidates() {
    let index = TagIndex::new(common::test_pool("pipeline_zero").await);
    index
        .insert(&record("/sb/calc.pdf", &["math"], ""))
        .await
        .unwrap();

    let classifier = Arc::new(common::MockClassifier::default());
    let judge = Arc::new(common::MockJudge {
        echo: true,
        ..Default::default()
    });
    let pipeline = RetrievalPipeline::new(index, classifier, judge);

    // No keyword match means no fallback enumeration of the index.
    assert!(pipeline.run("anything at all").await.unwrap().is_empty());
}

#[tokio::test]
async fn fabricated_judge_paths_are_dropped() {
    let index = TagIndex::new(common::test_pool("pipeline_fabricated").await);
    index
        .insert(&record("/sb/calc.pdf", &["math"], "calculus"))
        .await
        .unwrap();

    let classifier = Arc::new(common::MockClassifier {
        keyword_reply: vec!["math".to_string()],
        ..Default::default()
    });
    // The judge returns one verbatim path and one it made up.
    let judge = Arc::new(common::MockJudge {
        select_reply: vec![
            CandidateDoc {
                path: "/sb/calc.pdf".to_string(),
                description: "calculus".to_string(),
            },
            CandidateDoc {
                path: "/etc/passwd".to_string(),
                description: "definitely relevant".to_string(),
            },
        ],
        ..Default::default()
    });
    let pipeline = RetrievalPipeline::new(index, classifier, judge);

    let selected = pipeline.run("math").await.unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].path, "/sb/calc.pdf");
}

#[tokio::test]
async fn collaborator_failure_fails_the_whole_run() {
    let index = TagIndex::new(common::test_pool("pipeline_failure").await);
    let classifier = Arc::new(common::MockClassifier {
        fail_keywords: true,
        ..Default::default()
    });
    let judge = Arc::new(common::MockJudge::default());
    let pipeline = RetrievalPipeline::new(index, classifier, judge);

    let err = pipeline.run("anything").await.unwrap_err();
    assert!(matches!(err, Error::Collaborator(_)));
}
