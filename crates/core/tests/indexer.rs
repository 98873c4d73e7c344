mod common;

use agent_core::index::TagIndex;
use agent_core::indexer::Indexer;
use providers::FileMetadata;
use std::fs;
use std::sync::Arc;

#[tokio::test]
async fn reindex_is_idempotent_and_skips_known_files() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("notes")).unwrap();
    fs::write(temp.path().join("notes/lecture1.pdf"), "pdf bytes").unwrap();
    fs::write(temp.path().join("syllabus.txt"), "text").unwrap();

    let index = TagIndex::new(common::test_pool("indexer_idempotent").await);
    let classifier = Arc::new(common::MockClassifier {
        metadata_reply: FileMetadata {
            tags: vec!["math".to_string(), "lecture".to_string()],
            description: "course material".to_string(),
        },
        ..Default::default()
    });
    let indexer = Indexer::new(index.clone(), classifier.clone(), &[]).unwrap();

    let first = indexer.reindex(temp.path()).await.unwrap();
    assert_eq!(first, 2);
    assert_eq!(classifier.metadata_call_count(), 2);

    // Second run over an unchanged tree: no duplicates, zero classifier
    // calls.
    let second = indexer.reindex(temp.path()).await.unwrap();
    assert_eq!(second, 0);
    assert_eq!(classifier.metadata_call_count(), 2);

    let record = index
        .find_by_path(&temp.path().join("notes/lecture1.pdf").to_string_lossy())
        .await
        .unwrap()
        .expect("indexed");
    assert_eq!(record.file_type, "pdf");
    assert_eq!(record.description, "course material");
    assert_eq!(record.size, 9);
}

#[tokio::test]
async fn classifier_failure_degrades_to_empty_metadata() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("mystery.bin"), "data").unwrap();

    let index = TagIndex::new(common::test_pool("indexer_degrade").await);
    let classifier = Arc::new(common::MockClassifier {
        fail_metadata: true,
        ..Default::default()
    });
    let indexer = Indexer::new(index.clone(), classifier, &[]).unwrap();

    assert_eq!(indexer.reindex(temp.path()).await.unwrap(), 1);
    let record = index
        .find_by_path(&temp.path().join("mystery.bin").to_string_lossy())
        .await
        .unwrap()
        .expect("still indexed");
    assert!(record.tags.is_empty());
    assert!(record.description.is_empty());
}

#[tokio::test]
async fn missing_extension_indexes_as_unknown() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("Makefile"), "all:").unwrap();

    let index = TagIndex::new(common::test_pool("indexer_unknown").await);
    let classifier = Arc::new(common::MockClassifier::default());
    let indexer = Indexer::new(index.clone(), classifier, &[]).unwrap();

    indexer.reindex(temp.path()).await.unwrap();
    let record = index
        .find_by_path(&temp.path().join("Makefile").to_string_lossy())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.file_type, "unknown");
}

#[tokio::test]
async fn exclude_globs_skip_subtrees() {
    let temp = tempfile::tempdir().unwrap();
    fs::create_dir_all(temp.path().join("logs")).unwrap();
    fs::write(temp.path().join("logs/operations.log"), "[x] WRITE").unwrap();
    fs::write(temp.path().join("kept.txt"), "kept").unwrap();

    let index = TagIndex::new(common::test_pool("indexer_exclude").await);
    let classifier = Arc::new(common::MockClassifier::default());
    let indexer =
        Indexer::new(index.clone(), classifier, &["**/logs/**".to_string()]).unwrap();

    assert_eq!(indexer.reindex(temp.path()).await.unwrap(), 1);
    assert!(index
        .find_by_path(&temp.path().join("logs/operations.log").to_string_lossy())
        .await
        .unwrap()
        .is_none());
}
