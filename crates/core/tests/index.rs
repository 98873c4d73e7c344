mod common;

use agent_core::error::Error;
use agent_core::index::TagIndex;
use agent_core::models::NewFileRecord;

fn record(path: &str, tags: &[&str], description: &str) -> NewFileRecord {
    NewFileRecord {
        path: path.to_string(),
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        file_type: "pdf".to_string(),
        description: description.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        size: 128,
        last_modified: Some(1_700_000_000),
    }
}

#[tokio::test]
async fn insert_and_find_by_path_roundtrip() {
    let index = TagIndex::new(common::test_pool("index_roundtrip").await);
    index
        .insert(&record("/sb/notes/lecture1.pdf", &["math", "lecture"], "calc notes"))
        .await
        .unwrap();

    let found = index
        .find_by_path("/sb/notes/lecture1.pdf")
        .await
        .unwrap()
        .expect("record present");
    assert_eq!(found.name, "lecture1.pdf");
    assert_eq!(found.file_type, "pdf");
    assert_eq!(found.description, "calc notes");
    let mut tags = found.tags.clone();
    tags.sort();
    assert_eq!(tags, vec!["lecture", "math"]);

    assert!(index.find_by_path("/sb/other.pdf").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_insert_fails_and_leaves_record_unchanged() {
    let index = TagIndex::new(common::test_pool("index_duplicate").await);
    index
        .insert(&record("/sb/a.pdf", &["math"], "original"))
        .await
        .unwrap();

    let err = index
        .insert(&record("/sb/a.pdf", &["physics"], "replacement"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyExists(path) if path == "/sb/a.pdf"));

    let found = index.find_by_path("/sb/a.pdf").await.unwrap().unwrap();
    assert_eq!(found.description, "original");
    assert_eq!(found.tags, vec!["math"]);
}

#[tokio::test]
async fn find_by_tags_is_any_of_match() {
    let index = TagIndex::new(common::test_pool("index_any_of").await);
    index
        .insert(&record("/sb/calc.pdf", &["math", "lecture"], ""))
        .await
        .unwrap();
    index
        .insert(&record("/sb/essay.docx", &["history"], ""))
        .await
        .unwrap();
    index
        .insert(&record("/sb/hw3.pdf", &["math", "assignment"], ""))
        .await
        .unwrap();

    let math = index.find_by_tags(&["math".to_string()]).await.unwrap();
    let paths: Vec<&str> = math.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["/sb/calc.pdf", "/sb/hw3.pdf"]);

    // Union across tags, each record once.
    let union = index
        .find_by_tags(&["math".to_string(), "history".to_string()])
        .await
        .unwrap();
    assert_eq!(union.len(), 3);

    assert!(index.find_by_tags(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn all_tags_deduplicates_and_drops_orphans() {
    let index = TagIndex::new(common::test_pool("index_all_tags").await);
    index
        .insert(&record("/sb/a.pdf", &["math", "lecture"], ""))
        .await
        .unwrap();
    index
        .insert(&record("/sb/b.pdf", &["math"], ""))
        .await
        .unwrap();

    assert_eq!(index.all_tags().await.unwrap(), vec!["lecture", "math"]);

    // Removing the only record carrying "lecture" drops it from the
    // vocabulary.
    index.remove("/sb/a.pdf").await.unwrap();
    assert_eq!(index.all_tags().await.unwrap(), vec!["math"]);
}

#[tokio::test]
async fn remove_deletes_record_and_membership() {
    let index = TagIndex::new(common::test_pool("index_remove").await);
    index
        .insert(&record("/sb/a.pdf", &["math"], ""))
        .await
        .unwrap();

    index.remove("/sb/a.pdf").await.unwrap();
    assert!(index.find_by_path("/sb/a.pdf").await.unwrap().is_none());
    assert!(index
        .find_by_tags(&["math".to_string()])
        .await
        .unwrap()
        .is_empty());
}
