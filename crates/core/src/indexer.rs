//! Idempotent recursive tree indexer.

use crate::error::Error;
use crate::index::TagIndex;
use crate::models::NewFileRecord;
use globset::{Glob, GlobSet, GlobSetBuilder};
use providers::Classifier;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
struct ScannedFile {
    path: PathBuf,
    name: String,
    ext: Option<String>,
    size: u64,
    mtime: Option<i64>,
}

pub struct Indexer {
    index: TagIndex,
    classifier: Arc<dyn Classifier>,
    excludes: GlobSet,
    running: Mutex<()>,
}

impl Indexer {
    pub fn new(
        index: TagIndex,
        classifier: Arc<dyn Classifier>,
        excludes: &[String],
    ) -> Result<Self, Error> {
        Ok(Self {
            index,
            classifier,
            excludes: build_globset(excludes)?,
            running: Mutex::new(()),
        })
    }

    /// Walks `root` depth-first and indexes every file not yet known.
    /// Already-indexed paths are skipped untouched (even when the content
    /// changed), so re-running on an unchanged tree classifies nothing. A
    /// call while a run is in progress returns immediately.
    pub async fn reindex(&self, root: &Path) -> Result<u64, Error> {
        let Ok(_guard) = self.running.try_lock() else {
            warn!("reindex already running, skipping");
            return Ok(0);
        };

        // One vocabulary snapshot per walk; tags invented mid-walk become
        // visible on the next run.
        let vocabulary = self.index.all_tags().await?;

        let (tx, mut rx) = mpsc::channel(100);
        let excludes = self.excludes.clone();
        let root = root.to_path_buf();
        let walker = task::spawn_blocking(move || walk(&root, &excludes, tx));

        let mut indexed = 0u64;
        while let Some(file) = rx.recv().await {
            let path = file.path.to_string_lossy().into_owned();
            if self.index.find_by_path(&path).await?.is_some() {
                continue;
            }

            let metadata = match self.classifier.file_metadata(&file.name, &vocabulary).await {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!(file = %file.path.display(), error = %err,
                        "classifier failed, indexing without metadata");
                    providers::FileMetadata::default()
                }
            };

            let record = NewFileRecord {
                path,
                name: file.name,
                file_type: file.ext.unwrap_or_else(|| "unknown".to_string()),
                description: metadata.description,
                tags: metadata.tags,
                size: file.size,
                last_modified: file.mtime,
            };
            match self.index.insert(&record).await {
                Ok(()) => {
                    debug!(file = %record.path, tags = ?record.tags, "indexed");
                    indexed += 1;
                }
                // Raced with another writer; the existing record wins.
                Err(Error::AlreadyExists(_)) => continue,
                Err(err) => return Err(err),
            }
        }

        walker
            .await
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?;
        info!(indexed, "reindex complete");
        Ok(indexed)
    }
}

fn walk(root: &Path, excludes: &GlobSet, tx: mpsc::Sender<ScannedFile>) {
    let entries = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !excludes.is_match(e.path()));
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            // Unreadable subtree; skip it and keep walking siblings.
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(_) => continue,
        };
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64);
        let file = ScannedFile {
            path: path.to_path_buf(),
            name: entry.file_name().to_string_lossy().into_owned(),
            ext: path
                .extension()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string()),
            size: meta.len(),
            mtime,
        };
        if tx.blocking_send(file).is_err() {
            // Receiver dropped, stop walking.
            break;
        }
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).map_err(|e| Error::InvalidOperation(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::InvalidOperation(e.to_string()))
}
