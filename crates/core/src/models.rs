use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One indexed file. `path` is the unique key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub name: String,
    #[serde(rename = "type")]
    pub file_type: String,
    pub description: String,
    pub tags: Vec<String>,
    pub size: u64,
    pub last_modified: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Insert payload for the tag index; bookkeeping timestamps are filled by
/// the store.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub path: String,
    pub name: String,
    pub file_type: String,
    pub description: String,
    pub tags: Vec<String>,
    pub size: u64,
    pub last_modified: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub description: String,
    pub file_paths: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Properties {
    pub size: u64,
    pub is_file: bool,
    pub is_directory: bool,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeFolder {
    pub name: String,
    pub files: Vec<String>,
    pub folders: Vec<String>,
}

/// Immediate children plus one level of grandchild names, for UI rendering.
#[derive(Debug, Clone, Serialize)]
pub struct OneLevelTree {
    pub name: String,
    pub root_files: Vec<String>,
    pub folders: Vec<TreeFolder>,
}
