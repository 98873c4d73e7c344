//! Guarded filesystem operations over the sandbox.
//!
//! Every successful operation appends exactly one audit line with the
//! operation's canonical name and resolved target(s).

use crate::audit::{AuditLog, Operation};
use crate::error::Error;
use crate::index::TagIndex;
use crate::models::{OneLevelTree, Properties, TreeFolder};
use crate::sandbox::Sandbox;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Seam for the host's default-application mechanism.
pub trait AppLauncher: Send + Sync {
    fn launch(&self, path: &Path) -> std::io::Result<()>;
}

/// Hands the path to the platform opener.
#[derive(Debug, Default)]
pub struct SystemLauncher;

impl AppLauncher for SystemLauncher {
    fn launch(&self, path: &Path) -> std::io::Result<()> {
        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = std::process::Command::new("cmd");
            c.args(["/C", "start", ""]).arg(path);
            c
        } else if cfg!(target_os = "macos") {
            let mut c = std::process::Command::new("open");
            c.arg(path);
            c
        } else {
            let mut c = std::process::Command::new("xdg-open");
            c.arg(path);
            c
        };
        cmd.spawn().map(|_| ())
    }
}

pub struct OperationExecutor {
    sandbox: Sandbox,
    audit: Arc<AuditLog>,
    index: TagIndex,
    launcher: Box<dyn AppLauncher>,
}

impl OperationExecutor {
    pub fn new(sandbox: Sandbox, audit: Arc<AuditLog>, index: TagIndex) -> Self {
        Self::with_launcher(sandbox, audit, index, Box::new(SystemLauncher))
    }

    pub fn with_launcher(
        sandbox: Sandbox,
        audit: Arc<AuditLog>,
        index: TagIndex,
        launcher: Box<dyn AppLauncher>,
    ) -> Self {
        Self {
            sandbox,
            audit,
            index,
            launcher,
        }
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Writes `content`, creating missing parent directories.
    pub async fn write(&self, path: &str, content: &str) -> Result<PathBuf, Error> {
        let file = self.sandbox.resolve(path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file, content)?;
        self.audit
            .append(Operation::Write, Some(&file.to_string_lossy()))?;
        Ok(file)
    }

    pub async fn read(&self, path: &str) -> Result<String, Error> {
        let file = self.sandbox.resolve(path)?;
        if !file.exists() {
            return Err(Error::NotFound(file));
        }
        let data = fs::read_to_string(&file)?;
        self.audit
            .append(Operation::Read, Some(&file.to_string_lossy()))?;
        Ok(data)
    }

    pub async fn list(&self, dir: &str) -> Result<Vec<String>, Error> {
        let dir_path = self.sandbox.resolve(dir)?;
        if !dir_path.exists() {
            return Err(Error::NotFound(dir_path));
        }
        if !dir_path.is_dir() {
            return Err(Error::NotADirectory(dir_path));
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&dir_path)? {
            entries.push(entry?.file_name().to_string_lossy().into_owned());
        }
        entries.sort();
        self.audit
            .append(Operation::ListDir, Some(&dir_path.to_string_lossy()))?;
        Ok(entries)
    }

    /// Removes the index record first, then unlinks. The two steps are not
    /// transactional; a crash in between leaves a stale index row.
    pub async fn delete(&self, path: &str) -> Result<(), Error> {
        let file = self.sandbox.resolve(path)?;
        if !file.exists() {
            return Err(Error::NotFound(file));
        }
        self.index.remove(&file.to_string_lossy()).await?;
        fs::remove_file(&file)?;
        self.audit
            .append(Operation::Delete, Some(&file.to_string_lossy()))?;
        Ok(())
    }

    /// Renames or moves, creating the destination directory tree as needed.
    pub async fn rename(&self, old: &str, new: &str) -> Result<PathBuf, Error> {
        let from = self.sandbox.resolve(old)?;
        let to = self.sandbox.resolve(new)?;
        if !from.exists() {
            return Err(Error::NotFound(from));
        }
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&from, &to)?;
        self.audit.append(
            Operation::Rename,
            Some(&format!("{} -> {}", from.display(), to.display())),
        )?;
        Ok(to)
    }

    pub async fn mkdir(&self, dir: &str) -> Result<PathBuf, Error> {
        let dir_path = self.sandbox.resolve(dir)?;
        fs::create_dir_all(&dir_path)?;
        self.audit
            .append(Operation::Mkdir, Some(&dir_path.to_string_lossy()))?;
        Ok(dir_path)
    }

    /// Recursive copy. Refuses a destination inside the source before any
    /// filesystem mutation; copying onto an existing directory lands inside
    /// it.
    pub async fn copy(&self, src: &str, dest: &str) -> Result<PathBuf, Error> {
        let src_path = self.sandbox.resolve(src)?;
        let mut dest_path = self.sandbox.resolve(dest)?;
        if !src_path.exists() {
            return Err(Error::NotFound(src_path));
        }
        if dest_path.is_dir() {
            if let Some(name) = src_path.file_name() {
                dest_path = dest_path.join(name);
            }
        }
        if src_path.is_dir() && dest_path.starts_with(&src_path) {
            return Err(Error::InvalidOperation(
                "cannot copy a folder into itself or its subfolder".into(),
            ));
        }
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }
        copy_tree(&src_path, &dest_path)?;
        self.audit.append(
            Operation::Copy,
            Some(&format!("{} -> {}", src_path.display(), dest_path.display())),
        )?;
        Ok(dest_path)
    }

    pub async fn properties(&self, path: &str) -> Result<Properties, Error> {
        let target = self.sandbox.resolve(path)?;
        if !target.exists() {
            return Err(Error::NotFound(target));
        }
        let meta = fs::metadata(&target)?;
        let props = Properties {
            size: meta.len(),
            is_file: meta.is_file(),
            is_directory: meta.is_dir(),
            created: meta.created().ok().map(DateTime::<Utc>::from),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        };
        self.audit
            .append(Operation::Properties, Some(&target.to_string_lossy()))?;
        Ok(props)
    }

    /// Case-insensitive substring match over entry names, files and folders
    /// both, across the whole sandbox.
    pub async fn search(&self, query: &str) -> Result<Vec<PathBuf>, Error> {
        let needle = query.to_lowercase();
        let mut results = Vec::new();
        for entry in WalkDir::new(self.sandbox.root()).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                // Unreadable subtree; nothing below it can match.
                Err(_) => continue,
            };
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if name.contains(&needle) {
                results.push(entry.path().to_path_buf());
            }
        }
        self.audit.append(Operation::Search, Some(query))?;
        Ok(results)
    }

    pub async fn open_with_default_app(&self, path: &str) -> Result<PathBuf, Error> {
        let target = self.sandbox.resolve(path)?;
        if !target.exists() {
            return Err(Error::NotFound(target));
        }
        self.launcher.launch(&target)?;
        self.audit
            .append(Operation::Open, Some(&target.to_string_lossy()))?;
        Ok(target)
    }

    /// Immediate children plus one level of grandchild names only; a
    /// deliberately shallow listing, not a recursive tree.
    pub async fn one_level_tree(&self, dir: &str) -> Result<OneLevelTree, Error> {
        let root = self.sandbox.resolve(dir)?;
        if !root.exists() {
            return Err(Error::NotFound(root));
        }
        if !root.is_dir() {
            return Err(Error::NotADirectory(root));
        }

        let mut root_files = Vec::new();
        let mut folders = Vec::new();
        for entry in sorted_entries(&root)? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            if path.is_dir() {
                let mut files = Vec::new();
                let mut subfolders = Vec::new();
                for child in sorted_entries(&path)? {
                    let child_name = child.file_name().to_string_lossy().into_owned();
                    if child.path().is_dir() {
                        subfolders.push(child_name);
                    } else {
                        files.push(child_name);
                    }
                }
                folders.push(TreeFolder {
                    name,
                    files,
                    folders: subfolders,
                });
            } else {
                root_files.push(name);
            }
        }

        let name = root
            .file_name()
            .or_else(|| self.sandbox.root().file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.audit
            .append(Operation::ListTree, Some(&root.to_string_lossy()))?;
        Ok(OneLevelTree {
            name,
            root_files,
            folders,
        })
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<fs::DirEntry>, Error> {
    let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn copy_tree(src: &Path, dest: &Path) -> Result<(), Error> {
    if src.is_dir() {
        fs::create_dir_all(dest)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_tree(&entry.path(), &dest.join(entry.file_name()))?;
        }
    } else {
        fs::copy(src, dest)?;
    }
    Ok(())
}
