use crate::error::Error;
use std::path::{Component, Path, PathBuf};

/// Confines relative inputs to a single root directory.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps user input onto a path. Absolute inputs and inputs already under
    /// the root pass through unchanged; anything else is joined onto the
    /// root. Relative inputs must not contain `..` components.
    pub fn resolve(&self, input: &str) -> Result<PathBuf, Error> {
        let candidate = Path::new(input);
        if candidate.is_absolute() {
            return Ok(candidate.to_path_buf());
        }
        if candidate.starts_with(&self.root) {
            return Ok(candidate.to_path_buf());
        }
        if candidate
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(Error::InvalidOperation(format!(
                "path escapes the sandbox: {input}"
            )));
        }
        Ok(self.root.join(candidate))
    }
}
