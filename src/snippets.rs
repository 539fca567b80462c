//! Source snippets shown on project pages, read from a fixed root directory.
//!
//! Layout is `{root}/{project}/{filename}`. Both parts must be a single plain
//! path component, so a lookup can never leave the root.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnippetError {
    #[error("Missing parameters")]
    MissingParameters,

    #[error("File not found: {project}/{filename}")]
    NotFound { project: String, filename: String },
}

#[derive(Debug, Clone)]
pub struct SnippetStore {
    root: PathBuf,
}

/// True when `part` is exactly one normal component (no `..`, separators or roots)
fn is_plain_component(part: &str) -> bool {
    let mut components = Path::new(part).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == part
    )
}

impl SnippetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a snippet's text.
    ///
    /// Absent or empty parameters are `MissingParameters`. Anything that does
    /// not name a readable UTF-8 file under the root is `NotFound`.
    pub async fn read(
        &self,
        project: Option<&str>,
        filename: Option<&str>,
    ) -> Result<String, SnippetError> {
        let (project, filename) = match (project, filename) {
            (Some(p), Some(f)) if !p.is_empty() && !f.is_empty() => (p, f),
            _ => return Err(SnippetError::MissingParameters),
        };

        let not_found = || SnippetError::NotFound {
            project: project.to_string(),
            filename: filename.to_string(),
        };

        if !is_plain_component(project) || !is_plain_component(filename) {
            debug!("Rejected snippet path {:?}/{:?}", project, filename);
            return Err(not_found());
        }

        let path = self.root.join(project).join(filename);
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            debug!("Failed to read snippet {}: {}", path.display(), e);
            not_found()
        })
    }
}
