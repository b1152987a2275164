//! Local resume upload storage.
//!
//! This crate provides:
//! - Collision-free persistence of uploaded resume files
//! - The `/uploads/<name>` public path each stored file is served under
//! - Deletion by public path
//!
//! Files are written before the document referencing them; a document write
//! that fails afterwards leaves the file orphaned on disk, and nothing here
//! cleans that up.

pub mod error;

pub use error::{StorageError, StorageResult};

use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

/// URL prefix uploaded files are served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// A stored upload: where it is served from and what the uploader called it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Public path, e.g. `/uploads/3f2a...-resume.pdf`.
    pub public_path: String,
    /// Original filename as uploaded.
    pub file_name: String,
}

/// Writes uploads under a local directory.
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory uploads live in; the server mounts this for static serving.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist an uploaded resume. The stored name is prefixed with a fresh
    /// uuid so concurrent uploads of the same filename never collide; the
    /// original name is retained for display.
    pub async fn save_resume(&self, original_name: &str, bytes: &[u8]) -> StorageResult<StoredFile> {
        if bytes.is_empty() {
            return Err(StorageError::EmptyUpload(original_name.to_string()));
        }

        let stored_name = format!("{}-{}", Uuid::new_v4(), sanitize(original_name));
        let path = self.root.join(&stored_name);
        tokio::fs::write(&path, bytes).await?;
        debug!(file = %stored_name, size = bytes.len(), "Stored resume upload");

        Ok(StoredFile {
            public_path: format!("{}/{}", PUBLIC_PREFIX, stored_name),
            file_name: original_name.to_string(),
        })
    }

    /// Delete a stored upload by its public path. Returns whether a file was
    /// removed; paths outside the public prefix are refused.
    pub async fn delete(&self, public_path: &str) -> StorageResult<bool> {
        let Some(name) = public_path.strip_prefix(PUBLIC_PREFIX).map(|p| p.trim_start_matches('/'))
        else {
            return Err(StorageError::InvalidPath(public_path.to_string()));
        };
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return Err(StorageError::InvalidPath(public_path.to_string()));
        }

        let path = self.root.join(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Keep stored names shell- and URL-safe; anything else becomes a dash.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
