//! Backends for the single JSON document holding the Q&A collection.
//!
//! The record store only ever reads or overwrites the document as a whole, so
//! a backend is just "give me the bytes" and "replace the bytes".

use async_trait::async_trait;
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::fs;

#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Current document content, or `None` if the document does not exist.
    async fn read(&self) -> io::Result<Option<Vec<u8>>>;

    /// Overwrite the document with `bytes`.
    async fn write(&self, bytes: &[u8]) -> io::Result<()>;

    /// Where the document lives, for logs and readiness checks.
    fn location(&self) -> String;
}

/// Document stored as a plain file. Writes overwrite in place.
#[derive(Debug, Clone)]
pub struct FileDocument {
    path: PathBuf,
}

impl FileDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DocumentBackend for FileDocument {
    async fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn write(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(&self.path, bytes).await
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory document used by tests. Counts writes so callers can assert how
/// often the collection was persisted.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    content: Mutex<Option<Vec<u8>>>,
    writes: AtomicUsize,
    fail_writes: bool,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: Mutex::new(Some(content.into())),
            ..Self::default()
        }
    }

    /// A document whose writes always fail, for exercising save errors.
    pub fn read_only(content: Option<Vec<u8>>) -> Self {
        Self {
            content: Mutex::new(content),
            writes: AtomicUsize::new(0),
            fail_writes: true,
        }
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn content(&self) -> Option<Vec<u8>> {
        self.content
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl DocumentBackend for MemoryDocument {
    async fn read(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.content())
    }

    async fn write(&self, bytes: &[u8]) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(
                ErrorKind::PermissionDenied,
                "document is read-only",
            ));
        }
        *self
            .content
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(bytes.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".into()
    }
}
