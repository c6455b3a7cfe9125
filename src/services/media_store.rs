//! Backends for the two upload directories.
//!
//! A `MediaStore` knows nothing about whitelists or naming rules; it stores
//! opaque named blobs per [`MediaKind`]. Names handed in are already
//! sanitized by the media repository.

use crate::models::media::MediaKind;
use async_trait::async_trait;
use bytes::Bytes;
use std::{
    collections::HashMap,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn exists(&self, kind: MediaKind, name: &str) -> io::Result<bool>;

    /// Store `bytes` under `name`, replacing any existing entry.
    async fn write(&self, kind: MediaKind, name: &str, bytes: Bytes) -> io::Result<()>;

    /// All entry names for `kind`, in whatever order the backend enumerates
    /// them. Callers must not rely on that order being stable.
    async fn list(&self, kind: MediaKind) -> io::Result<Vec<String>>;

    /// Remove `name`. Fails with `ErrorKind::NotFound` if it does not exist.
    async fn remove(&self, kind: MediaKind, name: &str) -> io::Result<()>;
}

/// One directory per media kind on the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskMediaStore {
    video_dir: PathBuf,
    image_dir: PathBuf,
}

impl DiskMediaStore {
    pub fn new(video_dir: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            video_dir: video_dir.into(),
            image_dir: image_dir.into(),
        }
    }

    pub fn dir(&self, kind: MediaKind) -> &Path {
        match kind {
            MediaKind::Video => &self.video_dir,
            MediaKind::Image => &self.image_dir,
        }
    }

    /// Create both upload directories if they are missing.
    pub async fn ensure_dirs(&self) -> io::Result<()> {
        for kind in MediaKind::ALL {
            let dir = self.dir(kind);
            if !fs::try_exists(dir).await? {
                fs::create_dir_all(dir).await?;
                tracing::info!("Created {} upload directory at {}", kind, dir.display());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for DiskMediaStore {
    async fn exists(&self, kind: MediaKind, name: &str) -> io::Result<bool> {
        fs::try_exists(self.dir(kind).join(name)).await
    }

    /// Writes to a temporary file in the target directory and renames it into
    /// place, so a failed upload never leaves a half-written asset behind.
    async fn write(&self, kind: MediaKind, name: &str, bytes: Bytes) -> io::Result<()> {
        let dir = self.dir(kind);
        fs::create_dir_all(dir).await?;
        let final_path = dir.join(name);
        let tmp_path = dir.join(format!(".tmp-{}", Uuid::new_v4()));

        let mut file = File::create(&tmp_path).await?;
        let written = async {
            file.write_all(&bytes).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        drop(file);
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err);
        }

        if let Err(err) = fs::rename(&tmp_path, &final_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err);
        }
        debug!("stored {} bytes at {}", bytes.len(), final_path.display());
        Ok(())
    }

    async fn list(&self, kind: MediaKind) -> io::Result<Vec<String>> {
        let mut entries = fs::read_dir(self.dir(kind)).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => debug!("skipping non UTF-8 file name {:?}", raw),
            }
        }
        Ok(names)
    }

    async fn remove(&self, kind: MediaKind, name: &str) -> io::Result<()> {
        fs::remove_file(self.dir(kind).join(name)).await
    }
}

/// In-memory store for tests. Lists entries in insertion order.
#[derive(Debug, Default)]
pub struct MemoryMediaStore {
    entries: Mutex<HashMap<MediaKind, Vec<(String, Bytes)>>>,
}

impl MemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored bytes for `name`, if any.
    pub fn get(&self, kind: MediaKind, name: &str) -> Option<Bytes> {
        self.lock()
            .get(&kind)
            .and_then(|files| files.iter().find(|(n, _)| n == name))
            .map(|(_, bytes)| bytes.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<MediaKind, Vec<(String, Bytes)>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MediaStore for MemoryMediaStore {
    async fn exists(&self, kind: MediaKind, name: &str) -> io::Result<bool> {
        Ok(self.get(kind, name).is_some())
    }

    async fn write(&self, kind: MediaKind, name: &str, bytes: Bytes) -> io::Result<()> {
        let mut entries = self.lock();
        let files = entries.entry(kind).or_default();
        match files.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = bytes,
            None => files.push((name.to_string(), bytes)),
        }
        Ok(())
    }

    async fn list(&self, kind: MediaKind) -> io::Result<Vec<String>> {
        Ok(self
            .lock()
            .get(&kind)
            .map(|files| files.iter().map(|(n, _)| n.clone()).collect())
            .unwrap_or_default())
    }

    async fn remove(&self, kind: MediaKind, name: &str) -> io::Result<()> {
        let mut entries = self.lock();
        let files = entries.entry(kind).or_default();
        let before = files.len();
        files.retain(|(n, _)| n != name);
        if files.len() == before {
            return Err(io::Error::new(
                ErrorKind::NotFound,
                format!("{kind} `{name}` not found"),
            ));
        }
        Ok(())
    }
}
