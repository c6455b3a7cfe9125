//! Shared handler state.

use crate::{
    config::AppConfig,
    services::{
        answer_matcher::AnswerMatcher,
        document::FileDocument,
        media_repository::MediaRepository,
        media_store::DiskMediaStore,
        record_store::RecordStore,
    },
};
use std::{io, path::PathBuf, sync::Arc};

/// Everything the handlers need. Cheap to clone; the components share their
/// backends through `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub answers: AnswerMatcher,
    pub media: MediaRepository,
    /// Directories probed by the readiness endpoint, keyed by check name.
    pub probe_dirs: Arc<Vec<(&'static str, PathBuf)>>,
}

impl AppState {
    pub fn new(answers: AnswerMatcher, media: MediaRepository) -> Self {
        Self {
            answers,
            media,
            probe_dirs: Arc::new(Vec::new()),
        }
    }

    /// File-backed state: the Q&A document and both upload directories as
    /// configured. Creates the upload directories if needed.
    pub async fn from_config(cfg: &AppConfig) -> io::Result<Self> {
        let disk = DiskMediaStore::new(&cfg.video_dir, &cfg.image_dir);
        disk.ensure_dirs().await?;

        let answers = AnswerMatcher::new(RecordStore::new(Arc::new(FileDocument::new(
            &cfg.data_file,
        ))));
        let media = MediaRepository::new(
            Arc::new(disk),
            cfg.video_url_prefix(),
            cfg.image_url_prefix(),
        );

        let data_dir = cfg
            .data_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            answers,
            media,
            probe_dirs: Arc::new(vec![
                ("data", data_dir),
                ("videos", cfg.video_dir.clone()),
                ("images", cfg.image_dir.clone()),
            ]),
        })
    }
}
