//! MediaRepository: upload, enumerate and delete video and image assets.
//!
//! Validation (extension whitelist, filename sanitizing) and naming
//! (collision suffixes, display labels, public URLs) live here; the bytes
//! themselves go through a [`MediaStore`].

use crate::{
    models::media::{AssetRef, MediaKind},
    services::media_store::MediaStore,
};
use bytes::Bytes;
use std::{
    io::{self, ErrorKind},
    sync::Arc,
};
use thiserror::Error;
use tracing::{info, warn};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("No {0} file provided")]
    MissingFile(MediaKind),
    #[error("No selected file")]
    EmptyFilename,
    #[error("Invalid file type. Only {} are allowed.", .0.extension_list())]
    UnsupportedType(MediaKind),
    #[error("Invalid filename")]
    InvalidFilename,
    #[error("{} not found", .kind.label())]
    NotFound { kind: MediaKind, filename: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Clone)]
pub struct MediaRepository {
    store: Arc<dyn MediaStore>,
    video_prefix: String,
    image_prefix: String,
}

impl MediaRepository {
    /// `video_prefix`/`image_prefix` are the public URL paths the upload
    /// directories are served under, e.g. `/static/uploads/videos`.
    pub fn new(
        store: Arc<dyn MediaStore>,
        video_prefix: impl Into<String>,
        image_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            video_prefix: video_prefix.into().trim_end_matches('/').to_string(),
            image_prefix: image_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url_prefix(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Video => &self.video_prefix,
            MediaKind::Image => &self.image_prefix,
        }
    }

    fn url_for(&self, kind: MediaKind, filename: &str) -> String {
        format!("{}/{}", self.url_prefix(kind), filename)
    }

    /// Store an uploaded file.
    ///
    /// The extension is checked on the name as sent by the client; the file
    /// is then saved under its sanitized name, suffixed `_1`, `_2`, ... until
    /// the name is free. The display label counts the kind's assets after the
    /// write, so it is not a stable sequence number.
    pub async fn upload(
        &self,
        kind: MediaKind,
        raw_filename: &str,
        bytes: Bytes,
    ) -> MediaResult<AssetRef> {
        if raw_filename.is_empty() {
            warn!("No selected {} file", kind);
            return Err(MediaError::EmptyFilename);
        }
        if !kind.accepts(raw_filename) {
            warn!("Invalid {} file type: {}", kind, raw_filename);
            return Err(MediaError::UnsupportedType(kind));
        }

        let sanitized = secure_filename(raw_filename);
        if sanitized.is_empty() {
            warn!("Filename {:?} is empty after sanitizing", raw_filename);
            return Err(MediaError::InvalidFilename);
        }

        let filename = self.free_name(kind, &sanitized).await?;
        self.store.write(kind, &filename, bytes).await?;

        let count = self.valid_names(kind).await?.len();
        let asset = AssetRef {
            url: self.url_for(kind, &filename),
            display_name: format!("{} {}", kind.label(), count),
            filename,
        };
        info!("{} uploaded: {}, URL: {}", kind.label(), asset.filename, asset.url);
        Ok(asset)
    }

    /// Every whitelisted asset of `kind`, labelled by position.
    ///
    /// Order is whatever the backend enumerates (directory order on disk),
    /// so labels can shift between calls.
    pub async fn list(&self, kind: MediaKind) -> MediaResult<Vec<AssetRef>> {
        let names = self.valid_names(kind).await?;
        let assets: Vec<AssetRef> = names
            .into_iter()
            .enumerate()
            .map(|(i, filename)| AssetRef {
                url: self.url_for(kind, &filename),
                display_name: format!("{} {}", kind.label(), i + 1),
                filename,
            })
            .collect();
        info!("Retrieved {} {} assets", assets.len(), kind);
        Ok(assets)
    }

    /// Delete an asset by name. Returns the sanitized name that was removed.
    pub async fn delete(&self, kind: MediaKind, filename: &str) -> MediaResult<String> {
        let sanitized = secure_filename(filename);
        let not_found = || {
            warn!("{} not found: {}", kind.label(), filename);
            MediaError::NotFound {
                kind,
                filename: filename.to_string(),
            }
        };

        if sanitized.is_empty() || !self.store.exists(kind, &sanitized).await? {
            return Err(not_found());
        }
        match self.store.remove(kind, &sanitized).await {
            Ok(()) => {
                info!("{} deleted: {}", kind.label(), sanitized);
                Ok(sanitized)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Err(not_found()),
            Err(err) => Err(err.into()),
        }
    }

    async fn valid_names(&self, kind: MediaKind) -> MediaResult<Vec<String>> {
        let mut names = self.store.list(kind).await?;
        names.retain(|name| kind.accepts(name));
        Ok(names)
    }

    async fn free_name(&self, kind: MediaKind, filename: &str) -> MediaResult<String> {
        if !self.store.exists(kind, filename).await? {
            return Ok(filename.to_string());
        }
        let (base, ext) = split_extension(filename);
        let mut counter = 1u64;
        loop {
            let candidate = format!("{base}_{counter}{ext}");
            if !self.store.exists(kind, &candidate).await? {
                return Ok(candidate);
            }
            counter += 1;
        }
    }
}

/// Reduce a client supplied filename to a safe, flat ASCII name.
///
/// The name is NFKD-decomposed and what is left outside ASCII is dropped, so
/// accented letters keep their base letter. Path separators and whitespace runs
/// become `_`, anything outside `[A-Za-z0-9_.-]` is removed and leading or
/// trailing dots and underscores are stripped. May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Split `name` into base and extension (with its dot). Leading dots are part
/// of the base, so `.hidden` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    let stem_start = name.len() - name.trim_start_matches('.').len();
    match name[stem_start..].rfind('.') {
        Some(pos) if pos > 0 => name.split_at(stem_start + pos),
        _ => (name, ""),
    }
}
