use anyhow::{Context, Result};
use clap::Parser;
use std::{
    env,
    path::{Component, Path, PathBuf},
    str::FromStr,
};

/// Uploads above this size are rejected before reaching the media repository.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub video_dir: PathBuf,
    pub image_dir: PathBuf,
    pub max_upload_bytes: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Voice-driven question/answer service")]
pub struct Args {
    /// Host to bind to (overrides VOICE_QA_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides VOICE_QA_PORT / PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// JSON document holding the Q&A pairs (overrides VOICE_QA_DATA_FILE)
    #[arg(long)]
    pub data_file: Option<PathBuf>,

    /// Video upload directory (overrides VOICE_QA_VIDEO_DIR)
    #[arg(long)]
    pub video_dir: Option<PathBuf>,

    /// Image upload directory (overrides VOICE_QA_IMAGE_DIR)
    #[arg(long)]
    pub image_dir: Option<PathBuf>,

    /// Upload size ceiling in bytes (overrides VOICE_QA_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::resolve(Args::parse(), |name| env::var(name).ok())
    }

    /// Merge CLI args over values looked up through `lookup`, then defaults.
    pub fn resolve(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = lookup("VOICE_QA_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = match parse_var::<u16>(&lookup, "VOICE_QA_PORT")? {
            Some(port) => port,
            None => parse_var::<u16>(&lookup, "PORT")?.unwrap_or(5000),
        };
        let env_data = lookup("VOICE_QA_DATA_FILE").unwrap_or_else(|| "qa_data.json".into());
        let env_videos =
            lookup("VOICE_QA_VIDEO_DIR").unwrap_or_else(|| "static/uploads/videos".into());
        let env_images =
            lookup("VOICE_QA_IMAGE_DIR").unwrap_or_else(|| "static/uploads/images".into());
        let env_max = parse_var::<usize>(&lookup, "VOICE_QA_MAX_UPLOAD_BYTES")?
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            data_file: args.data_file.unwrap_or_else(|| env_data.into()),
            video_dir: args.video_dir.unwrap_or_else(|| env_videos.into()),
            image_dir: args.image_dir.unwrap_or_else(|| env_images.into()),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn video_url_prefix(&self) -> String {
        url_prefix(&self.video_dir)
    }

    pub fn image_url_prefix(&self) -> String {
        url_prefix(&self.image_dir)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        None => Ok(None),
    }
}

/// Public URL path a directory is served under: its normal components joined
/// with `/`, so `./static/uploads/videos` becomes `/static/uploads/videos`.
pub fn url_prefix(dir: &Path) -> String {
    let parts: Vec<String> = dir
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    format!("/{}", parts.join("/"))
}
