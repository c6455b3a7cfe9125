//! Media kinds and the asset references handed back to clients.

use serde::Serialize;
use std::fmt;

/// The two media categories accepted by the upload endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Image,
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Video, MediaKind::Image];

    /// Lowercase name, also used as the multipart field name.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }

    /// Capitalized name used in display labels and messages.
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Video => "Video",
            MediaKind::Image => "Image",
        }
    }

    /// Accepted filename extensions, lowercase and without the dot.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            MediaKind::Video => VIDEO_EXTENSIONS,
            MediaKind::Image => IMAGE_EXTENSIONS,
        }
    }

    /// True if the text after the last `.` is whitelisted for this kind,
    /// compared case-insensitively. Names without a dot never match.
    pub fn accepts(self, filename: &str) -> bool {
        filename
            .rsplit_once('.')
            .map(|(_, ext)| {
                self.extensions()
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Human readable whitelist, e.g. `mp4, webm, and ogg`.
    pub fn extension_list(self) -> String {
        match self.extensions() {
            [] => String::new(),
            [only] => only.to_string(),
            [first, second] => format!("{first} and {second}"),
            [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored media file as reported to clients.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct AssetRef {
    /// Stored filename; doubles as the asset identifier.
    #[serde(rename = "id")]
    pub filename: String,

    /// Sequential label such as `Video 2`.
    pub display_name: String,

    /// Public retrieval path, `/<kind-directory>/<filename>`.
    pub url: String,
}
