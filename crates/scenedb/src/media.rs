use serde::{Deserialize, Serialize};
use std::fmt;

/// Filepath extensions recognized as video media.
const VIDEO_EXTENSIONS: &[&str] = &["avi", "mkv", "mov", "mp4", "webm"];

/// Filepath extensions recognized as point-cloud media.
const POINT_CLOUD_EXTENSIONS: &[&str] = &["las", "pcd", "ply"];

///
/// MediaKind
///
/// Closed set of media kinds a collection, slice, or sample can carry.
/// `Group` marks a grouped collection; `Mixed` only ever appears on views
/// produced by a multi-slice selection with heterogeneous slice kinds.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKind {
    Group,
    Image,
    Mixed,
    PointCloud,
    Video,
}

impl MediaKind {
    /// Infer the media kind of a sample from its filepath extension.
    ///
    /// Unknown and missing extensions fall back to `Image`.
    #[must_use]
    pub fn from_filepath(filepath: &str) -> Self {
        let extension = filepath
            .rsplit_once('.')
            .map(|(_, extension)| extension.to_ascii_lowercase());

        match extension.as_deref() {
            Some(extension) if VIDEO_EXTENSIONS.contains(&extension) => Self::Video,
            Some(extension) if POINT_CLOUD_EXTENSIONS.contains(&extension) => Self::PointCloud,
            _ => Self::Image,
        }
    }

    /// Canonical lowercase name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Image => "image",
            Self::Mixed => "mixed",
            Self::PointCloud => "point-cloud",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
