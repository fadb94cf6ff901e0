//! Locally selected files and the descriptors returned by the media hosts.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::ModelError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The two classes of asset the pipeline uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AssetKind {
    Video,
    Image,
}

impl AssetKind {
    pub fn default_mime_type(&self) -> &'static str {
        match self {
            AssetKind::Video => "video/mp4",
            AssetKind::Image => "image/jpeg",
        }
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Video => f.write_str("video"),
            AssetKind::Image => f.write_str("image"),
        }
    }
}

/// A file picked on the device, as described by the picker.
///
/// Every field except `local_uri` and `size_bytes` is advisory; the picker may
/// not know the MIME type or a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocalFile {
    /// Filesystem path or `file://` URI.
    pub local_uri: String,
    pub declared_mime_type: Option<String>,
    pub declared_name: Option<String>,
    pub size_bytes: u64,
}

impl LocalFile {
    pub fn new(local_uri: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            local_uri: local_uri.into(),
            declared_mime_type: None,
            declared_name: None,
            size_bytes,
        }
    }

    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.declared_mime_type = Some(mime.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.declared_name = Some(name.into());
        self
    }

    pub fn mime_type_or(&self, kind: AssetKind) -> &str {
        self.declared_mime_type
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(kind.default_mime_type())
    }
}

/// A video accepted by the video host.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UploadedVideo {
    pub asset_id: String,
    pub playback_url: Option<String>,
    pub thumbnail_url: Option<String>,
    /// `None` while the host is still processing the upload.
    pub duration_seconds: Option<f64>,
    pub original_name: Option<String>,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// An image accepted by the image host.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UploadedImage {
    pub asset_id: String,
    pub delivery_url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Named size variants exposed by the image delivery network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ImageVariant {
    /// Small card thumbnail
    Thumbnail,
    /// Large card
    Medium,
    /// Full size
    Large,
    #[default]
    Public,
}

impl ImageVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageVariant::Thumbnail => "thumbnail",
            ImageVariant::Medium => "medium",
            ImageVariant::Large => "large",
            ImageVariant::Public => "public",
        }
    }
}

impl FromStr for ImageVariant {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thumbnail" => Ok(ImageVariant::Thumbnail),
            "medium" => Ok(ImageVariant::Medium),
            "large" => Ok(ImageVariant::Large),
            "public" => Ok(ImageVariant::Public),
            other => Err(ModelError::UnknownVariant(other.to_string())),
        }
    }
}

impl std::fmt::Display for ImageVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human readable byte count, e.g. `"1.5 MB"`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{value:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{rendered} {}", UNITS[unit])
}

const MIME_EXTENSIONS: [(&str, &str); 10] = [
    ("video/mp4", "mp4"),
    ("video/quicktime", "mov"),
    ("video/webm", "webm"),
    ("video/x-matroska", "mkv"),
    ("video/x-msvideo", "avi"),
    ("video/x-ms-wmv", "wmv"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// File extension for the MIME types the pickers hand us.
pub fn extension_for_mime(mime: &str) -> &'static str {
    MIME_EXTENSIONS
        .iter()
        .find(|(m, _)| *m == mime)
        .map(|(_, ext)| *ext)
        .unwrap_or("unknown")
}

/// Inverse of [`extension_for_mime`], case-insensitive. `m4v` and `jpeg` are
/// accepted as aliases.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_ascii_lowercase();
    let ext = match ext.as_str() {
        "m4v" => "mp4",
        "jpeg" => "jpg",
        other => other,
    };
    MIME_EXTENSIONS
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(mime, _)| *mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_size_is_trimmed() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(100 * 1024 * 1024), "100 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }

    #[test]
    fn mime_extension_lookup() {
        assert_eq!(extension_for_mime("video/quicktime"), "mov");
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("application/pdf"), "unknown");
    }

    #[test]
    fn extension_lookup_accepts_aliases() {
        assert_eq!(mime_for_extension("MP4"), Some("video/mp4"));
        assert_eq!(mime_for_extension("m4v"), Some("video/mp4"));
        assert_eq!(mime_for_extension("jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("txt"), None);
        for ext in ["mov", "webm", "mkv", "png", "webp"] {
            let mime = mime_for_extension(ext).unwrap();
            assert_eq!(extension_for_mime(mime), ext);
        }
    }

    #[test]
    fn variant_defaults_to_public() {
        assert_eq!(ImageVariant::default(), ImageVariant::Public);
        assert_eq!("medium".parse::<ImageVariant>(), Ok(ImageVariant::Medium));
        assert!("huge".parse::<ImageVariant>().is_err());
    }

    #[test]
    fn missing_mime_falls_back_per_kind() {
        let file = LocalFile::new("/tmp/a", 10);
        assert_eq!(file.mime_type_or(AssetKind::Video), "video/mp4");
        assert_eq!(file.mime_type_or(AssetKind::Image), "image/jpeg");
        let file = file.with_mime_type("video/quicktime");
        assert_eq!(file.mime_type_or(AssetKind::Video), "video/quicktime");
    }
}
