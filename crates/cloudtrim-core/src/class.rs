//! File type classification.
//!
//! Classification is a pure function of a record's mime type and name:
//! mime rules are tried first, then the extension table, then [`FileTypeClass::Other`].

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter};

/// Broad bucket a file falls into for storage breakdowns.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FileTypeClass {
    Document,
    Image,
    Video,
    Audio,
    Archive,
    Code,
    Other,
}

impl FileTypeClass {
    /// Classify from mime type, falling back to the file name's extension.
    pub fn classify(mime_type: &str, name: &str) -> Self {
        Self::from_mime(mime_type)
            .or_else(|| extension_of(name).and_then(|ext| Self::from_extension(&ext)))
            .unwrap_or(Self::Other)
    }

    /// Match a mime type against the explicit rules.
    ///
    /// Returns `None` for generic or unknown types so the caller can consult
    /// the extension table.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let mime = mime_type.trim().to_ascii_lowercase();
        let mime = mime.split(';').next().unwrap_or("").trim();

        if let Some(kind) = mime.strip_prefix("application/vnd.google-apps.") {
            return match kind {
                "document" | "spreadsheet" | "presentation" | "form" | "drawing" => {
                    Some(Self::Document)
                }
                "photo" => Some(Self::Image),
                "video" => Some(Self::Video),
                "audio" => Some(Self::Audio),
                "script" => Some(Self::Code),
                _ => None,
            };
        }

        if mime.starts_with("image/") {
            return Some(Self::Image);
        }
        if mime.starts_with("video/") {
            return Some(Self::Video);
        }
        if mime.starts_with("audio/") {
            return Some(Self::Audio);
        }

        match mime {
            "text/plain" | "text/csv" | "text/markdown" | "text/rtf" | "application/pdf"
            | "application/rtf" | "application/msword" | "application/epub+zip" => {
                return Some(Self::Document);
            }
            "application/zip" | "application/x-zip-compressed" | "application/gzip"
            | "application/x-gzip" | "application/x-tar" | "application/x-7z-compressed"
            | "application/x-rar-compressed" | "application/vnd.rar" | "application/x-bzip2"
            | "application/x-xz" | "application/zstd" | "application/x-iso9660-image" => {
                return Some(Self::Archive);
            }
            "text/html" | "text/css" | "text/javascript" | "application/javascript"
            | "application/json" | "application/xml" | "text/xml" | "application/x-sh"
            | "application/x-python-code" | "application/sql" | "application/x-yaml"
            | "application/toml" => return Some(Self::Code),
            _ => {}
        }

        if mime.starts_with("application/vnd.openxmlformats-officedocument.")
            || mime.starts_with("application/vnd.oasis.opendocument.")
            || mime.starts_with("application/vnd.ms-excel")
            || mime.starts_with("application/vnd.ms-powerpoint")
        {
            return Some(Self::Document);
        }
        if mime.starts_with("text/x-") {
            return Some(Self::Code);
        }

        None
    }

    /// Match a lowercased extension (no dot) against the extension table.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let class = match ext {
            "doc" | "docx" | "pdf" | "txt" | "rtf" | "odt" | "ods" | "odp" | "xls" | "xlsx"
            | "ppt" | "pptx" | "csv" | "md" | "epub" | "pages" | "numbers" | "key" => {
                Self::Document
            }
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" | "ico" | "tiff" | "tif"
            | "psd" | "raw" | "cr2" | "nef" | "heic" | "heif" => Self::Image,
            "mp4" | "mkv" | "avi" | "mov" | "wmv" | "flv" | "webm" | "m4v" | "mpg" | "mpeg"
            | "3gp" => Self::Video,
            "mp3" | "wav" | "flac" | "aac" | "ogg" | "wma" | "m4a" | "opus" => Self::Audio,
            "zip" | "rar" | "7z" | "tar" | "gz" | "tgz" | "bz2" | "xz" | "zst" | "cab" | "iso"
            | "dmg" => Self::Archive,
            "rs" | "py" | "js" | "ts" | "jsx" | "tsx" | "c" | "cpp" | "h" | "hpp" | "cs"
            | "java" | "go" | "rb" | "php" | "swift" | "kt" | "scala" | "html" | "css"
            | "scss" | "json" | "xml" | "yaml" | "yml" | "toml" | "sql" | "sh" | "bat"
            | "ps1" | "ipynb" => Self::Code,
            _ => return None,
        };
        Some(class)
    }
}

pub(crate) fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
