use std::path::Path;

/// What a file or remote locator holds, judged by its extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unknown,
}

const IMAGE_SUFFIXES: [&str; 4] = [".png", ".gif", ".jpg", ".jpeg"];
const VIDEO_SUFFIXES: [&str; 1] = [".mp4"];

impl MediaKind {
    /// Classify a file name or locator. Matching is case-sensitive.
    pub fn classify(name: &str) -> Self {
        if IMAGE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            Self::Image
        } else if VIDEO_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            Self::Video
        } else {
            Self::Unknown
        }
    }

    pub fn of_path(path: &Path) -> Self {
        path.file_name()
            .map(|name| Self::classify(&name.to_string_lossy()))
            .unwrap_or(Self::Unknown)
    }

    /// Content type sent with the upload part for a file of this name.
    pub fn mime_type(name: &str) -> &'static str {
        if name.ends_with(".jpg") || name.ends_with(".jpeg") {
            "image/jpeg"
        } else if name.ends_with(".png") {
            "image/png"
        } else if name.ends_with(".gif") {
            "image/gif"
        } else if name.ends_with(".mp4") {
            "video/mp4"
        } else {
            "application/octet-stream"
        }
    }
}
