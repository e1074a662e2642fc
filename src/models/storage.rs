use serde::{Deserialize, Serialize};
use std::path::Path;

pub const GENERATED_IMAGE_NAME: &str = "image.jpg";
pub const GENERATED_IMAGE_MIME: &str = "image/jpeg";

/// An in-memory payload with the metadata a file picker would attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Wraps downloaded image bytes the way the uploader names them.
    pub fn generated_image(bytes: Vec<u8>) -> Self {
        Self::new(GENERATED_IMAGE_NAME, GENERATED_IMAGE_MIME, bytes)
    }

    /// A blob counts as a file when it has a name and a `type/subtype` MIME type.
    pub fn is_file_like(&self) -> bool {
        if self.name.trim().is_empty() {
            return false;
        }
        match self.mime_type.split_once('/') {
            Some((kind, subtype)) => {
                !kind.is_empty() && !subtype.is_empty() && !subtype.contains('/')
            }
            None => false,
        }
    }

    pub fn is_audio(&self) -> bool {
        self.mime_type.starts_with("audio/")
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// MIME type for an audio file, judged by extension.
pub fn audio_mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "m4a" => "audio/mp4",
        "weba" => "audio/webm",
        "mid" | "midi" => "audio/midi",
        "aif" | "aiff" => "audio/aiff",
        _ => return None,
    };
    Some(mime)
}

/// One entry of the `/api/v0/add` response stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddResult {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Hash")]
    pub hash: String,
    #[serde(rename = "Size", default)]
    pub size: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadOutcome {
    Skipped,
    Stored { hash: String },
    Failed { error: String },
}

impl UploadOutcome {
    pub fn hash(&self) -> Option<&str> {
        match self {
            UploadOutcome::Stored { hash } => Some(hash),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, UploadOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    pub image: UploadOutcome,
    pub audio: UploadOutcome,
}

impl UploadReport {
    pub fn image_hash(&self) -> Option<&str> {
        self.image.hash()
    }

    pub fn audio_hash(&self) -> Option<&str> {
        self.audio.hash()
    }

    pub fn has_failures(&self) -> bool {
        self.image.is_failed() || self.audio.is_failed()
    }
}
