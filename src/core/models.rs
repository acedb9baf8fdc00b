use serde::{Deserialize, Serialize};
use std::fmt;

pub type BookId = i64;
pub type ChapterId = i64;
pub type CharacterId = i64;

/// Server-side processing state of a book. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookStatus {
    Ready,
    Processing,
    Other(String),
}

impl From<String> for BookStatus {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "READY" => BookStatus::Ready,
            "PROCESSING" => BookStatus::Processing,
            _ => BookStatus::Other(raw),
        }
    }
}

impl From<BookStatus> for String {
    fn from(status: BookStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookStatus::Ready => f.write_str("READY"),
            BookStatus::Processing => f.write_str("PROCESSING"),
            BookStatus::Other(raw) => f.write_str(raw),
        }
    }
}

/// Generation state of a chapter, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChapterStatus {
    Completed,
    Processing,
    /// Anything else counts as pending; the raw value is kept for display.
    Pending(String),
}

impl From<String> for ChapterStatus {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "COMPLETED" => ChapterStatus::Completed,
            "PROCESSING" => ChapterStatus::Processing,
            _ => ChapterStatus::Pending(raw),
        }
    }
}

impl From<ChapterStatus> for String {
    fn from(status: ChapterStatus) -> Self {
        match status {
            ChapterStatus::Completed => "COMPLETED".to_string(),
            ChapterStatus::Processing => "PROCESSING".to_string(),
            ChapterStatus::Pending(raw) => raw,
        }
    }
}

impl ChapterStatus {
    /// Upper-cased status shown on chapter badges.
    pub fn label(&self) -> String {
        match self {
            ChapterStatus::Completed => "COMPLETED".to_string(),
            ChapterStatus::Processing => "PROCESSING".to_string(),
            ChapterStatus::Pending(raw) => raw.to_uppercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub status: BookStatus,
    #[serde(default)]
    pub cover_path: Option<String>,
}

impl Book {
    pub fn snapshot(&self) -> BookSnapshot {
        BookSnapshot {
            id: self.id,
            title: self.title.clone(),
            author: self.author.clone(),
            cover_path: self.cover_path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: ChapterId,
    pub title: String,
    pub position: u32,
    pub status: ChapterStatus,
    #[serde(default)]
    pub audio_path: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
}

impl Chapter {
    pub fn is_completed(&self) -> bool {
        self.status == ChapterStatus::Completed
    }

    /// Completed and carrying an audio directory, i.e. playable.
    pub fn has_audio(&self) -> bool {
        self.is_completed() && self.audio_path.as_deref().is_some_and(|p| !p.is_empty())
    }

    pub fn position_label(&self) -> String {
        format!("#{:02}", self.position)
    }

    pub fn snapshot(&self) -> ChapterSnapshot {
        ChapterSnapshot {
            id: self.id,
            title: self.title.clone(),
            position: self.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub age_category: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
    #[serde(default)]
    pub voice_quality: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub assigned_voice_id: Option<String>,
}

impl Character {
    pub fn is_narrator(&self) -> bool {
        self.name == "Narrator"
    }

    pub fn initial(&self) -> String {
        self.name.chars().next().map(String::from).unwrap_or_default()
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_empty()))
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Voice {
    pub short_name: String,
    pub gender: String,
    pub locale: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
}

impl Voice {
    /// `fr-FR-DeniseNeural` becomes `Denise`.
    pub fn display_name(&self) -> String {
        self.short_name
            .rsplit('-')
            .next()
            .unwrap_or(&self.short_name)
            .replace("Neural", "")
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VoiceCatalog {
    #[serde(default)]
    pub voices: Vec<Voice>,
}

/// Backend processing mode. Any value other than `CLOUD` reads as local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppMode {
    Cloud,
    Local,
}

impl From<String> for AppMode {
    fn from(raw: String) -> Self {
        if raw == "CLOUD" {
            AppMode::Cloud
        } else {
            AppMode::Local
        }
    }
}

impl From<AppMode> for String {
    fn from(mode: AppMode) -> Self {
        mode.as_str().to_string()
    }
}

impl AppMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppMode::Cloud => "CLOUD",
            AppMode::Local => "LOCAL",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            AppMode::Cloud => AppMode::Local,
            AppMode::Local => AppMode::Cloud,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AppMode::Cloud => "Cloud Mode",
            AppMode::Local => "Local Mode",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AppMode::Cloud => "Using EdgeTTS + Gemini API",
            AppMode::Local => "Using XTTS + Ollama (Local)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub app_mode: AppMode,
    #[serde(default)]
    pub gemini_api_key_set: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModeUpdate {
    pub app_mode: AppMode,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModeChange {
    pub message: String,
    #[serde(default)]
    pub new_mode: Option<AppMode>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VoiceAssignment<'a> {
    pub assigned_voice_id: &'a str,
}

/// Book fields the player keeps while the book page is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub cover_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterSnapshot {
    pub id: ChapterId,
    pub title: String,
    pub position: u32,
}

/// A file picked by the user, read fully into memory before upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: None,
            bytes,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        let mime = mime.into();
        if !mime.is_empty() {
            self.mime = Some(mime);
        }
        self
    }

    /// Explicit mime when known, otherwise guessed from the extension.
    pub fn content_type(&self) -> &str {
        if let Some(mime) = &self.mime {
            return mime;
        }
        let ext = self
            .name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "epub" => "application/epub+zip",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "application/octet-stream",
        }
    }

    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.bytes.len() as f64 / 1024.0 / 1024.0)
    }
}
