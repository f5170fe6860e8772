use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Reference to an image or video hosted by the content source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Svg,
    Image,
    Missing,
}

impl MediaRef {
    pub fn new(url: impl Into<String>, content_type: Option<&str>) -> Self {
        MediaRef {
            url: url.into(),
            content_type: content_type.map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.trim().is_empty()
    }

    /// Classifies the media by its declared content type, falling back to the
    /// URL extension when the source did not send one.
    pub fn kind(&self) -> MediaKind {
        if self.is_empty() {
            return MediaKind::Missing;
        }
        if let Some(content_type) = self.content_type.as_deref() {
            let content_type = content_type.to_ascii_lowercase();
            if content_type.starts_with("video/") {
                return MediaKind::Video;
            }
            if content_type.starts_with("image/svg") {
                return MediaKind::Svg;
            }
            if content_type.starts_with("image/") {
                return MediaKind::Image;
            }
        }
        let path = self.url.split(['?', '#']).next().unwrap_or_default();
        let ext = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" | "mov" | "m4v" | "webm" | "mkv" | "m3u8" => MediaKind::Video,
            "svg" => MediaKind::Svg,
            _ => MediaKind::Image,
        }
    }
}

/// One slide of the full-screen carousel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRecord {
    pub title: String,
    pub eyebrow_text: String,
    /// Carried through from the content source; the player never follows it.
    pub target_url: String,
    pub enable_dark_backdrop: bool,
    pub eyebrow_image: MediaRef,
    #[serde(rename = "mobileImageOrVideo")]
    pub media: MediaRef,
}

/// The read-only list of stories for one session, tagged with an identity so
/// that supplying new content can be told apart from re-supplying the same.
#[derive(Debug, Clone)]
pub struct StorySequence {
    id: Uuid,
    records: Arc<[StoryRecord]>,
}

impl StorySequence {
    pub fn new(records: Vec<StoryRecord>) -> Self {
        StorySequence {
            id: Uuid::new_v4(),
            records: records.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StoryRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[StoryRecord] {
        &self.records
    }
}

impl Default for StorySequence {
    fn default() -> Self {
        Self::empty()
    }
}
