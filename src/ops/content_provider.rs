use crate::error::{Result, StoryError};
use crate::types::content::{StoryData, extract_stories};
use crate::types::story::StoryRecord;
use serde_json::Value;
use std::path::PathBuf;

/// Key of the hero slider object inside a GraphQL-style response envelope.
const HERO_SLIDER_KEY: &str = "blockHomeHeroSlider";

/// Supplies the ordered story list once per session.
pub trait ContentProvider {
    fn load(&self) -> Result<Vec<StoryRecord>>;
}

/// Serves stories that are already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticContentProvider {
    stories: Vec<StoryRecord>,
}

impl StaticContentProvider {
    pub fn new(stories: Vec<StoryRecord>) -> Self {
        Self { stories }
    }
}

impl ContentProvider for StaticContentProvider {
    fn load(&self) -> Result<Vec<StoryRecord>> {
        Ok(self.stories.clone())
    }
}

/// Reads a saved content API response from disk.
///
/// The document may be the flat hero slider object itself or the full
/// response, `{"data": {"blockHomeHeroSlider": {...}}}`.
#[derive(Debug, Clone)]
pub struct FileContentProvider {
    path: PathBuf,
}

impl FileContentProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentProvider for FileContentProvider {
    fn load(&self) -> Result<Vec<StoryRecord>> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| StoryError::ContentIo {
            path: self.path.display().to_string(),
            source,
        })?;
        let stories = parse_hero_slider(&json)?;
        tracing::info!(
            path = %self.path.display(),
            count = stories.len(),
            "loaded stories"
        );
        Ok(stories)
    }
}

/// Parses a content document and extracts its stories.
pub fn parse_hero_slider(json: &str) -> Result<Vec<StoryRecord>> {
    let document: Value = serde_json::from_str(json)?;
    let slider = match document.pointer(&format!("/data/{HERO_SLIDER_KEY}")) {
        Some(slider) => slider.clone(),
        None if document.get("data").is_some() => return Err(StoryError::MissingContent),
        None => document,
    };
    if !slider.is_object() {
        return Err(StoryError::MissingContent);
    }
    let data: StoryData = serde_json::from_value(slider)?;
    Ok(extract_stories(&data))
}
