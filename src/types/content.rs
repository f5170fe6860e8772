use crate::types::story::{MediaRef, StoryRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A single value of the flat hero slider object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoryDataValue {
    Null,
    Flag(bool),
    Text(String),
    Media(MediaRef),
    /// Anything else the content source sends (numbers, nested objects).
    Other(serde_json::Value),
}

/// Flat key-indexed object as delivered by the content API, with keys such as
/// `slide1Title`, `slide1EyebrowText`, `slide2MobileImageOrVideo`.
pub type StoryData = HashMap<String, StoryDataValue>;

const SLIDE_PREFIX: &str = "slide";
const TITLE_FIELD: &str = "Title";

/// Returns the slide number of a `slide<N>Title` key.
fn slide_number(key: &str) -> Option<u32> {
    let rest = key.strip_prefix(SLIDE_PREFIX)?;
    let digits_end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)?;
    if digits_end == 0 || &rest[digits_end..] != TITLE_FIELD {
        return None;
    }
    rest[..digits_end].parse().ok()
}

fn text_field(data: &StoryData, slide: u32, field: &str) -> String {
    match data.get(&format!("{SLIDE_PREFIX}{slide}{field}")) {
        Some(StoryDataValue::Text(text)) => text.clone(),
        _ => String::new(),
    }
}

fn flag_field(data: &StoryData, slide: u32, field: &str) -> bool {
    matches!(
        data.get(&format!("{SLIDE_PREFIX}{slide}{field}")),
        Some(StoryDataValue::Flag(true))
    )
}

fn media_field(data: &StoryData, slide: u32, field: &str) -> MediaRef {
    match data.get(&format!("{SLIDE_PREFIX}{slide}{field}")) {
        Some(StoryDataValue::Media(media)) => media.clone(),
        _ => MediaRef::default(),
    }
}

/// Groups `slide<N><Field>` keys by `N` and builds one record per group, in
/// ascending slide order. Groups without a non-empty title are skipped.
pub fn extract_stories(data: &StoryData) -> Vec<StoryRecord> {
    let slides: BTreeSet<u32> = data.keys().filter_map(|key| slide_number(key)).collect();

    slides
        .into_iter()
        .filter_map(|slide| {
            let title = text_field(data, slide, TITLE_FIELD);
            if title.is_empty() {
                tracing::debug!(slide, "skipping slide without a title");
                return None;
            }
            Some(StoryRecord {
                title,
                eyebrow_text: text_field(data, slide, "EyebrowText"),
                target_url: text_field(data, slide, "TargetUrl"),
                enable_dark_backdrop: flag_field(data, slide, "EnableDarkBackdrop"),
                eyebrow_image: media_field(data, slide, "EyebrowImage"),
                media: media_field(data, slide, "MobileImageOrVideo"),
            })
        })
        .collect()
}
