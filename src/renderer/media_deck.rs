use std::collections::HashSet;
use std::num::NonZeroUsize;

use eframe::egui;
use lru::LruCache;

use crate::renderer::media_stream::{StreamStatus, VideoStream};
use crate::types::playback_state::{MediaPlayback, PlaybackState};
use crate::types::story::MediaKind;

/// Streams kept open when there is no explicit capacity.
pub const DEFAULT_OPEN_STREAMS: usize = 3;

struct DeckEntry {
    stream: VideoStream,
    texture: Option<egui::TextureHandle>,
    display_size: egui::Vec2,
}

/// Play/pause decision for every video URL in the sequence, one entry per
/// URL. Stories sharing the active video never pause it, URLs that already
/// failed are left out, and non-video stories need no stream at all.
pub fn playback_plan<'a>(
    state: &'a PlaybackState,
    failed: &HashSet<String>,
) -> Vec<(&'a str, MediaPlayback)> {
    let active_url = state
        .active_record()
        .filter(|record| record.media.kind() == MediaKind::Video)
        .map(|record| record.media.url.as_str());
    let mut plan: Vec<(&str, MediaPlayback)> = Vec::new();
    if let Some(url) = active_url.filter(|url| !failed.contains(*url)) {
        plan.push((url, MediaPlayback::Playing));
    }
    for record in state.sequence().records() {
        let url = record.media.url.as_str();
        if record.media.kind() != MediaKind::Video
            || Some(url) == active_url
            || failed.contains(url)
            || plan.iter().any(|(planned, _)| *planned == url)
        {
            continue;
        }
        plan.push((url, MediaPlayback::Paused));
    }
    plan
}

/// Owns the video pipelines behind the story strip. The active story plays,
/// every other open stream is paused, and the least recently shown streams
/// are closed once the deck is full.
pub struct MediaDeck {
    entries: LruCache<String, DeckEntry>,
    failed: HashSet<String>,
    height: u32,
}

impl MediaDeck {
    pub fn new(capacity: usize, height: u32) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or(NonZeroUsize::new(DEFAULT_OPEN_STREAMS).unwrap_or(NonZeroUsize::MIN));
        Self {
            entries: LruCache::new(capacity),
            failed: HashSet::new(),
            height,
        }
    }

    /// Closes every stream, e.g. when new content replaces the old.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.failed.clear();
    }

    /// Applies the play/pause selection for the current active story.
    pub fn sync(&mut self, state: &PlaybackState) {
        for (url, playback) in playback_plan(state, &self.failed) {
            match playback {
                MediaPlayback::Playing => self.play(url),
                MediaPlayback::Paused => self.pause(url),
            }
        }
    }

    fn play(&mut self, url: &str) {
        if self.failed.contains(url) {
            return;
        }
        if !self.entries.contains(url) {
            match VideoStream::open(url, self.height) {
                Ok(stream) => {
                    if let Some((evicted, _)) = self.entries.push(
                        url.to_string(),
                        DeckEntry {
                            stream,
                            texture: None,
                            display_size: egui::Vec2::ZERO,
                        },
                    ) {
                        if evicted != url {
                            tracing::debug!(url = %evicted, "evicted video stream");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(url, "video unavailable: {e}");
                    self.failed.insert(url.to_string());
                    return;
                }
            }
        }
        let result = self
            .entries
            .get_mut(url)
            .map(|entry| entry.stream.set_playing(true));
        if let Some(Err(e)) = result {
            tracing::warn!(url, "{e}");
            self.fail(url);
        }
    }

    fn pause(&mut self, url: &str) {
        // peek so that paused streams age out of the cache
        let result = self
            .entries
            .peek_mut(url)
            .map(|entry| entry.stream.set_playing(false));
        if let Some(Err(e)) = result {
            tracing::warn!(url, "{e}");
            self.fail(url);
        }
    }

    fn fail(&mut self, url: &str) {
        self.entries.pop(url);
        self.failed.insert(url.to_string());
    }

    /// Pulls new frames from the open streams and uploads them to textures.
    pub fn update_textures(&mut self, ctx: &egui::Context) {
        let mut broken = Vec::new();
        for (url, entry) in self.entries.iter_mut() {
            match entry.stream.poll_bus() {
                Ok(StreamStatus::Looped) => tracing::trace!(%url, "video looped"),
                Ok(StreamStatus::Running) => {}
                Err(e) => {
                    tracing::warn!("{e}");
                    broken.push(url.clone());
                    continue;
                }
            }
            let Some(frame) = entry.stream.pull_frame() else {
                continue;
            };
            entry.display_size = egui::vec2(frame.display_size.0, frame.display_size.1);
            let image = egui::ColorImage::from_rgba_unmultiplied(
                [frame.width as usize, frame.height as usize],
                &frame.data,
            );
            match entry.texture.as_mut() {
                Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                None => {
                    entry.texture = Some(ctx.load_texture(
                        format!("story_video:{url}"),
                        image,
                        egui::TextureOptions::LINEAR,
                    ))
                }
            }
        }
        for url in broken {
            self.fail(&url);
        }
    }

    /// Latest frame of `url` and the size it should be shown at.
    pub fn texture(&self, url: &str) -> Option<(&egui::TextureHandle, egui::Vec2)> {
        let entry = self.entries.peek(url)?;
        Some((entry.texture.as_ref()?, entry.display_size))
    }

    pub fn has_failed(&self, url: &str) -> bool {
        self.failed.contains(url)
    }

    /// True while any open stream is playing and needs continuous repaints.
    pub fn is_playing(&self) -> bool {
        self.entries.iter().any(|(_, entry)| entry.stream.is_playing())
    }
}
