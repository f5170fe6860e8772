use std::path::Path;

use gst::prelude::*;
use gstreamer as gst;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;

use crate::error::{Result, StoryError};

/// One decoded RGBA frame.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Size the frame should be shown at once pixel aspect is applied.
    pub display_size: (f32, f32),
}

/// What happened on the pipeline bus since the last poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Running,
    Looped,
}

/// Converts a story media URL into something `uridecodebin` accepts.
/// Remote URLs pass through; bare paths become `file://` URIs.
pub fn media_uri(url: &str) -> Result<String> {
    if url.contains("://") {
        return Ok(url.to_string());
    }
    let abs_path = std::fs::canonicalize(Path::new(url))
        .map_err(|e| StoryError::Media(format!("cannot resolve {url}: {e}")))?;
    gst::glib::filename_to_uri(&abs_path, None)
        .map(|uri| uri.to_string())
        .map_err(|e| StoryError::Media(format!("cannot build uri for {url}: {e}")))
}

/// Rejects URIs that carry quotes, whitespace or control characters. Media
/// URLs come from remote content and must stay a single opaque value.
pub fn checked_uri(uri: &str) -> Result<&str> {
    if uri.is_empty() {
        return Err(StoryError::Media("empty media uri".into()));
    }
    if let Some(bad) = uri
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '\\'))
    {
        return Err(StoryError::Media(format!(
            "media uri contains forbidden character {bad:?}"
        )));
    }
    Ok(uri)
}

/// Width and height a frame covers on screen, given its pixel aspect ratio.
/// Degenerate ratios are treated as square pixels.
pub fn display_size(width: u32, height: u32, par: (i32, i32)) -> (f32, f32) {
    let (numer, denom) = par;
    let scale = if numer > 0 && denom > 0 {
        numer as f32 / denom as f32
    } else {
        1.0
    };
    (width as f32 * scale, height as f32)
}

/// Copies a possibly padded RGBA plane into a tightly packed buffer.
pub fn pack_rgba(plane: &[u8], width: usize, height: usize, stride: usize) -> Option<Vec<u8>> {
    let row_len = width * 4;
    if stride < row_len || plane.len() < stride * height.saturating_sub(1) + row_len {
        return None;
    }
    if stride == row_len {
        return Some(plane[..row_len * height].to_vec());
    }
    let mut data = Vec::with_capacity(row_len * height);
    for row in plane.chunks(stride).take(height) {
        data.extend_from_slice(&row[..row_len]);
    }
    Some(data)
}

/// A muted, looping video decoded into RGBA frames through an appsink.
pub struct VideoStream {
    uri: String,
    pipeline: gst::Pipeline,
    sink: gst_app::AppSink,
    playing: bool,
}

impl VideoStream {
    /// Opens `url` decoded at `height` rows; the width follows the source's
    /// display aspect with square pixels.
    pub fn open(url: &str, height: u32) -> Result<Self> {
        gst::init().map_err(|e| StoryError::Media(e.to_string()))?;
        let uri = media_uri(url)?;
        checked_uri(&uri)?;

        let media_err = |e: gst::glib::BoolError| StoryError::Media(e.to_string());

        // Only video streams are exposed, so the story plays muted.
        let source = gst::ElementFactory::make("uridecodebin")
            .property("uri", uri.as_str())
            .property("caps", gst::Caps::builder("video/x-raw").build())
            .property("expose-all-streams", false)
            .build()
            .map_err(media_err)?;
        let convert = gst::ElementFactory::make("videoconvert")
            .build()
            .map_err(media_err)?;
        let scale = gst::ElementFactory::make("videoscale")
            .build()
            .map_err(media_err)?;
        let caps = gst_video::VideoCapsBuilder::new()
            .format(gst_video::VideoFormat::Rgba)
            .height(i32::try_from(height).unwrap_or(i32::MAX))
            .pixel_aspect_ratio(gst::Fraction::new(1, 1))
            .build();
        let sink = gst_app::AppSink::builder()
            .caps(&caps)
            .max_buffers(1)
            .drop(true)
            .sync(true)
            .build();

        let pipeline = gst::Pipeline::new();
        pipeline
            .add_many([&source, &convert, &scale, sink.upcast_ref()])
            .map_err(media_err)?;
        gst::Element::link_many([&convert, &scale, sink.upcast_ref()]).map_err(media_err)?;

        let convert_weak = convert.downgrade();
        source.connect_pad_added(move |_, src_pad| {
            let Some(convert) = convert_weak.upgrade() else {
                return;
            };
            let Some(sink_pad) = convert.static_pad("sink") else {
                return;
            };
            if sink_pad.is_linked() {
                return;
            }
            let is_video = src_pad
                .current_caps()
                .and_then(|caps| {
                    caps.structure(0)
                        .map(|s| s.name().as_str().starts_with("video/"))
                })
                .unwrap_or(false);
            if !is_video {
                return;
            }
            if let Err(e) = src_pad.link(&sink_pad) {
                tracing::warn!("failed to link decoded video: {e:?}");
            }
        });

        pipeline
            .set_state(gst::State::Paused)
            .map_err(|e| StoryError::Media(format!("failed to preroll {uri}: {e}")))?;
        tracing::debug!(%uri, "opened video stream");

        Ok(Self {
            uri,
            pipeline,
            sink,
            playing: false,
        })
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) -> Result<()> {
        if self.playing == playing {
            return Ok(());
        }
        let state = if playing {
            gst::State::Playing
        } else {
            gst::State::Paused
        };
        self.pipeline
            .set_state(state)
            .map_err(|e| StoryError::Media(format!("failed to set {state:?} on {}: {e}", self.uri)))?;
        self.playing = playing;
        Ok(())
    }

    /// Drains the bus, rewinding to the start on end-of-stream.
    pub fn poll_bus(&mut self) -> Result<StreamStatus> {
        let Some(bus) = self.pipeline.bus() else {
            return Ok(StreamStatus::Running);
        };
        let mut status = StreamStatus::Running;
        while let Some(msg) = bus.pop_filtered(&[gst::MessageType::Eos, gst::MessageType::Error]) {
            match msg.view() {
                gst::MessageView::Eos(..) => {
                    self.pipeline
                        .seek_simple(
                            gst::SeekFlags::FLUSH | gst::SeekFlags::KEY_UNIT,
                            gst::ClockTime::ZERO,
                        )
                        .map_err(|e| StoryError::Media(format!("failed to loop {}: {e}", self.uri)))?;
                    status = StreamStatus::Looped;
                }
                gst::MessageView::Error(err) => {
                    return Err(StoryError::Media(format!(
                        "{} failed: {}",
                        self.uri,
                        err.error()
                    )));
                }
                _ => {}
            }
        }
        Ok(status)
    }

    /// Returns the newest decoded frame, if one arrived since the last call.
    pub fn pull_frame(&self) -> Option<VideoFrame> {
        let sample = self.sink.try_pull_sample(gst::ClockTime::ZERO)?;
        let caps = sample.caps()?;
        let info = gst_video::VideoInfo::from_caps(caps).ok()?;
        let buffer = sample.buffer()?;
        let map = buffer.map_readable().ok()?;
        let stride = usize::try_from(*info.stride().first()?).ok()?;
        let data = pack_rgba(
            map.as_slice(),
            info.width() as usize,
            info.height() as usize,
            stride,
        )?;
        let par = info.par();
        Some(VideoFrame {
            data,
            width: info.width(),
            height: info.height(),
            display_size: display_size(info.width(), info.height(), (par.numer(), par.denom())),
        })
    }
}

impl Drop for VideoStream {
    fn drop(&mut self) {
        self.pipeline.set_state(gst::State::Null).ok();
        tracing::debug!(uri = %self.uri, "closed video stream");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_uri_keeps_remote_urls() {
        let url = "https://videos.example/hero.mp4";
        assert_eq!(media_uri(url).unwrap(), url);
    }

    #[test]
    fn test_media_uri_converts_local_paths() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let uri = media_uri(&file.path().to_string_lossy()).unwrap();
        assert!(uri.starts_with("file://"));
    }

    #[test]
    fn test_media_uri_missing_path() {
        assert!(matches!(
            media_uri("/definitely/not/here.mp4"),
            Err(StoryError::Media(_))
        ));
    }

    #[test]
    fn test_checked_uri_accepts_plain_urls() {
        let uri = "https://cdn.example/hero%20cut.mp4?w=720&h=1280";
        assert_eq!(checked_uri(uri).unwrap(), uri);
        assert!(checked_uri("file:///srv/media/hero.mp4").is_ok());
    }

    #[test]
    fn test_checked_uri_rejects_pipeline_syntax() {
        let injected = "https://x/a.mp4\" ! filesink location=/tmp/out name=y";
        assert!(matches!(checked_uri(injected), Err(StoryError::Media(_))));
        assert!(checked_uri("https://x/a.mp4'").is_err());
        assert!(checked_uri("https://x/a b.mp4").is_err());
        assert!(checked_uri("https://x/a.mp4\n").is_err());
        assert!(checked_uri("").is_err());
    }

    #[test]
    fn test_display_size_square_pixels() {
        assert_eq!(display_size(2276, 1280, (1, 1)), (2276.0, 1280.0));
    }

    #[test]
    fn test_display_size_applies_pixel_aspect() {
        // 720x1280 buffer of a 16:9 source stretched with non-square pixels
        let (w, h) = display_size(720, 1280, (256, 81));
        assert!((w / h - 16.0 / 9.0).abs() < 1e-3);
        assert_eq!(display_size(720, 1280, (0, 1)), (720.0, 1280.0));
        assert_eq!(display_size(720, 1280, (1, 0)), (720.0, 1280.0));
    }

    #[test]
    fn test_pack_rgba_tight() {
        let plane: Vec<u8> = (0..16).collect();
        assert_eq!(pack_rgba(&plane, 2, 2, 8).unwrap(), plane);
    }

    #[test]
    fn test_pack_rgba_strips_padding() {
        // 1x2 image, 4 bytes of pixels plus 4 bytes of padding per row
        let plane = [1, 2, 3, 4, 0, 0, 0, 0, 5, 6, 7, 8];
        assert_eq!(
            pack_rgba(&plane, 1, 2, 8).unwrap(),
            vec![1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn test_pack_rgba_rejects_short_plane() {
        assert!(pack_rgba(&[0; 6], 1, 2, 4).is_none());
        assert!(pack_rgba(&[0; 16], 2, 2, 4).is_none());
    }
}
