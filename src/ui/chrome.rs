use eframe::egui;

use crate::renderer::story_player::ChromeFrame;
use crate::types::playback_state::PROGRESS_COMPLETE;
use crate::types::story::{MediaKind, MediaRef};

const BODY_PADDING: f32 = 24.0;
const BARS_PADDING: f32 = 16.0;
const BARS_BOTTOM_PADDING: f32 = 80.0;
const BAR_HEIGHT: f32 = 5.0;
const BAR_GAP: f32 = 2.0;
const CHEVRON_SIZE: egui::Vec2 = egui::vec2(60.0, 120.0);
const EYEBROW_SIZE: egui::Vec2 = egui::vec2(200.0, 80.0);
const TITLE_SIZE: f32 = 40.0;

/// What the user did with the chrome this frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChromeResponse {
    pub advance: bool,
}

/// URI egui's image loaders understand; bare paths are treated as local files.
pub fn image_uri(media: &MediaRef) -> String {
    if media.url.contains("://") {
        media.url.clone()
    } else {
        format!("file://{}", media.url)
    }
}

/// Tracks of the progress bars, laid out left to right along the bottom of `area`.
pub fn progress_tracks(area: egui::Rect, count: usize) -> Vec<egui::Rect> {
    if count == 0 {
        return Vec::new();
    }
    let left = area.left() + BARS_PADDING;
    let width = (area.width() - 2.0 * BARS_PADDING).max(0.0);
    let slot = width / count as f32;
    let bottom = area.bottom() - BARS_BOTTOM_PADDING;
    (0..count)
        .map(|i| {
            let x = left + slot * i as f32;
            egui::Rect::from_min_max(
                egui::pos2(x + BAR_GAP, bottom - BAR_HEIGHT),
                egui::pos2((x + slot - BAR_GAP).max(x + BAR_GAP), bottom),
            )
        })
        .collect()
}

/// Filled part of a track for `progress` percent.
pub fn progress_fill(track: egui::Rect, progress: u8) -> egui::Rect {
    let fraction = f32::from(progress.min(PROGRESS_COMPLETE)) / f32::from(PROGRESS_COMPLETE);
    egui::Rect::from_min_size(
        track.min,
        egui::vec2(track.width() * fraction, track.height()),
    )
}

fn draw_progress_bars(painter: &egui::Painter, area: egui::Rect, progress: &[u8]) {
    for (track, value) in progress_tracks(area, progress.len()).into_iter().zip(progress) {
        painter.rect_filled(track, 0.0, egui::Color32::GRAY);
        painter.rect_filled(progress_fill(track, *value), 0.0, egui::Color32::WHITE);
    }
}

fn eyebrow(ui: &mut egui::Ui, frame: &ChromeFrame) {
    let record = frame.active_record;
    match record.eyebrow_image.kind() {
        MediaKind::Svg | MediaKind::Image => {
            ui.add(
                egui::Image::new(image_uri(&record.eyebrow_image))
                    .fit_to_exact_size(EYEBROW_SIZE),
            );
        }
        MediaKind::Video | MediaKind::Missing => {
            if !record.eyebrow_text.is_empty() {
                ui.label(
                    egui::RichText::new(&record.eyebrow_text)
                        .size(16.0)
                        .color(egui::Color32::WHITE),
                );
            }
        }
    }
}

/// Draws the backdrop, title block, advance chevron and progress bars over
/// the story page in `rect`.
pub fn chrome_overlay(ui: &mut egui::Ui, rect: egui::Rect, frame: &ChromeFrame) -> ChromeResponse {
    let mut response = ChromeResponse::default();
    let painter = ui.painter_at(rect);

    if frame.enable_dark_backdrop {
        painter.rect_filled(rect, 0.0, egui::Color32::from_black_alpha(128));
    }

    let body = rect.shrink(BODY_PADDING);
    ui.scope_builder(egui::UiBuilder::new().max_rect(body), |ui| {
        ui.horizontal_centered(|ui| {
            let info_width = (ui.available_width() - CHEVRON_SIZE.x).max(0.0);
            ui.vertical(|ui| {
                ui.set_width(info_width);
                eyebrow(ui, frame);
                ui.add_space(20.0);
                ui.label(
                    egui::RichText::new(frame.active_record.title.to_uppercase())
                        .size(TITLE_SIZE)
                        .strong()
                        .color(egui::Color32::WHITE),
                );
            });
            let chevron = egui::Button::new(
                egui::RichText::new("›").size(60.0).color(egui::Color32::WHITE),
            )
            .frame(false)
            .min_size(CHEVRON_SIZE);
            if ui.add(chevron).on_hover_text("Next story").clicked() {
                response.advance = true;
            }
        });
    });

    draw_progress_bars(&painter, rect, frame.progress);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(332.0, 600.0))
    }

    #[test]
    fn test_progress_tracks_split_width() {
        let tracks = progress_tracks(area(), 3);
        assert_eq!(tracks.len(), 3);
        // 300 px of usable width, 100 px per slot, 2 px gap on each side
        assert_eq!(tracks[0].left(), 18.0);
        assert_eq!(tracks[0].width(), 96.0);
        assert_eq!(tracks[2].right(), 314.0);
        for track in &tracks {
            assert_eq!(track.bottom(), 520.0);
            assert_eq!(track.height(), BAR_HEIGHT);
        }
        assert!(progress_tracks(area(), 0).is_empty());
    }

    #[test]
    fn test_progress_fill_fraction() {
        let track = egui::Rect::from_min_size(egui::pos2(10.0, 10.0), egui::vec2(200.0, 5.0));
        assert_eq!(progress_fill(track, 0).width(), 0.0);
        assert_eq!(progress_fill(track, 50).width(), 100.0);
        assert_eq!(progress_fill(track, 100).width(), 200.0);
        assert_eq!(progress_fill(track, 250).width(), 200.0);
        assert_eq!(progress_fill(track, 50).min, track.min);
    }

    #[test]
    fn test_image_uri() {
        let remote = MediaRef::new("https://cdn.example/logo.svg", None);
        let local = MediaRef::new("/srv/content/logo.png", None);
        assert_eq!(image_uri(&remote), "https://cdn.example/logo.svg");
        assert_eq!(image_uri(&local), "file:///srv/content/logo.png");
    }
}
