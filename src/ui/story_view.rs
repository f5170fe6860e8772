use eframe::egui;

use crate::renderer::media_deck::MediaDeck;
use crate::renderer::viewport::StripViewport;
use crate::types::story::{MediaKind, StoryRecord};
use crate::ui::chrome::image_uri;

/// UV rect that crops a texture so it covers `target` without distortion.
pub fn cover_uv(texture: egui::Vec2, target: egui::Vec2) -> egui::Rect {
    let full = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    if texture.x <= 0.0 || texture.y <= 0.0 || target.x <= 0.0 || target.y <= 0.0 {
        return full;
    }
    let texture_aspect = texture.x / texture.y;
    let target_aspect = target.x / target.y;
    if texture_aspect > target_aspect {
        // wider than the page: trim the sides
        let visible = target_aspect / texture_aspect;
        let margin = (1.0 - visible) / 2.0;
        egui::Rect::from_min_max(egui::pos2(margin, 0.0), egui::pos2(1.0 - margin, 1.0))
    } else {
        let visible = texture_aspect / target_aspect;
        let margin = (1.0 - visible) / 2.0;
        egui::Rect::from_min_max(egui::pos2(0.0, margin), egui::pos2(1.0, 1.0 - margin))
    }
}

fn story_page(ui: &mut egui::Ui, record: &StoryRecord, page: egui::Vec2, deck: &MediaDeck) {
    let (rect, _) = ui.allocate_exact_size(page, egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, egui::Color32::BLACK);

    match record.media.kind() {
        MediaKind::Video => {
            if let Some((texture, display_size)) = deck.texture(&record.media.url) {
                let uv = cover_uv(display_size, rect.size());
                painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
            } else if deck.has_failed(&record.media.url) {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "Video unavailable",
                    egui::FontId::proportional(14.0),
                    egui::Color32::GRAY,
                );
            }
        }
        MediaKind::Image | MediaKind::Svg => {
            egui::Image::new(image_uri(&record.media))
                .fit_to_exact_size(rect.size())
                .paint_at(ui, rect);
        }
        MediaKind::Missing => {}
    }
}

/// Horizontal strip with one viewport-wide page per story. Users cannot
/// scroll it; the viewport target decides which page is shown.
pub fn story_strip(
    ui: &mut egui::Ui,
    records: &[StoryRecord],
    viewport: &StripViewport,
    deck: &MediaDeck,
) {
    let page = ui.available_size();
    egui::ScrollArea::horizontal()
        .id_salt("story_strip")
        .enable_scrolling(false)
        .scroll_bar_visibility(egui::scroll_area::ScrollBarVisibility::AlwaysHidden)
        .horizontal_scroll_offset(viewport.offset(page.x))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 0.0;
                for record in records {
                    story_page(ui, record, page, deck);
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::media_stream::display_size;

    #[test]
    fn test_cover_uv_trims_wide_texture() {
        let uv = cover_uv(egui::vec2(1920.0, 1080.0), egui::vec2(1080.0, 1080.0));
        assert!((uv.width() - 1080.0 / 1920.0).abs() < 1e-5);
        assert_eq!(uv.height(), 1.0);
        assert!((uv.center().x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_cover_uv_trims_tall_texture() {
        let uv = cover_uv(egui::vec2(720.0, 1280.0), egui::vec2(1280.0, 720.0));
        assert_eq!(uv.width(), 1.0);
        assert!((uv.height() - (720.0 / 1280.0) / (1280.0 / 720.0)).abs() < 1e-5);
        assert!((uv.center().y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_cover_uv_same_aspect_is_full() {
        let uv = cover_uv(egui::vec2(720.0, 1280.0), egui::vec2(360.0, 640.0));
        assert!((uv.width() - 1.0).abs() < 1e-5);
        assert!((uv.height() - 1.0).abs() < 1e-5);
        let degenerate = cover_uv(egui::vec2(0.0, 0.0), egui::vec2(360.0, 640.0));
        assert_eq!(degenerate.width(), 1.0);
    }

    #[test]
    fn test_cover_uv_uses_display_aspect() {
        // landscape source delivered in a portrait buffer with wide pixels
        let (w, h) = display_size(720, 1280, (256, 81));
        let uv = cover_uv(egui::vec2(w, h), egui::vec2(720.0, 1280.0));
        assert_eq!(uv.height(), 1.0);
        assert!((uv.width() - (9.0 / 16.0) / (16.0 / 9.0)).abs() < 1e-3);
        assert!((uv.center().x - 0.5).abs() < 1e-5);
    }
}
