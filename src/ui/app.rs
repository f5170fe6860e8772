use std::path::PathBuf;
use std::time::Instant;

use eframe::egui;

use crate::config::AppConfig;
use crate::ops::content_provider::{ContentProvider, FileContentProvider};
use crate::renderer::media_deck::MediaDeck;
use crate::renderer::story_player::StoryPlayer;
use crate::renderer::viewport::StripViewport;
use crate::types::story::StorySequence;
use crate::ui::chrome::chrome_overlay;
use crate::ui::story_view::story_strip;

pub struct StoryApp {
    player: StoryPlayer<StripViewport>,
    deck: MediaDeck,
    content_path: Option<PathBuf>,
    status: Option<String>,
}

impl StoryApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig, sequence: StorySequence) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let mut player = StoryPlayer::new(StripViewport::new(), config.tick_period);
        player.mount(sequence, Instant::now());

        Self {
            player,
            deck: MediaDeck::new(config.open_streams, config.video_height),
            content_path: config.content_path.clone(),
            status: None,
        }
    }

    fn open_content(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Content", &["json"])
            .pick_file()
        else {
            return;
        };
        match FileContentProvider::new(&path).load() {
            Ok(stories) => {
                let count = stories.len();
                self.deck.clear();
                self.player
                    .replace_sequence(StorySequence::new(stories), Instant::now());
                self.status = Some(format!("{count} stories from {}", path.display()));
                self.content_path = Some(path);
            }
            Err(e) => {
                tracing::error!("failed to open content: {e}");
                self.status = Some(e.to_string());
            }
        }
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("story_top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open content…").clicked() {
                    self.open_content();
                }
                if let Some(status) = &self.status {
                    ui.label(status);
                } else if let Some(path) = &self.content_path {
                    ui.label(path.display().to_string());
                }
            });
        });
    }
}

impl eframe::App for StoryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.player.poll(now);

        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            self.player.advance(now);
        }

        self.deck.sync(self.player.state());
        self.deck.update_textures(ctx);

        self.top_bar(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                // Nothing to draw without stories.
                if self.player.chrome().is_none() {
                    return;
                }
                let rect = ui.max_rect();
                let records = self.player.state().sequence().records();
                ui.scope_builder(egui::UiBuilder::new().max_rect(rect), |ui| {
                    story_strip(ui, records, self.player.scroller(), &self.deck);
                });
                let advance = self
                    .player
                    .chrome()
                    .map(|frame| chrome_overlay(ui, rect, &frame).advance)
                    .unwrap_or(false);
                if advance {
                    self.player.advance(Instant::now());
                }
            });

        if self.deck.is_playing() {
            ctx.request_repaint();
        } else if let Some(wait) = self.player.time_until_next_tick(Instant::now()) {
            ctx.request_repaint_after(wait);
        }
    }
}

impl Drop for StoryApp {
    fn drop(&mut self) {
        self.player.unmount();
        self.deck.clear();
    }
}
