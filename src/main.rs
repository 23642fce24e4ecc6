mod channels;
mod config;
mod overlay;
mod player;
mod theme;

use std::time::{Duration, Instant};

use eframe::egui::{
    self, epaint::QuadraticBezierShape, Align2, Color32, CornerRadius, FontId, LayerId, Pos2,
    Rect, Sense, Stroke, Vec2, ViewportBuilder,
};

use crate::{
    channels::BlobPulse,
    config::{Config, ConfigWatcher},
    overlay::SongListOverlay,
    player::{PlayerCore, PlayerEvent},
    theme::GradientCycle,
};

const COLUMN_MAX_WIDTH: f32 = 420.0;
const TOP_BAR_HEIGHT: f32 = 72.0;
const TRACK_INFO_HEIGHT: f32 = 70.0;
const TIMELINE_HEIGHT: f32 = 56.0;
const TRANSPORT_HEIGHT: f32 = 120.0;
const OVERLAY_HEIGHT_RATIO: f32 = 0.55;

/// Longest dt fed to the animation clock; anything above this (window
/// drag, suspend) is treated as a single long frame.
const MAX_FRAME_SECS: f32 = 0.25;

struct App {
    config: Config,
    config_watcher: Option<ConfigWatcher>,
    player: PlayerCore,
    blob: BlobPulse,
    gradient: GradientCycle,
    warnings: Vec<String>,
    last_frame: Option<Instant>,
}

impl Default for App {
    fn default() -> Self {
        let mut warnings = Vec::new();

        let loaded = match Config::load() {
            Ok(loaded) => loaded,
            Err(err) => {
                warnings.push(format!("Failed to load config: {err:?}"));
                config::LoadedConfig {
                    config: Config::default(),
                    source: None,
                }
            }
        };
        let config = loaded.config;

        let config_watcher = loaded.source.as_deref().and_then(|path| {
            match ConfigWatcher::watch(path) {
                Ok(watcher) => Some(watcher),
                Err(err) => {
                    warnings.push(format!("Config watcher unavailable: {err:?}"));
                    None
                }
            }
        });

        // The clamped config accessors keep every animation parameter in a
        // valid range, so these constructions cannot fail.
        let player = PlayerCore::new(config.animation.overlay_motion())
            .expect("clamped overlay motion is valid");
        let blob = BlobPulse::new(config.ui.blob_size(), config.animation.blob_cycle_secs())
            .expect("clamped blob config is valid");
        let gradient = GradientCycle::new(config.animation.gradient_cycle_secs())
            .expect("clamped gradient config is valid");

        Self {
            config,
            config_watcher,
            player,
            blob,
            gradient,
            warnings,
            last_frame: None,
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f32().min(MAX_FRAME_SECS))
            .unwrap_or(0.0);
        self.last_frame = Some(now);

        self.maintain_config_watcher();

        // The frame clock only advances channel samples; selection and
        // visibility state move exclusively in the input handlers below.
        self.blob.advance(dt);
        self.gradient.advance(dt);
        self.player.advance(dt);

        for event in self.player.drain_events() {
            match event {
                PlayerEvent::TrackSelected { .. }
                | PlayerEvent::PlaybackToggled { .. }
                | PlayerEvent::OverlayToggled { .. } => ctx.request_repaint(),
            }
        }

        let root_rect = ctx.screen_rect();
        ctx.layer_painter(LayerId::background())
            .rect_filled(root_rect, CornerRadius::same(0), theme::BACKGROUND);

        let mut panel_frame = egui::Frame::central_panel(&ctx.style());
        panel_frame.fill = Color32::TRANSPARENT;

        egui::CentralPanel::default()
            .frame(panel_frame)
            .show(ctx, |ui| {
                let column = column_rect(ui.max_rect());
                self.render_top_bar(ui, column);
                self.render_blobs_and_info(ui, column);
                self.render_timeline(ui, column);
                self.render_transport(ui, column);
                self.render_warnings(ui, column);
            });

        self.render_song_list(ctx, root_rect);

        ctx.request_repaint_after(self.desired_repaint_interval());
    }
}

impl App {
    fn maintain_config_watcher(&mut self) {
        let Some(watcher) = self.config_watcher.as_mut() else {
            return;
        };
        if let Some(config) = watcher.poll() {
            self.apply_config(config);
        }
    }

    fn apply_config(&mut self, config: Config) {
        match BlobPulse::new(config.ui.blob_size(), config.animation.blob_cycle_secs()) {
            Ok(blob) => self.blob = blob,
            Err(err) => self.warnings.push(format!("Blob config ignored: {err}")),
        }
        match GradientCycle::new(config.animation.gradient_cycle_secs()) {
            Ok(gradient) => self.gradient = gradient,
            Err(err) => self
                .warnings
                .push(format!("Gradient config ignored: {err}")),
        }
        if let Err(err) = self
            .player
            .set_overlay_motion(config.animation.overlay_motion())
        {
            self.warnings.push(format!("Overlay config ignored: {err}"));
        }
        self.config = config;
    }

    fn desired_repaint_interval(&self) -> Duration {
        // The blob and hue channels free-run, so the screen effectively
        // always animates at frame rate.
        Duration::from_millis(16)
    }

    fn render_top_bar(&mut self, ui: &mut egui::Ui, column: Rect) {
        let bar = Rect::from_min_size(column.min, Vec2::new(column.width(), TOP_BAR_HEIGHT));
        let button_size = Vec2::splat(52.0);

        let back_rect = Rect::from_center_size(
            Pos2::new(bar.min.x + button_size.x / 2.0 + 8.0, bar.center().y),
            button_size,
        );
        if neumorphic_button(ui, "top_bar.back", back_rect, "←", 24.0).clicked() {
            self.player.tap_back();
        }

        ui.painter().text(
            bar.center(),
            Align2::CENTER_CENTER,
            "Now Playing",
            FontId::proportional(20.0),
            theme::TEXT_PRIMARY,
        );

        let menu_rect = Rect::from_center_size(
            Pos2::new(bar.max.x - button_size.x / 2.0 - 8.0, bar.center().y),
            button_size,
        );
        let glyph = if self.player.is_slider_visible() {
            "✕"
        } else {
            "☰"
        };
        if neumorphic_button(ui, "top_bar.menu", menu_rect, glyph, 24.0).clicked() {
            self.player.toggle_song_list();
        }
    }

    fn render_blobs_and_info(&self, ui: &mut egui::Ui, column: Rect) {
        let size = self.blob.size();
        let available = column.height()
            - TOP_BAR_HEIGHT
            - TRACK_INFO_HEIGHT
            - TIMELINE_HEIGHT
            - TRANSPORT_HEIGHT;
        let canvas_height = (available / 2.0).clamp(80.0, size);
        let painter = ui.painter();

        let top_canvas = Rect::from_min_size(
            Pos2::new(column.min.x, column.min.y + TOP_BAR_HEIGHT),
            Vec2::new(column.width(), canvas_height),
        );
        let scale = canvas_height / size;
        let radius = self.blob.radius() * scale;
        let top_center = Pos2::new(
            top_canvas.center().x,
            top_canvas.min.y + self.blob.complement() * scale,
        );
        theme::paint_neumorphic_circle(painter, top_center, radius, theme::BLOB_FILL);

        let info = Rect::from_min_size(
            Pos2::new(column.min.x, top_canvas.max.y),
            Vec2::new(column.width(), TRACK_INFO_HEIGHT),
        );
        let track = self.player.current_track();
        painter.text(
            Pos2::new(info.center().x, info.center().y - 12.0),
            Align2::CENTER_CENTER,
            &track.title,
            FontId::proportional(24.0),
            theme::TEXT_PRIMARY,
        );
        painter.text(
            Pos2::new(info.center().x, info.center().y + 16.0),
            Align2::CENTER_CENTER,
            &track.artist,
            FontId::proportional(16.0),
            theme::TEXT_SECONDARY,
        );

        let bottom_canvas = Rect::from_min_size(
            Pos2::new(column.min.x, info.max.y),
            Vec2::new(column.width(), canvas_height),
        );
        let bottom_center = Pos2::new(
            bottom_canvas.center().x,
            bottom_canvas.min.y + self.blob.complement() * scale,
        );
        let (start, end) = self.gradient.stops();
        theme::paint_neumorphic_circle(painter, bottom_center, radius, theme::BLOB_FILL);
        theme::paint_gradient_circle(painter, bottom_center, radius, start, end);
        paint_waveform(painter, bottom_canvas, start);
    }

    fn render_timeline(&self, ui: &mut egui::Ui, column: Rect) {
        let timeline = Rect::from_min_size(
            Pos2::new(
                column.min.x + 24.0,
                column.max.y - TRANSPORT_HEIGHT - TIMELINE_HEIGHT,
            ),
            Vec2::new(column.width() - 48.0, TIMELINE_HEIGHT),
        );
        let painter = ui.painter();

        // The displayed times are part of the mockup; there is no real
        // playback position.
        painter.text(
            Pos2::new(timeline.min.x, timeline.min.y + 10.0),
            Align2::LEFT_CENTER,
            "1:21",
            FontId::proportional(14.0),
            theme::TEXT_SECONDARY,
        );
        painter.text(
            Pos2::new(timeline.max.x, timeline.min.y + 10.0),
            Align2::RIGHT_CENTER,
            "3:46",
            FontId::proportional(14.0),
            theme::TEXT_SECONDARY,
        );

        let (start, end) = self.gradient.stops();
        let strip = Rect::from_min_size(
            Pos2::new(timeline.min.x, timeline.min.y + 28.0),
            Vec2::new(timeline.width(), 8.0),
        );
        theme::paint_gradient_pill(painter, strip, start, end);
    }

    fn render_transport(&mut self, ui: &mut egui::Ui, column: Rect) {
        let transport = Rect::from_min_size(
            Pos2::new(column.min.x, column.max.y - TRANSPORT_HEIGHT),
            Vec2::new(column.width(), TRANSPORT_HEIGHT),
        );
        let center = transport.center();
        let side_size = Vec2::splat(56.0);
        let main_size = Vec2::splat(80.0);
        let gap = 36.0;

        let prev_rect = Rect::from_center_size(
            Pos2::new(center.x - main_size.x / 2.0 - gap - side_size.x / 2.0, center.y),
            side_size,
        );
        if neumorphic_button(ui, "transport.prev", prev_rect, "⏮", 24.0).clicked() {
            self.player.tap_previous();
        }

        let play_rect = Rect::from_center_size(center, main_size);
        let glyph = if self.player.is_playing() { "⏸" } else { "⏵" };
        if neumorphic_button(ui, "transport.play", play_rect, glyph, 36.0).clicked() {
            self.player.toggle_play_pause();
        }

        let next_rect = Rect::from_center_size(
            Pos2::new(center.x + main_size.x / 2.0 + gap + side_size.x / 2.0, center.y),
            side_size,
        );
        if neumorphic_button(ui, "transport.next", next_rect, "⏭", 24.0).clicked() {
            self.player.tap_next();
        }
    }

    fn render_warnings(&self, ui: &mut egui::Ui, column: Rect) {
        if self.warnings.is_empty() {
            return;
        }
        let painter = ui.painter();
        for (i, warning) in self.warnings.iter().enumerate() {
            painter.text(
                Pos2::new(column.min.x + 8.0, column.min.y + 4.0 + i as f32 * 14.0),
                Align2::LEFT_TOP,
                warning,
                FontId::proportional(11.0),
                Color32::from_rgb(0xcc, 0x88, 0x33),
            );
        }
    }

    fn render_song_list(&mut self, ctx: &egui::Context, root_rect: Rect) {
        let overlay = self.player.overlay();
        if !overlay.is_mounted() {
            return;
        }
        let opacity = overlay.opacity();
        let offset = overlay.offset();

        let panel_height = root_rect.height() * OVERLAY_HEIGHT_RATIO;
        let panel_top = root_rect.max.y - panel_height + offset;
        let panel_rect = Rect::from_min_max(
            Pos2::new(root_rect.min.x, panel_top),
            Pos2::new(root_rect.max.x, root_rect.max.y + offset.max(0.0)),
        );

        let mut selected: Option<String> = None;

        egui::Area::new(egui::Id::new("song_list"))
            .order(egui::Order::Foreground)
            .fixed_pos(panel_rect.min)
            .show(ctx, |ui| {
                ui.set_opacity(opacity);
                let painter = ui.painter();

                // Stand-in for the original's backdrop blur.
                painter.rect_filled(
                    root_rect,
                    CornerRadius::same(0),
                    theme::with_opacity(Color32::BLACK, 0.35 * opacity),
                );
                painter.rect_filled(
                    panel_rect,
                    CornerRadius {
                        nw: 24,
                        ne: 24,
                        sw: 0,
                        se: 0,
                    },
                    Color32::from_rgba_unmultiplied(0x2c, 0x2c, 0x2c, 0xf2),
                );
                painter.text(
                    Pos2::new(panel_rect.center().x, panel_rect.min.y + 26.0),
                    Align2::CENTER_CENTER,
                    "All Songs",
                    FontId::proportional(20.0),
                    theme::TEXT_PRIMARY,
                );

                let list_rect = Rect::from_min_max(
                    Pos2::new(panel_rect.min.x + 16.0, panel_rect.min.y + 52.0),
                    Pos2::new(panel_rect.max.x - 16.0, root_rect.max.y - 8.0),
                );
                let overlay = self.player.overlay();
                let mut list_ui = ui.new_child(
                    egui::UiBuilder::new()
                        .max_rect(list_rect)
                        .layout(egui::Layout::top_down(egui::Align::Min)),
                );
                list_ui.set_clip_rect(list_rect);
                egui::ScrollArea::vertical()
                    .max_height(list_rect.height())
                    .show(&mut list_ui, |ui| {
                        for (index, track) in self.player.catalog().iter().enumerate() {
                            if let Some(id) =
                                song_row(ui, index, track, overlay)
                            {
                                selected = Some(id);
                            }
                        }
                    });
            });

        if let Some(id) = selected {
            // The id came from the catalog, so this cannot fail; if it ever
            // did, the selection would simply stay put.
            if let Err(err) = self.player.select_track(&id) {
                eprintln!("Ignoring selection: {err}");
            }
        }
    }
}

fn column_rect(available: Rect) -> Rect {
    let width = available.width().min(COLUMN_MAX_WIDTH);
    Rect::from_center_size(
        available.center(),
        Vec2::new(width, available.height()),
    )
}

/// One tappable row of the song list, faded and nudged by its staggered
/// row channel.
fn song_row(
    ui: &mut egui::Ui,
    index: usize,
    track: &player::Track,
    overlay: &SongListOverlay,
) -> Option<String> {
    let row_opacity = overlay.row_opacity(index);
    let (rect, response) = ui.allocate_exact_size(
        Vec2::new(ui.available_width(), 54.0),
        Sense::click(),
    );
    if ui.is_rect_visible(rect) {
        // FadeInDown: rows start slightly below their slot and rise as
        // they fade in.
        let drop = (1.0 - row_opacity) * 16.0;
        let painter = ui.painter();
        if response.hovered() {
            painter.rect_filled(
                rect,
                CornerRadius::same(8),
                theme::with_opacity(Color32::WHITE, 0.06 * row_opacity),
            );
        }
        painter.text(
            Pos2::new(rect.min.x + 8.0, rect.min.y + 14.0 + drop),
            Align2::LEFT_CENTER,
            &track.title,
            FontId::proportional(16.0),
            theme::with_opacity(theme::TEXT_PRIMARY, row_opacity),
        );
        painter.text(
            Pos2::new(rect.min.x + 8.0, rect.min.y + 36.0 + drop),
            Align2::LEFT_CENTER,
            &track.artist,
            FontId::proportional(13.0),
            theme::with_opacity(theme::TEXT_SECONDARY, row_opacity),
        );
    }
    response.clicked().then(|| track.id.clone())
}

/// Square soft-shadowed button in the mockup's dark style: a dark copy
/// toward the lower right, a light copy toward the upper left.
fn neumorphic_button(
    ui: &mut egui::Ui,
    id_salt: &str,
    rect: Rect,
    glyph: &str,
    glyph_size: f32,
) -> egui::Response {
    let response = ui.interact(rect, ui.id().with(id_salt), Sense::click());
    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        let shadow_offset = Vec2::splat(5.0);
        let rounding = CornerRadius::same(14);
        painter.rect_filled(
            rect.translate(shadow_offset),
            rounding,
            theme::with_opacity(theme::SHADOW_DARK, 0.6),
        );
        painter.rect_filled(
            rect.translate(-shadow_offset),
            rounding,
            theme::with_opacity(theme::SHADOW_LIGHT, 0.6),
        );
        let fill = if response.is_pointer_button_down_on() {
            theme::lerp_color(theme::BLOB_FILL, Color32::WHITE, 0.08)
        } else {
            theme::BLOB_FILL
        };
        painter.rect_filled(rect, rounding, fill);
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            glyph,
            FontId::proportional(glyph_size),
            theme::TEXT_PRIMARY,
        );
    }
    response
}

/// The decorative waveform across the bottom canvas: three quadratic
/// bezier arcs alternating above and below the midline.
fn paint_waveform(painter: &egui::Painter, canvas: Rect, color: Color32) {
    let scale = canvas.width() / 400.0;
    let at = |x: f32, y: f32| {
        Pos2::new(
            canvas.min.x + x * scale,
            canvas.min.y + (y - 150.0) * scale + canvas.height() / 2.0,
        )
    };
    let stroke = Stroke::new(4.0, color);
    let segments = [
        [at(50.0, 150.0), at(100.0, 50.0), at(150.0, 150.0)],
        [at(150.0, 150.0), at(200.0, 250.0), at(250.0, 150.0)],
        [at(250.0, 150.0), at(300.0, 50.0), at(350.0, 150.0)],
    ];
    for points in segments {
        painter.add(QuadraticBezierShape::from_points_stroke(
            points,
            false,
            Color32::TRANSPARENT,
            stroke,
        ));
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([390.0, 780.0])
            .with_min_inner_size([320.0, 640.0]),
        ..Default::default()
    };
    let run_res = eframe::run_native(
        "Neon Player",
        native_options,
        Box::new(
            |_cc| -> std::result::Result<
                Box<dyn eframe::App>,
                Box<dyn std::error::Error + Send + Sync>,
            > { Ok(Box::new(App::default())) },
        ),
    );
    if let Err(e) = run_res {
        return Err(Box::new(e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_starts_on_the_first_track_with_everything_at_rest() {
        let app = App::default();
        assert_eq!(app.player.current_track().title, "Blinding Lights");
        assert!(!app.player.is_playing());
        assert!(!app.player.is_slider_visible());
        assert_eq!(app.blob.radius(), 0.0);
        assert_eq!(app.gradient.index(), 0.0);
    }

    #[test]
    fn reloaded_config_reshapes_the_blob() {
        let mut app = App::default();
        let mut config = Config::default();
        config.ui.blob_size = 300.0;
        app.apply_config(config);
        assert_eq!(app.blob.size(), 300.0);
        assert_eq!(app.blob.max_radius(), 300.0 * 0.33);
    }

    #[test]
    fn column_is_centered_and_capped() {
        let wide = Rect::from_min_size(Pos2::ZERO, Vec2::new(1000.0, 700.0));
        let column = column_rect(wide);
        assert_eq!(column.width(), COLUMN_MAX_WIDTH);
        assert_eq!(column.center().x, wide.center().x);

        let narrow = Rect::from_min_size(Pos2::ZERO, Vec2::new(320.0, 700.0));
        assert_eq!(column_rect(narrow).width(), 320.0);
    }
}
