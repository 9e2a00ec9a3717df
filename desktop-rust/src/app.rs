use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, RichText};
use eframe::egui::{FontData, FontDefinitions, FontFamily};
use image::ImageReader;
use pegboard_common::storage::clear_last_store;
use pegboard_common::{
    BayLayout, CompletionTracker, Dataset, JsonFileStore, PointPx, RectPx, Session, ViewConfig,
    HIGHLIGHT_DURATION_MS,
};

use crate::io::{load_dataset, load_settings, save_settings, state_path};
use crate::model::{AppState, DesktopSettings, HighlightTimer};

const BOARD_COLOR: Color32 = Color32::from_rgb(217, 199, 165);
const HOLE_COLOR: Color32 = Color32::from_rgb(138, 119, 82);
const BOX_COLOR: Color32 = Color32::from_rgb(250, 250, 250);
const DONE_COLOR: Color32 = Color32::from_rgb(200, 230, 201);
const MATCH_COLOR: Color32 = Color32::from_rgb(249, 168, 37);
const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(211, 47, 47);

pub struct DesktopApp {
    state: AppState,
    status: String,
    loading: bool,
    load_rx: Option<Receiver<LoadDone>>,
    thumbs: HashMap<String, egui::TextureHandle>,
    thumb_rx: Receiver<ThumbData>,
    thumb_tx: mpsc::Sender<ThumbData>,
    thumb_inflight: HashSet<String>,
    pending_thumbs: Vec<ThumbData>,
}

struct LoadDone {
    dir: PathBuf,
    result: Result<Dataset, String>,
}

struct ThumbData {
    path: String,
    size: [usize; 2],
    pixels: Vec<u8>,
}

/// 箱の描き分け
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BoxStyle {
    completed: bool,
    highlighted: bool,
    matched: bool,
    dimmed: bool,
}

impl BoxStyle {
    fn fill(&self) -> Color32 {
        let base = if self.completed { DONE_COLOR } else { BOX_COLOR };
        if self.dimmed {
            base.gamma_multiply(0.2)
        } else {
            base
        }
    }

    fn stroke(&self) -> egui::Stroke {
        if self.highlighted {
            egui::Stroke::new(4.0, HIGHLIGHT_COLOR)
        } else if self.matched {
            egui::Stroke::new(3.0, MATCH_COLOR)
        } else {
            egui::Stroke::new(1.0, Color32::from_gray(120))
        }
    }
}

fn view_config(viewport_width: f32) -> ViewConfig {
    ViewConfig {
        viewport_width: viewport_width as f64,
        ..ViewConfig::default()
    }
}

fn to_rect(origin: egui::Pos2, rect: &RectPx) -> egui::Rect {
    egui::Rect::from_min_size(
        origin + egui::vec2(rect.left as f32, rect.top as f32),
        egui::vec2(rect.width as f32, rect.height as f32),
    )
}

fn to_board_point(origin: egui::Pos2, pointer: egui::Pos2) -> PointPx {
    let offset = pointer - origin;
    PointPx {
        x: offset.x as f64,
        y: offset.y as f64,
    }
}

impl DesktopApp {
    fn open_folder(&mut self) {
        if let Some(folder) = rfd::FileDialog::new().pick_folder() {
            self.start_load(folder);
        }
    }

    fn start_load(&mut self, dir: PathBuf) {
        let (tx, rx) = mpsc::channel();
        self.load_rx = Some(rx);
        self.loading = true;
        self.status = format!("Loading {}...", dir.display());

        std::thread::spawn(move || {
            let result = load_dataset(&dir).map_err(|err| format!("{err:#}"));
            let _ = tx.send(LoadDone { dir, result });
        });
    }

    fn finish_load(&mut self, done: LoadDone) {
        self.loading = false;
        self.load_rx = None;

        let dataset = match done.result {
            Ok(dataset) => Arc::new(dataset),
            Err(err) => {
                self.status = format!("Load failed: {err}");
                return;
            }
        };

        let Some(path) = state_path() else {
            self.status = "Home directory not found".to_string();
            return;
        };
        let tracker = CompletionTracker::load(JsonFileStore::open(&path));
        let view = self
            .state
            .session
            .as_ref()
            .map(|s| *s.view())
            .unwrap_or_default();

        self.state.session = Session::restore(Arc::clone(&dataset), view, tracker.store());
        self.state.tracker = Some(tracker);
        self.state.store_error = None;
        self.state.search_input.clear();
        self.state.highlight = None;
        self.thumbs.clear();
        self.thumb_inflight.clear();
        self.pending_thumbs.clear();

        self.status = format!(
            "Loaded {} ({} records, {} issues)",
            done.dir.display(),
            dataset.records.len(),
            dataset.issues.len()
        );
        self.state.dataset = Some(dataset);
        self.state.data_dir = Some(done.dir.clone());

        if let Err(err) = save_settings(&DesktopSettings { data_dir: Some(done.dir) }) {
            self.status = format!("Settings save failed: {err:#}");
        }
    }

    fn select_store(&mut self, viewport_width: f32) {
        let (Some(dataset), Some(tracker)) = (&self.state.dataset, &mut self.state.tracker) else {
            return;
        };
        match Session::select(
            Arc::clone(dataset),
            &self.state.store_input,
            view_config(viewport_width),
            tracker.store_mut(),
        ) {
            Ok(session) => {
                self.status = format!("Store {} / POG {}", session.store_id(), session.planogram_id());
                self.state.session = Some(session);
                self.state.store_error = None;
                self.state.store_input.clear();
                self.state.search_input.clear();
            }
            Err(err) => self.state.store_error = Some(err.to_string()),
        }
    }

    fn change_store(&mut self) {
        if let Some(tracker) = &mut self.state.tracker {
            if let Err(err) = clear_last_store(tracker.store_mut()) {
                self.status = format!("Save failed: {err}");
            }
        }
        self.state.session = None;
        self.state.highlight = None;
        self.state.search_input.clear();
    }

    fn locate(&mut self) {
        let Some(session) = &mut self.state.session else {
            return;
        };
        match session.locate(&self.state.locate_input) {
            Ok(outcome) => {
                self.status = format!(
                    "{} {} (Bay {})",
                    outcome.record.product_code, outcome.record.description, outcome.record.bay
                );
                if outcome.bay_switched {
                    self.state.search_input.clear();
                }
                self.state.locate_input.clear();
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn toggle(&mut self, code: &str) {
        let Some(tracker) = &mut self.state.tracker else {
            return;
        };
        if let Err(err) = tracker.toggle(code) {
            self.status = format!("Save failed: {err}");
        }
    }

    fn change_bay(&mut self, change: impl FnOnce(&mut Session) -> bool) {
        if let Some(session) = &mut self.state.session {
            if change(session) {
                self.state.search_input.clear();
            }
        }
    }

    fn request_thumbnail(&mut self, relative: &str) {
        if self.thumbs.contains_key(relative) || self.thumb_inflight.contains(relative) {
            return;
        }
        let Some(dir) = &self.state.data_dir else {
            return;
        };
        self.thumb_inflight.insert(relative.to_string());
        let sender = self.thumb_tx.clone();
        let path_owned = relative.to_string();
        let full_path = dir.join(relative);

        std::thread::spawn(move || {
            let image = ImageReader::open(&full_path).ok().and_then(|r| r.decode().ok());
            let message = match image {
                Some(image) => {
                    let thumb = image.thumbnail(200, 200);
                    ThumbData {
                        path: path_owned,
                        size: [thumb.width() as usize, thumb.height() as usize],
                        pixels: thumb.to_rgba8().into_raw(),
                    }
                }
                None => ThumbData {
                    path: path_owned,
                    size: [0, 0],
                    pixels: Vec::new(),
                },
            };
            let _ = sender.send(message);
        });
    }

    fn process_pending_thumbs(&mut self, ctx: &egui::Context) {
        let pending = std::mem::take(&mut self.pending_thumbs);
        for msg in pending {
            if msg.size[0] == 0 || msg.size[1] == 0 {
                continue;
            }
            let color_image = egui::ColorImage::from_rgba_unmultiplied(msg.size, &msg.pixels);
            let texture = ctx.load_texture(&msg.path, color_image, egui::TextureOptions::default());
            self.thumbs.insert(msg.path, texture);
        }
    }

    fn poll_messages(&mut self) {
        while let Ok(msg) = self.thumb_rx.try_recv() {
            self.thumb_inflight.remove(&msg.path);
            self.pending_thumbs.push(msg);
        }

        let done = self.load_rx.as_ref().and_then(|rx| rx.try_recv().ok());
        if let Some(done) = done {
            self.finish_load(done);
        }
    }

    fn clear_expired_highlight(&mut self) {
        let Some(timer) = self.state.highlight else {
            return;
        };
        if Instant::now() >= timer.clear_at {
            if let Some(session) = &mut self.state.session {
                session.clear_highlight(timer.ticket_id);
            }
            self.state.highlight = None;
        }
    }

    fn render_store_picker(&mut self, ui: &mut egui::Ui) {
        let viewport_width = ui.available_width();
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("Enter store number");
            if let Some(dataset) = &self.state.dataset {
                let stores = dataset.store_ids();
                ui.label(RichText::new(format!("{} stores", stores.len())).color(Color32::from_gray(150)));
            }
            let response = ui.text_edit_singleline(&mut self.state.store_input);
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Load Store").clicked() || submitted {
                self.select_store(viewport_width);
            }
            if let Some(err) = &self.state.store_error {
                ui.label(RichText::new(err).color(HIGHLIGHT_COLOR));
            }
        });
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        let Some(session) = &self.state.session else {
            return;
        };
        let bays = session.navigator().bays().to_vec();
        let current = session.current_bay();
        let is_first = session.navigator().is_first();
        let is_last = session.navigator().is_last();
        let progress = self
            .state
            .tracker
            .as_ref()
            .map(|t| session.bay_progress(t))
            .unwrap_or_default();
        let match_count = {
            let filter = session.search_filter();
            filter.is_active().then(|| filter.match_count())
        };

        ui.horizontal(|ui| {
            ui.label("UPC");
            let response = ui.text_edit_singleline(&mut self.state.locate_input);
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.button("Find").clicked() || submitted {
                self.locate();
            }

            ui.separator();
            ui.label("Search");
            if ui.text_edit_singleline(&mut self.state.search_input).changed() {
                if let Some(session) = &mut self.state.session {
                    session.search(&self.state.search_input);
                }
            }
            if let Some(count) = match_count {
                ui.label(format!("{count} matches"));
            }
        });

        ui.horizontal_wrapped(|ui| {
            if ui.add_enabled(!is_first, egui::Button::new("◀")).clicked() {
                self.change_bay(|s| s.prev().is_changed());
            }
            for bay in bays {
                if ui.selectable_label(bay == current, format!("Bay {bay}")).clicked() {
                    self.change_bay(|s| s.go_to(bay).is_changed());
                }
            }
            if ui.add_enabled(!is_last, egui::Button::new("▶")).clicked() {
                self.change_bay(|s| s.next().is_changed());
            }
        });

        ui.add(egui::ProgressBar::new(progress.ratio() as f32).text(progress.to_string()));
    }

    fn render_board(&mut self, ui: &mut egui::Ui) {
        let viewport_width = ui.available_width();
        if let Some(session) = &mut self.state.session {
            if (session.view().viewport_width - viewport_width as f64).abs() > 0.5 {
                session.resize(viewport_width as f64);
            }
        }

        let Some(session) = &self.state.session else {
            return;
        };
        let layout: BayLayout = session.bay_layout().clone();
        let board_spec = session.view().board;
        let images: Vec<Option<String>> = layout
            .items
            .iter()
            .map(|item| session.image_for(&item.record.product_code).map(String::from))
            .collect();
        for path in images.iter().flatten() {
            self.request_thumbnail(path);
        }

        let mut clicked = None;
        egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
            let size = egui::vec2(layout.board.width as f32, layout.board.height as f32);
            let (response, painter) = ui.allocate_painter(size, egui::Sense::click());
            let origin = response.rect.min;
            let scale = layout.scale as f32;

            painter.rect_filled(response.rect, 0.0, BOARD_COLOR);
            for row in 0..board_spec.height_holes() {
                for col in 0..board_spec.width_holes() {
                    let center = origin + egui::vec2((col as f32 + 0.5) * scale, (row as f32 + 0.5) * scale);
                    painter.circle_filled(center, (scale * 0.12).max(1.0), HOLE_COLOR);
                }
            }

            let Some(session) = &self.state.session else {
                return;
            };
            let filter = session.search_filter();
            for (item, image) in layout.items.iter().zip(&images) {
                let code = &item.record.normalized_code;
                let style = BoxStyle {
                    completed: self.state.tracker.as_ref().is_some_and(|t| t.is_done(code)),
                    highlighted: session.is_highlighted(code),
                    matched: filter.is_match(code),
                    dimmed: filter.is_dimmed(code),
                };
                let rect = to_rect(origin, &item.geometry.rect);

                painter.rect_filled(rect, 2.0, style.fill());
                match image.as_ref().and_then(|p| self.thumbs.get(p)) {
                    Some(texture) => {
                        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                        let tint = if style.dimmed { Color32::from_white_alpha(50) } else { Color32::WHITE };
                        painter.image(texture.id(), rect.shrink(2.0), uv, tint);
                    }
                    None => {
                        painter.text(
                            rect.center(),
                            egui::Align2::CENTER_CENTER,
                            &item.record.product_code,
                            egui::FontId::proportional(10.0),
                            Color32::from_gray(40),
                        );
                    }
                }
                painter.rect_stroke(rect, 2.0, style.stroke());

                let support = origin + egui::vec2(item.geometry.support.x as f32, item.geometry.support.y as f32);
                painter.circle_filled(support, 3.0, Color32::from_gray(30));
            }

            if response.clicked() {
                if let Some(pointer) = response.interact_pointer_pos() {
                    clicked = layout
                        .hit_test(to_board_point(origin, pointer))
                        .map(|item| item.record.normalized_code.clone());
                }
            }

            // この世代を描いたので強調予約を処理する
            if session.pending_ticket().is_some() {
                self.complete_render(ui, origin, layout.generation);
            }
        });

        if let Some(code) = clicked {
            self.toggle(&code);
        }
    }

    fn complete_render(&mut self, ui: &mut egui::Ui, origin: egui::Pos2, generation: u64) {
        let (Some(session), Some(tracker)) = (&mut self.state.session, &mut self.state.tracker) else {
            return;
        };
        match session.render_complete(generation, tracker) {
            Ok(Some(highlight)) => {
                ui.scroll_to_rect(to_rect(origin, &highlight.rect), Some(egui::Align::Center));
                self.state.highlight = Some(HighlightTimer {
                    ticket_id: highlight.ticket.id,
                    clear_at: Instant::now() + Duration::from_millis(HIGHLIGHT_DURATION_MS as u64),
                });
            }
            Ok(None) => {}
            Err(err) => self.status = format!("Save failed: {err}"),
        }
    }
}

pub fn configure_fonts(ctx: &egui::Context) {
    let mut fonts = FontDefinitions::default();
    let candidates = [
        r"C:\Windows\Fonts\meiryo.ttc",
        r"C:\Windows\Fonts\msgothic.ttc",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
        "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    ];

    for path in candidates {
        if let Ok(data) = std::fs::read(path) {
            fonts.font_data.insert("jp_fallback".to_string(), FontData::from_owned(data));
            fonts.families
                .entry(FontFamily::Proportional)
                .or_default()
                .insert(0, "jp_fallback".to_string());
            ctx.set_fonts(fonts);
            return;
        }
    }
}

impl Default for DesktopApp {
    fn default() -> Self {
        let (thumb_tx, thumb_rx) = mpsc::channel();
        let mut app = Self {
            state: AppState::default(),
            status: String::new(),
            loading: false,
            load_rx: None,
            thumbs: HashMap::new(),
            thumb_rx,
            thumb_tx,
            thumb_inflight: HashSet::new(),
            pending_thumbs: Vec::new(),
        };
        if let Some(dir) = load_settings().data_dir {
            app.start_load(dir);
        }
        app
    }
}

impl eframe::App for DesktopApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.loading || !self.thumb_inflight.is_empty() || !self.pending_thumbs.is_empty() {
            ctx.request_repaint();
        }
        if let Some(timer) = self.state.highlight {
            ctx.request_repaint_after(timer.clear_at.saturating_duration_since(Instant::now()));
        }
        self.poll_messages();
        self.process_pending_thumbs(ctx);
        self.clear_expired_highlight();

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.add_enabled(!self.loading, egui::Button::new("Open Data Folder")).clicked() {
                        self.open_folder();
                        ui.close_menu();
                    }
                    let reload_dir = self.state.data_dir.clone();
                    if ui.add_enabled(reload_dir.is_some() && !self.loading, egui::Button::new("Reload Data")).clicked() {
                        if let Some(dir) = reload_dir {
                            self.start_load(dir);
                        }
                        ui.close_menu();
                    }
                    if ui.add_enabled(self.state.session.is_some(), egui::Button::new("Change Store")).clicked() {
                        self.change_store();
                        ui.close_menu();
                    }
                });

                if let Some(session) = &self.state.session {
                    ui.separator();
                    ui.label(RichText::new(format!("Store #{}", session.store_id())).strong());
                    ui.label(RichText::new(format!("POG: {}", session.planogram_id())).color(Color32::from_gray(170)));

                    let pdf = session.pdf().map(String::from);
                    let planogram_id = session.planogram_id().to_string();
                    if ui.button("PDF").clicked() {
                        match (pdf, &self.state.data_dir) {
                            (Some(pdf), Some(dir)) => {
                                let path = dir.join(pdf).display().to_string();
                                self.status = format!("PDF path copied: {path}");
                                ui.output_mut(|o| o.copied_text = path);
                            }
                            _ => self.status = format!("PDF not available for POG {planogram_id}"),
                        }
                    }
                }

                ui.separator();
                if !self.status.is_empty() {
                    ui.label(RichText::new(&self.status).color(Color32::from_gray(170)));
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.vertical_centered(|ui| {
                    ui.add_space(40.0);
                    if self.loading {
                        ui.spinner();
                    } else if ui.button("Open Data Folder").clicked() {
                        self.open_folder();
                    }
                });
                return;
            }

            if self.state.session.is_none() {
                self.render_store_picker(ui);
                return;
            }

            self.render_toolbar(ui);
            ui.separator();
            self.render_board(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_style_colors() {
        let plain = BoxStyle { completed: false, highlighted: false, matched: false, dimmed: false };
        let done = BoxStyle { completed: true, ..plain };
        assert_eq!(plain.fill(), BOX_COLOR);
        assert_eq!(done.fill(), DONE_COLOR);
        assert_eq!(BoxStyle { highlighted: true, matched: true, ..plain }.stroke().color, HIGHLIGHT_COLOR);
        assert_eq!(BoxStyle { matched: true, ..plain }.stroke().color, MATCH_COLOR);
    }

    #[test]
    fn test_to_board_point() {
        let p = to_board_point(egui::pos2(10.0, 20.0), egui::pos2(58.0, 44.0));
        assert_eq!(p, PointPx { x: 48.0, y: 24.0 });
    }

    #[test]
    fn test_to_rect() {
        let rect = to_rect(
            egui::pos2(10.0, 20.0),
            &RectPx { left: 24.0, top: 24.0, width: 48.0, height: 96.0 },
        );
        assert_eq!(rect.min, egui::pos2(34.0, 44.0));
        assert_eq!(rect.size(), egui::vec2(48.0, 96.0));
    }
}
