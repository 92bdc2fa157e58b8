use std::path::{Path, PathBuf};

use tracing::warn;
use trestle_io::{InspectionReport, ReportRow, export_report, load_obj, load_texture};
use trestle_view::ViewerConfig;
use trestle_view::measure::{
    CursorHint, MeasureController, MeasureState, PointOrdinal, RecordOutcome,
};
use trestle_view::viewer::{
    Align2, Color32, GroundGrid, Modifiers, OrbitCamera, OverlayPainter, Point2, ProjectionKind,
    Rect, Vec2, ViewerInput, ViewerMesh,
};

use self::overlay::EguiOverlay;
use self::surface::SurfaceCache;
use super::model::{ModelInfo, format_point};

mod overlay;
mod surface;

const LOG_LIMIT: usize = 200;

pub struct TrestleApp {
    config: ViewerConfig,
    camera: OrbitCamera,
    measure: MeasureController,
    viewer_mesh: Option<ViewerMesh>,
    mesh_revision: u64,
    grid: GroundGrid,
    surface: SurfaceCache,
    model_info: ModelInfo,
    model_path: String,
    texture_path: String,
    pending_texture: Option<image::RgbaImage>,
    texture: Option<egui::TextureHandle>,
    report: InspectionReport,
    report_dir: String,
    log: Vec<String>,
}

impl TrestleApp {
    pub fn new(config: ViewerConfig) -> Self {
        let model_path = path_text(config.model.as_deref());
        let texture_path = path_text(config.texture.as_deref());
        let mut app = Self {
            camera: OrbitCamera::new(config.projection),
            measure: MeasureController::new(config.distance_format),
            viewer_mesh: None,
            mesh_revision: 0,
            grid: GroundGrid::default(),
            surface: SurfaceCache::default(),
            model_info: ModelInfo::default(),
            model_path,
            texture_path,
            pending_texture: None,
            texture: None,
            report: InspectionReport::default(),
            report_dir: ".".to_string(),
            log: Vec::new(),
            config,
        };
        if let Some(path) = app.config.model.clone() {
            app.load_model(&path);
        }
        if let Some(path) = app.config.texture.clone() {
            app.load_texture(&path);
        }
        app
    }

    pub fn ui(&mut self, ctx: &egui::Context) {
        self.upload_texture(ctx);
        self.apply_shortcuts(Shortcuts::read(ctx));
        let indicator = self.measure.indicator();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing = egui::vec2(10.0, 0.0);
                ui.heading("Trestle");
                ui.add(egui::Separator::default().vertical());

                if ui.selectable_label(indicator.armed, indicator.label).clicked() {
                    self.toggle_measurement();
                }
                if ui.button("Clear").clicked() {
                    self.measure.clear_measurement();
                    self.push_log("Measurement cleared".to_string());
                }
                ui.add(egui::Separator::default().vertical());
                if ui.button("Fit Model").clicked() {
                    self.fit_model();
                }
                if ui.button("Reset View").clicked() {
                    self.camera.reset_view();
                }
                let projection = self.camera.projection();
                if ui
                    .selectable_label(projection == ProjectionKind::Perspective, "Perspective")
                    .clicked()
                {
                    self.camera.set_projection(ProjectionKind::Perspective);
                }
                if ui
                    .selectable_label(projection == ProjectionKind::Parallel, "Parallel")
                    .clicked()
                {
                    self.camera.set_projection(ProjectionKind::Parallel);
                }
                ui.add(egui::Separator::default().vertical());
                if ui.button("Export Report").clicked() {
                    self.export_report();
                }
            });
        });

        egui::SidePanel::left("side_panel")
            .resizable(false)
            .exact_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().auto_shrink([false; 2]).show(ui, |ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(8.0, 8.0);
                    ui.add_space(12.0);
                    ui.group(|ui| self.measure_panel(ui));
                    ui.group(|ui| self.model_panel(ui));
                    ui.group(|ui| self.report_panel(ui));
                    ui.group(|ui| self.log_panel(ui));
                    ui.add_space(20.0);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let (rect, response) = ui.allocate_exact_size(available, egui::Sense::click_and_drag());
            if response.clicked() {
                response.request_focus();
            }
            self.draw_viewport(ctx, ui, rect, &response);
        });
    }

    fn measure_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Measurement");
        ui.label(
            egui::RichText::new(self.measure.display_text())
                .size(28.0)
                .strong(),
        );
        ui.label(self.measure.hint());
        for point in self.measure.session().points() {
            let label = match point.ordinal {
                PointOrdinal::First => "P1",
                PointOrdinal::Second => "P2",
            };
            ui.label(format!("{label}: {}", format_point(&point.position)));
        }
        ui.small("M toggles measuring, Esc cancels");
    }

    fn model_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Model");
        for (key, value) in self.model_info.rows() {
            ui.horizontal(|ui| {
                ui.label(format!("{key}:"));
                ui.label(value);
            });
        }
        ui.add_space(4.0);
        ui.label("OBJ file");
        ui.text_edit_singleline(&mut self.model_path);
        if ui.button("Load Model").clicked() {
            let path = PathBuf::from(self.model_path.trim());
            self.load_model(&path);
        }
        ui.label("Texture");
        ui.text_edit_singleline(&mut self.texture_path);
        if ui.button("Load Texture").clicked() {
            let path = PathBuf::from(self.texture_path.trim());
            self.load_texture(&path);
        }
    }

    fn report_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Report");
        egui::Grid::new("report_fields").num_columns(2).show(ui, |ui| {
            ui.label("Title");
            ui.text_edit_singleline(&mut self.report.title);
            ui.end_row();
            ui.label("Structure");
            ui.text_edit_singleline(&mut self.report.structure);
            ui.end_row();
            ui.label("Location");
            ui.text_edit_singleline(&mut self.report.location);
            ui.end_row();
            ui.label("Inspector");
            ui.text_edit_singleline(&mut self.report.inspector);
            ui.end_row();
            ui.label("Date");
            ui.text_edit_singleline(&mut self.report.date);
            ui.end_row();
        });

        ui.add_space(4.0);
        ui.label("Findings");
        let mut remove = None;
        for (idx, row) in self.report.rows.iter_mut().enumerate() {
            ui.horizontal(|ui| {
                ui.add(egui::TextEdit::singleline(&mut row.component).desired_width(80.0));
                ui.add(egui::TextEdit::singleline(&mut row.condition).desired_width(70.0));
                ui.add(egui::TextEdit::singleline(&mut row.remarks).desired_width(90.0));
                if ui.small_button("x").clicked() {
                    remove = Some(idx);
                }
            });
        }
        if let Some(idx) = remove {
            self.report.rows.remove(idx);
        }
        if ui.button("Add Row").clicked() {
            self.report.rows.push(ReportRow::new("", "", ""));
        }

        ui.add_space(4.0);
        ui.label("Export folder");
        ui.text_edit_singleline(&mut self.report_dir);
    }

    fn log_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Log");
        egui::ScrollArea::vertical()
            .id_salt("log_scroll")
            .max_height(160.0)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &self.log {
                    ui.small(line.as_str());
                }
            });
    }

    fn draw_viewport(
        &mut self,
        ctx: &egui::Context,
        ui: &mut egui::Ui,
        rect: egui::Rect,
        response: &egui::Response,
    ) {
        ui.painter().rect_filled(rect, 0.0, ui.visuals().extreme_bg_color);

        let hovered = response.contains_pointer();
        if hovered && self.measure.indicator().cursor == CursorHint::Crosshair {
            ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
        }
        let input = viewport_input(ctx, rect, hovered);
        let viewport = input.rect;
        self.camera.handle_input(&input);
        if let Some(pos) = input.primary_press_pos() {
            let view = self.camera.transform(viewport);
            let outcome = self
                .measure
                .on_pointer_down(pos, viewport, &view, self.viewer_mesh.as_ref());
            self.log_outcome(outcome);
        }

        let view = self.camera.transform(viewport);
        let clipped = ui.painter().with_clip_rect(rect);
        let mut overlay = EguiOverlay::new(&clipped, rect.min);

        self.grid.draw(&mut overlay, &view, viewport);
        if let Some(mesh) = self.viewer_mesh.as_ref() {
            let texture = self
                .texture
                .as_ref()
                .filter(|_| mesh.has_uvs())
                .map(|handle| handle.id());
            clipped.add(
                self.surface
                    .shape(mesh, &view, viewport, rect, texture, self.mesh_revision),
            );
        } else {
            overlay.text(
                viewport.center(),
                Align2::CenterBottom,
                "No model loaded".to_string(),
                16.0,
                Color32::from_gray(140),
            );
        }
        self.measure
            .paint(&mut overlay, &view, viewport, self.viewer_mesh.as_ref());
        overlay.text(
            Point2::new(10.0, 10.0),
            Align2::LeftTop,
            self.measure.hint().to_string(),
            13.0,
            Color32::from_gray(170),
        );
    }

    fn apply_shortcuts(&mut self, shortcuts: Shortcuts) {
        if shortcuts.cancel {
            self.cancel_measurement();
        }
        if shortcuts.toggle {
            self.toggle_measurement();
        }
    }
}

impl TrestleApp {
    fn toggle_measurement(&mut self) {
        let armed = self.measure.toggle_measurement_mode();
        let line = if armed {
            "Measure mode on"
        } else {
            "Measure mode off"
        };
        self.push_log(line.to_string());
    }

    fn cancel_measurement(&mut self) {
        if self.measure.state() != MeasureState::Disarmed {
            self.measure.cancel_measurement();
            self.push_log("Measure mode cancelled".to_string());
        }
    }

    fn log_outcome(&mut self, outcome: RecordOutcome) {
        let line = match outcome {
            RecordOutcome::Ignored => return,
            RecordOutcome::Missed => "No surface under the pointer".to_string(),
            RecordOutcome::FirstPoint | RecordOutcome::Restarted => {
                let point = self
                    .measure
                    .session()
                    .points()
                    .first()
                    .map(|point| format_point(&point.position))
                    .unwrap_or_default();
                format!("Point 1: {point}")
            }
            RecordOutcome::Completed { .. } => {
                format!("Distance: {}", self.measure.display_text())
            }
        };
        self.push_log(line);
    }

    fn fit_model(&mut self) {
        if let Some(bounds) = self.viewer_mesh.as_ref().and_then(|mesh| mesh.bounds) {
            self.camera.fit_bounds(bounds);
        }
    }

    fn load_model(&mut self, path: &Path) {
        match load_obj(path, self.config.up_axis) {
            Ok(mesh) => {
                let viewer_mesh = ViewerMesh::from_mesh(&mesh);
                let label = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                self.model_info = ModelInfo::from_mesh(label, &viewer_mesh);
                if let Some(bounds) = viewer_mesh.bounds {
                    self.grid = GroundGrid::for_bounds(bounds);
                    self.camera.fit_bounds(bounds);
                }
                self.viewer_mesh = Some(viewer_mesh);
                self.mesh_revision += 1;
                self.surface.invalidate();
                self.measure.clear_measurement();
                self.config.model = Some(path.to_path_buf());
                self.push_log(format!(
                    "Loaded {} ({} triangles)",
                    self.model_info.label, self.model_info.triangles
                ));
            }
            Err(err) => {
                warn!(path = %path.display(), "model load failed: {err:#}");
                self.push_log(format!("Model load failed: {err:#}"));
            }
        }
    }

    fn load_texture(&mut self, path: &Path) {
        match load_texture(path) {
            Ok(image) => {
                self.pending_texture = Some(image);
                self.config.texture = Some(path.to_path_buf());
                self.push_log(format!("Texture loaded: {}", path.display()));
            }
            Err(err) => {
                warn!(path = %path.display(), "texture load failed: {err:#}");
                self.push_log(format!("Texture load failed: {err:#}"));
            }
        }
    }

    fn upload_texture(&mut self, ctx: &egui::Context) {
        let Some(image) = self.pending_texture.take() else {
            return;
        };
        let size = [image.width() as usize, image.height() as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        self.texture = Some(ctx.load_texture(
            "model-texture",
            color_image,
            egui::TextureOptions::LINEAR,
        ));
        self.surface.invalidate();
    }

    fn export_report(&mut self) {
        self.report.measurement = self.measure.display_text();
        let dir = PathBuf::from(self.report_dir.trim());
        match export_report(&self.report, &dir) {
            Ok(files) => {
                self.push_log(format!("CSV exported: {}", files.csv.display()));
                self.push_log(format!("Document exported: {}", files.document.display()));
            }
            Err(err) => {
                warn!(dir = %dir.display(), "report export failed: {err:#}");
                self.push_log(format!("Report export failed: {err:#}"));
            }
        }
    }

    fn push_log(&mut self, line: String) {
        if self.log.len() >= LOG_LIMIT {
            self.log.remove(0);
        }
        self.log.push(line);
    }
}

fn path_text(path: Option<&Path>) -> String {
    path.map(|path| path.display().to_string()).unwrap_or_default()
}

/// Keys that drive measurement from anywhere in the window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Shortcuts {
    /// Escape.
    cancel: bool,
    /// M.
    toggle: bool,
}

impl Shortcuts {
    fn read(ctx: &egui::Context) -> Self {
        let text_focus = ctx.wants_keyboard_input();
        ctx.input(|i| {
            Self::from_keys(
                text_focus,
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::M),
            )
        })
    }

    /// Keys typed into a text field stay with that field.
    fn from_keys(text_focus: bool, escape: bool, m: bool) -> Self {
        if text_focus {
            return Self::default();
        }
        Self {
            cancel: escape,
            toggle: m,
        }
    }
}

/// This frame's pointer activity over the viewport, in viewport pixels.
fn viewport_input(ctx: &egui::Context, rect: egui::Rect, hovered: bool) -> ViewerInput {
    ctx.input(|i| {
        let delta = i.pointer.delta();
        ViewerInput {
            rect: Rect::from_min_size(Point2::new(0.0, 0.0), Vec2::new(rect.width(), rect.height())),
            pointer_pos: i
                .pointer
                .interact_pos()
                .map(|pos| Point2::new(pos.x - rect.min.x, pos.y - rect.min.y)),
            pointer_delta: if hovered {
                Vec2::new(delta.x, delta.y)
            } else {
                Vec2::ZERO
            },
            primary_pressed: i.pointer.button_pressed(egui::PointerButton::Primary),
            secondary_down: i.pointer.button_down(egui::PointerButton::Secondary),
            middle_down: i.pointer.button_down(egui::PointerButton::Middle),
            scroll_delta: if hovered { i.raw_scroll_delta.y } else { 0.0 },
            modifiers: Modifiers {
                shift: i.modifiers.shift,
                ctrl: i.modifiers.ctrl,
            },
            hovered,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_in_a_field_keeps_measurement_keys() {
        assert_eq!(Shortcuts::from_keys(true, true, true), Shortcuts::default());
        let escape = Shortcuts::from_keys(false, true, false);
        assert!(escape.cancel && !escape.toggle);
    }

    #[test]
    fn escape_in_report_field_leaves_measurement_running() {
        let mut app = TrestleApp::new(ViewerConfig::default());
        app.toggle_measurement();
        app.apply_shortcuts(Shortcuts::from_keys(true, true, false));
        assert_eq!(app.measure.state(), MeasureState::ArmedEmpty);

        app.apply_shortcuts(Shortcuts::from_keys(false, true, false));
        assert_eq!(app.measure.state(), MeasureState::Disarmed);
    }
}
