// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the egui::App trait, coordinating the editing session, the upload
//! simulation, the tool panels and file ingestion.

use crate::editor::session::EditorSession;
use crate::io::media;
use crate::models::scene::SavedCrop;
use crate::models::settings::{ShapeSettings, TextSettings, Tool};
use crate::ui::{canvas, crop_panel, shape_panel, text_panel, toolbar, upload};
use crate::util::geometry::Point;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

/// Uneven increments cycled by the upload progress simulation.
const PROGRESS_STEPS: [f32; 6] = [9.0, 16.0, 7.0, 13.0, 18.0, 11.0];

/// Cadence of the simulated progress timer.
const PROGRESS_TICK: Duration = Duration::from_millis(100);

const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "tif"];

/// A simulated upload: the progress bar advances on a timer while the
/// real decode runs on a background thread. The image is installed only
/// once both have finished.
struct UploadTask {
    file_name: String,
    progress: f32,
    step: usize,
    last_tick: Instant,
    receiver: Receiver<Result<image::RgbaImage, String>>,
    decoded: Option<image::RgbaImage>,
    replace: bool,
}

enum UploadStatus {
    InProgress,
    Done(image::RgbaImage),
    Failed,
}

impl UploadTask {
    fn start(path: PathBuf, replace: bool) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        log::info!("Uploading {}", file_name);

        let (sender, receiver) = channel();
        std::thread::spawn(move || {
            let result = media::load_image(&path).map_err(|e| format!("{e:#}"));
            let _ = sender.send(result);
        });

        Self {
            file_name,
            progress: 0.0,
            step: 0,
            last_tick: Instant::now(),
            receiver,
            decoded: None,
            replace,
        }
    }

    fn tick(&mut self) -> UploadStatus {
        if let Ok(result) = self.receiver.try_recv() {
            match result {
                Ok(img) => self.decoded = Some(img),
                Err(e) => {
                    log::error!("Failed to load image: {}", e);
                    return UploadStatus::Failed;
                }
            }
        }

        if self.progress < 100.0 && self.last_tick.elapsed() >= PROGRESS_TICK {
            self.progress =
                (self.progress + PROGRESS_STEPS[self.step % PROGRESS_STEPS.len()]).min(100.0);
            self.step += 1;
            self.last_tick = Instant::now();
        }

        if self.progress >= 100.0 {
            if let Some(img) = self.decoded.take() {
                return UploadStatus::Done(img);
            }
        }
        UploadStatus::InProgress
    }
}

/// Pending text placement opened by a pointer-down in text mode.
struct TextPrompt {
    anchor: Point,
    buffer: String,
    focus_requested: bool,
}

/// Main application state.
pub struct MarqApp {
    /// Active editing session, present once an image is loaded
    session: Option<EditorSession>,

    /// Currently selected editing tool
    current_tool: Tool,

    shape_settings: ShapeSettings,
    text_settings: TextSettings,

    /// Saved crops; owned here so they survive image replacement
    saved_crops: Vec<SavedCrop>,

    crop_panel: crop_panel::CropPanel,
    canvas_texture: canvas::CanvasTexture,

    /// In-flight upload simulation
    upload: Option<UploadTask>,

    /// Open text prompt, if any
    text_prompt: Option<TextPrompt>,
}

impl Default for MarqApp {
    fn default() -> Self {
        Self::new()
    }
}

impl MarqApp {
    /// Create a new Marq application instance.
    pub fn new() -> Self {
        Self {
            session: None,
            current_tool: Tool::Select,
            shape_settings: ShapeSettings::default(),
            text_settings: TextSettings::default(),
            saved_crops: Vec::new(),
            crop_panel: crop_panel::CropPanel::default(),
            canvas_texture: canvas::CanvasTexture::default(),
            upload: None,
            text_prompt: None,
        }
    }

    fn start_upload(&mut self, path: PathBuf) {
        if !is_image_path(&path) {
            log::warn!("Ignoring non-image file {}", path.display());
            return;
        }
        let replace = self.session.is_some();
        self.upload = Some(UploadTask::start(path, replace));
    }

    /// Install a freshly decoded image. On replace the scene's fragments,
    /// shapes and labels are cleared; the saved-crop list is kept.
    fn install_image(&mut self, img: image::RgbaImage, replace: bool) {
        match self.session.as_mut() {
            Some(session) if replace => session.replace_image(img),
            _ => self.session = Some(EditorSession::new(img)),
        }
        self.current_tool = Tool::Select;
        self.text_prompt = None;
        self.canvas_texture = canvas::CanvasTexture::default();
        log::info!("Image installed");
    }

    fn reset(&mut self) {
        self.session = None;
        self.saved_crops.clear();
        self.current_tool = Tool::Select;
        self.text_prompt = None;
        self.upload = None;
        self.canvas_texture = canvas::CanvasTexture::default();
        log::info!("Editor reset");
    }

    fn pick_image_file() -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter("Images", &IMAGE_EXTENSIONS)
            .pick_file()
    }

    fn export_composite(&self) {
        let Some(session) = &self.session else { return };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name("edited-image.png")
            .save_file()
        else {
            return;
        };

        match session.export_png().and_then(|bytes| {
            std::fs::write(&path, bytes).map_err(anyhow::Error::from)
        }) {
            Ok(_) => log::info!("Exported composite to {}", path.display()),
            Err(e) => log::error!("Failed to export composite: {e:#}"),
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(path) = dropped.into_iter().find_map(|f| f.path) {
            self.start_upload(path);
        }
        ctx.input(|i| !i.raw.hovered_files.is_empty())
    }

    fn show_text_prompt(&mut self, ctx: &egui::Context) {
        let mut submit: Option<(Point, String)> = None;
        let mut cancel = false;

        if let Some(prompt) = &mut self.text_prompt {
            egui::Window::new("Add Text")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
                .show(ctx, |ui| {
                    let response = ui.text_edit_singleline(&mut prompt.buffer);
                    if !prompt.focus_requested {
                        response.request_focus();
                        prompt.focus_requested = true;
                    }

                    let entered =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                    ui.horizontal(|ui| {
                        if ui.button("Add").clicked() || entered {
                            submit = Some((prompt.anchor, prompt.buffer.clone()));
                        }
                        if ui.button("Cancel").clicked()
                            || ui.input(|i| i.key_pressed(egui::Key::Escape))
                        {
                            cancel = true;
                        }
                    });
                });
        }

        if submit.is_some() || cancel {
            self.text_prompt = None;
        }
        if let (Some((anchor, text)), Some(session)) = (submit, self.session.as_mut()) {
            // An empty or cancelled prompt places nothing
            session.place_label(anchor, text.trim(), &self.text_settings);
        }
    }

    fn show_welcome(&mut self, ctx: &egui::Context, is_drag_over: bool) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(20.0);
                    ui.heading(
                        egui::RichText::new("Marq")
                            .size(32.0)
                            .color(egui::Color32::from_gray(200)),
                    );
                    ui.label(
                        egui::RichText::new("Image annotation and crop compositing")
                            .size(14.0)
                            .color(egui::Color32::from_gray(150)),
                    );
                    ui.add_space(20.0);
                    let invite = if is_drag_over {
                        "Release to start editing"
                    } else {
                        "Drag and drop an image here, or click to browse"
                    };
                    ui.label(
                        egui::RichText::new(invite).color(egui::Color32::from_gray(180)),
                    );
                    ui.add_space(12.0);
                    if ui.button("Choose File...").clicked() {
                        if let Some(path) = Self::pick_image_file() {
                            self.start_upload(path);
                        }
                    }
                });
            });
        });
    }
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|known| *known == e)
        })
        .unwrap_or(false)
}

impl eframe::App for MarqApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Advance the upload simulation first; its completion is what
        // hands the session its base image.
        let upload_status = self.upload.as_mut().map(|task| (task.tick(), task.replace));
        match upload_status {
            Some((UploadStatus::InProgress, _)) => {
                ctx.request_repaint_after(PROGRESS_TICK);
            }
            Some((UploadStatus::Done(img), replace)) => {
                self.upload = None;
                self.install_image(img, replace);
            }
            Some((UploadStatus::Failed, _)) => {
                self.upload = None;
            }
            None => {}
        }

        if let Some(task) = &self.upload {
            egui::CentralPanel::default().show(ctx, |ui| {
                upload::show(ui, &task.file_name, task.progress);
            });
            return;
        }

        let is_drag_over = self.handle_dropped_files(ctx);

        if self.session.is_none() {
            self.show_welcome(ctx, is_drag_over);
            return;
        }

        // Commit any finished fragment decodes; keep polling while some
        // are still in flight.
        if let Some(session) = &mut self.session {
            session.poll_decodes();
            if session.has_pending_decodes() {
                ctx.request_repaint_after(Duration::from_millis(50));
            }
        }

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image...").clicked() {
                        if let Some(path) = Self::pick_image_file() {
                            self.start_upload(path);
                        }
                        ui.close_menu();
                    }
                    if ui.button("Export PNG...").clicked() {
                        self.export_composite();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Reset").clicked() {
                        self.reset();
                        ui.close_menu();
                    }
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });

        // Toolbar with tools on the left, image actions on the right
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                toolbar::show(ui, &mut self.current_tool);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("↺ Reset").clicked() {
                        self.reset();
                    }
                    if ui.button("⬇ Download").clicked() {
                        self.export_composite();
                    }
                    if ui.button("⟳ Replace Image").clicked() {
                        if let Some(path) = Self::pick_image_file() {
                            self.start_upload(path);
                        }
                    }
                });
            });
        });

        if self.session.is_none() {
            // Reset was clicked this frame
            return;
        }

        // Tool side panel
        match self.current_tool {
            Tool::Crop => {
                let action = egui::SidePanel::right("crop_panel")
                    .default_width(280.0)
                    .show(ctx, |ui| self.crop_panel.show(ui, &self.saved_crops))
                    .inner;
                match action {
                    crop_panel::CropPanelAction::Paste(id) => {
                        let crop = self.saved_crops.iter().find(|c| c.id == id).cloned();
                        if let (Some(crop), Some(session)) = (crop, self.session.as_mut()) {
                            session.paste_crop(&crop);
                            // Switch to select so the fragment can be
                            // moved right away
                            self.current_tool = Tool::Select;
                        }
                    }
                    crop_panel::CropPanelAction::Delete(id) => {
                        self.saved_crops.retain(|c| c.id != id);
                        log::info!("Deleted saved crop {}", id);
                    }
                    crop_panel::CropPanelAction::None => {}
                }
            }
            Tool::Shape(_) => {
                egui::SidePanel::right("shape_panel")
                    .default_width(240.0)
                    .show(ctx, |ui| {
                        shape_panel::show(ui, &mut self.current_tool, &mut self.shape_settings);
                    });
            }
            Tool::Text => {
                egui::SidePanel::right("text_panel")
                    .default_width(240.0)
                    .show(ctx, |ui| {
                        text_panel::show(ui, &mut self.text_settings);
                    });
            }
            Tool::Select => {}
        }

        // Delete the selected fragment (select mode only); skipped while
        // a text field has focus so typing never deletes scene state
        if self.current_tool == Tool::Select && !ctx.wants_keyboard_input() {
            let delete_pressed = ctx.input(|i| {
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)
            });
            if delete_pressed {
                if let Some(session) = &mut self.session {
                    session.delete_selected();
                }
            }
        }

        // Main canvas (center)
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(session) = &mut self.session {
                    canvas::show(
                        ui,
                        session,
                        self.current_tool,
                        &self.shape_settings,
                        &mut self.canvas_texture,
                        is_drag_over,
                    )
                } else {
                    canvas::CanvasAction::None
                }
            })
            .inner;

        match canvas_action {
            canvas::CanvasAction::TextPrompt { anchor } => {
                self.text_prompt = Some(TextPrompt {
                    anchor,
                    buffer: String::new(),
                    focus_requested: false,
                });
            }
            canvas::CanvasAction::CropSaved(crop) => {
                log::info!("Saved crop {}, total: {}", crop.id, self.saved_crops.len() + 1);
                self.saved_crops.push(crop);
            }
            canvas::CanvasAction::None => {}
        }

        self.show_text_prompt(ctx);
    }
}
