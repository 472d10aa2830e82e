// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for the composited image.
//!
//! Displays the session's rendered frame scaled to the available width
//! and feeds pointer events, mapped from display pixels to logical
//! pixels, into the editing session.

use crate::editor::session::EditorSession;
use crate::editor::tools::PointerResponse;
use crate::models::scene::SavedCrop;
use crate::models::settings::{ShapeSettings, Tool};
use crate::util::geometry::{fit_display, DisplayMapper, Point};

/// Horizontal padding reserved around the displayed canvas.
const CANVAS_PADDING: f32 = 32.0;

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    /// Text mode pointer-down: the app opens the text prompt.
    TextPrompt { anchor: Point },
    /// A marquee was confirmed and produced a saved crop.
    CropSaved(SavedCrop),
}

/// Cached GPU texture of the composited frame.
#[derive(Default)]
pub struct CanvasTexture {
    handle: Option<egui::TextureHandle>,
    uploaded_version: u64,
}

impl CanvasTexture {
    /// Re-upload the frame when the session rendered a new version.
    fn sync(&mut self, ctx: &egui::Context, session: &EditorSession) -> egui::TextureId {
        if self.handle.is_none() || self.uploaded_version != session.frame_version() {
            let frame = session.frame();
            let size = [frame.width() as usize, frame.height() as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, frame.as_raw());
            match &mut self.handle {
                Some(handle) => handle.set(color_image, egui::TextureOptions::LINEAR),
                None => {
                    self.handle = Some(ctx.load_texture(
                        "composited_frame",
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ));
                }
            }
            self.uploaded_version = session.frame_version();
        }
        self.handle.as_ref().map(|h| h.id()).unwrap_or_default()
    }
}

/// Display the canvas area and route pointer interactions.
pub fn show(
    ui: &mut egui::Ui,
    session: &mut EditorSession,
    tool: Tool,
    shape_settings: &ShapeSettings,
    texture: &mut CanvasTexture,
    is_drag_over: bool,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let (logical_width, logical_height) = session.logical_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        let available = ui.available_size();
        let (display_width, display_height) = fit_display(
            logical_width,
            logical_height,
            available.x - CANVAS_PADDING,
        );

        // Center the canvas horizontally in the panel
        let x_offset = ((available.x - display_width) / 2.0).max(0.0);
        let image_rect = egui::Rect::from_min_size(
            ui.min_rect().min + egui::vec2(x_offset, 8.0),
            egui::vec2(display_width, display_height),
        );
        ui.set_min_size(egui::vec2(available.x, display_height + 16.0));

        let texture_id = texture.sync(ui.ctx(), session);
        ui.painter().image(
            texture_id,
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());
        let response = if tool == Tool::Select {
            response
        } else {
            response.on_hover_cursor(egui::CursorIcon::Crosshair)
        };

        // Rebuilt per event: panel layout can change between frames
        let mapper = DisplayMapper::new(
            (image_rect.min.x, image_rect.min.y),
            (display_width, display_height),
            (logical_width, logical_height),
        );

        if let Some(pos) = response.interact_pointer_pos() {
            let point = mapper.to_logical(pos.x, pos.y);

            if response.clicked() {
                // Press and release without movement
                if let PointerResponse::TextPrompt { anchor } =
                    session.pointer_down(tool, point, shape_settings)
                {
                    action = CanvasAction::TextPrompt { anchor };
                }
                if let Some(crop) = session.pointer_up() {
                    action = CanvasAction::CropSaved(crop);
                }
            } else if response.drag_started() {
                if let PointerResponse::TextPrompt { anchor } =
                    session.pointer_down(tool, point, shape_settings)
                {
                    action = CanvasAction::TextPrompt { anchor };
                }
            } else if response.dragged() {
                session.pointer_move(point);
            }
        }
        if response.drag_stopped() {
            if let Some(crop) = session.pointer_up() {
                action = CanvasAction::CropSaved(crop);
            }
        }

        if is_drag_over {
            draw_drop_overlay(ui, image_rect);
        }
    });

    // Canvas info line
    ui.separator();
    ui.horizontal(|ui| {
        ui.label(format!("Canvas: {} x {}px", logical_width, logical_height));
        if session.scene().selection.is_some() {
            ui.separator();
            ui.label(
                egui::RichText::new("Fragment selected (press Delete to remove)")
                    .color(egui::Color32::LIGHT_BLUE),
            );
        }
    });

    action
}

/// Overlay shown while an image file hovers over the editor.
fn draw_drop_overlay(ui: &mut egui::Ui, rect: egui::Rect) {
    let painter = ui.painter();
    painter.rect_filled(
        rect,
        6.0,
        egui::Color32::from_rgba_unmultiplied(59, 130, 246, 40),
    );
    painter.rect_stroke(
        rect,
        6.0,
        egui::Stroke::new(2.0, egui::Color32::from_rgb(59, 130, 246)),
    );
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "Drop to replace the current image",
        egui::FontId::proportional(18.0),
        egui::Color32::from_rgb(59, 130, 246),
    );
}
