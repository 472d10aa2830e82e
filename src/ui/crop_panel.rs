// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Saved crops panel.
//!
//! Lists the crops saved from marquee confirms with a thumbnail and
//! dimensions; each entry can be pasted back onto the canvas as a
//! fragment, downloaded as a PNG, or deleted. The list survives image
//! replacement.

use crate::io::media;
use crate::models::scene::{ElementId, SavedCrop};
use std::collections::HashMap;

/// Result of crop panel interaction.
pub enum CropPanelAction {
    None,
    Paste(ElementId),
    Delete(ElementId),
}

/// Panel state: cached thumbnail textures keyed by crop id.
#[derive(Default)]
pub struct CropPanel {
    thumbnails: HashMap<ElementId, Option<egui::TextureHandle>>,
}

impl CropPanel {
    /// Display the saved crops list.
    pub fn show(&mut self, ui: &mut egui::Ui, crops: &[SavedCrop]) -> CropPanelAction {
        let mut action = CropPanelAction::None;

        ui.heading("Saved Crops");
        ui.separator();

        if crops.is_empty() {
            ui.label(
                egui::RichText::new("No crops saved yet. Use the crop tool to create selections.")
                    .weak(),
            );
            return CropPanelAction::None;
        }

        // Drop textures of deleted crops
        self.thumbnails
            .retain(|id, _| crops.iter().any(|c| c.id == *id));

        egui::ScrollArea::vertical().show(ui, |ui| {
            for crop in crops {
                ui.horizontal(|ui| {
                    if let Some(texture) = self.thumbnail(ui.ctx(), crop) {
                        let size = thumbnail_size(crop.width, crop.height);
                        ui.add(egui::Image::new(egui::load::SizedTexture::new(
                            texture, size,
                        )));
                    }

                    ui.vertical(|ui| {
                        ui.label(format!("Crop {}", crop.id));
                        ui.label(
                            egui::RichText::new(format!(
                                "{} x {}px",
                                crop.width as u32, crop.height as u32
                            ))
                            .weak(),
                        );
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .button("🗑")
                            .on_hover_text("Delete crop")
                            .clicked()
                        {
                            action = CropPanelAction::Delete(crop.id);
                        }
                        if ui
                            .button("💾")
                            .on_hover_text("Download crop")
                            .clicked()
                        {
                            download_crop(crop);
                        }
                        if ui
                            .button("📋")
                            .on_hover_text("Paste to canvas")
                            .clicked()
                        {
                            action = CropPanelAction::Paste(crop.id);
                        }
                    });
                });
                ui.separator();
            }

            ui.label(
                egui::RichText::new(
                    "Tip: paste crops onto the canvas, then use the select tool to move them around.",
                )
                .italics()
                .weak(),
            );
        });

        action
    }

    /// Decode and upload the thumbnail texture the first time a crop is
    /// shown. A crop whose payload fails to decode keeps a `None` entry
    /// so the decode is not retried every frame.
    fn thumbnail(&mut self, ctx: &egui::Context, crop: &SavedCrop) -> Option<egui::TextureId> {
        if !self.thumbnails.contains_key(&crop.id) {
            let texture = match media::decode_image(&crop.image_data) {
                Ok(img) => {
                    let size = [img.width() as usize, img.height() as usize];
                    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw());
                    Some(ctx.load_texture(
                        format!("crop_thumb_{}", crop.id),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    ))
                }
                Err(e) => {
                    log::error!("Failed to decode thumbnail for crop {}: {e:#}", crop.id);
                    None
                }
            };
            self.thumbnails.insert(crop.id, texture);
        }
        self.thumbnails
            .get(&crop.id)
            .and_then(|t| t.as_ref())
            .map(|t| t.id())
    }
}

/// Fit a crop into the 64x64 thumbnail box, aspect preserved.
fn thumbnail_size(width: f32, height: f32) -> egui::Vec2 {
    let scale = (64.0 / width.max(1.0)).min(64.0 / height.max(1.0)).min(1.0);
    egui::vec2(width * scale, height * scale)
}

/// Save a crop's PNG payload through the native file dialog.
fn download_crop(crop: &SavedCrop) {
    if let Some(path) = rfd::FileDialog::new()
        .add_filter("PNG", &["png"])
        .set_file_name(format!("crop-{}.png", crop.id))
        .save_file()
    {
        match std::fs::write(&path, &crop.image_data) {
            Ok(_) => log::info!("Saved crop {} to {}", crop.id, path.display()),
            Err(e) => log::error!("Failed to save crop {}: {}", crop.id, e),
        }
    }
}
