// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Upload progress view.
//!
//! Shown full-screen while an image upload is simulated; the real decode
//! runs on a background thread in the meantime.

/// Display the progress view for an in-flight upload.
pub fn show(ui: &mut egui::Ui, file_name: &str, progress: f32) {
    let complete = progress >= 100.0;

    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);

            if complete {
                ui.heading("Upload Complete!");
            } else {
                ui.spinner();
                ui.add_space(10.0);
                ui.heading("Uploading Image...");
            }

            ui.add_space(6.0);
            ui.label(
                egui::RichText::new(file_name)
                    .size(14.0)
                    .color(egui::Color32::from_gray(180)),
            );

            ui.add_space(16.0);
            ui.add_sized(
                [320.0, 20.0],
                egui::ProgressBar::new(progress / 100.0).show_percentage(),
            );

            ui.add_space(10.0);
            let status = if complete {
                "Ready to edit"
            } else {
                "Processing image..."
            };
            ui.label(
                egui::RichText::new(status)
                    .size(13.0)
                    .color(egui::Color32::from_gray(150)),
            );
        });
    });
}
