// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Text tool settings panel.

use crate::models::settings::TextSettings;

/// Font families offered in the dropdown.
const FONT_FAMILIES: [&str; 8] = [
    "Arial",
    "Helvetica",
    "Times New Roman",
    "Georgia",
    "Verdana",
    "Comic Sans MS",
    "Impact",
    "Trebuchet MS",
];

/// Display the text settings editor.
pub fn show(ui: &mut egui::Ui, settings: &mut TextSettings) {
    ui.heading("Text Tool");
    ui.separator();

    egui::ComboBox::from_label("Font family")
        .selected_text(settings.font_family.clone())
        .show_ui(ui, |ui| {
            for family in FONT_FAMILIES {
                ui.selectable_value(&mut settings.font_family, family.to_string(), family);
            }
        });

    ui.add_space(8.0);
    ui.add(
        egui::Slider::new(&mut settings.font_size, 12.0..=72.0)
            .integer()
            .text("Font size"),
    );

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.label("Text color:");
        let mut color = egui::Color32::from_rgba_unmultiplied(
            settings.text_color[0],
            settings.text_color[1],
            settings.text_color[2],
            settings.text_color[3],
        );
        if ui.color_edit_button_srgba(&mut color).changed() {
            settings.text_color = image::Rgba([color.r(), color.g(), color.b(), color.a()]);
        }
    });

    ui.add_space(8.0);
    ui.separator();
    ui.label(
        egui::RichText::new("Click on the canvas to add text")
            .italics()
            .weak(),
    );
}
