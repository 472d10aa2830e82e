// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Shape tool settings panel.

use crate::models::scene::ShapeKind;
use crate::models::settings::{ShapeSettings, Tool};

/// Display the shape settings editor; variant buttons also switch the
/// active shape tool.
pub fn show(ui: &mut egui::Ui, current_tool: &mut Tool, settings: &mut ShapeSettings) {
    ui.heading("Shape Tool");
    ui.separator();

    ui.label("Shape type");
    ui.horizontal(|ui| {
        for (kind, label) in [
            (ShapeKind::Rectangle, "▭ Rectangle"),
            (ShapeKind::Circle, "◯ Circle"),
            (ShapeKind::Line, "⟋ Line"),
        ] {
            if ui
                .selectable_label(*current_tool == Tool::Shape(kind), label)
                .clicked()
            {
                *current_tool = Tool::Shape(kind);
            }
        }
    });

    ui.add_space(8.0);
    ui.add(
        egui::Slider::new(&mut settings.stroke_width, 1.0..=10.0)
            .integer()
            .text("Stroke width"),
    );

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        ui.label("Stroke color:");
        let mut color = egui::Color32::from_rgba_unmultiplied(
            settings.stroke_color[0],
            settings.stroke_color[1],
            settings.stroke_color[2],
            settings.stroke_color[3],
        );
        if ui.color_edit_button_srgba(&mut color).changed() {
            settings.stroke_color = image::Rgba([color.r(), color.g(), color.b(), color.a()]);
        }
    });

    // Fill does not apply to lines
    if *current_tool != Tool::Shape(ShapeKind::Line) {
        ui.add_space(8.0);
        ui.checkbox(&mut settings.fill_shape, "Fill shape");
    }

    ui.add_space(8.0);
    ui.separator();
    ui.label(
        egui::RichText::new("Click and drag on the canvas to draw shapes")
            .italics()
            .weak(),
    );
}
