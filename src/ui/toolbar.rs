// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.

use crate::models::scene::ShapeKind;
use crate::models::settings::Tool;

/// Display the toolbar with tool selection buttons.
pub fn show(ui: &mut egui::Ui, current_tool: &mut Tool) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Tools:");

        ui.separator();

        if ui
            .selectable_label(*current_tool == Tool::Select, "⬆ Select")
            .clicked()
        {
            *current_tool = Tool::Select;
        }

        if ui
            .selectable_label(*current_tool == Tool::Crop, "⛶ Crop")
            .clicked()
        {
            *current_tool = Tool::Crop;
        }

        if ui
            .selectable_label(*current_tool == Tool::Text, "T Text")
            .clicked()
        {
            *current_tool = Tool::Text;
        }

        if ui
            .selectable_label(
                *current_tool == Tool::Shape(ShapeKind::Rectangle),
                "▭ Rectangle",
            )
            .clicked()
        {
            *current_tool = Tool::Shape(ShapeKind::Rectangle);
        }

        if ui
            .selectable_label(*current_tool == Tool::Shape(ShapeKind::Circle), "◯ Circle")
            .clicked()
        {
            *current_tool = Tool::Shape(ShapeKind::Circle);
        }

        if ui
            .selectable_label(*current_tool == Tool::Shape(ShapeKind::Line), "⟋ Line")
            .clicked()
        {
            *current_tool = Tool::Shape(ShapeKind::Line);
        }

        ui.separator();

        let tool_text = match current_tool {
            Tool::Select => "Click fragments to select, drag to move, corner handles to resize",
            Tool::Crop => "Drag a marquee to save a crop of the composite",
            Tool::Text => "Click on the canvas to place text",
            Tool::Shape(_) => "Click and drag on the canvas to draw the shape",
        };

        ui.label(egui::RichText::new(tool_text).italics().weak());
    });
}
