// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Marq - image annotation and crop compositing.
//!
//! A cross-platform desktop application for annotating a raster image
//! with movable crop fragments, vector shapes and text labels, and
//! exporting the flattened composite.

mod app;
mod editor;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::MarqApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Marq - Image Annotation"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Marq",
        options,
        Box::new(|_cc| Ok(Box::new(MarqApp::new()))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
