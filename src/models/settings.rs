// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tool selection and per-tool settings.

use super::scene::ShapeKind;
use image::Rgba;

/// Current editing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Crop,
    Text,
    Shape(ShapeKind),
}

/// Settings applied to newly drawn shapes.
#[derive(Debug, Clone)]
pub struct ShapeSettings {
    pub stroke_color: Rgba<u8>,
    pub stroke_width: f32,
    pub fill_shape: bool,
}

impl Default for ShapeSettings {
    fn default() -> Self {
        Self {
            stroke_color: Rgba([0, 0, 0, 255]),
            stroke_width: 2.0,
            fill_shape: false,
        }
    }
}

/// Settings applied to newly placed text labels.
#[derive(Debug, Clone)]
pub struct TextSettings {
    pub font_size: f32,
    pub text_color: Rgba<u8>,
    pub font_family: String,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            font_size: 20.0,
            text_color: Rgba([0, 0, 0, 255]),
            font_family: "Arial".to_string(),
        }
    }
}
