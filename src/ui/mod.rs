// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the Marq application.

pub mod canvas;
pub mod crop_panel;
pub mod shape_panel;
pub mod text_panel;
pub mod toolbar;
pub mod upload;
