// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scene data structures.
//!
//! This module defines the authoritative scene state for an editing
//! session: the base image, placed crop fragments, vector shapes, text
//! labels, the current selection and the transient pointer interaction.

use crate::util::geometry::{fit_within, Point, Rect};
use image::{Rgba, RgbaImage};

/// Maximum logical canvas size; images larger than this are scaled down.
pub const MAX_LOGICAL_WIDTH: u32 = 800;
pub const MAX_LOGICAL_HEIGHT: u32 = 600;

/// Minimum fragment edge length in logical pixels, enforced during resize.
pub const MIN_FRAGMENT_SIZE: f32 = 20.0;

/// Edge length of the square resize handles, in logical pixels.
pub const HANDLE_SIZE: f32 = 8.0;

/// A marquee smaller than this on either axis (strictly) is discarded.
pub const MARQUEE_THRESHOLD: f32 = 10.0;

/// Default placement position for pasted crop fragments.
pub const PASTE_POSITION: Point = Point { x: 50.0, y: 50.0 };

/// Stable identifier for scene elements and saved crops.
pub type ElementId = u64;

/// A rectangular bitmap pasted onto the scene, movable and resizable.
///
/// The decoded pixels are not stored here; they live in the session's
/// decode cache keyed by `id`, so a stale decode can never resurrect a
/// fragment that was removed from the scene.
#[derive(Debug, Clone)]
pub struct CropFragment {
    pub id: ElementId,
    pub position: Point,
    pub width: f32,
    pub height: f32,
    /// PNG-encoded source pixels.
    pub image_data: Vec<u8>,
}

impl CropFragment {
    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }
}

/// Shape primitive variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
}

/// A stroke/fill primitive defined by two drag endpoints.
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: ElementId,
    pub kind: ShapeKind,
    pub start: Point,
    pub end: Point,
    pub color: Rgba<u8>,
    pub stroke_width: f32,
    /// Ignored for the line variant.
    pub filled: bool,
}

/// A positioned text string, baseline-anchored.
#[derive(Debug, Clone)]
pub struct TextLabel {
    pub id: ElementId,
    pub anchor: Point,
    pub text: String,
    pub font_size: f32,
    pub color: Rgba<u8>,
    pub font_family: String,
}

/// A rectangle cut from the composite at crop-confirm time.
///
/// Saved crops are owned by the crop panel, not the scene; they survive
/// image replacement.
#[derive(Debug, Clone)]
pub struct SavedCrop {
    pub id: ElementId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// PNG-encoded pixels of the cropped composite region.
    pub image_data: Vec<u8>,
}

/// Corner resize handles of a selected fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

/// Transient pointer interaction, alive between pointer-down and
/// pointer-up only.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    None,
    DraggingFragment {
        id: ElementId,
        grab_offset: Point,
    },
    ResizingFragment {
        id: ElementId,
        handle: Handle,
        original: Rect,
        anchor: Point,
    },
    MarqueeSelecting {
        start: Point,
        current: Point,
    },
    DrawingShape {
        id: ElementId,
    },
}

/// The authoritative scene of an editing session.
pub struct Scene {
    pub base_image: RgbaImage,
    pub logical_width: u32,
    pub logical_height: u32,
    /// Z-ordered: later entries render (and hit-test) on top.
    pub fragments: Vec<CropFragment>,
    pub shapes: Vec<Shape>,
    pub labels: Vec<TextLabel>,
    pub selection: Option<ElementId>,
    pub interaction: Interaction,
    next_id: ElementId,
}

impl Scene {
    /// Create a scene around a freshly decoded base image. The logical
    /// size is derived once from the image dimensions.
    pub fn new(base_image: RgbaImage) -> Self {
        let (logical_width, logical_height) = fit_within(
            base_image.width(),
            base_image.height(),
            MAX_LOGICAL_WIDTH,
            MAX_LOGICAL_HEIGHT,
        );
        Self {
            base_image,
            logical_width,
            logical_height,
            fragments: Vec::new(),
            shapes: Vec::new(),
            labels: Vec::new(),
            selection: None,
            interaction: Interaction::None,
            next_id: 1,
        }
    }

    /// Replace the base image wholesale. Fragments, shapes and labels are
    /// cleared; the externally held saved-crop list is not our concern.
    pub fn replace_image(&mut self, base_image: RgbaImage) {
        let (w, h) = fit_within(
            base_image.width(),
            base_image.height(),
            MAX_LOGICAL_WIDTH,
            MAX_LOGICAL_HEIGHT,
        );
        self.base_image = base_image;
        self.logical_width = w;
        self.logical_height = h;
        self.fragments.clear();
        self.shapes.clear();
        self.labels.clear();
        self.selection = None;
        self.interaction = Interaction::None;
    }

    pub fn alloc_id(&mut self) -> ElementId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn fragment(&self, id: ElementId) -> Option<&CropFragment> {
        self.fragments.iter().find(|f| f.id == id)
    }

    pub fn fragment_mut(&mut self, id: ElementId) -> Option<&mut CropFragment> {
        self.fragments.iter_mut().find(|f| f.id == id)
    }

    pub fn selected_fragment(&self) -> Option<&CropFragment> {
        self.selection.and_then(|id| self.fragment(id))
    }

    /// Remove a fragment, clearing the selection if it pointed at it.
    pub fn remove_fragment(&mut self, id: ElementId) {
        self.fragments.retain(|f| f.id != id);
        if self.selection == Some(id) {
            self.selection = None;
        }
    }

    pub fn contains_fragment(&self, id: ElementId) -> bool {
        self.fragments.iter().any(|f| f.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_scene() -> Scene {
        Scene::new(RgbaImage::new(1000, 500))
    }

    #[test]
    fn test_logical_size_derived_from_image() {
        let scene = test_scene();
        assert_eq!((scene.logical_width, scene.logical_height), (800, 400));
    }

    #[test]
    fn test_replace_image_clears_elements_and_selection() {
        let mut scene = test_scene();
        let id = scene.alloc_id();
        scene.fragments.push(CropFragment {
            id,
            position: Point::new(50.0, 50.0),
            width: 40.0,
            height: 40.0,
            image_data: Vec::new(),
        });
        scene.selection = Some(id);
        scene.interaction = Interaction::DraggingFragment {
            id,
            grab_offset: Point::new(5.0, 5.0),
        };

        scene.replace_image(RgbaImage::new(400, 300));

        assert!(scene.fragments.is_empty());
        assert!(scene.selection.is_none());
        assert_eq!(scene.interaction, Interaction::None);
        assert_eq!((scene.logical_width, scene.logical_height), (400, 300));
    }

    #[test]
    fn test_remove_fragment_clears_matching_selection() {
        let mut scene = test_scene();
        let id = scene.alloc_id();
        scene.fragments.push(CropFragment {
            id,
            position: Point::new(0.0, 0.0),
            width: 30.0,
            height: 30.0,
            image_data: Vec::new(),
        });
        scene.selection = Some(id);

        scene.remove_fragment(id);

        assert!(!scene.contains_fragment(id));
        assert!(scene.selection.is_none());
    }

    #[test]
    fn test_alloc_id_is_monotonic() {
        let mut scene = test_scene();
        let a = scene.alloc_id();
        let b = scene.alloc_id();
        assert!(b > a);
    }
}
