// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tool state machine.
//!
//! Converts mapped pointer events into scene mutations, one small state
//! machine per tool mode. All transient state lives in the scene's
//! `interaction` record, which exists only between pointer-down and
//! pointer-up.

use crate::editor::hit;
use crate::models::scene::{
    Handle, Interaction, Scene, Shape, TextLabel, MARQUEE_THRESHOLD, MIN_FRAGMENT_SIZE,
};
use crate::models::settings::{ShapeSettings, TextSettings, Tool};
use crate::util::geometry::{Point, Rect};

/// Side effect requested by a pointer-down that the shell must fulfill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerResponse {
    None,
    /// Text mode: prompt the user for content to place at `anchor`.
    TextPrompt { anchor: Point },
}

/// Outcome of a pointer-up transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpOutcome {
    None,
    /// A marquee above the size threshold was confirmed; the session
    /// extracts this normalized region from the composite.
    MarqueeDone(Rect),
}

/// Pointer-down transition for the active tool.
pub fn pointer_down(
    scene: &mut Scene,
    tool: Tool,
    point: Point,
    shape_settings: &ShapeSettings,
) -> PointerResponse {
    match tool {
        Tool::Select => {
            // Resize handles of the selected fragment take priority; they
            // reach slightly outside the fragment's bounding box.
            let handle_hit = scene
                .selected_fragment()
                .and_then(|f| hit::handle_at(f, point).map(|h| (f.id, h, f.rect())));
            if let Some((id, handle, original)) = handle_hit {
                scene.interaction = Interaction::ResizingFragment {
                    id,
                    handle,
                    original,
                    anchor: point,
                };
                return PointerResponse::None;
            }

            if let Some(id) = hit::fragment_at(&scene.fragments, point) {
                let origin = scene
                    .fragment(id)
                    .map(|f| f.position)
                    .unwrap_or_default();
                scene.selection = Some(id);
                scene.interaction = Interaction::DraggingFragment {
                    id,
                    grab_offset: Point::new(point.x - origin.x, point.y - origin.y),
                };
                log::info!("Selected fragment {}", id);
            } else {
                scene.selection = None;
            }
            PointerResponse::None
        }
        Tool::Crop => {
            scene.interaction = Interaction::MarqueeSelecting {
                start: point,
                current: point,
            };
            PointerResponse::None
        }
        Tool::Text => PointerResponse::TextPrompt { anchor: point },
        Tool::Shape(kind) => {
            let id = scene.alloc_id();
            scene.shapes.push(Shape {
                id,
                kind,
                start: point,
                end: point,
                color: shape_settings.stroke_color,
                stroke_width: shape_settings.stroke_width,
                filled: shape_settings.fill_shape,
            });
            scene.interaction = Interaction::DrawingShape { id };
            PointerResponse::None
        }
    }
}

/// Pointer-move transition for the active interaction.
pub fn pointer_move(scene: &mut Scene, point: Point) {
    match scene.interaction.clone() {
        Interaction::DraggingFragment { id, grab_offset } => {
            if let Some(fragment) = scene.fragment_mut(id) {
                fragment.position = Point::new(
                    (point.x - grab_offset.x).max(0.0),
                    (point.y - grab_offset.y).max(0.0),
                );
            }
        }
        Interaction::ResizingFragment {
            id,
            handle,
            original,
            anchor,
        } => {
            let rect = resized_rect(original, handle, point.x - anchor.x, point.y - anchor.y);
            if let Some(fragment) = scene.fragment_mut(id) {
                fragment.position = Point::new(rect.x, rect.y);
                fragment.width = rect.width;
                fragment.height = rect.height;
            }
        }
        Interaction::MarqueeSelecting { start, .. } => {
            scene.interaction = Interaction::MarqueeSelecting {
                start,
                current: point,
            };
        }
        Interaction::DrawingShape { id } => {
            // The in-progress shape is always the last entry; its endpoint
            // is the only mutable field of the otherwise append-only log.
            // Replaced with an updated copy rather than patched through an
            // aliasing reference.
            if let Some(last) = scene.shapes.last_mut() {
                if last.id == id {
                    let mut updated = last.clone();
                    updated.end = point;
                    *last = updated;
                }
            }
        }
        Interaction::None => {}
    }
}

/// Pointer-up transition: confirms or discards the marquee, ends every
/// other interaction without further mutation. Never changes the mode.
pub fn pointer_up(scene: &mut Scene) -> UpOutcome {
    let interaction = std::mem::replace(&mut scene.interaction, Interaction::None);
    if let Interaction::MarqueeSelecting { start, current } = interaction {
        // Strictly-greater threshold on both axes; below it the gesture
        // is a silent no-op, not an error.
        if (current.x - start.x).abs() > MARQUEE_THRESHOLD
            && (current.y - start.y).abs() > MARQUEE_THRESHOLD
        {
            return UpOutcome::MarqueeDone(Rect::from_corners(start, current));
        }
    }
    UpOutcome::None
}

/// Delete/Backspace in select mode: remove the selected fragment.
/// Returns whether anything was removed.
pub fn delete_selected(scene: &mut Scene) -> bool {
    if let Some(id) = scene.selection {
        scene.remove_fragment(id);
        log::info!("Deleted fragment {}, remaining: {}", id, scene.fragments.len());
        true
    } else {
        false
    }
}

/// Append a text label at `anchor`. Empty or cancelled input creates
/// nothing. Returns whether a label was placed.
pub fn place_label(
    scene: &mut Scene,
    anchor: Point,
    text: &str,
    settings: &TextSettings,
) -> bool {
    if text.is_empty() {
        return false;
    }
    let id = scene.alloc_id();
    scene.labels.push(TextLabel {
        id,
        anchor,
        text: text.to_string(),
        font_size: settings.font_size,
        color: settings.text_color,
        font_family: settings.font_family.clone(),
    });
    true
}

/// Apply a handle drag delta to a fragment rect.
///
/// Each handle owns two edges; each axis floors independently at the
/// minimum size with the opposite edge pinned, so shrinking through the
/// floor never drags the far side along. The position is clamped to stay
/// inside the top-left canvas bounds.
fn resized_rect(original: Rect, handle: Handle, dx: f32, dy: f32) -> Rect {
    let mut rect = original;

    // Horizontal edge
    match handle {
        Handle::NorthWest | Handle::SouthWest => {
            let width = original.width - dx;
            if width < MIN_FRAGMENT_SIZE {
                rect.width = MIN_FRAGMENT_SIZE;
                rect.x = original.right() - MIN_FRAGMENT_SIZE;
            } else {
                rect.width = width;
                rect.x = original.x + dx;
            }
        }
        Handle::NorthEast | Handle::SouthEast => {
            rect.width = (original.width + dx).max(MIN_FRAGMENT_SIZE);
        }
    }

    // Vertical edge
    match handle {
        Handle::NorthWest | Handle::NorthEast => {
            let height = original.height - dy;
            if height < MIN_FRAGMENT_SIZE {
                rect.height = MIN_FRAGMENT_SIZE;
                rect.y = original.bottom() - MIN_FRAGMENT_SIZE;
            } else {
                rect.height = height;
                rect.y = original.y + dy;
            }
        }
        Handle::SouthWest | Handle::SouthEast => {
            rect.height = (original.height + dy).max(MIN_FRAGMENT_SIZE);
        }
    }

    rect.x = rect.x.max(0.0);
    rect.y = rect.y.max(0.0);
    rect
}
