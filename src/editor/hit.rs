// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Hit testing for scene elements.
//!
//! Resolves which fragment (and, for the selected fragment, which resize
//! handle) sits under a logical-space point. Fragments are tested from
//! the top of the z-order down, so overlapping fragments resolve to the
//! most recently placed one.

use crate::models::scene::{CropFragment, ElementId, Handle, HANDLE_SIZE};
use crate::util::geometry::{Point, Rect};

/// Find the top-most fragment whose bounding box contains `point`.
pub fn fragment_at(fragments: &[CropFragment], point: Point) -> Option<ElementId> {
    fragments
        .iter()
        .rev()
        .find(|f| f.rect().contains(point))
        .map(|f| f.id)
}

/// The four 8x8 handle squares of a fragment, centered on its corners.
/// Order is fixed: NW, NE, SW, SE.
pub fn handle_rects(rect: Rect) -> [(Handle, Rect); 4] {
    let half = HANDLE_SIZE / 2.0;
    let square = |cx: f32, cy: f32| Rect::new(cx - half, cy - half, HANDLE_SIZE, HANDLE_SIZE);
    [
        (Handle::NorthWest, square(rect.x, rect.y)),
        (Handle::NorthEast, square(rect.right(), rect.y)),
        (Handle::SouthWest, square(rect.x, rect.bottom())),
        (Handle::SouthEast, square(rect.right(), rect.bottom())),
    ]
}

/// Find the resize handle of `fragment` under `point`, if any.
pub fn handle_at(fragment: &CropFragment, point: Point) -> Option<Handle> {
    handle_rects(fragment.rect())
        .into_iter()
        .find(|(_, rect)| rect.contains(point))
        .map(|(handle, _)| handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(id: ElementId, x: f32, y: f32, w: f32, h: f32) -> CropFragment {
        CropFragment {
            id,
            position: Point::new(x, y),
            width: w,
            height: h,
            image_data: Vec::new(),
        }
    }

    #[test]
    fn test_topmost_fragment_wins_on_overlap() {
        let fragments = vec![
            fragment(1, 10.0, 10.0, 100.0, 100.0),
            fragment(2, 50.0, 50.0, 100.0, 100.0),
        ];

        // Overlap region: the later-inserted fragment is on top
        assert_eq!(fragment_at(&fragments, Point::new(60.0, 60.0)), Some(2));
        // Only the first fragment covers this point
        assert_eq!(fragment_at(&fragments, Point::new(20.0, 20.0)), Some(1));
        assert_eq!(fragment_at(&fragments, Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_fragment_bounds_are_inclusive() {
        let fragments = vec![fragment(1, 10.0, 10.0, 20.0, 20.0)];
        assert_eq!(fragment_at(&fragments, Point::new(10.0, 10.0)), Some(1));
        assert_eq!(fragment_at(&fragments, Point::new(30.0, 30.0)), Some(1));
        assert_eq!(fragment_at(&fragments, Point::new(30.5, 30.0)), None);
    }

    #[test]
    fn test_handle_at_each_corner() {
        let f = fragment(1, 50.0, 50.0, 100.0, 100.0);
        assert_eq!(handle_at(&f, Point::new(50.0, 50.0)), Some(Handle::NorthWest));
        assert_eq!(handle_at(&f, Point::new(150.0, 50.0)), Some(Handle::NorthEast));
        assert_eq!(handle_at(&f, Point::new(50.0, 150.0)), Some(Handle::SouthWest));
        assert_eq!(handle_at(&f, Point::new(150.0, 150.0)), Some(Handle::SouthEast));
        assert_eq!(handle_at(&f, Point::new(100.0, 100.0)), None);
    }

    #[test]
    fn test_handle_extends_outside_fragment() {
        let f = fragment(1, 50.0, 50.0, 100.0, 100.0);
        // Handles are centered on the corner, so they reach 4px outside
        assert_eq!(handle_at(&f, Point::new(47.0, 47.0)), Some(Handle::NorthWest));
        assert_eq!(handle_at(&f, Point::new(45.0, 45.0)), None);
    }
}
