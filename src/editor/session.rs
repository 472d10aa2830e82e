// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editing session facade.
//!
//! Owns the scene, the fragment decode cache and the compositor, and
//! exposes the event entry points the UI layer drives: mapped pointer
//! events, text placement, deletion, crop pasting, fragment-list
//! replacement, image replacement and the flattened export. Every
//! mutation re-renders the composite synchronously, so the frame always
//! reflects the most recently processed event.

use crate::editor::compositor::Compositor;
use crate::editor::decode::DecodeCache;
use crate::editor::tools::{self, PointerResponse, UpOutcome};
use crate::io::media;
use crate::models::scene::{
    CropFragment, ElementId, Interaction, SavedCrop, Scene, PASTE_POSITION,
};
use crate::models::settings::{ShapeSettings, TextSettings, Tool};
use crate::util::geometry::Point;
use anyhow::Result;
use image::RgbaImage;

pub struct EditorSession {
    scene: Scene,
    decode: DecodeCache,
    compositor: Compositor,
    frame: RgbaImage,
    frame_version: u64,
}

impl EditorSession {
    pub fn new(base_image: RgbaImage) -> Self {
        let scene = Scene::new(base_image);
        let mut compositor = Compositor::new();
        let decode = DecodeCache::new();
        let frame = compositor.render(&scene, &decode);
        Self {
            scene,
            decode,
            compositor,
            frame,
            frame_version: 1,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The latest composited frame at logical resolution.
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    /// Bumped on every re-render; lets the canvas widget skip texture
    /// uploads when nothing changed.
    pub fn frame_version(&self) -> u64 {
        self.frame_version
    }

    pub fn logical_size(&self) -> (u32, u32) {
        (self.scene.logical_width, self.scene.logical_height)
    }

    pub fn pointer_down(
        &mut self,
        tool: Tool,
        point: Point,
        shape_settings: &ShapeSettings,
    ) -> PointerResponse {
        let response = tools::pointer_down(&mut self.scene, tool, point, shape_settings);
        self.rerender();
        response
    }

    pub fn pointer_move(&mut self, point: Point) {
        if self.scene.interaction == Interaction::None {
            return;
        }
        tools::pointer_move(&mut self.scene, point);
        self.rerender();
    }

    /// Pointer-up: confirms the marquee when it clears the threshold and
    /// returns the saved crop cut from the composite. The marquee overlay
    /// is cleared and the frame re-rendered before extraction, so the
    /// dashed outline never leaks into the saved pixels.
    pub fn pointer_up(&mut self) -> Option<SavedCrop> {
        let outcome = tools::pointer_up(&mut self.scene);
        self.rerender();

        let UpOutcome::MarqueeDone(rect) = outcome else {
            return None;
        };
        let region = Compositor::extract_region(&self.frame, rect)?;
        let image_data = match media::encode_png(&region) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Failed to encode crop region: {e:#}");
                return None;
            }
        };
        let id = self.scene.alloc_id();
        log::info!(
            "Saved {}x{} crop at ({}, {})",
            rect.width,
            rect.height,
            rect.x,
            rect.y
        );
        Some(SavedCrop {
            id,
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            image_data,
        })
    }

    /// Place a text label; empty input is a no-op (cancelled prompt).
    pub fn place_label(&mut self, anchor: Point, text: &str, settings: &TextSettings) -> bool {
        let placed = tools::place_label(&mut self.scene, anchor, text, settings);
        if placed {
            self.rerender();
        }
        placed
    }

    /// Delete the selected fragment, if any.
    pub fn delete_selected(&mut self) -> bool {
        let deleted = tools::delete_selected(&mut self.scene);
        if deleted {
            self.decode.prune(&self.scene);
            self.rerender();
        }
        deleted
    }

    /// Instantiate a fragment from a saved crop at the default paste
    /// position and kick off its bitmap decode.
    pub fn paste_crop(&mut self, crop: &SavedCrop) -> ElementId {
        let id = self.scene.alloc_id();
        let mut fragments = self.scene.fragments.clone();
        fragments.push(CropFragment {
            id,
            position: PASTE_POSITION,
            width: crop.width,
            height: crop.height,
            image_data: crop.image_data.clone(),
        });
        self.replace_fragments(fragments);
        log::info!("Pasted crop as fragment {}", id);
        id
    }

    /// The single entry point for external fragment-list mutation:
    /// callers supply the complete new list, never a partial update.
    pub fn replace_fragments(&mut self, fragments: Vec<CropFragment>) {
        self.scene.fragments = fragments;
        if let Some(selected) = self.scene.selection {
            if !self.scene.contains_fragment(selected) {
                self.scene.selection = None;
            }
        }
        self.decode.prune(&self.scene);
        for fragment in &self.scene.fragments {
            if self.decode.get(fragment.id).is_none() {
                self.decode.request(fragment.id, fragment.image_data.clone());
            }
        }
        self.rerender();
    }

    /// Replace the base image; fragments, shapes and labels are cleared.
    pub fn replace_image(&mut self, base_image: RgbaImage) {
        self.scene.replace_image(base_image);
        self.compositor.invalidate_base();
        self.decode.prune(&self.scene);
        self.rerender();
    }

    /// Drain finished fragment decodes; re-renders and reports `true`
    /// when a bitmap was committed.
    pub fn poll_decodes(&mut self) -> bool {
        if self.decode.poll(&self.scene) {
            self.rerender();
            true
        } else {
            false
        }
    }

    pub fn has_pending_decodes(&self) -> bool {
        self.decode.has_pending()
    }

    /// Flattened export: the current composite, PNG-encoded.
    pub fn export_png(&self) -> Result<Vec<u8>> {
        media::encode_png(&self.frame)
    }

    fn rerender(&mut self) {
        self.frame = self.compositor.render(&self.scene, &self.decode);
        self.frame_version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    const GRAY: image::Rgba<u8> = image::Rgba([128, 128, 128, 255]);

    fn session() -> EditorSession {
        EditorSession::new(RgbaImage::from_pixel(400, 300, GRAY))
    }

    fn confirm_marquee(session: &mut EditorSession, from: Point, to: Point) -> Option<SavedCrop> {
        session.pointer_down(Tool::Crop, from, &ShapeSettings::default());
        session.pointer_move(to);
        session.pointer_up()
    }

    #[test]
    fn test_marquee_confirm_emits_saved_crop() {
        let mut session = session();

        let crop = confirm_marquee(
            &mut session,
            Point::new(10.0, 10.0),
            Point::new(25.0, 25.0),
        )
        .expect("crop above threshold");

        assert_eq!((crop.x, crop.y), (10.0, 10.0));
        assert_eq!((crop.width, crop.height), (15.0, 15.0));

        // The payload decodes back to the extracted region
        let decoded = media::decode_image(&crop.image_data).expect("valid png");
        assert_eq!((decoded.width(), decoded.height()), (15, 15));
        assert_eq!(*decoded.get_pixel(7, 7), GRAY);
        assert_eq!(session.scene().interaction, Interaction::None);
    }

    #[test]
    fn test_marquee_below_threshold_emits_nothing() {
        let mut session = session();

        let crop = confirm_marquee(
            &mut session,
            Point::new(10.0, 10.0),
            Point::new(15.0, 15.0),
        );

        assert!(crop.is_none());
    }

    #[test]
    fn test_paste_places_fragment_at_default_position() {
        let mut session = session();
        let crop = confirm_marquee(
            &mut session,
            Point::new(10.0, 10.0),
            Point::new(60.0, 60.0),
        )
        .expect("saved crop");

        let id = session.paste_crop(&crop);

        let fragment = session.scene().fragment(id).expect("fragment pasted");
        assert_eq!(fragment.position, Point::new(50.0, 50.0));
        assert_eq!((fragment.width, fragment.height), (50.0, 50.0));
    }

    #[test]
    fn test_pasted_fragment_renders_once_decode_lands() {
        let mut session = session();
        let crop = confirm_marquee(
            &mut session,
            Point::new(10.0, 10.0),
            Point::new(60.0, 60.0),
        )
        .expect("saved crop");
        session.paste_crop(&crop);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut committed = false;
        while Instant::now() < deadline {
            if session.poll_decodes() {
                committed = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(committed, "decode should commit");
        assert_eq!(*session.frame().get_pixel(60, 60), GRAY);
    }

    #[test]
    fn test_replace_fragments_clears_stale_selection() {
        let mut session = session();
        let crop = confirm_marquee(
            &mut session,
            Point::new(10.0, 10.0),
            Point::new(60.0, 60.0),
        )
        .expect("saved crop");
        let id = session.paste_crop(&crop);

        // Select it the way the UI would
        session.pointer_down(
            Tool::Select,
            Point::new(60.0, 60.0),
            &ShapeSettings::default(),
        );
        session.pointer_up();
        assert_eq!(session.scene().selection, Some(id));

        session.replace_fragments(Vec::new());
        assert!(session.scene().selection.is_none());
        assert!(session.scene().fragments.is_empty());
    }

    #[test]
    fn test_replace_image_clears_scene_but_frame_tracks_new_size() {
        let mut session = session();
        session.place_label(
            Point::new(30.0, 30.0),
            "note",
            &TextSettings::default(),
        );

        session.replace_image(RgbaImage::from_pixel(1000, 500, GRAY));

        assert!(session.scene().labels.is_empty());
        assert_eq!(session.logical_size(), (800, 400));
        assert_eq!(
            (session.frame().width(), session.frame().height()),
            (800, 400)
        );
    }

    #[test]
    fn test_export_is_decodable_png_of_logical_size() {
        let session = session();
        let bytes = session.export_png().expect("export");
        let decoded = media::decode_image(&bytes).expect("valid png");
        assert_eq!((decoded.width(), decoded.height()), (400, 300));
    }
}
