// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Fragment bitmap decode cache.
//!
//! Fragments carry PNG-encoded payloads; decoding runs on a background
//! thread and finished bitmaps are committed here, keyed by fragment id.
//! The compositor consults the cache and simply skips fragments whose
//! bitmap has not arrived yet. A decode that completes after its fragment
//! was removed from the scene is discarded instead of committed, so stale
//! callbacks can never resurrect a deleted fragment.

use crate::models::scene::{ElementId, Scene};
use image::RgbaImage;
use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{channel, Receiver, Sender};

type DecodeResult = (ElementId, Result<RgbaImage, String>);

pub struct DecodeCache {
    decoded: HashMap<ElementId, RgbaImage>,
    requested: HashSet<ElementId>,
    sender: Sender<DecodeResult>,
    receiver: Receiver<DecodeResult>,
    pending: usize,
}

impl DecodeCache {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            decoded: HashMap::new(),
            requested: HashSet::new(),
            sender,
            receiver,
            pending: 0,
        }
    }

    /// Kick off a background decode for a fragment's payload. Repeated
    /// requests for an id that is already decoded or in flight are
    /// ignored.
    pub fn request(&mut self, id: ElementId, image_data: Vec<u8>) {
        if self.decoded.contains_key(&id) || self.requested.contains(&id) {
            return;
        }
        self.requested.insert(id);
        self.pending += 1;

        let sender = self.sender.clone();
        std::thread::spawn(move || {
            let result = image::load_from_memory(&image_data)
                .map(|img| img.to_rgba8())
                .map_err(|e| e.to_string());
            let _ = sender.send((id, result));
        });
    }

    /// Drain finished decodes, committing only bitmaps whose fragment is
    /// still present in `scene`. Returns whether anything was committed
    /// (the caller re-renders in that case).
    pub fn poll(&mut self, scene: &Scene) -> bool {
        let mut committed = false;
        while let Ok((id, result)) = self.receiver.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            self.requested.remove(&id);
            match result {
                Ok(bitmap) => {
                    if scene.contains_fragment(id) {
                        self.decoded.insert(id, bitmap);
                        committed = true;
                    } else {
                        log::debug!("Discarding decode result for removed fragment {}", id);
                    }
                }
                Err(e) => log::error!("Failed to decode fragment {} bitmap: {}", id, e),
            }
        }
        committed
    }

    pub fn get(&self, id: ElementId) -> Option<&RgbaImage> {
        self.decoded.get(&id)
    }

    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }

    /// Drop cached bitmaps for fragments no longer in the scene.
    pub fn prune(&mut self, scene: &Scene) {
        self.decoded.retain(|id, _| scene.contains_fragment(*id));
    }

    #[cfg(test)]
    pub fn insert_decoded(&mut self, id: ElementId, bitmap: RgbaImage) {
        self.decoded.insert(id, bitmap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scene::CropFragment;
    use crate::util::geometry::Point;
    use std::time::{Duration, Instant};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .expect("png encode");
        bytes
    }

    fn wait_for_poll(cache: &mut DecodeCache, scene: &Scene) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cache.poll(scene) {
                return true;
            }
            if !cache.has_pending() {
                return false;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_decode_commits_for_live_fragment() {
        let mut scene = Scene::new(RgbaImage::new(100, 100));
        let id = scene.alloc_id();
        scene.fragments.push(CropFragment {
            id,
            position: Point::new(0.0, 0.0),
            width: 8.0,
            height: 8.0,
            image_data: Vec::new(),
        });

        let mut cache = DecodeCache::new();
        cache.request(id, png_bytes(8, 8));

        assert!(wait_for_poll(&mut cache, &scene));
        let bitmap = cache.get(id).expect("bitmap committed");
        assert_eq!((bitmap.width(), bitmap.height()), (8, 8));
    }

    #[test]
    fn test_decode_for_removed_fragment_is_discarded() {
        let scene = Scene::new(RgbaImage::new(100, 100));

        let mut cache = DecodeCache::new();
        // Fragment 42 is not in the scene; the result must not be committed
        cache.request(42, png_bytes(4, 4));

        assert!(!wait_for_poll(&mut cache, &scene));
        assert!(cache.get(42).is_none());
        assert!(!cache.has_pending());
    }

    #[test]
    fn test_malformed_payload_is_dropped_without_panic() {
        let scene = Scene::new(RgbaImage::new(100, 100));

        let mut cache = DecodeCache::new();
        cache.request(7, vec![1, 2, 3, 4]);

        assert!(!wait_for_poll(&mut cache, &scene));
        assert!(cache.get(7).is_none());
    }
}
