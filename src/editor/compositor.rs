// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scene compositor.
//!
//! Renders the full scene into the logical-size RGBA backing store in a
//! fixed order: base image, crop fragments (with selection overlay),
//! shapes, text labels, then the live marquee. Invoked after every scene
//! mutation; the resulting frame is both what the canvas displays and
//! what crop extraction and the flattened export read from.

use crate::editor::decode::DecodeCache;
use crate::editor::fonts::FontCache;
use crate::models::scene::{CropFragment, Interaction, Scene, Shape, ShapeKind, TextLabel};
use crate::editor::hit::handle_rects;
use crate::util::geometry::{Point, Rect};
use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::{imageops, imageops::FilterType, Rgba, RgbaImage};

/// Accent color for selection borders, handles and the marquee.
pub const SELECTION_COLOR: Rgba<u8> = Rgba([59, 130, 246, 255]);

const SELECTION_OUTSET: f32 = 2.0;
const OVERLAY_STROKE: f32 = 2.0;
const DASH_ON: f32 = 5.0;
const DASH_OFF: f32 = 5.0;

pub struct Compositor {
    fonts: FontCache,
    /// Base image resampled to the logical size; rebuilt on image change.
    scaled_base: Option<RgbaImage>,
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            fonts: FontCache::new(),
            scaled_base: None,
        }
    }

    /// Drop the cached resampled base image; call after the base image
    /// is replaced.
    pub fn invalidate_base(&mut self) {
        self.scaled_base = None;
    }

    /// Render the scene into a fresh frame at the logical size.
    pub fn render(&mut self, scene: &Scene, decoded: &DecodeCache) -> RgbaImage {
        let (width, height) = (scene.logical_width, scene.logical_height);

        // Stretching the base to the logical size is also what
        // re-quantizes the image to the working resolution.
        let rebuild = self
            .scaled_base
            .as_ref()
            .map(|b| (b.width(), b.height()) != (width, height))
            .unwrap_or(true);
        if rebuild {
            self.scaled_base = Some(imageops::resize(
                &scene.base_image,
                width,
                height,
                FilterType::Triangle,
            ));
        }
        let mut frame = match &self.scaled_base {
            Some(base) => base.clone(),
            None => return RgbaImage::new(width, height),
        };

        for fragment in &scene.fragments {
            // Fragments whose bitmap has not finished decoding are
            // skipped this frame and appear once the decode commits.
            if let Some(bitmap) = decoded.get(fragment.id) {
                blit_scaled(&mut frame, bitmap, fragment.rect());

                if scene.selection == Some(fragment.id) {
                    draw_selection_overlay(&mut frame, fragment);
                }
            }
        }

        for shape in &scene.shapes {
            draw_shape(&mut frame, shape);
        }

        for label in &scene.labels {
            draw_label(&mut frame, &mut self.fonts, label);
        }

        if let Interaction::MarqueeSelecting { start, current } = scene.interaction {
            stroke_rect_dashed(
                &mut frame,
                Rect::from_corners(start, current),
                SELECTION_COLOR,
                OVERLAY_STROKE,
            );
        }

        frame
    }

    /// Cut a region out of a rendered frame, clamped to the frame bounds.
    /// Returns `None` when nothing of the region lies inside the frame.
    pub fn extract_region(frame: &RgbaImage, rect: Rect) -> Option<RgbaImage> {
        let x0 = rect.x.round().max(0.0) as u32;
        let y0 = rect.y.round().max(0.0) as u32;
        if x0 >= frame.width() || y0 >= frame.height() {
            return None;
        }
        let width = (rect.right().round() as i64 - x0 as i64).clamp(0, i64::from(frame.width() - x0)) as u32;
        let height = (rect.bottom().round() as i64 - y0 as i64).clamp(0, i64::from(frame.height() - y0)) as u32;
        if width == 0 || height == 0 {
            return None;
        }
        Some(imageops::crop_imm(frame, x0, y0, width, height).to_image())
    }
}

/// Blend a color into one pixel with the given coverage (0..=1).
fn blend_pixel(frame: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>, coverage: f32) {
    if coverage <= 0.0 || x < 0 || y < 0 || x >= frame.width() as i64 || y >= frame.height() as i64 {
        return;
    }
    let alpha = coverage.min(1.0) * (color[3] as f32 / 255.0);
    if alpha <= 0.0 {
        return;
    }
    let dst = frame.get_pixel_mut(x as u32, y as u32);
    for c in 0..3 {
        dst[c] = (color[c] as f32 * alpha + dst[c] as f32 * (1.0 - alpha)).round() as u8;
    }
    dst[3] = (255.0 * alpha + dst[3] as f32 * (1.0 - alpha)).round() as u8;
}

/// Draw `src` scaled into `dest`, nearest-neighbor sampled, respecting
/// the source's alpha channel.
fn blit_scaled(frame: &mut RgbaImage, src: &RgbaImage, dest: Rect) {
    if dest.width <= 0.0 || dest.height <= 0.0 || src.width() == 0 || src.height() == 0 {
        return;
    }
    let x0 = dest.x.round().max(0.0) as i64;
    let y0 = dest.y.round().max(0.0) as i64;
    let x1 = (dest.right().round() as i64).min(frame.width() as i64);
    let y1 = (dest.bottom().round() as i64).min(frame.height() as i64);

    for py in y0..y1 {
        let v = ((py as f32 + 0.5 - dest.y) / dest.height * src.height() as f32)
            .clamp(0.0, src.height() as f32 - 1.0) as u32;
        for px in x0..x1 {
            let u = ((px as f32 + 0.5 - dest.x) / dest.width * src.width() as f32)
                .clamp(0.0, src.width() as f32 - 1.0) as u32;
            let pixel = *src.get_pixel(u, v);
            blend_pixel(frame, px, py, pixel, 1.0);
        }
    }
}

/// Fill an axis-aligned rectangle.
fn fill_rect(frame: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    let x0 = rect.x.round() as i64;
    let y0 = rect.y.round() as i64;
    let x1 = rect.right().round() as i64;
    let y1 = rect.bottom().round() as i64;
    for py in y0..y1 {
        for px in x0..x1 {
            blend_pixel(frame, px, py, color, 1.0);
        }
    }
}

/// Stroke a rectangle outline with the stroke centered on its edges.
fn stroke_rect(frame: &mut RgbaImage, rect: Rect, color: Rgba<u8>, stroke_width: f32) {
    let half = stroke_width / 2.0;
    let outer = Rect::new(
        rect.x - half,
        rect.y - half,
        rect.width + stroke_width,
        rect.height + stroke_width,
    );
    if rect.width <= stroke_width || rect.height <= stroke_width {
        fill_rect(frame, outer, color);
        return;
    }
    // Four edge bands
    fill_rect(frame, Rect::new(outer.x, outer.y, outer.width, stroke_width), color);
    fill_rect(
        frame,
        Rect::new(outer.x, outer.bottom() - stroke_width, outer.width, stroke_width),
        color,
    );
    fill_rect(
        frame,
        Rect::new(outer.x, outer.y + stroke_width, stroke_width, outer.height - 2.0 * stroke_width),
        color,
    );
    fill_rect(
        frame,
        Rect::new(
            outer.right() - stroke_width,
            outer.y + stroke_width,
            stroke_width,
            outer.height - 2.0 * stroke_width,
        ),
        color,
    );
}

/// Stroke a rectangle with a 5-on/5-off dash pattern, the dash phase
/// running continuously around the perimeter.
fn stroke_rect_dashed(frame: &mut RgbaImage, rect: Rect, color: Rgba<u8>, stroke_width: f32) {
    let corners = [
        Point::new(rect.x, rect.y),
        Point::new(rect.right(), rect.y),
        Point::new(rect.right(), rect.bottom()),
        Point::new(rect.x, rect.bottom()),
        Point::new(rect.x, rect.y),
    ];
    let mut phase = 0.0;
    for pair in corners.windows(2) {
        draw_dashed_segment(frame, pair[0], pair[1], color, stroke_width, &mut phase);
    }
}

fn draw_dashed_segment(
    frame: &mut RgbaImage,
    a: Point,
    b: Point,
    color: Rgba<u8>,
    stroke_width: f32,
    phase: &mut f32,
) {
    let length = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
    if length <= 0.0 {
        return;
    }
    let dir = Point::new((b.x - a.x) / length, (b.y - a.y) / length);
    let cycle = DASH_ON + DASH_OFF;
    let mut t = 0.0;
    while t < length {
        let in_cycle = *phase % cycle;
        if in_cycle < DASH_ON {
            let run = (DASH_ON - in_cycle).min(length - t);
            let from = Point::new(a.x + dir.x * t, a.y + dir.y * t);
            let to = Point::new(a.x + dir.x * (t + run), a.y + dir.y * (t + run));
            draw_line(frame, from, to, color, stroke_width);
            t += run;
            *phase += run;
        } else {
            let run = (cycle - in_cycle).min(length - t);
            t += run;
            *phase += run;
        }
    }
}

/// Draw a thick line segment with a soft 1px edge.
fn draw_line(frame: &mut RgbaImage, a: Point, b: Point, color: Rgba<u8>, stroke_width: f32) {
    let half = stroke_width / 2.0;
    let x0 = (a.x.min(b.x) - half - 1.0).floor() as i64;
    let y0 = (a.y.min(b.y) - half - 1.0).floor() as i64;
    let x1 = (a.x.max(b.x) + half + 1.0).ceil() as i64;
    let y1 = (a.y.max(b.y) + half + 1.0).ceil() as i64;

    for py in y0..=y1 {
        for px in x0..=x1 {
            let d = segment_distance(px as f32 + 0.5, py as f32 + 0.5, a, b);
            let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
            blend_pixel(frame, px, py, color, coverage);
        }
    }
}

/// Distance from a point to a line segment.
fn segment_distance(px: f32, py: f32, a: Point, b: Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let apx = px - a.x;
    let apy = py - a.y;
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        ((apx * abx + apy * aby) / len_sq).clamp(0.0, 1.0)
    };
    let cx = a.x + abx * t;
    let cy = a.y + aby * t;
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

fn draw_circle(
    frame: &mut RgbaImage,
    cx: f32,
    cy: f32,
    radius: f32,
    color: Rgba<u8>,
    stroke_width: f32,
    filled: bool,
) {
    if radius <= 0.0 {
        return;
    }
    let half = stroke_width / 2.0;
    let reach = radius + half + 1.0;
    let x0 = (cx - reach).floor() as i64;
    let y0 = (cy - reach).floor() as i64;
    let x1 = (cx + reach).ceil() as i64;
    let y1 = (cy + reach).ceil() as i64;

    for py in y0..=y1 {
        for px in x0..=x1 {
            let d = ((px as f32 + 0.5 - cx).powi(2) + (py as f32 + 0.5 - cy).powi(2)).sqrt();
            let ring = (half + 0.5 - (d - radius).abs()).clamp(0.0, 1.0);
            let coverage = if filled {
                ring.max((radius - d + 0.5).clamp(0.0, 1.0))
            } else {
                ring
            };
            blend_pixel(frame, px, py, color, coverage);
        }
    }
}

fn draw_shape(frame: &mut RgbaImage, shape: &Shape) {
    match shape.kind {
        ShapeKind::Rectangle => {
            let rect = Rect::from_corners(shape.start, shape.end);
            if shape.filled {
                fill_rect(frame, rect, shape.color);
            }
            stroke_rect(frame, rect, shape.color, shape.stroke_width);
        }
        ShapeKind::Circle => {
            // Center is the drag midpoint; the radius tracks the
            // horizontal extent only.
            let cx = (shape.start.x + shape.end.x) / 2.0;
            let cy = (shape.start.y + shape.end.y) / 2.0;
            let radius = (shape.end.x - shape.start.x).abs() / 2.0;
            draw_circle(frame, cx, cy, radius, shape.color, shape.stroke_width, shape.filled);
        }
        ShapeKind::Line => {
            draw_line(frame, shape.start, shape.end, shape.color, shape.stroke_width);
        }
    }
}

/// Dashed border (2px outset) plus the four filled corner handles.
fn draw_selection_overlay(frame: &mut RgbaImage, fragment: &CropFragment) {
    let rect = fragment.rect();
    let border = Rect::new(
        rect.x - SELECTION_OUTSET,
        rect.y - SELECTION_OUTSET,
        rect.width + 2.0 * SELECTION_OUTSET,
        rect.height + 2.0 * SELECTION_OUTSET,
    );
    stroke_rect_dashed(frame, border, SELECTION_COLOR, OVERLAY_STROKE);

    for (_, handle_rect) in handle_rects(rect) {
        fill_rect(frame, handle_rect, SELECTION_COLOR);
    }
}

/// Rasterize a single-line label with its baseline at the anchor point.
fn draw_label(frame: &mut RgbaImage, fonts: &mut FontCache, label: &TextLabel) {
    let Some(font) = fonts.get(&label.font_family) else {
        return;
    };
    draw_text(frame, &font, label);
}

fn draw_text(frame: &mut RgbaImage, font: &FontArc, label: &TextLabel) {
    let scale = PxScale::from(label.font_size);
    let scaled = font.as_scaled(scale);

    let mut caret = label.anchor.x;
    let mut previous: Option<GlyphId> = None;
    for ch in label.text.chars() {
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, glyph_id);
        }
        let glyph = glyph_id.with_scale_and_position(scale, ab_glyph::point(caret, label.anchor.y));
        caret += scaled.h_advance(glyph_id);
        previous = Some(glyph_id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                blend_pixel(
                    frame,
                    bounds.min.x as i64 + gx as i64,
                    bounds.min.y as i64 + gy as i64,
                    label.color,
                    coverage,
                );
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const GRAY: Rgba<u8> = Rgba([128, 128, 128, 255]);

    fn scene_with_base(width: u32, height: u32) -> Scene {
        Scene::new(RgbaImage::from_pixel(width, height, GRAY))
    }

    fn push_fragment(scene: &mut Scene, x: f32, y: f32, w: f32, h: f32) -> u64 {
        let id = scene.alloc_id();
        scene.fragments.push(CropFragment {
            id,
            position: Point::new(x, y),
            width: w,
            height: h,
            image_data: Vec::new(),
        });
        id
    }

    #[test]
    fn test_base_image_fills_logical_size() {
        let mut scene = scene_with_base(400, 300);
        let mut compositor = Compositor::new();
        let frame = compositor.render(&scene, &DecodeCache::new());

        assert_eq!((frame.width(), frame.height()), (400, 300));
        assert_eq!(*frame.get_pixel(0, 0), GRAY);
        assert_eq!(*frame.get_pixel(399, 299), GRAY);

        // Logical size caps apply on replace as well
        scene.replace_image(RgbaImage::from_pixel(1000, 500, GRAY));
        let mut compositor = Compositor::new();
        let frame = compositor.render(&scene, &DecodeCache::new());
        assert_eq!((frame.width(), frame.height()), (800, 400));
    }

    #[test]
    fn test_undecoded_fragment_is_omitted() {
        let mut scene = scene_with_base(200, 200);
        push_fragment(&mut scene, 20.0, 20.0, 50.0, 50.0);

        let mut compositor = Compositor::new();
        let frame = compositor.render(&scene, &DecodeCache::new());

        assert_eq!(*frame.get_pixel(40, 40), GRAY);
    }

    #[test]
    fn test_decoded_fragment_is_drawn_scaled() {
        let mut scene = scene_with_base(200, 200);
        let id = push_fragment(&mut scene, 20.0, 20.0, 50.0, 50.0);

        let mut cache = DecodeCache::new();
        // 10x10 source stretched onto the 50x50 fragment rect
        cache.insert_decoded(id, RgbaImage::from_pixel(10, 10, GREEN));

        let mut compositor = Compositor::new();
        let frame = compositor.render(&scene, &cache);

        assert_eq!(*frame.get_pixel(40, 40), GREEN);
        assert_eq!(*frame.get_pixel(69, 69), GREEN);
        assert_eq!(*frame.get_pixel(10, 10), GRAY);
    }

    #[test]
    fn test_shapes_draw_above_fragments() {
        let mut scene = scene_with_base(200, 200);
        let id = push_fragment(&mut scene, 20.0, 20.0, 50.0, 50.0);

        let mut cache = DecodeCache::new();
        cache.insert_decoded(id, RgbaImage::from_pixel(10, 10, GREEN));

        let shape_id = scene.alloc_id();
        scene.shapes.push(Shape {
            id: shape_id,
            kind: ShapeKind::Rectangle,
            start: Point::new(30.0, 30.0),
            end: Point::new(60.0, 60.0),
            color: RED,
            stroke_width: 2.0,
            filled: true,
        });

        let mut compositor = Compositor::new();
        let frame = compositor.render(&scene, &cache);

        // Overlap region: the shape wins; outside it the fragment shows
        assert_eq!(*frame.get_pixel(45, 45), RED);
        assert_eq!(*frame.get_pixel(22, 22), GREEN);
    }

    #[test]
    fn test_filled_circle_center_and_radius_from_horizontal_extent() {
        let mut scene = scene_with_base(200, 200);
        let id = scene.alloc_id();
        scene.shapes.push(Shape {
            id,
            kind: ShapeKind::Circle,
            start: Point::new(40.0, 100.0),
            end: Point::new(120.0, 100.0),
            color: RED,
            stroke_width: 2.0,
            filled: true,
        });

        let mut compositor = Compositor::new();
        let frame = compositor.render(&scene, &DecodeCache::new());

        // Center (80, 100), radius 40
        assert_eq!(*frame.get_pixel(80, 100), RED);
        assert_eq!(*frame.get_pixel(80, 75), RED);
        assert_eq!(*frame.get_pixel(80, 30), GRAY);
    }

    #[test]
    fn test_line_shape_covers_its_path() {
        let mut scene = scene_with_base(100, 100);
        let id = scene.alloc_id();
        scene.shapes.push(Shape {
            id,
            kind: ShapeKind::Line,
            start: Point::new(10.0, 50.0),
            end: Point::new(90.0, 50.0),
            color: RED,
            stroke_width: 4.0,
            filled: false,
        });

        let mut compositor = Compositor::new();
        let frame = compositor.render(&scene, &DecodeCache::new());

        assert_eq!(*frame.get_pixel(50, 50), RED);
        assert_eq!(*frame.get_pixel(50, 20), GRAY);
    }

    #[test]
    fn test_selection_overlay_draws_handles() {
        let mut scene = scene_with_base(200, 200);
        let id = push_fragment(&mut scene, 50.0, 50.0, 60.0, 60.0);
        scene.selection = Some(id);

        let mut cache = DecodeCache::new();
        cache.insert_decoded(id, RgbaImage::from_pixel(10, 10, GREEN));

        let mut compositor = Compositor::new();
        let frame = compositor.render(&scene, &cache);

        // A handle square is centered on each corner of the fragment
        assert_eq!(*frame.get_pixel(50, 50), SELECTION_COLOR);
        assert_eq!(*frame.get_pixel(110, 110), SELECTION_COLOR);
    }

    #[test]
    fn test_marquee_outline_only_during_interaction() {
        let mut scene = scene_with_base(200, 200);
        scene.interaction = Interaction::MarqueeSelecting {
            start: Point::new(20.0, 20.0),
            current: Point::new(120.0, 120.0),
        };

        let mut compositor = Compositor::new();
        let with_marquee = compositor.render(&scene, &DecodeCache::new());

        scene.interaction = Interaction::None;
        let without_marquee = compositor.render(&scene, &DecodeCache::new());

        // The dash starts at the top-left corner of the marquee
        assert_eq!(*with_marquee.get_pixel(21, 20), SELECTION_COLOR);
        assert_eq!(*without_marquee.get_pixel(21, 20), GRAY);
    }

    #[test]
    fn test_extract_region_cuts_composite_pixels() {
        let mut scene = scene_with_base(200, 200);
        let id = push_fragment(&mut scene, 20.0, 20.0, 50.0, 50.0);

        let mut cache = DecodeCache::new();
        cache.insert_decoded(id, RgbaImage::from_pixel(10, 10, GREEN));

        let mut compositor = Compositor::new();
        let frame = compositor.render(&scene, &cache);

        // The extracted region bakes the pasted fragment in as pixels
        let region = Compositor::extract_region(&frame, Rect::new(10.0, 10.0, 30.0, 30.0))
            .expect("region inside frame");
        assert_eq!((region.width(), region.height()), (30, 30));
        assert_eq!(*region.get_pixel(0, 0), GRAY);
        assert_eq!(*region.get_pixel(15, 15), GREEN);
    }

    #[test]
    fn test_extract_region_clamps_to_frame() {
        let frame = RgbaImage::from_pixel(100, 100, GRAY);

        let clipped = Compositor::extract_region(&frame, Rect::new(80.0, 80.0, 50.0, 50.0))
            .expect("partially inside");
        assert_eq!((clipped.width(), clipped.height()), (20, 20));

        assert!(Compositor::extract_region(&frame, Rect::new(200.0, 200.0, 10.0, 10.0)).is_none());
        assert!(Compositor::extract_region(&frame, Rect::new(10.0, 10.0, 0.0, 0.0)).is_none());
    }
}
