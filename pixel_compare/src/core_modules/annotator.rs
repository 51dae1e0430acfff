// THEORY:
// The annotator is the presentation end of the engine. It never edits a source
// raster; it draws on a fresh canvas from `RasterImage::to_canvas`.
//
// It produces two kinds of output:
// 1.  **Annotated copies**: each region outlined with a fixed-width stroke and
//     numbered (1-based, in list order) with a small bitmap label.
// 2.  **Difference visualization**: a copy of the first image where every flagged
//     cell of the undilated mask is replaced by the per-channel absolute
//     difference, amplified x3 so faint changes become visible.
//
// Label placement is closed-form. The label width is estimated from the
// character count alone. It prefers the left side of the box's top edge, falls
// back to the right side, and if neither fits it clamps into the image.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::config::{AnnotationStyle, MAX_LABEL_SCALE};
use crate::core_modules::difference_mask::DifferenceMask;
use crate::core_modules::digit_glyphs::{self, GLYPH_ADVANCE, GLYPH_HEIGHT};
use crate::core_modules::raster::RasterImage;
use crate::core_modules::region::Region;

/// Space between a rectangle and its label.
pub const LABEL_GAP: u32 = 2;
/// Channel difference amplification in the difference visualization.
pub const DIFF_GAIN: u16 = 3;

/// Top-left corner of a label, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPosition {
    pub x: u32,
    pub y: u32,
}

/// Estimated label width: character count times the per-character advance.
pub fn label_width(text_len: usize, scale: u32) -> u32 {
    (text_len as u32).saturating_mul(GLYPH_ADVANCE).saturating_mul(scale)
}

pub fn label_height(scale: u32) -> u32 {
    GLYPH_HEIGHT.saturating_mul(scale)
}

/// Where to put a `text_len`-character label for `region` in a `width x height` image.
pub fn place_label(region: &Region, text_len: usize, scale: u32, width: u32, height: u32) -> LabelPosition {
    let label_w = label_width(text_len, scale) as i64;
    let label_h = label_height(scale) as i64;

    let left = region.x as i64 - LABEL_GAP as i64 - label_w;
    let right = region.right() as i64 + LABEL_GAP as i64;

    let x = if left >= 0 {
        left
    } else if right + label_w <= width as i64 {
        right
    } else {
        // Best effort: the left position pulled back inside the image.
        left.clamp(0, (width as i64 - label_w).max(0))
    };
    let y = (region.y as i64).clamp(0, (height as i64 - label_h).max(0));

    LabelPosition {
        x: x as u32,
        y: y as u32,
    }
}

/// A copy of `image` with every region outlined and numbered.
pub fn annotate(image: &RasterImage, regions: &[Region], style: &AnnotationStyle) -> RgbaImage {
    let mut canvas = image.to_canvas();
    let (width, height) = canvas.dimensions();
    let color = Rgba(style.color);
    let scale = style.label_scale.clamp(1, MAX_LABEL_SCALE);

    for (index, region) in regions.iter().enumerate() {
        let Some(visible) = region.clamped_to(width, height) else {
            continue;
        };
        draw_outline(&mut canvas, &visible, style.stroke_width, color);

        let label = (index + 1).to_string();
        let position = place_label(&visible, label.len(), scale, width, height);
        draw_label(&mut canvas, &label, position, scale, color);
    }

    canvas
}

/// A copy of `a` with flagged cells replaced by the amplified channel difference.
///
/// `a`, `b` and `mask` must share dimensions; the orchestrator guarantees it.
pub fn render_difference(a: &RasterImage, b: &RasterImage, mask: &DifferenceMask) -> RgbaImage {
    let mut canvas = a.to_canvas();
    let (width, height) = mask.dimensions();

    for y in 0..height {
        for x in 0..width {
            if !mask.get(x, y) {
                continue;
            }
            let pa = a.pixel(x, y);
            let pb = b.pixel(x, y);
            let amplify = |c: usize| (pa[c].abs_diff(pb[c]) as u16 * DIFF_GAIN).min(255) as u8;
            canvas.put_pixel(x, y, Rgba([amplify(0), amplify(1), amplify(2), 255]));
        }
    }

    canvas
}

/// Draws `stroke` nested one-pixel outlines from the region's edge inward.
fn draw_outline(canvas: &mut RgbaImage, region: &Region, stroke: u32, color: Rgba<u8>) {
    for inset in 0..stroke {
        if region.width <= inset * 2 || region.height <= inset * 2 {
            break;
        }
        let rect = Rect::at((region.x + inset) as i32, (region.y + inset) as i32)
            .of_size(region.width - inset * 2, region.height - inset * 2);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

fn draw_label(canvas: &mut RgbaImage, text: &str, position: LabelPosition, scale: u32, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    let advance = GLYPH_ADVANCE.saturating_mul(scale);
    for (i, ch) in text.chars().enumerate() {
        let origin_x = position.x.saturating_add((i as u32).saturating_mul(advance));
        if origin_x >= width {
            break;
        }
        for (col, row) in digit_glyphs::lit_cells(ch) {
            let x = origin_x.saturating_add(col * scale);
            let y = position.y.saturating_add(row * scale);
            if x >= width || y >= height {
                continue;
            }
            // imageproc clips cells that run past the canvas edge
            draw_filled_rect_mut(canvas, Rect::at(x as i32, y as i32).of_size(scale, scale), color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const RED: [u8; 4] = [255, 0, 0, 255];

    fn r(x: u32, y: u32, w: u32, h: u32) -> Region {
        Region::new(x, y, w, h).unwrap()
    }

    #[test]
    fn label_prefers_left_of_top_edge() {
        // "1" at scale 2 is 8 wide; 40 - 2 - 8 = 30
        let position = place_label(&r(40, 20, 10, 10), 1, 2, 100, 100);
        assert_eq!(position, LabelPosition { x: 30, y: 20 });
    }

    #[test]
    fn label_moves_right_near_left_border() {
        let position = place_label(&r(3, 20, 10, 10), 1, 2, 100, 100);
        assert_eq!(position, LabelPosition { x: 15, y: 20 });
    }

    #[test]
    fn label_clamps_when_neither_side_fits() {
        // 3 chars at scale 2 = 24 wide, box spans almost the whole image
        let position = place_label(&r(5, 0, 30, 10), 3, 2, 40, 40);
        assert_eq!(position, LabelPosition { x: 0, y: 0 });
    }

    #[test]
    fn label_stays_inside_vertically() {
        let position = place_label(&r(40, 97, 3, 3), 1, 2, 100, 100);
        assert_eq!(position.y, 90);
    }

    #[test]
    fn label_in_tiny_image_is_pinned_to_origin() {
        let position = place_label(&r(0, 0, 2, 2), 2, 2, 4, 4);
        assert_eq!(position, LabelPosition { x: 0, y: 0 });
    }

    #[test]
    fn annotate_leaves_source_untouched() {
        let source = RasterImage::filled(60, 60, WHITE);
        let annotated = annotate(&source, &[r(20, 20, 10, 10)], &AnnotationStyle::default());
        assert_eq!(source.pixel(20, 20), WHITE);
        assert_eq!(annotated.get_pixel(20, 20).0, RED);
    }

    #[test]
    fn outline_is_two_pixels_wide() {
        let source = RasterImage::filled(60, 60, WHITE);
        let annotated = annotate(&source, &[r(20, 20, 10, 10)], &AnnotationStyle::default());
        assert_eq!(annotated.get_pixel(25, 20).0, RED);
        assert_eq!(annotated.get_pixel(25, 21).0, RED);
        assert_eq!(annotated.get_pixel(25, 22).0, WHITE);
        assert_eq!(annotated.get_pixel(29, 25).0, RED);
        assert_eq!(annotated.get_pixel(28, 25).0, RED);
        assert_eq!(annotated.get_pixel(27, 25).0, WHITE);
        assert_eq!(annotated.get_pixel(25, 25).0, WHITE);
    }

    #[test]
    fn label_is_drawn_left_of_box() {
        let source = RasterImage::filled(60, 60, WHITE);
        let annotated = annotate(&source, &[r(20, 20, 10, 10)], &AnnotationStyle::default());
        // "1" at x = 20 - 2 - 8 = 10, its top-middle cell spans x 12..14
        assert_eq!(annotated.get_pixel(12, 20).0, RED);
        assert_eq!(annotated.get_pixel(10, 20).0, WHITE);
    }

    #[test]
    fn regions_outside_image_are_skipped() {
        let source = RasterImage::filled(10, 10, WHITE);
        let annotated = annotate(&source, &[r(10, 10, 5, 5)], &AnnotationStyle::default());
        assert_eq!(annotated, source.to_canvas());
    }

    #[test]
    fn oversized_label_scale_does_not_overflow() {
        let source = RasterImage::filled(40, 40, WHITE);
        let style = AnnotationStyle {
            label_scale: u32::MAX,
            ..AnnotationStyle::default()
        };
        let annotated = annotate(&source, &[r(10, 10, 5, 5)], &style);
        assert_eq!(annotated.get_pixel(10, 10).0, RED);
        assert_eq!(label_width(3, u32::MAX), u32::MAX);
    }

    #[test]
    fn difference_is_amplified_and_opaque() {
        let a = RasterImage::filled(2, 1, [100, 100, 100, 40]);
        let b = RasterImage::from_fn(2, 1, |x, _| if x == 0 { [120, 10, 100, 40] } else { [100, 100, 100, 40] });
        let mask = DifferenceMask::from_fn(2, 1, |x, _| x == 0);
        let diff = render_difference(&a, &b, &mask);
        assert_eq!(diff.get_pixel(0, 0).0, [60, 255, 0, 255]);
        // unflagged cells keep image A's pixel
        assert_eq!(diff.get_pixel(1, 0).0, [100, 100, 100, 40]);
    }
}
