use crate::core_modules::region_merger::MergeStrategy;
use crate::error::{CompareError, Result};

/// Grayscale difference above which a pixel counts as changed (0-255 scale).
pub const DEFAULT_THRESHOLD: u8 = 30;
/// Smallest bounding-box area (width x height) a region must have to be reported.
pub const DEFAULT_MIN_AREA: u32 = 50;
/// Chebyshev radius used to bridge nearby differing pixels.
pub const DEFAULT_EXPAND_PIXELS: u32 = 3;
/// Regions closer than this (in pixels) are merged into one box.
pub const DEFAULT_MERGE_DISTANCE: u32 = 10;
/// Number of comparisons allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 5;

pub const DEFAULT_ANNOTATION_COLOR: [u8; 4] = [255, 0, 0, 255];
pub const DEFAULT_STROKE_WIDTH: u32 = 2;
pub const DEFAULT_LABEL_SCALE: u32 = 2;
/// Largest label scale accepted; one glyph cell is `scale` pixels square.
pub const MAX_LABEL_SCALE: u32 = 64;

/// How regions are outlined and numbered on the annotated copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationStyle {
    /// RGBA colour of outlines and labels.
    pub color: [u8; 4],
    /// Outline thickness in pixels, drawn inward from the region's edge.
    pub stroke_width: u32,
    /// Integer upscale applied to the 3x5 digit glyphs.
    pub label_scale: u32,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_ANNOTATION_COLOR,
            stroke_width: DEFAULT_STROKE_WIDTH,
            label_scale: DEFAULT_LABEL_SCALE,
        }
    }
}

/// Tunables for a comparison run. Every constant the engine uses lives here.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    pub threshold: u8,
    pub min_area: u32,
    pub expand_pixels: u32,
    pub merge_distance: u32,
    pub merge_strategy: MergeStrategy,
    /// Size of the batch scheduler's admission gate.
    pub concurrency: usize,
    pub annotation: AnnotationStyle,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_area: DEFAULT_MIN_AREA,
            expand_pixels: DEFAULT_EXPAND_PIXELS,
            merge_distance: DEFAULT_MERGE_DISTANCE,
            merge_strategy: MergeStrategy::default(),
            concurrency: DEFAULT_CONCURRENCY,
            annotation: AnnotationStyle::default(),
        }
    }
}

impl CompareConfig {
    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(CompareError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.annotation.stroke_width == 0 {
            return Err(CompareError::InvalidConfig(
                "stroke width must be at least 1 pixel".to_string(),
            ));
        }
        if self.annotation.label_scale == 0 || self.annotation.label_scale > MAX_LABEL_SCALE {
            return Err(CompareError::InvalidConfig(format!(
                "label scale must be between 1 and {MAX_LABEL_SCALE}"
            )));
        }
        Ok(())
    }
}
