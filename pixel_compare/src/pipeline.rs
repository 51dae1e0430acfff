// THEORY:
// The `pipeline` module is the top-level API for a single image pair. It runs the
// layers in a fixed order (mask, dilation, extraction, merge, annotation) and
// hands back one `ComparisonResult`.
//
// It is a small state machine:
//   Start -> inputs present and decodable? -- no --> Failed
//         -> same dimensions?              -- no --> SizeMismatch
//         -> pixel work + artifacts        -- err -> Failed
//                                          -- ok --> Succeeded
//
// Nothing escapes `compare` as an error. A failing pair becomes a `Failed`
// result with a readable reason so a batch can keep going. Packaging is
// all-or-nothing: if any artifact cannot be written the pair is `Failed` even
// though its percentage was known.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::RgbaImage;
#[cfg(feature = "serde")]
use serde::Serialize;

use crate::config::CompareConfig;
use crate::core_modules::annotator::{annotate, render_difference};
use crate::core_modules::difference_mask::DifferenceMask;
use crate::core_modules::dilation::dilate;
use crate::core_modules::raster::RasterImage;
use crate::core_modules::region::Region;
use crate::core_modules::region_extractor::extract_regions;
use crate::core_modules::region_merger::merge_regions;
use crate::core_modules::utils::image_helper;
use crate::error::Result;

/// One unit of work: a row identifier and the two images to compare.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ComparisonItem {
    /// Used only to label artifacts and messages.
    pub row_index: u32,
    pub image1_path: PathBuf,
    pub image2_path: PathBuf,
}

impl ComparisonItem {
    pub fn new(row_index: u32, image1_path: impl Into<PathBuf>, image2_path: impl Into<PathBuf>) -> Self {
        Self {
            row_index,
            image1_path: image1_path.into(),
            image2_path: image2_path.into(),
        }
    }
}

/// Dimensions of both images of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SizeInfo {
    pub image1: (u32, u32),
    pub image2: (u32, u32),
}

impl SizeInfo {
    pub fn of(a: &RasterImage, b: &RasterImage) -> Self {
        Self {
            image1: a.dimensions(),
            image2: b.dimensions(),
        }
    }

    pub fn is_match(&self) -> bool {
        self.image1 == self.image2
    }
}

impl fmt::Display for SizeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "image 1: {}x{}, image 2: {}x{}",
            self.image1.0, self.image1.1, self.image2.0, self.image2.1
        )
    }
}

/// Everything a successful comparison produced. Artifact files belong to the caller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ComparisonReport {
    /// Share of pixels (undilated mask) that differ, 0-100.
    pub difference_percentage: f64,
    pub region_count: usize,
    pub regions: Vec<Region>,
    pub diff_visualization_image: PathBuf,
    pub annotated_image1: PathBuf,
    pub annotated_image2: PathBuf,
    pub size_info: SizeInfo,
}

/// The outcome for one pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
pub enum ComparisonResult {
    /// The images have different dimensions; no pixel work was done.
    SizeMismatch { size_info: SizeInfo },
    /// An input was missing or unreadable, or an artifact could not be written.
    Failed { error_message: String },
    Succeeded(ComparisonReport),
}

impl ComparisonResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ComparisonResult::Succeeded(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ComparisonResult::Failed { .. })
    }

    pub fn difference_percentage(&self) -> Option<f64> {
        match self {
            ComparisonResult::Succeeded(report) => Some(report.difference_percentage),
            _ => None,
        }
    }

    /// Short human-readable status for a results list.
    pub fn status_label(&self) -> String {
        match self {
            ComparisonResult::Succeeded(report) => format!(
                "{:.2}% different, {} region(s)",
                report.difference_percentage, report.region_count
            ),
            ComparisonResult::SizeMismatch { size_info } => format!("size mismatch ({size_info})"),
            ComparisonResult::Failed { error_message } => format!("failed: {error_message}"),
        }
    }
}

/// In-memory result of comparing two equally sized rasters.
#[derive(Debug, Clone)]
pub struct PairAnalysis {
    pub difference_percentage: f64,
    pub different_pixels: usize,
    pub regions: Vec<Region>,
    pub diff_visualization: RgbaImage,
    pub annotated_image1: RgbaImage,
    pub annotated_image2: RgbaImage,
}

/// Runs mask -> dilation -> extraction -> merge -> annotation on two decoded images.
///
/// Returns the size information instead when the dimensions differ; no pixel is read then.
pub fn analyze_pair(a: &RasterImage, b: &RasterImage, config: &CompareConfig) -> std::result::Result<PairAnalysis, SizeInfo> {
    let size_info = SizeInfo::of(a, b);
    let Some(mask) = DifferenceMask::build(a, b, config.threshold) else {
        return Err(size_info);
    };
    let started = Instant::now();

    let different_pixels = mask.count();
    let difference_percentage = mask.percentage();

    let dilated = dilate(&mask, config.expand_pixels);
    let raw_regions = extract_regions(&dilated, config.min_area);
    let regions = merge_regions(&raw_regions, config.merge_distance, config.merge_strategy);

    log::debug!(
        "{} differing pixels, {} raw region(s), {} after merge ({:?})",
        different_pixels,
        raw_regions.len(),
        regions.len(),
        started.elapsed()
    );

    Ok(PairAnalysis {
        difference_percentage,
        different_pixels,
        diff_visualization: render_difference(a, b, &mask),
        annotated_image1: annotate(a, &regions, &config.annotation),
        annotated_image2: annotate(b, &regions, &config.annotation),
        regions,
    })
}

/// Compares image files and writes the rendered artifacts to one directory.
#[derive(Debug, Clone)]
pub struct ComparisonPipeline {
    config: CompareConfig,
    artifact_dir: PathBuf,
}

impl ComparisonPipeline {
    /// Validates `config`; artifacts go to the default temp sub-directory.
    pub fn new(config: CompareConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            artifact_dir: image_helper::default_artifact_dir(),
        })
    }

    pub fn with_artifact_dir(mut self, artifact_dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = artifact_dir.into();
        self
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }

    /// Compares one pair. Never fails; errors become `ComparisonResult::Failed`.
    pub fn compare(&self, item: &ComparisonItem) -> ComparisonResult {
        let row = item.row_index;
        let result = self.try_compare(item).unwrap_or_else(|error| ComparisonResult::Failed {
            error_message: error.to_string(),
        });

        match &result {
            ComparisonResult::Succeeded(report) => log::info!(
                "row {}: compared, difference {:.2}%, {} region(s)",
                row,
                report.difference_percentage,
                report.region_count
            ),
            ComparisonResult::SizeMismatch { size_info } => {
                log::info!("row {}: image sizes differ - {}", row, size_info)
            }
            ComparisonResult::Failed { error_message } => {
                log::warn!("row {}: comparison failed: {}", row, error_message)
            }
        }
        result
    }

    fn try_compare(&self, item: &ComparisonItem) -> Result<ComparisonResult> {
        let image1 = RasterImage::open(&item.image1_path)?;
        let image2 = RasterImage::open(&item.image2_path)?;

        let analysis = match analyze_pair(&image1, &image2, &self.config) {
            Ok(analysis) => analysis,
            Err(size_info) => return Ok(ComparisonResult::SizeMismatch { size_info }),
        };

        let size_info = SizeInfo::of(&image1, &image2);
        self.package(item.row_index, analysis, size_info)
    }

    /// Writes the three artifacts; any failure fails the whole pair.
    fn package(&self, row_index: u32, analysis: PairAnalysis, size_info: SizeInfo) -> Result<ComparisonResult> {
        image_helper::ensure_dir(&self.artifact_dir)?;
        let suffix = image_helper::unique_suffix();

        let diff_path = image_helper::artifact_path(&self.artifact_dir, "diff", row_index, &suffix);
        let marked1_path = image_helper::artifact_path(&self.artifact_dir, "marked1", row_index, &suffix);
        let marked2_path = image_helper::artifact_path(&self.artifact_dir, "marked2", row_index, &suffix);

        image_helper::save_all(&[
            (diff_path.as_path(), &analysis.diff_visualization),
            (marked1_path.as_path(), &analysis.annotated_image1),
            (marked2_path.as_path(), &analysis.annotated_image2),
        ])?;

        Ok(ComparisonResult::Succeeded(ComparisonReport {
            difference_percentage: analysis.difference_percentage,
            region_count: analysis.regions.len(),
            regions: analysis.regions,
            diff_visualization_image: diff_path,
            annotated_image1: marked1_path,
            annotated_image2: marked2_path,
            size_info,
        }))
    }
}
