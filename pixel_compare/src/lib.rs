// THEORY:
// This file is the entry point of the `pixel_compare` library crate. It exposes
// two high-level interfaces and keeps the pixel layers underneath them public
// but secondary:
//
// - `ComparisonPipeline` compares one pair of images and returns a
//   `ComparisonResult` (success with artifacts, size mismatch, or failure).
// - `BatchScheduler` runs many pairs with a bounded number in flight and
//   reports progress as they finish.
//
// The `core_modules` are the layers in pipeline order: raster loading, the
// difference mask, dilation, region extraction, region merging and annotation.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod manifest;
pub mod parallel_pipeline;
pub mod pipeline;

pub use config::{AnnotationStyle, CompareConfig};
pub use core_modules::raster::RasterImage;
pub use core_modules::region::Region;
pub use core_modules::region_merger::MergeStrategy;
pub use error::{CompareError, Result};
pub use parallel_pipeline::{BatchEntry, BatchProgress, BatchScheduler, PairComparator};
pub use pipeline::{ComparisonItem, ComparisonPipeline, ComparisonReport, ComparisonResult, SizeInfo};
