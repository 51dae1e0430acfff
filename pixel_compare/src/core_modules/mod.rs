pub mod annotator;
pub mod difference_mask;
pub mod digit_glyphs;
pub mod dilation;
pub mod raster;
pub mod region;
pub mod region_extractor;
pub mod region_merger;
pub mod utils;
