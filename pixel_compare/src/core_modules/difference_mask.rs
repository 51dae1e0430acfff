// THEORY:
// The `DifferenceMask` is the first analytical layer. It answers a single yes/no
// question per pixel position: did the brightness change by more than the
// threshold between image A and image B?
//
// Key principles:
// 1.  **Intensity Proxy**: Pixels are compared on a BT.709 grayscale intensity,
//     the same luma weights an image library's grayscale filter applies before
//     reading one channel back. Colour shifts with identical luma go unnoticed;
//     that is accepted behaviour and changing it would move every percentage.
// 2.  **Same-Shape Contract**: A mask always has the dimensions of the images it
//     came from. `build` refuses mismatched inputs instead of guessing.
// 3.  **Dumb Output**: The mask is a flat `Vec<bool>` with no knowledge of
//     regions. Dilation and region extraction are separate layers.

use crate::core_modules::raster::RasterImage;

pub type Intensity = u8;

const LUMA_RED: f32 = 0.2126;
const LUMA_GREEN: f32 = 0.7152;
const LUMA_BLUE: f32 = 0.0722;

/// Grayscale intensity of an RGBA pixel (alpha ignored).
#[inline]
pub fn gray_intensity(pixel: [u8; 4]) -> Intensity {
    let luma = LUMA_RED * pixel[0] as f32 + LUMA_GREEN * pixel[1] as f32 + LUMA_BLUE * pixel[2] as f32;
    luma.round().clamp(0.0, 255.0) as Intensity
}

/// One boolean per pixel, row-major, flagging positions that differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferenceMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl DifferenceMask {
    /// Compares two equally sized images. Returns `None` when their dimensions differ.
    pub fn build(a: &RasterImage, b: &RasterImage, threshold: u8) -> Option<Self> {
        if a.dimensions() != b.dimensions() {
            return None;
        }
        let (width, height) = a.dimensions();
        let threshold = threshold as i16;

        let cells = a
            .as_rgba()
            .pixels()
            .zip(b.as_rgba().pixels())
            .map(|(pa, pb)| {
                let delta = gray_intensity(pa.0) as i16 - gray_intensity(pb.0) as i16;
                delta.abs() > threshold
            })
            .collect();

        Some(Self { width, height, cells })
    }

    /// Builds a mask by evaluating `f` at every position.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self { width, height, cells }
    }

    /// Wraps row-major cells. Returns `None` if the length does not match.
    pub fn from_cells(width: u32, height: u32, cells: Vec<bool>) -> Option<Self> {
        (cells.len() == width as usize * height as usize).then_some(Self { width, height, cells })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.cells[self.index(x, y)]
    }

    /// Number of flagged cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// True when no cell is flagged.
    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Share of flagged cells as a percentage of all cells. Empty masks report 0.
    pub fn percentage(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.count() as f64 * 100.0 / self.cells.len() as f64
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
