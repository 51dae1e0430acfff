// THEORY:
// Anti-aliased edges and sub-pixel shifts leave scattered single-pixel
// differences. Dilation grows every flagged cell into a (2r+1)x(2r+1) square so
// neighbouring specks fuse into one blob before region extraction.
//
// A square structuring element is separable: dilating rows and then columns
// gives exactly the Chebyshev-radius result. Each pass keeps a running count of
// flagged cells inside the window, so the cost is O(w*h) for any radius.

use crate::core_modules::difference_mask::DifferenceMask;

/// Marks every cell within Chebyshev distance `radius` of a flagged cell.
pub fn dilate(mask: &DifferenceMask, radius: u32) -> DifferenceMask {
    let (width, height) = mask.dimensions();
    if radius == 0 || mask.is_empty() {
        return mask.clone();
    }
    let w = width as usize;
    let h = height as usize;
    let r = radius as usize;

    let horizontal = dilate_lines(mask.cells(), h, w, 1, w, r);
    let vertical = dilate_lines(&horizontal, w, h, w, 1, r);

    // Lengths are preserved by both passes.
    DifferenceMask::from_cells(width, height, vertical).unwrap_or_else(|| mask.clone())
}

/// One 1-D dilation pass over `lines` independent lines of `len` cells.
/// `stride` steps along a line, `line_step` moves to the next line.
fn dilate_lines(
    cells: &[bool],
    lines: usize,
    len: usize,
    stride: usize,
    line_step: usize,
    radius: usize,
) -> Vec<bool> {
    let mut out = vec![false; cells.len()];
    for line in 0..lines {
        let base = line * line_step;
        let at = |i: usize| cells[base + i * stride];

        // Flagged cells within [i - radius, i + radius].
        let mut in_window = (0..len.min(radius + 1)).filter(|&i| at(i)).count();
        for i in 0..len {
            out[base + i * stride] = in_window > 0;

            let entering = i + radius + 1;
            if entering < len && at(entering) {
                in_window += 1;
            }
            if i >= radius && at(i - radius) {
                in_window -= 1;
            }
        }
    }
    out
}
