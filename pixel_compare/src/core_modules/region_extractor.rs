// THEORY:
// The region extractor is the spatial grouping layer. It turns the (dilated)
// difference mask into a short list of rectangles a person can look at.
//
// Algorithm:
// 1.  **Raster Scan Seeding**: Cells are visited top-to-bottom, left-to-right.
//     The first unvisited flagged cell found starts a new component, so the
//     output order is discovery order, not any spatial sort.
// 2.  **Breadth-First Fill**: From the seed, the fill expands through the four
//     direct neighbours (no diagonals) while tracking min/max x and y. A shared
//     `visited` grid guarantees each cell joins at most one component.
// 3.  **Area Filter**: A component is kept only if its bounding box, not its
//     pixel count, covers at least `min_area` cells. Isolated specks vanish
//     unless `min_area <= 1`.
// 4.  **Stateless Utility**: No memory between calls; one mask in, regions out.

use std::collections::VecDeque;

use crate::core_modules::difference_mask::DifferenceMask;
use crate::core_modules::region::Region;

/// Bounding boxes of the 4-connected components whose box area is at least `min_area`.
pub fn extract_regions(mask: &DifferenceMask, min_area: u32) -> Vec<Region> {
    let (width, height) = mask.dimensions();
    let mut visited = vec![false; width as usize * height as usize];
    let mut regions = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let index = y as usize * width as usize + x as usize;
            if !mask.get(x, y) || visited[index] {
                continue;
            }

            let region = fill_component(mask, &mut visited, x, y);
            if region.area() >= min_area as u64 {
                regions.push(region);
            } else {
                log::trace!("dropping component {:?} below min area {}", region, min_area);
            }
        }
    }

    regions
}

/// Breadth-first flood fill from a seed cell, returning the component's bounding box.
fn fill_component(mask: &DifferenceMask, visited: &mut [bool], seed_x: u32, seed_y: u32) -> Region {
    let (width, height) = mask.dimensions();
    let w = width as usize;

    let mut min_x = seed_x;
    let mut max_x = seed_x;
    let mut min_y = seed_y;
    let mut max_y = seed_y;

    let mut queue = VecDeque::from([(seed_x, seed_y)]);
    visited[seed_y as usize * w + seed_x as usize] = true;

    while let Some((x, y)) = queue.pop_front() {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);

        // Check all 4 direct neighbors (not diagonals).
        for (dx, dy) in [(0i64, 1i64), (0, -1), (1, 0), (-1, 0)] {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            let index = ny as usize * w + nx as usize;
            if mask.get(nx, ny) && !visited[index] {
                visited[index] = true;
                queue.push_back((nx, ny));
            }
        }
    }

    Region::from_corners(min_x, min_y, max_x, max_y)
}
