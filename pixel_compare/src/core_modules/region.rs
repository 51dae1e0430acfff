// THEORY:
// A `Region` is the spatial summary of one difference: the axis-aligned box around
// a connected patch of the mask. Like the blob it descends from, it is a plain
// value. It holds no reference to the mask or the images, so regions can be
// merged, sorted, clamped and drawn freely.
//
// Edges are stored as top-left plus extent. `right()`/`bottom()` are exclusive,
// which makes "touching" boxes (one's right edge equals the other's left edge)
// come out at distance 0.

#[cfg(feature = "serde")]
use serde::Serialize;

/// An integer rectangle with non-zero extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Returns `None` for an empty rectangle.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { x, y, width, height })
    }

    /// The box spanning two inclusive corner coordinates.
    pub fn from_corners(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    /// Bounding-box area, which is what the minimum-area filter compares against.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Region) -> Region {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Region {
            x,
            y,
            width: (right - x as u64) as u32,
            height: (bottom - y as u64) as u32,
        }
    }

    /// Euclidean distance between the closest edges; 0 when overlapping or touching.
    pub fn distance_to(&self, other: &Region) -> f64 {
        let gap_x = gap(self.x as u64, self.right(), other.x as u64, other.right());
        let gap_y = gap(self.y as u64, self.bottom(), other.y as u64, other.bottom());
        ((gap_x * gap_x + gap_y * gap_y) as f64).sqrt()
    }

    pub fn contains(&self, other: &Region) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && self.right() >= other.right()
            && self.bottom() >= other.bottom()
    }

    /// The part of the region inside a `width x height` image, if any.
    pub fn clamped_to(&self, width: u32, height: u32) -> Option<Region> {
        let right = self.right().min(width as u64);
        let bottom = self.bottom().min(height as u64);
        if self.x as u64 >= right || self.y as u64 >= bottom {
            return None;
        }
        Region::new(
            self.x,
            self.y,
            (right - self.x as u64) as u32,
            (bottom - self.y as u64) as u32,
        )
    }
}

/// Empty space between two half-open intervals on one axis.
fn gap(a_start: u64, a_end: u64, b_start: u64, b_end: u64) -> u64 {
    if a_end <= b_start {
        b_start - a_end
    } else if b_end <= a_start {
        a_start - b_end
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: u32, y: u32, w: u32, h: u32) -> Region {
        Region::new(x, y, w, h).unwrap()
    }

    #[test]
    fn zero_extent_is_rejected() {
        assert!(Region::new(1, 1, 0, 5).is_none());
        assert!(Region::new(1, 1, 5, 0).is_none());
    }

    #[test]
    fn corners_are_inclusive() {
        assert_eq!(Region::from_corners(3, 4, 3, 4), r(3, 4, 1, 1));
        assert_eq!(Region::from_corners(0, 0, 9, 4).area(), 50);
    }

    #[test]
    fn overlapping_and_touching_are_zero_distance() {
        assert_eq!(r(0, 0, 10, 10).distance_to(&r(5, 5, 10, 10)), 0.0);
        assert_eq!(r(0, 0, 10, 10).distance_to(&r(10, 0, 4, 4)), 0.0);
        assert_eq!(r(0, 0, 10, 10).distance_to(&r(10, 10, 4, 4)), 0.0);
    }

    #[test]
    fn separated_boxes_measure_edge_gap() {
        assert_eq!(r(0, 0, 10, 10).distance_to(&r(15, 0, 5, 5)), 5.0);
        assert_eq!(r(0, 20, 10, 10).distance_to(&r(0, 0, 5, 5)), 15.0);
        assert_eq!(r(0, 0, 1, 1).distance_to(&r(4, 5, 1, 1)), 5.0);
        let a = r(3, 3, 2, 2);
        let b = r(20, 30, 2, 2);
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
    }

    #[test]
    fn union_covers_both() {
        let a = r(2, 8, 3, 3);
        let b = r(10, 1, 5, 2);
        let u = a.union(&b);
        assert_eq!(u, r(2, 1, 13, 10));
        assert!(u.contains(&a) && u.contains(&b));
    }

    #[test]
    fn clamping_trims_to_image() {
        assert_eq!(r(45, 45, 10, 10).clamped_to(50, 50), Some(r(45, 45, 5, 5)));
        assert_eq!(r(50, 0, 3, 3).clamped_to(50, 50), None);
        assert_eq!(r(1, 1, 3, 3).clamped_to(50, 50), Some(r(1, 1, 3, 3)));
    }
}
