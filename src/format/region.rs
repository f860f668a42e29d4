//! Rectangular plane regions
//!
//! A region selects a rectangle of pixels within one plane. Coordinates are
//! in pixels with (0,0) at the top-left corner.

use std::fmt;

/// Region of a plane (in pixel coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// X-coordinate of the top-left corner (pixels from left)
    pub x: usize,

    /// Y-coordinate of the top-left corner (pixels from top)
    pub y: usize,

    /// Width of the region in pixels
    pub width: usize,

    /// Height of the region in pixels
    pub height: usize,
}

impl Region {
    /// Create a new region
    ///
    /// # Arguments
    /// * `x` - X-coordinate of the top-left corner
    /// * `y` - Y-coordinate of the top-left corner
    /// * `width` - Width of the region in pixels
    /// * `height` - Height of the region in pixels
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Region { x, y, width, height }
    }

    /// The region covering a whole plane
    pub fn full(size_x: usize, size_y: usize) -> Self {
        Region::new(0, 0, size_x, size_y)
    }

    /// X-coordinate immediately right of the region
    pub fn end_x(&self) -> usize {
        self.x + self.width
    }

    /// Y-coordinate immediately below the region
    pub fn end_y(&self) -> usize {
        self.y + self.height
    }

    /// Number of pixels in the region
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Whether the region has no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the region lies entirely within a plane of the given size
    pub fn fits_within(&self, size_x: usize, size_y: usize) -> bool {
        match (self.x.checked_add(self.width), self.y.checked_add(self.height)) {
            (Some(end_x), Some(end_y)) => end_x <= size_x && end_y <= size_y,
            _ => false,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}
