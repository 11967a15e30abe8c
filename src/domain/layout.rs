// Grid geometry: cell rectangles and first-fit placement
use serde::{Deserialize, Serialize};

/// Largest coordinate or extent a stored rect may carry.
pub const MAX_GRID_EXTENT: u32 = 1024;

/// Grid-cell position and size, in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

/// Width and height in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn at(self, x: u32, y: u32) -> Rect {
        Rect::new(x, y, self.w, self.h)
    }
}

impl Rect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// Pull every coordinate and extent down to [`MAX_GRID_EXTENT`].
    pub fn bounded(self) -> Self {
        Self {
            x: self.x.min(MAX_GRID_EXTENT),
            y: self.y.min(MAX_GRID_EXTENT),
            w: self.w.min(MAX_GRID_EXTENT),
            h: self.h.min(MAX_GRID_EXTENT),
        }
    }

    /// Grow `w`/`h` up to `min` where they fall short.
    pub fn clamp_to_min(self, min: Size) -> Self {
        Self {
            w: self.w.max(min.w),
            h: self.h.max(min.h),
            ..self
        }
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Bounded search area for first-fit placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub columns: u32,
    pub rows: u32,
}

/// Find the first cell, scanning rows top to bottom and columns left to right,
/// where a widget of `size` fits without touching any `occupied` rect.
/// Returns `None` when nothing fits inside `bounds`.
pub fn first_free_cell(occupied: &[Rect], size: Size, bounds: GridBounds) -> Option<Rect> {
    if size.w == 0 || size.h == 0 || size.w > bounds.columns {
        return None;
    }
    // Space below the scanned rows counts as free unless an occupied rect
    // reaches into it.
    for y in 0..bounds.rows {
        for x in 0..=(bounds.columns - size.w) {
            let candidate = size.at(x, y);
            if !occupied.iter().any(|rect| rect.overlaps(&candidate)) {
                return Some(candidate);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: GridBounds = GridBounds { columns: 12, rows: 20 };

    #[test]
    fn test_empty_grid_places_at_origin() {
        let rect = first_free_cell(&[], Size::new(4, 4), BOUNDS);
        assert_eq!(rect, Some(Rect::new(0, 0, 4, 4)));
    }

    #[test]
    fn test_scans_row_major() {
        let occupied = [Rect::new(0, 0, 6, 4)];
        let rect = first_free_cell(&occupied, Size::new(4, 2), BOUNDS);
        assert_eq!(rect, Some(Rect::new(6, 0, 4, 2)));
    }

    #[test]
    fn test_moves_down_when_row_is_full() {
        let occupied = [Rect::new(0, 0, 6, 2), Rect::new(6, 0, 6, 3)];
        let rect = first_free_cell(&occupied, Size::new(6, 2), BOUNDS);
        assert_eq!(rect, Some(Rect::new(0, 2, 6, 2)));
    }

    #[test]
    fn test_too_wide_never_fits() {
        assert_eq!(first_free_cell(&[], Size::new(13, 1), BOUNDS), None);
    }

    #[test]
    fn test_full_grid_has_no_cell() {
        let occupied = [Rect::new(0, 0, 12, 20)];
        assert_eq!(first_free_cell(&occupied, Size::new(2, 2), BOUNDS), None);
    }

    #[test]
    fn test_clamp_to_min() {
        let rect = Rect::new(1, 1, 1, 5).clamp_to_min(Size::new(2, 2));
        assert_eq!(rect, Rect::new(1, 1, 2, 5));
    }

    #[test]
    fn test_huge_rect_does_not_overflow() {
        let occupied = [Rect::new(u32::MAX, 0, 6, 4), Rect::new(0, 2, 4, u32::MAX)];
        assert_eq!(occupied[0].right(), u32::MAX);
        let rect = first_free_cell(&occupied, Size::new(4, 2), BOUNDS);
        assert_eq!(rect, Some(Rect::new(0, 0, 4, 2)));
        let rect = first_free_cell(&occupied, Size::new(4, 4), BOUNDS);
        assert_eq!(rect, Some(Rect::new(4, 0, 4, 4)));
    }

    #[test]
    fn test_bounded() {
        let rect = Rect::new(u32::MAX, 3, 5000, 2).bounded();
        assert_eq!(rect, Rect::new(MAX_GRID_EXTENT, 3, MAX_GRID_EXTENT, 2));
    }

    #[test]
    fn test_overlaps() {
        let a = Rect::new(0, 0, 2, 2);
        assert!(a.overlaps(&Rect::new(1, 1, 2, 2)));
        assert!(!a.overlaps(&Rect::new(2, 0, 2, 2)));
    }
}
