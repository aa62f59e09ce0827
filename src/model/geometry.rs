//! Page-space geometry.

use serde::{Deserialize, Serialize};

/// A point in page or device space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in page or device space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge (smallest y)
    pub y: f64,
    /// Width in points
    pub width: f64,
    /// Height in points
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build the smallest rectangle containing two corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Letter-size page (8.5 x 11 inches) at the origin.
    pub fn letter() -> Self {
        Self::new(0.0, 0.0, 612.0, 792.0)
    }

    /// Check if the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Bottom-right corner.
    pub fn far_corner(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }
}

/// Reduce any rotation in degrees to one of 0, 90, 180, 270.
///
/// Values that are not a multiple of 90 are rounded down to one.
pub fn normalize_rotation(rotation: i32) -> i32 {
    let r = rotation.rem_euclid(360);
    r - r % 90
}

/// Map a page-space point to device space for a page box, zoom and rotation.
///
/// The page box origin maps to the device origin; the rotated page always
/// lies in the positive quadrant. With `inverse` the mapping runs from
/// device space back to page space.
pub fn transform_point(
    point: Point,
    page_box: Rect,
    zoom: f32,
    rotation: i32,
    inverse: bool,
) -> Point {
    let zoom = f64::from(zoom);
    let w = page_box.width * zoom;
    let h = page_box.height * zoom;
    let rotation = normalize_rotation(rotation);

    if !inverse {
        let x = (point.x - page_box.x) * zoom;
        let y = (point.y - page_box.y) * zoom;
        match rotation {
            90 => Point::new(h - y, x),
            180 => Point::new(w - x, h - y),
            270 => Point::new(y, w - x),
            _ => Point::new(x, y),
        }
    } else {
        let (x, y) = match rotation {
            90 => (point.y, h - point.x),
            180 => (w - point.x, h - point.y),
            270 => (w - point.y, point.x),
            _ => (point.x, point.y),
        };
        if zoom == 0.0 {
            return page_box.origin();
        }
        Point::new(x / zoom + page_box.x, y / zoom + page_box.y)
    }
}

/// Rectangle counterpart of [`transform_point`].
pub fn transform_rect(rect: Rect, page_box: Rect, zoom: f32, rotation: i32, inverse: bool) -> Rect {
    let a = transform_point(rect.origin(), page_box, zoom, rotation, inverse);
    let b = transform_point(rect.far_corner(), page_box, zoom, rotation, inverse);
    Rect::from_corners(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_normalize_rotation() {
        assert_eq!(normalize_rotation(0), 0);
        assert_eq!(normalize_rotation(450), 90);
        assert_eq!(normalize_rotation(-90), 270);
        assert_eq!(normalize_rotation(100), 90);
    }

    #[test]
    fn test_transform_zoom_only() {
        let page = Rect::new(0.0, 0.0, 100.0, 200.0);
        let p = transform_point(Point::new(10.0, 20.0), page, 2.0, 0, false);
        assert!(close(p, Point::new(20.0, 40.0)));
    }

    #[test]
    fn test_transform_rotation_inverse() {
        let page = Rect::new(5.0, 5.0, 100.0, 200.0);
        for rotation in [0, 90, 180, 270] {
            let original = Point::new(30.0, 70.0);
            let device = transform_point(original, page, 1.5, rotation, false);
            let back = transform_point(device, page, 1.5, rotation, true);
            assert!(close(original, back), "rotation {rotation}");
        }
    }

    #[test]
    fn test_transform_rotation_90() {
        let page = Rect::new(0.0, 0.0, 100.0, 200.0);
        let p = transform_point(Point::new(0.0, 0.0), page, 1.0, 90, false);
        assert!(close(p, Point::new(200.0, 0.0)));
    }

    #[test]
    fn test_transform_rect_normalizes() {
        let page = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r = transform_rect(Rect::new(10.0, 10.0, 20.0, 30.0), page, 1.0, 180, false);
        assert_eq!(r, Rect::new(70.0, 60.0, 20.0, 30.0));
    }
}
