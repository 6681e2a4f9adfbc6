//! Bounding box representation and the geometry used across the crate.

/// Axis-aligned bounding box in integer pixel coordinates.
///
/// Stored as top-left corner plus dimensions (TLWH). Width and height are
/// expected to be non-negative; degenerate zero-area boxes are legal and
/// score zero overlap against everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoundingBox {
    /// Left edge (top-left x)
    pub left: i32,
    /// Top edge (top-left y)
    pub top: i32,
    /// Width of the bounding box
    pub width: i32,
    /// Height of the bounding box
    pub height: i32,
}

impl BoundingBox {
    /// Create a new box from top-left coordinates and dimensions.
    #[inline]
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        debug_assert!(width >= 0 && height >= 0);
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Create a box of the given dimensions centered at `(cx, cy)`.
    ///
    /// Fractional corners truncate toward zero, matching the integer pixel
    /// grid the detector and trackers work on.
    #[inline]
    pub fn from_center(cx: f64, cy: f64, width: i32, height: i32) -> Self {
        Self {
            left: (cx - width as f64 / 2.0) as i32,
            top: (cy - height as f64 / 2.0) as i32,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Box area in square pixels.
    #[inline]
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Center point of the box.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            self.left as f64 + self.width as f64 / 2.0,
            self.top as f64 + self.height as f64 / 2.0,
        )
    }

    /// Intersection over Union with another box.
    ///
    /// 0.0 for disjoint boxes, 1.0 for identical boxes with positive area;
    /// a zero-area union also yields 0.0.
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let x1 = self.left.max(other.left);
        let y1 = self.top.max(other.top);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        let inter_width = (x2 - x1).max(0) as i64;
        let inter_height = (y2 - y1).max(0) as i64;
        let inter_area = inter_width * inter_height;

        let union_area = self.area() + other.area() - inter_area;

        if union_area > 0 {
            inter_area as f64 / union_area as f64
        } else {
            0.0
        }
    }

    /// Euclidean distance between the centers of two boxes.
    pub fn center_distance(&self, other: &BoundingBox) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        (ax - bx).hypot(ay - by)
    }
}
