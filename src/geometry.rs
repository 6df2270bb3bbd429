use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self { Self { width, height } }
}

/// Integer screen rectangle. Layouts work in whole pixels, so every
/// computation floors toward the origin the same way.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn max_x(&self) -> i32 { self.x + self.width }

    pub fn max_y(&self) -> i32 { self.y + self.height }

    pub fn center(&self) -> Point { Point::new(self.x + self.width / 2, self.y + self.height / 2) }

    pub fn size(&self) -> Size { Size::new(self.width, self.height) }

    /// True when `other` lies entirely inside `self` (shared edges count).
    /// A rect with a negative size is never included.
    pub fn includes(&self, other: &Rect) -> bool {
        other.width >= 0
            && other.height >= 0
            && self.x <= other.x
            && self.y <= other.y
            && self.max_x() >= other.max_x()
            && self.max_y() >= other.max_y()
    }

    pub fn includes_point(&self, point: Point) -> bool {
        self.x <= point.x && point.x <= self.max_x() && self.y <= point.y && point.y <= self.max_y()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Some(Rect::new(
            x,
            y,
            self.max_x().min(other.max_x()) - x,
            self.max_y().min(other.max_y()) - y,
        ))
    }

    /// Shrinks the rectangle by the given amount on each edge.
    pub fn gap(&self, left: i32, right: i32, top: i32, bottom: i32) -> Rect {
        Rect::new(
            self.x + left,
            self.y + top,
            (self.width - left - right).max(0),
            (self.height - top - bottom).max(0),
        )
    }

    /// Clamps the size into `[min, max]` per axis, keeping the origin.
    /// A `max` of zero or less means unbounded.
    pub fn clip_size(&self, min_w: i32, max_w: i32, min_h: i32, max_h: i32) -> Rect {
        let clamp = |value: i32, min: i32, max: i32| {
            let value = if max > 0 { value.min(max) } else { value };
            value.max(min)
        };
        Rect::new(
            self.x,
            self.y,
            clamp(self.width, min_w, max_w),
            clamp(self.height, min_h, max_h),
        )
    }

    /// Pulls the rectangle back inside `bounds`. Overflow past the trailing
    /// edges is first removed by moving the rectangle; whatever still sticks
    /// out afterwards is cut off the trailing edges. Negative sizes count
    /// as empty.
    pub fn contain_within(&self, bounds: &Rect) -> Rect {
        if bounds.includes(self) {
            return *self;
        }
        let own = Rect::new(self.x, self.y, self.width.max(0), self.height.max(0));
        let x = own.x + (bounds.max_x() - own.max_x()).min(0);
        let y = own.y + (bounds.max_y() - own.max_y()).min(0);
        let x = x.max(bounds.x);
        let y = y.max(bounds.y);
        let width = own.width.min(bounds.max_x() - x).max(0);
        let height = own.height.min(bounds.max_y() - y).max(0);
        Rect::new(x, y, width, height)
    }

    /// Component-wise difference, used to derive resize deltas.
    pub fn subtract(&self, other: &Rect) -> Rect {
        Rect::new(
            self.x - other.x,
            self.y - other.y,
            self.width - other.width,
            self.height - other.height,
        )
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rect({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// Per-edge growth of a rectangle. Positive values push the edge outward.
///
/// A zero delta is the fixpoint of resize propagation: a layout part that
/// returns it has fully absorbed the user's resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RectDelta {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl RectDelta {
    pub const ZERO: RectDelta = RectDelta::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self { left, right, top, bottom }
    }

    /// Delta that turns `basis` into `target`.
    pub fn from_rects(basis: &Rect, target: &Rect) -> Self {
        let diff = target.subtract(basis);
        Self {
            left: -f64::from(diff.x),
            right: f64::from(diff.width + diff.x),
            top: -f64::from(diff.y),
            bottom: f64::from(diff.height + diff.y),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0.0 && self.right == 0.0 && self.top == 0.0 && self.bottom == 0.0
    }

    pub fn apply_to(&self, basis: &Rect) -> Rect {
        let left = self.left.round() as i32;
        let right = self.right.round() as i32;
        let top = self.top.round() as i32;
        let bottom = self.bottom.round() as i32;
        Rect::new(
            basis.x - left,
            basis.y - top,
            basis.width + left + right,
            basis.height + top + bottom,
        )
    }

    /// The same delta expressed in the frame a rotate part hands to its
    /// inner part (see `layout_engine::parts::Rotate`).
    pub fn into_rotated_frame(&self, angle: u16) -> Self {
        match angle % 360 {
            90 => RectDelta::new(self.top, self.bottom, self.left, self.right),
            180 => RectDelta::new(self.right, self.left, self.top, self.bottom),
            270 => RectDelta::new(self.bottom, self.top, self.left, self.right),
            _ => *self,
        }
    }

    /// Inverse of [`RectDelta::into_rotated_frame`].
    pub fn out_of_rotated_frame(&self, angle: u16) -> Self {
        match angle % 360 {
            90 => RectDelta::new(self.top, self.bottom, self.left, self.right),
            180 => RectDelta::new(self.right, self.left, self.top, self.bottom),
            270 => RectDelta::new(self.top, self.bottom, self.right, self.left),
            _ => *self,
        }
    }
}
