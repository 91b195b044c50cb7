//! Screen geometry shared by the selector, overlay and recorder.

use crate::{CaptureError, CoreResult};

use std::panic::Location;

use error_location::ErrorLocation;

/// A point in root window coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Create a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned screen rectangle with non-negative size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a rectangle.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounding box between a fixed anchor and a moving point.
    ///
    /// Each axis is normalized independently, so dragging left or up from the
    /// anchor never yields a negative size.
    pub fn spanning(anchor: Point, moving: Point) -> Self {
        let (x, width) = span_axis(anchor.x, moving.x);
        let (y, height) = span_axis(anchor.y, moving.y);
        Self::new(x, y, width, height)
    }

    /// True when both width and height are positive.
    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Reject zero-area rectangles.
    #[track_caller]
    pub fn ensure_area(self) -> CoreResult<Self> {
        if self.has_area() {
            Ok(self)
        } else {
            Err(CaptureError::DegenerateSelection {
                rect: self,
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }

    /// Outline that covers exactly the pixels of this rectangle.
    ///
    /// X draws a rectangle outline `width + 1` pixels wide, so the size is
    /// shrunk by one.
    pub fn inner_outline(&self) -> Self {
        Self::new(
            self.x,
            self.y,
            self.width.saturating_sub(1),
            self.height.saturating_sub(1),
        )
    }

    /// Outline one pixel outside this rectangle on every side.
    pub fn padded_outline(&self) -> Self {
        Self::new(
            self.x - 1,
            self.y - 1,
            self.width.saturating_add(1),
            self.height.saturating_add(1),
        )
    }
}

fn span_axis(anchor: i32, moving: i32) -> (i32, u32) {
    if moving > anchor {
        (anchor, moving.abs_diff(anchor))
    } else {
        (moving, anchor.abs_diff(moving))
    }
}
