// ABOUTME: Rectangle math shared by the layout engine and the layout file format.
// ABOUTME: Pure functions for splitting rects by ratio and hit-testing points.

use serde::{Deserialize, Serialize};

/// Smallest fraction of a split that either child may occupy.
pub const MIN_RATIO: f32 = 0.05;

/// Axis-aligned rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// True when either dimension is zero, negative or not a number
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.x.is_finite()
            || !self.y.is_finite()
            || !self.width.is_finite()
            || !self.height.is_finite()
    }

    /// Scale position and size per axis
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width * sx,
            height: self.height * sy,
        }
    }

    pub fn contains(&self, point: (f32, f32)) -> bool {
        point_in_rect(point, *self)
    }
}

/// How a split divides its rectangle.
///
/// `Horizontal` places the children side by side (divided along x),
/// `Vertical` stacks them (divided along y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Start of `rect` along the split axis
    pub fn origin(&self, rect: Rect) -> f32 {
        match self {
            Orientation::Horizontal => rect.x,
            Orientation::Vertical => rect.y,
        }
    }

    /// Length of `rect` along the split axis
    pub fn extent(&self, rect: Rect) -> f32 {
        match self {
            Orientation::Horizontal => rect.width,
            Orientation::Vertical => rect.height,
        }
    }

    /// The component of `point` that lies on the split axis
    pub fn coord(&self, point: (f32, f32)) -> f32 {
        match self {
            Orientation::Horizontal => point.0,
            Orientation::Vertical => point.1,
        }
    }
}

/// Side of an existing panel where a new panel is docked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn orientation(&self) -> Orientation {
        match self {
            Direction::Left | Direction::Right => Orientation::Horizontal,
            Direction::Up | Direction::Down => Orientation::Vertical,
        }
    }

    /// Whether the new panel becomes the first child of the split
    pub fn new_panel_first(&self) -> bool {
        matches!(self, Direction::Left | Direction::Up)
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            "up" | "top" => Some(Direction::Up),
            "down" | "bottom" => Some(Direction::Down),
            _ => None,
        }
    }
}

pub fn clamp_ratio(ratio: f32) -> f32 {
    ratio.clamp(MIN_RATIO, 1.0 - MIN_RATIO)
}

/// Divide `rect` along `orientation`, leaving a gap of `2 * border` between the halves.
///
/// The ratio is clamped to `[MIN_RATIO, 1 - MIN_RATIO]`; extents that the border
/// would push below zero clamp to zero.
pub fn split_rect(rect: Rect, orientation: Orientation, ratio: f32, border: f32) -> (Rect, Rect) {
    let ratio = clamp_ratio(ratio);
    let extent = orientation.extent(rect);
    let mid = extent * ratio;

    let first_extent = (mid - border).max(0.0);
    let second_offset = (mid + border).min(extent);
    let second_extent = (extent - mid - border).max(0.0);

    match orientation {
        Orientation::Horizontal => (
            Rect::new(rect.x, rect.y, first_extent, rect.height),
            Rect::new(rect.x + second_offset, rect.y, second_extent, rect.height),
        ),
        Orientation::Vertical => (
            Rect::new(rect.x, rect.y, rect.width, first_extent),
            Rect::new(rect.x, rect.y + second_offset, rect.width, second_extent),
        ),
    }
}

/// Half-open containment: the left/top edges are inside, right/bottom are not
pub fn point_in_rect(point: (f32, f32), rect: Rect) -> bool {
    point.0 >= rect.x && point.0 < rect.right() && point.1 >= rect.y && point.1 < rect.bottom()
}

/// True when the two rects share a region of positive area
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}
