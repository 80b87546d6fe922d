//! Static platform geometry.
//!
//! Platforms are axis-aligned rectangles in screen space (y grows downward),
//! built once from the world config and never mutated. `StaticGeometry` is the
//! single handle the tick borrows; it carries its own length, so no caller
//! ever iterates with a hardcoded platform count.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_position_size(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.left + self.width * 0.5, self.top + self.height * 0.5)
    }

    /// Zero, negative or non-finite extents. Such rectangles never collide.
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
            || !self.left.is_finite()
            || !self.top.is_finite()
            || !self.width.is_finite()
            || !self.height.is_finite()
    }

    /// Strict overlap test: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }
        let inter_left = self.left.max(other.left);
        let inter_right = self.right().min(other.right());
        let inter_top = self.top.max(other.top);
        let inter_bottom = self.bottom().min(other.bottom());
        inter_left < inter_right && inter_top < inter_bottom
    }

    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect::new(self.left + offset.x, self.top + offset.y, self.width, self.height)
    }

    /// Shrink by `dx` on the left and right and `dy` on the top and bottom.
    pub fn inset(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(
            self.left + dx,
            self.top + dy,
            self.width - 2.0 * dx,
            self.height - 2.0 * dy,
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticGeometry {
    platforms: Vec<Rect>,
}

impl StaticGeometry {
    pub fn new(platforms: Vec<Rect>) -> Self {
        let degenerate = platforms.iter().filter(|p| p.is_degenerate()).count();
        if degenerate > 0 {
            log::warn!("{degenerate} platform(s) have no area and will never collide");
        }
        Self { platforms }
    }

    pub fn platforms(&self) -> &[Rect] {
        &self.platforms
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Platforms intersecting `rect`, in iteration order.
    pub fn overlapping<'a>(&'a self, rect: &Rect) -> impl Iterator<Item = &'a Rect> + 'a {
        let rect = *rect;
        self.platforms.iter().filter(move |p| p.intersects(&rect))
    }

    pub fn any_overlap(&self, rect: &Rect) -> bool {
        self.overlapping(rect).next().is_some()
    }

    pub fn first_overlap(&self, rect: &Rect) -> Option<&Rect> {
        self.overlapping(rect).next()
    }
}
