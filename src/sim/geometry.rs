//! Axis-aligned rectangle geometry
//!
//! Everything in the playfield is an integer-pixel box: the player, obstacles,
//! the goal, the pogo hitbox and the waypoint marker.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH, UNIT_SIZE};

/// An axis-aligned box in pixel units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of `size` with its top-left corner at `pos`
    pub fn square_at(pos: IVec2, size: i32) -> Self {
        Self::new(pos.x, pos.y, size, size)
    }

    /// Box in placement units (25 px grid), converted to pixels
    pub const fn from_units(ux: i32, uy: i32, uw: i32, uh: i32) -> Self {
        Self::new(ux * UNIT_SIZE, uy * UNIT_SIZE, uw * UNIT_SIZE, uh * UNIT_SIZE)
    }

    /// Zero-area box outside the playfield; nothing can ever touch it
    pub const fn unreachable() -> Self {
        Self::new(PLAYFIELD_WIDTH + 50, PLAYFIELD_HEIGHT + 50, 0, 0)
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub fn position(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    /// True when the box has no area
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// AABB overlap test. Touching edges count as overlapping; an empty box
    /// never overlaps anything.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// True when `other` lies entirely inside this box (edges inclusive)
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Same box moved so its top-left corner sits at `pos`
    pub fn moved_to(self, pos: IVec2) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_and_touching() {
        let a = Rect::new(0, 0, 25, 25);
        assert!(a.intersects(&Rect::new(10, 10, 25, 25)));
        // Shared edge counts
        assert!(a.intersects(&Rect::new(25, 0, 25, 25)));
        assert!(a.intersects(&Rect::new(0, 25, 25, 25)));
        // One pixel gap does not
        assert!(!a.intersects(&Rect::new(26, 0, 25, 25)));
    }

    #[test]
    fn test_empty_never_intersects() {
        let player = Rect::new(400, 400, 16, 16);
        assert!(!player.intersects(&Rect::unreachable()));
        assert!(!Rect::unreachable().intersects(&Rect::unreachable()));
        assert!(Rect::unreachable().is_empty());
    }

    #[test]
    fn test_units_and_containment() {
        let region = Rect::from_units(4, 12, 4, 4);
        assert_eq!(region, Rect::new(100, 300, 100, 100));
        assert!(region.contains_rect(&Rect::from_units(7, 15, 1, 1)));
        assert!(!region.contains_rect(&Rect::from_units(7, 15, 2, 1)));
    }
}
