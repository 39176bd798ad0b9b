//! Axis-aligned rectangle geometry in pixel space
//!
//! Every body in the maze is a 64px square; rectangles are what collision,
//! line-of-sight and pickup checks are expressed in.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::consts::SIZE;

/// An axis-aligned rectangle (top-left origin, integer pixels)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// A full cell-sized box with its top-left at `pos`
    #[inline]
    pub fn cell_at(pos: IVec2) -> Self {
        Self::new(pos.x, pos.y, SIZE, SIZE)
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub fn top_left(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    #[inline]
    pub fn center(&self) -> IVec2 {
        IVec2::new(self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Overlap with positive area (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Point containment, right/bottom edges exclusive
    pub fn contains_point(&self, p: IVec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }

    /// Shrink by `amount` on every side
    pub fn inset(&self, amount: i32) -> Rect {
        let amount = amount.clamp(0, self.w.min(self.h) / 2);
        Rect::new(
            self.x + amount,
            self.y + amount,
            self.w - 2 * amount,
            self.h - 2 * amount,
        )
    }

    /// Does the segment `a -> b` pass through this rectangle?
    ///
    /// Liang-Barsky clip against the pixel-inclusive extent
    /// `[left, right - 1] x [top, bottom - 1]`.
    pub fn clips_segment(&self, a: IVec2, b: IVec2) -> bool {
        if self.w <= 0 || self.h <= 0 {
            return false;
        }
        let a = a.as_vec2();
        let d = b.as_vec2() - a;
        let min = Vec2::new(self.left() as f32, self.top() as f32);
        let max = Vec2::new((self.right() - 1) as f32, (self.bottom() - 1) as f32);

        let mut t0 = 0.0f32;
        let mut t1 = 1.0f32;
        let edges = [
            (-d.x, a.x - min.x),
            (d.x, max.x - a.x),
            (-d.y, a.y - min.y),
            (d.y, max.y - a.y),
        ];
        for (p, q) in edges {
            if p == 0.0 {
                // Parallel to this edge: reject if outside it
                if q < 0.0 {
                    return false;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                if t > t1 {
                    return false;
                }
                t0 = t0.max(t);
            } else {
                if t < t0 {
                    return false;
                }
                t1 = t1.min(t);
            }
        }
        t0 <= t1
    }
}

/// The four cardinal walking directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Blast and AI scan order
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Unit step in pixel/grid space (y grows downward)
    #[inline]
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
        }
    }

    /// Unit step as (row, col)
    #[inline]
    pub fn cell_delta(self) -> (i32, i32) {
        let d = self.delta();
        (d.y, d.x)
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}
