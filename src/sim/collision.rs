//! Collision detection and response for grid-bound bodies
//!
//! Movement is continuous in pixel space, but everything solid is a grid
//! cell. Response is first-contact: the leading edge of the mover is clamped
//! to the first obstacle it overlaps, and the rest of that obstacle group is
//! not consulted for the tick.

use glam::IVec2;

use super::rect::{Direction, Rect};
use crate::consts::{SIZE, SNAP_TOLERANCE, Y_OFFSET};

/// Clamp `rect`'s leading edge (in the direction of travel) against the first
/// overlapping obstacle. Returns the corrected box if a contact happened.
pub fn resolve_first_contact<I>(rect: Rect, dir: Direction, obstacles: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    for item in obstacles {
        if !rect.intersects(&item) {
            continue;
        }
        let mut out = rect;
        match dir {
            Direction::Right if rect.right() > item.left() => {
                out.x = item.left() - rect.w;
                return Some(out);
            }
            Direction::Left if rect.left() < item.right() => {
                out.x = item.right();
                return Some(out);
            }
            Direction::Up if rect.top() < item.bottom() => {
                out.y = item.bottom();
                return Some(out);
            }
            Direction::Down if rect.bottom() > item.top() => {
                out.y = item.top() - rect.h;
                return Some(out);
            }
            _ => {}
        }
    }
    None
}

/// Enemy variant of contact resolution: only obstacles ahead of the mover
/// count (a block the enemy is already past is ignored).
pub fn resolve_contact_ahead<I>(rect: Rect, dir: Direction, obstacles: I) -> Option<Rect>
where
    I: IntoIterator<Item = Rect>,
{
    for item in obstacles {
        if !item.intersects(&rect) {
            continue;
        }
        let mut out = rect;
        match dir {
            Direction::Left if rect.right() > item.right() => {
                out.x = item.right();
                return Some(out);
            }
            Direction::Right if rect.left() < item.left() => {
                out.x = item.left() - rect.w;
                return Some(out);
            }
            Direction::Up if rect.bottom() > item.bottom() => {
                out.y = item.bottom();
                return Some(out);
            }
            Direction::Down if rect.top() < item.top() => {
                out.y = item.top() - rect.h;
                return Some(out);
            }
            _ => {}
        }
    }
    None
}

/// Snap the coordinate orthogonal to the direction of travel onto the nearest
/// grid line when it is within the tolerance band.
pub fn snap_to_grid(pos: IVec2, dir: Direction) -> IVec2 {
    let mut pos = pos;
    if dir.is_horizontal() {
        pos.y = snap_axis(pos.y - Y_OFFSET) + Y_OFFSET;
    } else {
        pos.x = snap_axis(pos.x);
    }
    pos
}

fn snap_axis(v: i32) -> i32 {
    let offset = v.rem_euclid(SIZE);
    if offset <= SNAP_TOLERANCE {
        v - offset
    } else if offset >= SIZE - SNAP_TOLERANCE {
        v + (SIZE - offset)
    } else {
        v
    }
}

/// Inclusive bounds for a body's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayArea {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl PlayArea {
    /// Interior of the border ring for a grid of `rows` x `cols` cells
    pub fn for_grid(rows: i32, cols: i32) -> Self {
        Self {
            left: SIZE,
            right: (cols - 2) * SIZE,
            top: Y_OFFSET + SIZE,
            bottom: (rows - 2) * SIZE + Y_OFFSET,
        }
    }

    /// Correct at most one axis per call, priority left, right, top, bottom
    pub fn restrict(&self, pos: IVec2) -> IVec2 {
        let mut pos = pos;
        if pos.x < self.left {
            pos.x = self.left;
        } else if pos.x > self.right {
            pos.x = self.right;
        } else if pos.y < self.top {
            pos.y = self.top;
        } else if pos.y > self.bottom {
            pos.y = self.bottom;
        }
        pos
    }
}

/// Mask-accurate overlap: the bounding boxes must touch, then the two
/// collision masks (inset boxes) must overlap too.
pub fn masks_overlap(a: Rect, a_inset: i32, b: Rect, b_inset: i32) -> bool {
    a.intersects(&b) && a.inset(a_inset).intersects(&b.inset(b_inset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_to_pixel;
    use crate::sim::grid::Grid;

    #[test]
    fn test_first_contact_clamps_leading_edge() {
        let block = Grid::cell_rect(1, 3);
        // Moving right, overlapping the block by 5px
        let mover = Rect::cell_at(cell_to_pixel(1, 2) + IVec2::new(5, 0));
        let out = resolve_first_contact(mover, Direction::Right, [block]).unwrap();
        assert_eq!(out.right(), block.left());

        // Moving left into a block on the left
        let block = Grid::cell_rect(1, 1);
        let mover = Rect::cell_at(cell_to_pixel(1, 2) - IVec2::new(3, 0));
        let out = resolve_first_contact(mover, Direction::Left, [block]).unwrap();
        assert_eq!(out.left(), block.right());
    }

    #[test]
    fn test_first_contact_stops_after_first_obstacle() {
        let a = Grid::cell_rect(2, 2);
        let b = Grid::cell_rect(2, 3);
        // Straddles a and b vertically below them, moving up
        let mover = Rect::cell_at(cell_to_pixel(3, 2) + IVec2::new(20, -4));
        let out = resolve_first_contact(mover, Direction::Up, [a, b]).unwrap();
        assert_eq!(out.top(), a.bottom());
    }

    #[test]
    fn test_no_contact_when_clear() {
        let block = Grid::cell_rect(1, 3);
        let mover = Grid::cell_rect(1, 2);
        assert!(resolve_first_contact(mover, Direction::Right, [block]).is_none());
    }

    #[test]
    fn test_contact_ahead_ignores_block_behind() {
        let behind = Grid::cell_rect(1, 1);
        // Moving right, slightly overlapping a block on the left
        let mover = Rect::cell_at(cell_to_pixel(1, 2) - IVec2::new(2, 0));
        assert!(resolve_contact_ahead(mover, Direction::Right, [behind]).is_none());
        let out = resolve_contact_ahead(mover, Direction::Left, [behind]).unwrap();
        assert_eq!(out.left(), behind.right());
    }

    #[test]
    fn test_snap_to_grid_band() {
        let base = cell_to_pixel(3, 3);
        // Moving up/down snaps x
        assert_eq!(snap_to_grid(base + IVec2::new(12, 0), Direction::Up).x, base.x);
        assert_eq!(snap_to_grid(base + IVec2::new(13, 0), Direction::Up).x, base.x + 13);
        assert_eq!(snap_to_grid(base + IVec2::new(52, 0), Direction::Down).x, base.x + SIZE);
        // Moving left/right snaps y
        assert_eq!(snap_to_grid(base + IVec2::new(0, 7), Direction::Left).y, base.y);
        assert_eq!(snap_to_grid(base + IVec2::new(0, 60), Direction::Right).y, base.y + SIZE);
        // The travel axis is untouched
        assert_eq!(snap_to_grid(base + IVec2::new(5, 0), Direction::Right).x, base.x + 5);
    }

    #[test]
    fn test_play_area_one_axis_per_call() {
        let area = PlayArea::for_grid(13, 31);
        let out = area.restrict(IVec2::new(area.left - 5, area.top - 5));
        assert_eq!(out, IVec2::new(area.left, area.top - 5));
        let out = area.restrict(out);
        assert_eq!(out, IVec2::new(area.left, area.top));
        let out = area.restrict(IVec2::new(area.right + 1, area.bottom + 1));
        assert_eq!(out.x, area.right);
        assert_eq!(out.y, area.bottom + 1);
    }

    #[test]
    fn test_masks_overlap_needs_mask_contact() {
        let a = Rect::new(0, 0, 64, 64);
        let b = Rect::new(60, 0, 64, 64);
        assert!(a.intersects(&b));
        assert!(!masks_overlap(a, 4, b, 4));
        assert!(masks_overlap(a, 0, b, 0));
        let c = Rect::new(40, 0, 64, 64);
        assert!(masks_overlap(a, 4, c, 4));
    }
}
