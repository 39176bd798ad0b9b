//! Blast propagation
//!
//! A detonation walks outward from the bomb cell one step at a time in all
//! four directions. Each direction stops independently at the first
//! obstruction; the cell after the current one is peeked to pick the Mid or
//! End sprite without a second pass.

use serde::{Deserialize, Serialize};

use super::anim::Animation;
use super::bomb;
use super::grid::{Cell, EntityId, Grid};
use super::rect::{Direction, Rect};
use super::specials;
use super::state::GameState;

/// Which sprite a blast cell shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlastPiece {
    /// The bomb's own cell
    Centre,
    /// The arm continues past this cell
    Mid(Direction),
    /// Last cell of an arm
    End(Direction),
}

/// One cell of an explosion. Lives for one run of the blast animation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlastSegment {
    pub id: EntityId,
    pub row: i32,
    pub col: i32,
    pub piece: BlastPiece,
    pub anim: Animation,
}

impl BlastSegment {
    #[inline]
    pub fn rect(&self) -> Rect {
        Grid::cell_rect(self.row, self.col)
    }
}

fn spawn_segment(state: &mut GameState, row: i32, col: i32, piece: BlastPiece) {
    let id = state.next_entity_id();
    state.blasts.push(BlastSegment {
        id,
        row,
        col,
        piece,
        anim: Animation::new(state.time_ms),
    });
}

/// Walk a blast of `power` cells out from `(row, col)`
pub fn propagate(state: &mut GameState, row: i32, col: i32, power: u32) {
    spawn_segment(state, row, col, BlastPiece::Centre);

    let power = power as i32;
    let mut valid = [true; 4];
    for step in 0..power {
        for (i, dir) in Direction::ALL.into_iter().enumerate() {
            if !valid[i] {
                continue;
            }
            let (dr, dc) = dir.cell_delta();
            let r = row + dr * (step + 1);
            let c = col + dc * (step + 1);

            match state.grid.get(r, c) {
                Some(Cell::Empty) => {
                    let wall_next = state
                        .grid
                        .get(r + dr, c + dc)
                        .is_none_or(|next| next.is_hard());
                    if step == power - 1 || wall_next {
                        spawn_segment(state, r, c, BlastPiece::End(dir));
                        valid[i] = false;
                    } else {
                        spawn_segment(state, r, c, BlastPiece::Mid(dir));
                    }
                }
                Some(Cell::Bomb(id)) => {
                    valid[i] = false;
                    bomb::detonate(state, id);
                }
                Some(Cell::Soft(id)) => {
                    valid[i] = false;
                    specials::destroy_soft_block(state, id);
                }
                Some(Cell::Special(id)) => {
                    valid[i] = false;
                    specials::hit_special(state, id);
                }
                Some(Cell::Hard) | None => valid[i] = false,
            }
        }
    }
}

/// Animate blast segments and drop the ones that have finished
pub fn update_blasts(state: &mut GameState) {
    let now = state.time_ms;
    let frame_ms = state.tuning.blast_frame_ms;
    let frames = state.sprites.blast;
    state
        .blasts
        .retain_mut(|b| !b.anim.step_once(now, frame_ms, frames));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bomb::Bomb;
    use crate::sim::stage::clear_level;
    use proptest::prelude::*;

    fn open_state() -> GameState {
        let mut state = GameState::new(11);
        clear_level(&mut state);
        state
    }

    fn count(state: &GameState, f: impl Fn(BlastPiece) -> bool) -> usize {
        state.blasts.iter().filter(|b| f(b.piece)).count()
    }

    fn arm(state: &GameState, dir: Direction) -> usize {
        count(state, |p| {
            matches!(p, BlastPiece::Mid(d) | BlastPiece::End(d) if d == dir)
        })
    }

    #[test]
    fn test_power_one_between_pillars() {
        let mut state = open_state();
        // Hard blocks two cells away from (3, 3) in every direction
        let mut grid = Grid::new(13, 31);
        for (r, c) in [(3, 1), (3, 5), (1, 3), (5, 3)] {
            grid.set(r, c, Cell::Hard);
        }
        state.grid = grid;
        propagate(&mut state, 3, 3, 1);

        assert_eq!(count(&state, |p| matches!(p, BlastPiece::End(_))), 4);
        assert_eq!(count(&state, |p| matches!(p, BlastPiece::Mid(_))), 0);
        assert_eq!(count(&state, |p| p == BlastPiece::Centre), 1);
        for b in state.blasts.iter().filter(|b| b.piece != BlastPiece::Centre) {
            assert_eq!((b.row - 3).abs() + (b.col - 3).abs(), 1);
        }
    }

    #[test]
    fn test_open_row_reaches_full_power() {
        let mut state = open_state();
        // Row 1 is an open corridor; 3 cells right of (1, 5) are open
        propagate(&mut state, 1, 5, 3);
        assert_eq!(arm(&state, Direction::Right), 3);
        assert_eq!(arm(&state, Direction::Left), 3);
        // Border above; column 5 is open below
        assert_eq!(arm(&state, Direction::Up), 0);
        assert_eq!(arm(&state, Direction::Down), 3);
        let ends = state
            .blasts
            .iter()
            .filter(|b| b.piece == BlastPiece::End(Direction::Right))
            .collect::<Vec<_>>();
        assert_eq!(ends.len(), 1);
        assert_eq!((ends[0].row, ends[0].col), (1, 8));
    }

    #[test]
    fn test_blast_stops_at_hard_block() {
        let mut state = open_state();
        // Column 2 of row 1 is open, but (2, 2) is a pillar
        propagate(&mut state, 1, 2, 5);
        assert_eq!(arm(&state, Direction::Down), 0);
        // Left arm: (1, 1) then the border
        assert_eq!(arm(&state, Direction::Left), 1);
        assert!(state
            .blasts
            .iter()
            .any(|b| b.piece == BlastPiece::End(Direction::Left) && (b.row, b.col) == (1, 1)));
    }

    #[test]
    fn test_soft_block_absorbs_blast() {
        let mut state = open_state();
        let id = state.next_entity_id();
        state.soft_blocks.push(specials::SoftBlock::new(id, 1, 7, None));
        state.grid.set(1, 7, Cell::Soft(id));
        propagate(&mut state, 1, 5, 4);
        // (1, 6) only; (1, 7) is being destroyed and nothing lands past it
        assert_eq!(arm(&state, Direction::Right), 1);
        assert!(state.soft_blocks[0].destroying.is_some());
    }

    #[test]
    fn test_chain_reaction_detonates_each_bomb_once() {
        let mut state = open_state();
        state.player.bomb_limit = 3;
        for (id, col) in [(100, 3), (101, 5), (102, 7)] {
            state.bombs.push(Bomb::new(id, 1, col, 2, false, 0));
            state.grid.set(1, col, Cell::Bomb(id));
        }
        state.player.bombs_planted = 3;

        bomb::detonate(&mut state, 100);
        assert!(state.bombs.is_empty());
        assert_eq!(state.player.bombs_planted, 0);
        // One centre per bomb
        assert_eq!(count(&state, |p| p == BlastPiece::Centre), 3);

        // A second blast over the same cells finds nothing left to detonate
        bomb::detonate(&mut state, 101);
        assert_eq!(count(&state, |p| p == BlastPiece::Centre), 3);
    }

    #[test]
    fn test_segments_expire_after_animation() {
        let mut state = open_state();
        propagate(&mut state, 1, 5, 1);
        assert!(!state.blasts.is_empty());
        // One frame per update: run past the last frame
        for t in 1..=state.sprites.blast as u64 + 1 {
            state.time_ms = t * state.tuning.blast_frame_ms;
            update_blasts(&mut state);
        }
        assert!(state.blasts.is_empty());
    }

    proptest! {
        #[test]
        fn prop_open_arms_never_exceed_power(
            row in 1i32..12,
            col in 1i32..30,
            power in 1u32..8,
        ) {
            prop_assume!(!(row % 2 == 0 && col % 2 == 0));
            let mut state = open_state();
            propagate(&mut state, row, col, power);

            for dir in Direction::ALL {
                let n = arm(&state, dir) as i32;
                prop_assert!(n <= power as i32);

                // Count the open cells before the first hard block
                let (dr, dc) = dir.cell_delta();
                let mut open = 0;
                while open < power as i32
                    && state.grid.get(row + dr * (open + 1), col + dc * (open + 1)) == Some(Cell::Empty)
                {
                    open += 1;
                }
                prop_assert_eq!(n, open);
            }

            // Nothing ever lands on a hard block
            for b in &state.blasts {
                prop_assert!(!state.grid.cell(b.row, b.col).is_hard());
            }
        }
    }
}
