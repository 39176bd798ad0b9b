//! Bombs: planting, fuses and detonation
//!
//! A bomb sits in one grid cell. Its fuse counts animation frames; remote
//! bombs never go off on their own. Detonation removes the bomb from the grid
//! and hands over to the blast engine.

use serde::{Deserialize, Serialize};

use super::anim::Animation;
use super::blast;
use super::grid::{Cell, EntityId, Grid};
use super::rect::Rect;
use super::state::{GameState, SoundCue};

/// A planted bomb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub id: EntityId,
    pub row: i32,
    pub col: i32,
    /// Blast radius in cells
    pub power: u32,
    /// Animation frames shown so far (the fuse)
    pub fuse_frames: u32,
    /// Waits for a detonate intent instead of the fuse
    pub remote: bool,
    /// The planting player may still walk off it
    pub passable: bool,
    pub anim: Animation,
}

impl Bomb {
    pub fn new(id: EntityId, row: i32, col: i32, power: u32, remote: bool, now: u64) -> Self {
        Self {
            id,
            row,
            col,
            power,
            fuse_frames: 0,
            remote,
            passable: true,
            anim: Animation::new(now),
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Grid::cell_rect(self.row, self.col)
    }

    /// Animate and burn the fuse. Returns true when the bomb should go off.
    pub fn update(&mut self, now: u64, frame_ms: u64, frames: usize, fuse_frames: u32) -> bool {
        if self.anim.step_looping(now, frame_ms, frames) {
            self.fuse_frames += 1;
        }
        !self.remote && self.fuse_frames >= fuse_frames
    }

    /// Once the player's box no longer overlaps, the bomb becomes solid for good
    pub fn update_passable(&mut self, player: &Rect) {
        if self.passable && !self.rect().intersects(player) {
            self.passable = false;
        }
    }
}

/// Plant a bomb under the player's centre if the cell is free and the player
/// has bombs left. Returns true if a bomb was planted.
pub fn plant_bomb(state: &mut GameState) -> bool {
    let player = &state.player;
    if !player.is_alive() || player.bombs_planted >= player.bomb_limit {
        return false;
    }
    let (row, col) = player.cell();
    if state.grid.get(row, col) != Some(Cell::Empty) {
        return false;
    }

    let id = state.next_entity_id();
    let bomb = Bomb::new(
        id,
        row,
        col,
        state.player.power,
        state.player.abilities.remote,
        state.time_ms,
    );
    state.grid.set(row, col, Cell::Bomb(id));
    state.bombs.push(bomb);
    state.player.bombs_planted += 1;
    state.sound(SoundCue::BombPlant);
    log::debug!("Bomb {} planted at ({}, {})", id, row, col);
    true
}

/// Detonate a bomb. Detonating a bomb that is already gone does nothing.
pub fn detonate(state: &mut GameState, id: EntityId) {
    let Some(idx) = state.bombs.iter().position(|b| b.id == id) else {
        return;
    };
    let bomb = state.bombs.remove(idx);

    if state.grid.get(bomb.row, bomb.col) == Some(Cell::Bomb(bomb.id)) {
        state.grid.clear(bomb.row, bomb.col);
    }
    state.player.bombs_planted = state.player.bombs_planted.saturating_sub(1);
    state.sound(SoundCue::Explosion);
    log::debug!(
        "Bomb {} detonated at ({}, {}) power {}",
        bomb.id,
        bomb.row,
        bomb.col,
        bomb.power
    );

    blast::propagate(state, bomb.row, bomb.col, bomb.power);
}

/// Remote trigger: detonate the most recently planted bomb
pub fn remote_detonate(state: &mut GameState) -> bool {
    if !state.player.abilities.remote || !state.player.is_alive() {
        return false;
    }
    match state.bombs.iter().map(|b| b.id).max() {
        Some(id) => {
            detonate(state, id);
            true
        }
        None => false,
    }
}

/// Per-tick bomb update: fuses and passability
pub fn update_bombs(state: &mut GameState) {
    let now = state.time_ms;
    let player_rect = state.player.rect();
    let frame_ms = state.tuning.bomb_frame_ms;
    let frames = state.sprites.bomb;
    let fuse = state.tuning.bomb_fuse_frames;

    // Iterate over an id snapshot: a detonation can chain into later bombs
    let ids: Vec<EntityId> = state.bombs.iter().map(|b| b.id).collect();
    for id in ids {
        let Some(bomb) = state.bombs.iter_mut().find(|b| b.id == id) else {
            continue;
        };
        let due = bomb.update(now, frame_ms, frames, fuse);
        bomb.update_passable(&player_rect);
        if due {
            detonate(state, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_to_pixel;
    use crate::sim::stage::clear_level;

    fn open_state() -> GameState {
        let mut state = GameState::new(5);
        clear_level(&mut state);
        state
    }

    #[test]
    fn test_plant_registers_in_grid() {
        let mut state = open_state();
        assert!(plant_bomb(&mut state));
        let (row, col) = state.player.cell();
        let id = state.bombs[0].id;
        assert_eq!(state.grid.cell(row, col), Cell::Bomb(id));
        assert_eq!(state.player.bombs_planted, 1);
        assert!(state.events.contains(&crate::sim::GameEvent::Sound(SoundCue::BombPlant)));
    }

    #[test]
    fn test_plant_respects_limit_and_occupancy() {
        let mut state = open_state();
        assert!(plant_bomb(&mut state));
        // Same cell is occupied now, and the limit is 1 anyway
        assert!(!plant_bomb(&mut state));
        state.player.bomb_limit = 2;
        assert!(!plant_bomb(&mut state));
        state.player.pos = cell_to_pixel(3, 3);
        assert!(plant_bomb(&mut state));
        assert!(!plant_bomb(&mut state));
        assert_eq!(state.bombs.len(), 2);
    }

    #[test]
    fn test_fuse_detonates_and_frees_slot() {
        let mut state = open_state();
        plant_bomb(&mut state);
        let (row, col) = state.player.cell();
        let fuse_ms = state.tuning.bomb_frame_ms * state.tuning.bomb_fuse_frames as u64;
        while state.time_ms < fuse_ms - state.tuning.bomb_frame_ms {
            state.time_ms += 16;
            update_bombs(&mut state);
            assert_eq!(state.bombs.len(), 1, "went off early at {}", state.time_ms);
        }
        while state.time_ms < fuse_ms + 100 {
            state.time_ms += 16;
            update_bombs(&mut state);
        }
        assert!(state.bombs.is_empty());
        assert!(state.grid.cell(row, col).is_empty());
        assert_eq!(state.player.bombs_planted, 0);
        assert!(!state.blasts.is_empty());
    }

    #[test]
    fn test_remote_bomb_waits_for_trigger() {
        let mut state = open_state();
        state.player.abilities.remote = true;
        plant_bomb(&mut state);
        for _ in 0..1000 {
            state.time_ms += 16;
            update_bombs(&mut state);
        }
        assert_eq!(state.bombs.len(), 1);
        assert!(remote_detonate(&mut state));
        assert!(state.bombs.is_empty());
        assert!(!remote_detonate(&mut state));
    }

    #[test]
    fn test_remote_detonates_latest_bomb() {
        let mut state = open_state();
        state.player.abilities.remote = true;
        state.player.bomb_limit = 2;
        plant_bomb(&mut state);
        let first = state.bombs[0].id;
        state.player.pos = cell_to_pixel(3, 5);
        plant_bomb(&mut state);
        remote_detonate(&mut state);
        assert_eq!(state.bombs.len(), 1);
        assert_eq!(state.bombs[0].id, first);
    }

    #[test]
    fn test_bomb_turns_solid_once_player_leaves() {
        let mut state = open_state();
        plant_bomb(&mut state);
        update_bombs(&mut state);
        assert!(state.bombs[0].passable);
        state.player.pos = cell_to_pixel(3, 3) + glam::IVec2::new(1, 0);
        update_bombs(&mut state);
        assert!(!state.bombs[0].passable);
        // Walking back does not make it passable again
        state.player.pos = cell_to_pixel(3, 2);
        update_bombs(&mut state);
        assert!(!state.bombs[0].passable);
    }

    #[test]
    fn test_double_detonation_is_a_no_op() {
        let mut state = open_state();
        plant_bomb(&mut state);
        let id = state.bombs[0].id;
        detonate(&mut state, id);
        let blasts = state.blasts.len();
        let planted = state.player.bombs_planted;
        detonate(&mut state, id);
        assert_eq!(state.blasts.len(), blasts);
        assert_eq!(state.player.bombs_planted, planted);
    }
}
