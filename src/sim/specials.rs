//! Soft blocks and power-ups
//!
//! A soft block may conceal a power-up (or the exit). Destroying it runs a
//! short animation while the block keeps blocking; afterwards the cell is
//! either cleared or handed to the revealed special.

use serde::{Deserialize, Serialize};

use super::anim::Animation;
use super::grid::{Cell, EntityId, Grid};
use super::player::Player;
use super::rect::Rect;
use super::stage;
use super::state::{GameEvent, GameState, MusicCue, SoundCue};
use super::EnemyKind;
use crate::tuning::Tuning;

/// Every power-up a stage can conceal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUp {
    /// One more bomb at a time
    BombUp,
    /// One more cell of blast radius
    FireUp,
    SpeedUp,
    WallHack,
    Remote,
    BombPass,
    FlamePass,
    Invincible,
    /// Leads to the next stage once every enemy is gone
    Exit,
}

impl PowerUp {
    /// Collectable power-ups (everything but the exit)
    pub const PICKUPS: [PowerUp; 8] = [
        PowerUp::BombUp,
        PowerUp::FireUp,
        PowerUp::SpeedUp,
        PowerUp::WallHack,
        PowerUp::Remote,
        PowerUp::BombPass,
        PowerUp::FlamePass,
        PowerUp::Invincible,
    ];

    /// Enemy kind released when a blast hits this special
    pub fn wave_enemy(self) -> EnemyKind {
        match self {
            PowerUp::BombUp | PowerUp::FireUp => EnemyKind::Onil,
            PowerUp::SpeedUp => EnemyKind::Dahl,
            PowerUp::WallHack => EnemyKind::Minvo,
            PowerUp::Remote => EnemyKind::Doria,
            PowerUp::BombPass => EnemyKind::Ovape,
            PowerUp::FlamePass => EnemyKind::Pass,
            PowerUp::Invincible | PowerUp::Exit => EnemyKind::Pontan,
        }
    }

    /// The player already has this ability, or the counter is maxed out
    pub fn is_exhausted(self, player: &Player, tuning: &Tuning) -> bool {
        match self {
            PowerUp::BombUp => player.bomb_limit >= tuning.max_bombs,
            PowerUp::FireUp => player.power >= tuning.max_power,
            PowerUp::SpeedUp => player.speed >= tuning.max_speed,
            PowerUp::WallHack => player.abilities.wall_hack,
            PowerUp::Remote => player.abilities.remote,
            PowerUp::BombPass => player.abilities.bomb_pass,
            PowerUp::FlamePass => player.abilities.flame_pass,
            PowerUp::Invincible | PowerUp::Exit => false,
        }
    }
}

/// Destructible block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoftBlock {
    pub id: EntityId,
    pub row: i32,
    pub col: i32,
    /// Revealed when the block is destroyed
    pub conceals: Option<PowerUp>,
    /// Destruction animation, once hit
    pub destroying: Option<Animation>,
}

impl SoftBlock {
    pub fn new(id: EntityId, row: i32, col: i32, conceals: Option<PowerUp>) -> Self {
        Self {
            id,
            row,
            col,
            conceals,
            destroying: None,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Grid::cell_rect(self.row, self.col)
    }
}

/// A revealed power-up lying in the maze
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Special {
    pub id: EntityId,
    pub row: i32,
    pub col: i32,
    pub kind: PowerUp,
}

impl Special {
    #[inline]
    pub fn rect(&self) -> Rect {
        Grid::cell_rect(self.row, self.col)
    }
}

/// Start destroying a soft block. Already-crumbling blocks are left alone.
pub fn destroy_soft_block(state: &mut GameState, id: EntityId) {
    let now = state.time_ms;
    if let Some(block) = state.soft_blocks.iter_mut().find(|b| b.id == id)
        && block.destroying.is_none()
    {
        block.destroying = Some(Animation::new(now));
    }
}

/// Run destruction animations; finished blocks free their cell or reveal
/// what they concealed
pub fn update_soft_blocks(state: &mut GameState) {
    let now = state.time_ms;
    let frame_ms = state.tuning.soft_block_frame_ms;
    let frames = state.sprites.soft_block_destroy;

    let mut destroyed = Vec::new();
    state.soft_blocks.retain_mut(|block| {
        let done = block
            .destroying
            .as_mut()
            .is_some_and(|anim| anim.step_once(now, frame_ms, frames));
        if done {
            destroyed.push((block.row, block.col, block.conceals));
        }
        !done
    });

    for (row, col, conceals) in destroyed {
        match conceals {
            Some(kind) => {
                let id = state.next_entity_id();
                state.specials.push(Special { id, row, col, kind });
                state.grid.set(row, col, Cell::Special(id));
                log::debug!("Revealed {:?} at ({}, {})", kind, row, col);
            }
            None => state.grid.clear(row, col),
        }
    }
}

/// Apply a collected power-up to the player
pub fn apply_power_up(player: &mut Player, kind: PowerUp, tuning: &Tuning, now: u64) {
    match kind {
        PowerUp::BombUp => player.bomb_limit = (player.bomb_limit + 1).min(tuning.max_bombs),
        PowerUp::FireUp => player.power = (player.power + 1).min(tuning.max_power),
        PowerUp::SpeedUp => player.speed = (player.speed + 1).min(tuning.max_speed),
        PowerUp::WallHack => player.abilities.wall_hack = true,
        PowerUp::Remote => player.abilities.remote = true,
        PowerUp::BombPass => player.abilities.bomb_pass = true,
        PowerUp::FlamePass => player.abilities.flame_pass = true,
        PowerUp::Invincible => player.grant_invincibility(now),
        PowerUp::Exit => {}
    }
}

/// Pick up whatever special the player is standing on
pub fn update_specials(state: &mut GameState) {
    if !state.player.is_alive() {
        return;
    }
    let player_rect = state.player.rect();
    let Some(idx) = state
        .specials
        .iter()
        .position(|s| player_rect.contains_point(s.rect().center()))
    else {
        return;
    };

    let special = &state.specials[idx];
    let (row, col, kind) = (special.row, special.col, special.kind);

    if kind == PowerUp::Exit {
        // Inert until the maze is clear
        if !state.enemies.is_empty() {
            return;
        }
        state.emit(GameEvent::MusicStop);
        state.player.score += state.tuning.exit_score;
        log::info!("Stage {} cleared", state.stage);
        stage::new_stage(state);
        return;
    }

    let now = state.time_ms;
    apply_power_up(&mut state.player, kind, &state.tuning, now);
    state.specials.remove(idx);
    state.grid.clear(row, col);
    state.sound(SoundCue::PowerUp);
    state.emit(GameEvent::Music(MusicCue::PowerUp));
    state.player.score += state.tuning.power_up_score;
    log::info!("Picked up {:?}", kind);
}

/// A blast reached a revealed special: release a wave of enemies
pub fn hit_special(state: &mut GameState, id: EntityId) {
    let Some(kind) = state.special(id).map(|s| s.kind) else {
        return;
    };
    let wave = vec![kind.wave_enemy(); state.tuning.special_wave_size];
    log::debug!("Special {:?} hit, releasing {} enemies", kind, wave.len());
    stage::spawn_enemies(state, &wave);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_to_pixel;
    use crate::sim::stage::clear_level;

    fn open_state() -> GameState {
        let mut state = GameState::new(21);
        clear_level(&mut state);
        state
    }

    fn place_block(state: &mut GameState, row: i32, col: i32, conceals: Option<PowerUp>) -> EntityId {
        let id = state.next_entity_id();
        state.soft_blocks.push(SoftBlock::new(id, row, col, conceals));
        state.grid.set(row, col, Cell::Soft(id));
        id
    }

    fn finish_destruction(state: &mut GameState) {
        for _ in 0..=state.sprites.soft_block_destroy {
            state.time_ms += state.tuning.soft_block_frame_ms;
            update_soft_blocks(state);
        }
    }

    fn place_special(state: &mut GameState, row: i32, col: i32, kind: PowerUp) -> EntityId {
        let id = state.next_entity_id();
        state.specials.push(Special { id, row, col, kind });
        state.grid.set(row, col, Cell::Special(id));
        id
    }

    #[test]
    fn test_block_keeps_blocking_while_crumbling() {
        let mut state = open_state();
        let id = place_block(&mut state, 1, 5, None);
        destroy_soft_block(&mut state, id);
        state.time_ms += state.tuning.soft_block_frame_ms;
        update_soft_blocks(&mut state);
        assert_eq!(state.grid.cell(1, 5), Cell::Soft(id));

        finish_destruction(&mut state);
        assert!(state.soft_blocks.is_empty());
        assert!(state.grid.cell(1, 5).is_empty());
    }

    #[test]
    fn test_concealed_power_up_is_revealed() {
        let mut state = open_state();
        let id = place_block(&mut state, 1, 5, Some(PowerUp::FireUp));
        destroy_soft_block(&mut state, id);
        finish_destruction(&mut state);
        assert_eq!(state.specials.len(), 1);
        let special = &state.specials[0];
        assert_eq!(special.kind, PowerUp::FireUp);
        assert_eq!(state.grid.cell(1, 5), Cell::Special(special.id));
    }

    #[test]
    fn test_pickup_applies_and_scores() {
        let mut state = open_state();
        place_special(&mut state, 1, 3, PowerUp::BombUp);
        state.player.pos = cell_to_pixel(1, 3);
        update_specials(&mut state);
        assert_eq!(state.player.bomb_limit, 2);
        assert_eq!(state.player.score, 500);
        assert!(state.specials.is_empty());
        assert!(state.grid.cell(1, 3).is_empty());
        assert!(state.events.contains(&GameEvent::Music(MusicCue::PowerUp)));
    }

    #[test]
    fn test_counters_are_capped() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning, 0);
        for _ in 0..20 {
            apply_power_up(&mut player, PowerUp::FireUp, &tuning, 0);
        }
        assert_eq!(player.power, tuning.max_power);
        assert!(PowerUp::FireUp.is_exhausted(&player, &tuning));
        assert!(!PowerUp::BombUp.is_exhausted(&player, &tuning));
    }

    #[test]
    fn test_speed_is_capped() {
        let tuning = Tuning::default();
        let mut player = Player::new(&tuning, 0);
        assert!(!PowerUp::SpeedUp.is_exhausted(&player, &tuning));
        for _ in 0..20 {
            apply_power_up(&mut player, PowerUp::SpeedUp, &tuning, 0);
        }
        assert_eq!(player.speed, tuning.max_speed);
        assert!(player.speed < crate::consts::SNAP_TOLERANCE);
        assert!(PowerUp::SpeedUp.is_exhausted(&player, &tuning));
    }

    #[test]
    fn test_exit_is_inert_while_enemies_remain() {
        let mut state = open_state();
        place_special(&mut state, 1, 3, PowerUp::Exit);
        stage::spawn_enemies(&mut state, &[EnemyKind::Ballom]);
        state.player.pos = cell_to_pixel(1, 3);
        update_specials(&mut state);
        assert_eq!(state.stage, 1);
        assert_eq!(state.player.score, 0);
        assert_eq!(state.specials.len(), 1);
    }

    #[test]
    fn test_exit_ends_stage_when_clear() {
        let mut state = open_state();
        place_special(&mut state, 1, 3, PowerUp::Exit);
        state.player.pos = cell_to_pixel(1, 3);
        update_specials(&mut state);
        assert_eq!(state.stage, 2);
        assert_eq!(state.player.score, 1000);
        assert!(matches!(state.phase, crate::sim::GamePhase::StageIntro { .. }));
    }

    #[test]
    fn test_hit_special_releases_wave() {
        let mut state = open_state();
        let id = place_special(&mut state, 1, 25, PowerUp::Remote);
        hit_special(&mut state, id);
        assert_eq!(state.enemies.len(), 10);
        assert!(state.enemies.iter().all(|e| e.kind == EnemyKind::Doria));
        // The special itself survives the blast
        assert_eq!(state.specials.len(), 1);
    }
}
