//! Stage lifecycle
//!
//! New games, stage transitions, procedural level generation, enemy
//! placement and the end-of-life bookkeeping.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::enemy::{Enemy, EnemyKind};
use super::grid::{Cell, Grid};
use super::player::Player;
use super::specials::{PowerUp, SoftBlock};
use super::state::{GameEvent, GamePhase, GameState, MusicCue, SoundCue, StageClock};

/// Start a fresh run at stage 1
pub fn new_game(state: &mut GameState) {
    state.player = Player::new(&state.tuning, state.time_ms);
    state.stage = 1;
    state.stage_special = select_special(state);
    state.emit(GameEvent::MusicStop);
    log::info!("New game (seed {})", state.seed);
    regenerate_stage(state);
}

/// Advance to the next stage, keeping the player's power-ups
pub fn new_stage(state: &mut GameState) {
    state.stage += 1;
    state.stage_special = select_special(state);
    state.player.return_to_start();
    regenerate_stage(state);
}

/// Throw away the current level and build a new one for the same stage
pub fn regenerate_stage(state: &mut GameState) {
    let now = state.time_ms;
    state.bombs.clear();
    state.soft_blocks.clear();
    state.specials.clear();
    state.blasts.clear();
    state.enemies.clear();
    state.popups.clear();
    state.popup_bonus = 0;
    state.player.bombs_planted = 0;

    generate_grid(state);
    let roster = state.tuning.difficulty.roster(state.stage, &mut state.rng);
    spawn_enemies(state, &roster);

    state.camera_x = 0;
    state.clock = StageClock::new(state.tuning.stage_seconds, now);
    state.music_playing = false;
    state.phase = GamePhase::StageIntro {
        until_ms: now + state.tuning.stage_intro_ms,
    };
    state.sound(SoundCue::StageStart);
    state.emit(GameEvent::StageStarted { stage: state.stage });
    log::info!(
        "Stage {} generated: {} soft blocks, {} enemies, special {:?}",
        state.stage,
        state.soft_blocks.len(),
        state.enemies.len(),
        state.stage_special
    );
}

/// Spawn cell neighbourhood kept free of soft blocks
fn in_safe_zone(state: &GameState, row: i32, col: i32) -> bool {
    let (r, c) = state.player.start;
    (row - r).abs() <= 1 && (col - c).abs() <= 1
}

/// Build the level: skeleton, random soft blocks, then one concealed special
/// and one concealed exit on cells that were left open
pub fn generate_grid(state: &mut GameState) {
    let mut grid = Grid::default();
    let one_in = state.tuning.soft_block_one_in.max(1);

    let mut open = Vec::new();
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            if grid.is_skeleton(row, col) || in_safe_zone(state, row, col) {
                continue;
            }
            if state.rng.random_range(0..one_in) == 0 {
                let id = state.next_entity_id();
                state.soft_blocks.push(SoftBlock::new(id, row, col, None));
                grid.set(row, col, Cell::Soft(id));
            } else {
                open.push((row, col));
            }
        }
    }

    for kind in [state.stage_special, PowerUp::Exit] {
        if open.is_empty() {
            log::warn!("No room left to hide {:?}", kind);
            break;
        }
        let (row, col) = open.swap_remove(state.rng.random_range(0..open.len()));
        let id = state.next_entity_id();
        state.soft_blocks.push(SoftBlock::new(id, row, col, Some(kind)));
        grid.set(row, col, Cell::Soft(id));
    }

    state.grid = grid;
}

/// Place enemies on random open cells away from the player
pub fn spawn_enemies(state: &mut GameState, kinds: &[EnemyKind]) {
    if kinds.is_empty() {
        return;
    }
    let (pr, pc) = state.player.cell();
    let clearance = state.tuning.spawn_clearance;
    let candidates: Vec<(i32, i32)> = state
        .grid
        .iter()
        .filter(|&(row, col, cell)| {
            cell.is_empty() && ((row - pr).abs() > clearance || (col - pc).abs() > clearance)
        })
        .map(|(row, col, _)| (row, col))
        .collect();

    let now = state.time_ms;
    for &kind in kinds {
        let Some(&(row, col)) = candidates.choose(&mut state.rng) else {
            log::warn!("No open cell to spawn {:?}", kind);
            return;
        };
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, kind, row, col, now));
    }
    log::debug!("Spawned {} enemies", kinds.len());
}

/// Power-up concealed in the current stage. Early stages are fixed; later
/// ones pick among what the player can still use.
pub fn select_special(state: &mut GameState) -> PowerUp {
    let player = &state.player;
    if state.stage == 4 {
        return PowerUp::SpeedUp;
    }
    if state.stage == 1 {
        return PowerUp::BombUp;
    }
    if player.bomb_limit <= 2 || player.power <= 2 {
        return if state.rng.random_bool(0.5) {
            PowerUp::BombUp
        } else {
            PowerUp::FireUp
        };
    }
    let options: Vec<PowerUp> = PowerUp::PICKUPS
        .into_iter()
        .filter(|kind| !kind.is_exhausted(player, &state.tuning))
        .collect();
    options
        .choose(&mut state.rng)
        .copied()
        .unwrap_or(PowerUp::Invincible)
}

/// The death sequence is over: take a life or end the run
pub fn lose_life(state: &mut GameState) {
    if state.player.lives == 0 {
        game_over(state);
        return;
    }
    state.player.lives -= 1;
    log::info!("Life lost, {} left", state.player.lives);
    let now = state.time_ms;
    state.player.reset_attributes(&state.tuning, now);
    regenerate_stage(state);
}

fn game_over(state: &mut GameState) {
    let score = state.player.score;
    let rank = state.check_top_score(score);
    state.phase = GamePhase::GameOver;
    state.bombs.clear();
    state.blasts.clear();
    state.emit(GameEvent::GameOver { score, rank });
    state.emit(GameEvent::Music(MusicCue::Title));
    log::info!("Game over on stage {} with {} points", state.stage, score);
}

/// Playing state on stage 1 with a bare skeleton and nothing else in it
#[cfg(test)]
pub(crate) fn clear_level(state: &mut GameState) {
    state.phase = GamePhase::Playing;
    state.stage = 1;
    state.grid = Grid::default();
    state.bombs.clear();
    state.soft_blocks.clear();
    state.specials.clear();
    state.blasts.clear();
    state.enemies.clear();
    state.popups.clear();
    state.popup_bonus = 0;
    let now = state.time_ms;
    state.player.reset_attributes(&state.tuning, now);
    state.events.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PLAYER_START;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    fn started(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        new_game(&mut state);
        state
    }

    /// Cells reachable from the spawn cell through anything but hard blocks
    fn reachable(grid: &Grid, from: (i32, i32)) -> usize {
        let mut seen = vec![false; (grid.rows() * grid.cols()) as usize];
        let mut queue = VecDeque::from([from]);
        seen[(from.0 * grid.cols() + from.1) as usize] = true;
        let mut count = 0;
        while let Some((row, col)) = queue.pop_front() {
            count += 1;
            for dir in crate::sim::Direction::ALL {
                let (dr, dc) = dir.cell_delta();
                let (r, c) = (row + dr, col + dc);
                if let Some(cell) = grid.get(r, c)
                    && !cell.is_hard()
                    && !seen[(r * grid.cols() + c) as usize]
                {
                    seen[(r * grid.cols() + c) as usize] = true;
                    queue.push_back((r, c));
                }
            }
        }
        count
    }

    #[test]
    fn test_new_game_enters_stage_intro() {
        let state = started(9);
        assert_eq!(state.stage, 1);
        assert_eq!(state.stage_special, PowerUp::BombUp);
        assert_eq!(state.player.lives, 5);
        assert!(matches!(state.phase, GamePhase::StageIntro { until_ms: 2800 }));
        assert!(state.events.contains(&GameEvent::StageStarted { stage: 1 }));
        assert_eq!(state.enemies.len(), 10);
    }

    #[test]
    fn test_safe_zone_is_clear() {
        for seed in 0..20 {
            let state = started(seed);
            let (r, c) = PLAYER_START;
            for row in r - 1..=r + 1 {
                for col in c - 1..=c + 1 {
                    assert!(!matches!(state.grid.cell(row, col), Cell::Soft(_)));
                }
            }
        }
    }

    #[test]
    fn test_special_and_exit_are_concealed() {
        let state = started(4);
        let hidden: Vec<_> = state.soft_blocks.iter().filter_map(|b| b.conceals).collect();
        assert_eq!(hidden.len(), 2);
        assert!(hidden.contains(&PowerUp::BombUp));
        assert!(hidden.contains(&PowerUp::Exit));
    }

    #[test]
    fn test_enemies_spawn_away_from_player() {
        for seed in 0..20 {
            let state = started(seed);
            let (pr, pc) = state.player.cell();
            for enemy in &state.enemies {
                let (row, col) = crate::pixel_to_cell(enemy.pos);
                assert!((row - pr).abs() > 3 || (col - pc).abs() > 3);
                assert!(state.grid.cell(row, col).is_empty());
            }
        }
    }

    #[test]
    fn test_special_selection_rules() {
        let mut state = started(1);
        state.stage = 4;
        assert_eq!(select_special(&mut state), PowerUp::SpeedUp);

        state.stage = 7;
        for _ in 0..20 {
            let pick = select_special(&mut state);
            assert!(matches!(pick, PowerUp::BombUp | PowerUp::FireUp));
        }

        state.player.bomb_limit = 10;
        state.player.power = 5;
        state.player.abilities.wall_hack = true;
        state.player.abilities.remote = true;
        for _ in 0..50 {
            let pick = select_special(&mut state);
            assert!(!matches!(
                pick,
                PowerUp::BombUp | PowerUp::WallHack | PowerUp::Remote | PowerUp::Exit
            ));
        }
    }

    #[test]
    fn test_new_stage_keeps_power_ups() {
        let mut state = started(2);
        state.player.power = 3;
        state.player.score = 1200;
        state.player.pos.x += 200;
        new_stage(&mut state);
        assert_eq!(state.stage, 2);
        assert_eq!(state.player.power, 3);
        assert_eq!(state.player.score, 1200);
        assert_eq!(state.player.cell(), PLAYER_START);
        assert_eq!(state.camera_x, 0);
    }

    #[test]
    fn test_sixth_death_is_game_over() {
        let mut state = started(5);
        state.player.score = 4300;
        for death in 1..=5 {
            lose_life(&mut state);
            assert_eq!(state.player.lives, 5 - death);
            assert!(matches!(state.phase, GamePhase::StageIntro { .. }));
        }
        state.events.clear();
        lose_life(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.top_score(), 4300);
        assert!(state.events.contains(&GameEvent::GameOver {
            score: 4300,
            rank: Some(1)
        }));
    }

    #[test]
    fn test_life_lost_resets_bomb_count() {
        let mut state = started(6);
        state.player.bombs_planted = 1;
        state.player.power = 4;
        lose_life(&mut state);
        assert_eq!(state.player.bombs_planted, 0);
        assert_eq!(state.player.power, 1);
        assert!(state.bombs.is_empty());
    }

    proptest! {
        #[test]
        fn prop_generated_grid_keeps_skeleton_and_connectivity(seed in any::<u64>(), stage in 1u32..60) {
            let mut state = GameState::new(seed);
            state.stage = stage;
            state.stage_special = select_special(&mut state);
            generate_grid(&mut state);
            let grid = &state.grid;

            let mut open = 0;
            for (row, col, cell) in grid.iter() {
                if grid.is_skeleton(row, col) {
                    prop_assert!(cell.is_hard());
                } else {
                    prop_assert!(!cell.is_hard());
                    open += 1;
                }
            }
            prop_assert_eq!(reachable(grid, PLAYER_START), open);
        }
    }
}
