//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::bomb::{plant_bomb, remote_detonate, update_bombs};
use super::blast::update_blasts;
use super::collision::masks_overlap;
use super::enemy::{EnemyKind, blast_enemy_collisions, update_enemies};
use super::player::DeathProgress;
use super::rect::Direction;
use super::score::update_popups;
use super::specials::{update_soft_blocks, update_specials};
use super::stage::{lose_life, new_game, spawn_enemies};
use super::state::{GameEvent, GamePhase, GameState, MusicCue, SoundCue};

/// Input intents for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub right: bool,
    pub left: bool,
    pub up: bool,
    pub down: bool,
    /// Plant a bomb under the player
    pub plant_bomb: bool,
    /// Remote-detonate the newest bomb
    pub detonate: bool,
    /// Start a game from the title or game over screen
    pub start: bool,
}

impl TickInput {
    /// One walk direction per tick; right, left, up, down in that priority
    pub fn walk_direction(&self) -> Option<Direction> {
        if self.right {
            Some(Direction::Right)
        } else if self.left {
            Some(Direction::Left)
        } else if self.up {
            Some(Direction::Up)
        } else if self.down {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: u64) {
    state.time_ms += dt_ms;
    let now = state.time_ms;

    match state.phase {
        GamePhase::Title | GamePhase::GameOver => {
            if input.start {
                new_game(state);
            }
            return;
        }
        GamePhase::StageIntro { until_ms } => {
            if now < until_ms {
                return;
            }
            state.phase = GamePhase::Playing;
            // The countdown starts with play, not with the intro screen
            state.clock.ticked_at = now;
        }
        GamePhase::Playing => {}
    }

    update_music(state);

    if state.clock.update(now) {
        log::info!("Time up on stage {}", state.stage);
        let wave = vec![EnemyKind::Pontan; state.tuning.timeout_wave_size];
        spawn_enemies(state, &wave);
    }

    handle_input(state, input);

    update_soft_blocks(state);
    update_bombs(state);
    update_specials(state);
    if !state.is_playing() {
        // Exit taken
        return;
    }
    update_blasts(state);
    update_enemies(state);
    if update_player(state) {
        return;
    }
    update_popups(state);
    blast_enemy_collisions(state);

    state.update_camera();
    state.normalize_order();
}

/// Stage theme while enemies remain; stage-clear fanfare once they're gone
fn update_music(state: &mut GameState) {
    if !state.music_playing && !state.enemies.is_empty() {
        state.music_playing = true;
        state.emit(GameEvent::Music(MusicCue::Main));
    } else if state.music_playing && state.enemies.is_empty() {
        state.music_playing = false;
        state.emit(GameEvent::MusicStop);
        state.sound(SoundCue::StageClear);
    }
}

fn handle_input(state: &mut GameState, input: &TickInput) {
    if !state.player.is_alive() {
        return;
    }
    let now = state.time_ms;

    if let Some(dir) = input.walk_direction() {
        let area = state.play_area();
        let cue = state.player.walk(
            dir,
            &state.grid,
            &state.bombs,
            area,
            &state.tuning,
            &state.sprites,
            now,
        );
        if let Some(cue) = cue {
            state.sound(cue);
        }
    }
    if input.plant_bomb {
        plant_bomb(state);
    }
    if input.detonate {
        remote_detonate(state);
    }
}

/// Invincibility, deadly contacts and the death sequence.
/// Returns true if the stage was torn down.
fn update_player(state: &mut GameState) -> bool {
    let now = state.time_ms;

    if state.player.is_alive() {
        // Expire first: the window is [since, since + duration)
        state
            .player
            .update_invincibility(now, state.tuning.invincibility_ms);
        if !state.player.is_invincible() && touches_hazard(state) {
            state.player.kill(now);
            state.emit(GameEvent::MusicStop);
            state.sound(SoundCue::PlayerDeath);
            log::info!("Player died on stage {}", state.stage);
        }
        return false;
    }

    match state
        .player
        .advance_death(now, &state.tuning, &state.sprites)
    {
        DeathProgress::Waiting => false,
        DeathProgress::Jingle => {
            state.sound(SoundCue::Miss);
            false
        }
        DeathProgress::Finished => {
            lose_life(state);
            true
        }
    }
}

/// Blast segments (unless flame-pass) or enemies under the player. An enemy
/// stays deadly until its death animation has finished.
fn touches_hazard(state: &GameState) -> bool {
    let rect = state.player.rect();
    let mask = state.sprites.player_mask;

    let burnt = !state.player.abilities.flame_pass
        && state
            .blasts
            .iter()
            .any(|b| masks_overlap(rect, mask, b.rect(), state.sprites.blast_mask));
    burnt
        || state
            .enemies
            .iter()
            .any(|e| masks_overlap(rect, mask, e.rect(), state.sprites.enemy_mask))
}
