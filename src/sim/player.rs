//! The player character
//!
//! Walking, grid snapping, first-contact collision against the level, the
//! invincibility window and the multi-stage death sequence.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::anim::{Animation, elapsed};
use super::bomb::Bomb;
use super::collision::{PlayArea, resolve_first_contact, snap_to_grid};
use super::grid::{Cell, Grid};
use super::rect::{Direction, Rect};
use super::state::SoundCue;
use crate::assets::SpriteTable;
use crate::consts::PLAYER_START;
use crate::tuning::Tuning;
use crate::{cell_to_pixel, pixel_to_cell};

/// What the player sprite is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    Walk(Direction),
    Dying,
}

/// Death sequence: animation, short pause, miss jingle, then respawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathStage {
    Alive,
    /// Death animation playing
    Animating,
    /// Sprite hidden, waiting before the jingle
    Pause { since: u64 },
    /// Miss jingle playing
    Jingle { since: u64 },
}

/// What the death sequence asks the orchestrator to do this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathProgress {
    Waiting,
    /// Play the miss jingle
    Jingle,
    /// Sequence over: take a life
    Finished,
}

/// Abilities granted by power-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Abilities {
    /// Walk through soft blocks
    pub wall_hack: bool,
    /// Walk through bombs
    pub bomb_pass: bool,
    /// Immune to blasts
    pub flame_pass: bool,
    /// Bombs wait for a detonate intent
    pub remote: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left pixel position
    pub pos: IVec2,
    /// Spawn cell (row, col)
    pub start: (i32, i32),
    pub action: PlayerAction,
    pub anim: Animation,
    /// Pixels per tick
    pub speed: i32,
    pub bomb_limit: u32,
    /// Blast radius in cells
    pub power: u32,
    pub bombs_planted: u32,
    pub abilities: Abilities,
    /// Start of the invincibility window
    pub invincible_since: Option<u64>,
    pub lives: u32,
    pub score: u64,
    pub death: DeathStage,
    /// Last walk-step sound
    walk_sound_at: u64,
}

impl Player {
    pub fn new(tuning: &Tuning, now: u64) -> Self {
        let mut player = Self {
            pos: IVec2::ZERO,
            start: PLAYER_START,
            action: PlayerAction::Walk(Direction::Right),
            anim: Animation::new(now),
            speed: tuning.player_speed,
            bomb_limit: 1,
            power: 1,
            bombs_planted: 0,
            abilities: Abilities::default(),
            invincible_since: None,
            lives: tuning.lives,
            score: 0,
            death: DeathStage::Alive,
            walk_sound_at: now,
        };
        player.reset_attributes(tuning, now);
        player
    }

    /// Fresh life: back at the spawn cell with starting attributes.
    /// Lives and score carry over.
    pub fn reset_attributes(&mut self, tuning: &Tuning, now: u64) {
        self.return_to_start();
        self.speed = tuning.player_speed;
        self.bomb_limit = 1;
        self.power = 1;
        self.bombs_planted = 0;
        self.abilities = Abilities::default();
        self.invincible_since = None;
        self.action = PlayerAction::Walk(Direction::Right);
        self.anim.restart(now);
        self.death = DeathStage::Alive;
    }

    pub fn return_to_start(&mut self) {
        self.pos = cell_to_pixel(self.start.0, self.start.1);
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::cell_at(self.pos)
    }

    #[inline]
    pub fn center(&self) -> IVec2 {
        self.rect().center()
    }

    /// Cell under the player's centre
    pub fn cell(&self) -> (i32, i32) {
        pixel_to_cell(self.center())
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.death == DeathStage::Alive
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_since.is_some()
    }

    /// Hidden during the pause and jingle of the death sequence
    pub fn is_visible(&self) -> bool {
        !matches!(
            self.death,
            DeathStage::Pause { .. } | DeathStage::Jingle { .. }
        )
    }

    pub fn grant_invincibility(&mut self, now: u64) {
        self.invincible_since = Some(now);
    }

    /// Drop invincibility once its window has run out
    pub fn update_invincibility(&mut self, now: u64, duration_ms: u64) {
        if let Some(since) = self.invincible_since
            && elapsed(now, since, duration_ms)
        {
            self.invincible_since = None;
        }
    }

    /// Walk one tick in `dir`. Returns a footstep cue when one is due.
    #[allow(clippy::too_many_arguments)]
    pub fn walk(
        &mut self,
        dir: Direction,
        grid: &Grid,
        bombs: &[Bomb],
        area: PlayArea,
        tuning: &Tuning,
        sprites: &SpriteTable,
        now: u64,
    ) -> Option<SoundCue> {
        if !self.is_alive() {
            return None;
        }

        if self.action != PlayerAction::Walk(dir) {
            self.action = PlayerAction::Walk(dir);
            self.anim.restart(now);
        }

        self.pos += dir.delta() * self.speed;

        let cue = if elapsed(now, self.walk_sound_at, tuning.walk_sound_ms) {
            self.walk_sound_at = now;
            Some(if dir.is_horizontal() {
                SoundCue::WalkHorizontal
            } else {
                SoundCue::WalkVertical
            })
        } else {
            None
        };

        self.anim
            .step_looping(now, tuning.player_frame_ms, sprites.player_walk);

        self.pos = snap_to_grid(self.pos, dir);
        self.pos = area.restrict(self.pos);

        // Hard blocks always stop the player
        self.collide(dir, grid, |cell| cell.is_hard());
        if !self.abilities.wall_hack {
            self.collide(dir, grid, |cell| matches!(cell, Cell::Soft(_)));
        }
        if !self.abilities.bomb_pass {
            self.collide(dir, grid, |cell| match cell {
                Cell::Bomb(id) => bombs.iter().any(|b| b.id == id && !b.passable),
                _ => false,
            });
        }

        cue
    }

    fn collide(&mut self, dir: Direction, grid: &Grid, solid: impl Fn(Cell) -> bool) {
        let rect = self.rect();
        let obstacles = grid
            .cells_overlapping(rect)
            .filter(|&(_, _, cell)| solid(cell))
            .map(|(row, col, _)| Grid::cell_rect(row, col));
        if let Some(fixed) = resolve_first_contact(rect, dir, obstacles) {
            self.pos = fixed.top_left();
        }
    }

    /// Struck by a blast or an enemy
    pub fn kill(&mut self, now: u64) {
        if !self.is_alive() {
            return;
        }
        self.action = PlayerAction::Dying;
        self.death = DeathStage::Animating;
        self.anim.restart(now);
    }

    /// Advance the death sequence
    pub fn advance_death(&mut self, now: u64, tuning: &Tuning, sprites: &SpriteTable) -> DeathProgress {
        match self.death {
            DeathStage::Alive => DeathProgress::Waiting,
            DeathStage::Animating => {
                if self
                    .anim
                    .step_once(now, tuning.player_frame_ms, sprites.player_death)
                {
                    self.anim.frame = 0;
                    self.death = DeathStage::Pause { since: now };
                }
                DeathProgress::Waiting
            }
            DeathStage::Pause { since } => {
                if elapsed(now, since, tuning.death_pause_ms) {
                    self.anim.frame = sprites.player_death.saturating_sub(1);
                    self.death = DeathStage::Jingle { since: now };
                    DeathProgress::Jingle
                } else {
                    DeathProgress::Waiting
                }
            }
            DeathStage::Jingle { since } => {
                if elapsed(now, since, tuning.death_jingle_ms) {
                    DeathProgress::Finished
                } else {
                    DeathProgress::Waiting
                }
            }
        }
    }
}
