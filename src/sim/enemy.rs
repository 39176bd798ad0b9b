//! Enemies and their AI
//!
//! Each enemy walks in a straight line until it bumps into something, turns
//! at random, occasionally re-picks a direction at junctions, and (for the
//! smarter kinds) steers towards the player while it can see them.

use glam::IVec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::anim::{Animation, elapsed};
use super::collision::{masks_overlap, resolve_contact_ahead};
use super::grid::{Cell, EntityId, Grid};
use super::rect::{Direction, Rect};
use super::score;
use super::state::{GameState, SoundCue};
use crate::consts::{SIZE, Y_OFFSET};
use crate::tuning::Tuning;
use crate::{is_grid_aligned, pixel_to_cell};

/// The enemy roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Ballom,
    Onil,
    Dahl,
    Minvo,
    Doria,
    Ovape,
    Pass,
    Pontan,
}

/// Per-kind behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyStats {
    /// Pixels per tick
    pub speed: i32,
    /// Walks through soft blocks
    pub wall_hack: bool,
    /// Steers towards the player when in sight
    pub chases: bool,
    /// Sight range in cells (per axis)
    pub sight: i32,
    /// Soft blocks and bombs do not block its view
    pub see_through: bool,
    /// Points for killing it
    pub score: u64,
}

impl EnemyKind {
    pub fn stats(self) -> EnemyStats {
        let (speed, wall_hack, chases, sight, see_through, score) = match self {
            EnemyKind::Ballom => (1, false, false, 0, false, 100),
            EnemyKind::Onil => (2, false, true, 4, false, 200),
            EnemyKind::Dahl => (2, false, false, 0, false, 400),
            EnemyKind::Minvo => (2, false, true, 4, false, 800),
            EnemyKind::Doria => (1, true, true, 4, false, 1000),
            EnemyKind::Ovape => (1, true, true, 4, false, 2000),
            EnemyKind::Pass => (2, false, true, 6, false, 4000),
            EnemyKind::Pontan => (2, true, true, 6, true, 8000),
        };
        EnemyStats {
            speed,
            wall_hack,
            chases,
            sight,
            see_through,
            score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    /// Top-left pixel position
    pub pos: IVec2,
    pub direction: Direction,
    /// Last time the direction was re-picked
    pub redirected_at: u64,
    /// Playing the death animation
    pub destroyed: bool,
    pub anim: Animation,
}

impl Enemy {
    pub fn new(id: EntityId, kind: EnemyKind, row: i32, col: i32, now: u64) -> Self {
        Self {
            id,
            kind,
            pos: crate::cell_to_pixel(row, col),
            direction: Direction::Left,
            redirected_at: now,
            destroyed: false,
            anim: Animation::new(now),
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::cell_at(self.pos)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        !self.destroyed
    }

    /// Start the death animation. Returns false if already dying.
    pub fn destroy(&mut self, now: u64) -> bool {
        if self.destroyed {
            return false;
        }
        self.destroyed = true;
        self.anim.restart(now);
        true
    }

    /// Is `cell` in the way for this enemy?
    fn blocked_by(&self, cell: Option<Cell>) -> bool {
        match cell {
            None | Some(Cell::Hard) | Some(Cell::Bomb(_)) => true,
            Some(Cell::Soft(_)) => !self.kind.stats().wall_hack,
            Some(Cell::Empty) | Some(Cell::Special(_)) => false,
        }
    }

    /// One tick of movement and decision making. `target` is the player's
    /// centre while the player can be chased.
    pub fn think<R: Rng>(
        &mut self,
        grid: &Grid,
        target: Option<IVec2>,
        rng: &mut R,
        tuning: &Tuning,
        now: u64,
    ) {
        if self.destroyed {
            return;
        }
        let stats = self.kind.stats();

        self.pos += self.direction.delta() * stats.speed;

        if self.resolve_contacts(grid, stats) {
            self.redirect_after_contact(grid, rng, now);
        }

        if stats.chases
            && let Some(target) = target
            && self.can_see(grid, target, stats)
        {
            self.steer_towards(target, now);
        }

        if elapsed(now, self.redirected_at, tuning.enemy_redirect_ms) {
            self.redirect_at_junction(grid, rng, now);
        }
    }

    /// Clamp against hard blocks, soft blocks (unless wall-hack) and bombs.
    /// Returns true if anything was hit.
    fn resolve_contacts(&mut self, grid: &Grid, stats: EnemyStats) -> bool {
        let groups: [fn(Cell) -> bool; 3] = [
            |cell| cell.is_hard(),
            |cell| matches!(cell, Cell::Soft(_)),
            |cell| matches!(cell, Cell::Bomb(_)),
        ];
        let mut hit = false;
        for (i, solid) in groups.into_iter().enumerate() {
            if i == 1 && stats.wall_hack {
                continue;
            }
            let rect = self.rect();
            let obstacles = grid
                .cells_overlapping(rect)
                .filter(|&(_, _, cell)| solid(cell))
                .map(|(row, col, _)| Grid::cell_rect(row, col));
            if let Some(fixed) = resolve_contact_ahead(rect, self.direction, obstacles) {
                self.pos = fixed.top_left();
                hit = true;
            }
        }
        hit
    }

    /// Turn away from whatever was hit, preferring open neighbours
    fn redirect_after_contact<R: Rng>(&mut self, grid: &Grid, rng: &mut R, now: u64) {
        let (row, col) = pixel_to_cell(self.rect().center());
        let blocked = self.direction;
        let options: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&d| d != blocked && !self.blocked_by(grid.neighbor(row, col, d)))
            .collect();
        self.direction = options
            .choose(rng)
            .copied()
            .unwrap_or(blocked.opposite());
        self.redirected_at = now;
    }

    /// Periodic re-pick, only when sitting exactly on a junction cell
    fn redirect_at_junction<R: Rng>(&mut self, grid: &Grid, rng: &mut R, now: u64) {
        if !is_grid_aligned(self.pos) {
            return;
        }
        let (row, col) = pixel_to_cell(self.pos);
        if !Grid::is_junction(row, col) {
            return;
        }
        let wall_hack = self.kind.stats().wall_hack;
        let options: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&d| match grid.neighbor(row, col, d) {
                None | Some(Cell::Hard) => false,
                Some(cell) => wall_hack || cell.is_empty(),
            })
            .collect();
        self.direction = options.choose(rng).copied().unwrap_or(Direction::Left);
        self.redirected_at = now;
    }

    /// Within range on both axes and nothing opaque between the two centres
    fn can_see(&self, grid: &Grid, target: IVec2, stats: EnemyStats) -> bool {
        let eye = self.rect().center();
        let range = stats.sight * SIZE;
        let d = (target - eye).abs();
        if d.x > range || d.y > range {
            return false;
        }
        !grid
            .cells_in_span(eye.x, target.x, eye.y, target.y)
            .filter(|&(_, _, cell)| match cell {
                Cell::Hard => true,
                Cell::Soft(_) | Cell::Bomb(_) => !stats.see_through,
                Cell::Empty | Cell::Special(_) => false,
            })
            .any(|(row, col, _)| Grid::cell_rect(row, col).clips_segment(eye, target))
    }

    /// Head for the player's column first, then row. Turns only happen when
    /// centred on the cross axis.
    fn steer_towards(&mut self, target: IVec2, now: u64) {
        let (row, col) = pixel_to_cell(self.rect().center());
        let (target_row, target_col) = pixel_to_cell(target);
        let row_centred = (self.pos.y - Y_OFFSET).rem_euclid(SIZE) == 0;
        let col_centred = self.pos.x.rem_euclid(SIZE) == 0;

        let steer = if col > target_col && row_centred {
            Some(Direction::Left)
        } else if col < target_col && row_centred {
            Some(Direction::Right)
        } else if row > target_row && col_centred {
            Some(Direction::Up)
        } else if row < target_row && col_centred {
            Some(Direction::Down)
        } else {
            None
        };
        if let Some(dir) = steer {
            self.direction = dir;
            self.redirected_at = now;
        }
    }
}

/// Move every enemy, then retire the ones whose death animation is over
pub fn update_enemies(state: &mut GameState) {
    let now = state.time_ms;
    let target = state.player.is_alive().then(|| state.player.center());
    let walk_frames = state.sprites.enemy_walk;
    let death_frames = state.sprites.enemy_death;
    let frame_ms = state.tuning.enemy_frame_ms;

    let mut finished = Vec::new();
    for enemy in state.enemies.iter_mut() {
        if enemy.destroyed {
            if enemy.anim.step_once(now, frame_ms, death_frames) {
                finished.push(enemy.id);
            }
            continue;
        }
        enemy.think(&state.grid, target, &mut state.rng, &state.tuning, now);
        enemy.anim.step_looping(now, frame_ms, walk_frames);
    }

    for id in finished {
        let Some(idx) = state.enemies.iter().position(|e| e.id == id) else {
            continue;
        };
        let enemy = state.enemies.remove(idx);
        score::spawn_popup(state, enemy.pos, enemy.kind.stats().score);
    }
}

/// Kill every live enemy caught in a blast
pub fn blast_enemy_collisions(state: &mut GameState) {
    if state.blasts.is_empty() {
        return;
    }
    let now = state.time_ms;
    let blast_mask = state.sprites.blast_mask;
    let enemy_mask = state.sprites.enemy_mask;

    let mut kills = 0;
    for enemy in state.enemies.iter_mut().filter(|e| e.is_alive()) {
        let rect = enemy.rect();
        let hit = state
            .blasts
            .iter()
            .any(|b| masks_overlap(b.rect(), blast_mask, rect, enemy_mask));
        if hit && enemy.destroy(now) {
            log::debug!("Enemy {} ({:?}) destroyed", enemy.id, enemy.kind);
            kills += 1;
        }
    }
    for _ in 0..kills {
        state.sound(SoundCue::EnemyKill);
    }
}
