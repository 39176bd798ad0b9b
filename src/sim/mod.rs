//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod anim;
pub mod blast;
pub mod bomb;
pub mod collision;
pub mod enemy;
pub mod grid;
pub mod player;
pub mod rect;
pub mod score;
pub mod specials;
pub mod stage;
pub mod state;
pub mod tick;

pub use anim::Animation;
pub use blast::{BlastPiece, BlastSegment};
pub use bomb::Bomb;
pub use enemy::{Enemy, EnemyKind, EnemyStats};
pub use grid::{Cell, EntityId, Grid};
pub use player::{Abilities, DeathStage, Player, PlayerAction};
pub use rect::{Direction, Rect};
pub use score::ScorePopup;
pub use specials::{PowerUp, SoftBlock, Special};
pub use state::{GameEvent, GamePhase, GameState, MusicCue, SoundCue, StageClock};
pub use tick::{TickInput, tick};
