//! Data-driven game balance
//!
//! Every gameplay constant that a designer might want to tweak lives here,
//! with the arcade defaults. Loadable from JSON; missing fields fall back to
//! the defaults.

use std::path::Path;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::sim::EnemyKind;

/// Gameplay timing and balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Lives at the start of a game
    pub lives: u32,
    /// Player walking speed (px per tick)
    pub player_speed: i32,
    /// Player walk animation frame time
    pub player_frame_ms: u64,
    /// Minimum gap between walk-step sounds
    pub walk_sound_ms: u64,
    /// Pause after the death animation before the miss jingle
    pub death_pause_ms: u64,
    /// Length of the miss jingle before respawn/game over
    pub death_jingle_ms: u64,
    /// Invincibility power-up duration
    pub invincibility_ms: u64,
    /// Upper bound for the bomb limit
    pub max_bombs: u32,
    /// Upper bound for blast power
    pub max_power: u32,
    /// Upper bound for walking speed; stays below the snap band
    pub max_speed: i32,

    /// Bomb animation frame time (the fuse counts these frames)
    pub bomb_frame_ms: u64,
    /// Bomb frames until automatic detonation
    pub bomb_fuse_frames: u32,
    /// Blast segment animation frame time
    pub blast_frame_ms: u64,
    /// Soft block destruction animation frame time
    pub soft_block_frame_ms: u64,

    /// Enemy animation frame time
    pub enemy_frame_ms: u64,
    /// Periodic enemy redirect interval
    pub enemy_redirect_ms: u64,

    /// Score popup lifetime
    pub popup_ms: u64,
    /// Points for collecting a power-up
    pub power_up_score: u64,
    /// Points for leaving through the exit
    pub exit_score: u64,

    /// Stage intro screen duration
    pub stage_intro_ms: u64,
    /// Stage countdown in seconds
    pub stage_seconds: u32,
    /// Enemies spawned when a special is hit by a blast
    pub special_wave_size: usize,
    /// Enemies spawned when the stage clock runs out
    pub timeout_wave_size: usize,
    /// Soft block density: one in `soft_block_one_in` open cells
    pub soft_block_one_in: u32,
    /// Enemies never spawn within this many cells of the player
    pub spawn_clearance: i32,

    /// Stage to enemy roster lookup
    pub difficulty: DifficultyTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lives: 5,
            player_speed: 3,
            player_frame_ms: 50,
            walk_sound_ms: 200,
            death_pause_ms: 400,
            death_jingle_ms: 2500,
            invincibility_ms: 20_000,
            max_bombs: 10,
            max_power: 10,
            max_speed: 6,

            bomb_frame_ms: 200,
            bomb_fuse_frames: 11,
            blast_frame_ms: 75,
            soft_block_frame_ms: 100,

            enemy_frame_ms: 100,
            enemy_redirect_ms: 1500,

            popup_ms: 1000,
            power_up_score: 500,
            exit_score: 1000,

            stage_intro_ms: 2800,
            stage_seconds: 200,
            special_wave_size: 10,
            timeout_wave_size: 10,
            soft_block_one_in: 4,
            spawn_clearance: 3,

            difficulty: DifficultyTable::default(),
        }
    }
}

impl Tuning {
    /// Parse from JSON (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from a JSON file, falling back to the arcade defaults
    pub fn load_from(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("No tuning at {} ({}), using defaults", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring bad tuning file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// One band of the difficulty table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterTier {
    /// Last stage (inclusive) this tier applies to
    pub up_to_stage: u32,
    /// Number of basic enemies
    pub basic: usize,
    /// Number of the stage's featured enemy
    pub featured: usize,
    /// Number of randomly chosen enemies
    pub wildcards: usize,
}

impl RosterTier {
    const fn new(up_to_stage: u32, basic: usize, featured: usize, wildcards: usize) -> Self {
        Self {
            up_to_stage,
            basic,
            featured,
            wildcards,
        }
    }
}

/// Stage number to enemy roster composition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTable {
    /// Tiers in ascending stage order; the last one covers every later stage
    pub tiers: Vec<RosterTier>,
    /// Featured enemy is `rotation[stage % rotation.len()]`; wildcards draw from it
    pub rotation: Vec<EnemyKind>,
    /// Kind used for the basic slots
    pub basic: EnemyKind,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                RosterTier::new(8, 8, 2, 0),
                RosterTier::new(17, 7, 2, 1),
                RosterTier::new(26, 6, 3, 1),
                RosterTier::new(35, 5, 3, 2),
                RosterTier::new(45, 4, 4, 2),
                RosterTier::new(u32::MAX, 3, 4, 4),
            ],
            rotation: vec![
                EnemyKind::Ballom,
                EnemyKind::Ballom,
                EnemyKind::Onil,
                EnemyKind::Dahl,
                EnemyKind::Minvo,
                EnemyKind::Doria,
                EnemyKind::Ovape,
                EnemyKind::Pass,
                EnemyKind::Pontan,
            ],
            basic: EnemyKind::Ballom,
        }
    }
}

impl DifficultyTable {
    /// Tier for a stage (the last tier if none matches)
    pub fn tier(&self, stage: u32) -> Option<&RosterTier> {
        self.tiers
            .iter()
            .find(|t| stage <= t.up_to_stage)
            .or_else(|| self.tiers.last())
    }

    /// The enemy that headlines a stage
    pub fn featured(&self, stage: u32) -> EnemyKind {
        if self.rotation.is_empty() {
            return self.basic;
        }
        self.rotation[stage as usize % self.rotation.len()]
    }

    /// Enemy roster for a stage
    pub fn roster<R: Rng>(&self, stage: u32, rng: &mut R) -> Vec<EnemyKind> {
        let Some(tier) = self.tier(stage) else {
            return Vec::new();
        };
        let mut roster = Vec::with_capacity(tier.basic + tier.featured + tier.wildcards);
        roster.extend(std::iter::repeat_n(self.basic, tier.basic));
        roster.extend(std::iter::repeat_n(self.featured(stage), tier.featured));
        for _ in 0..tier.wildcards {
            roster.push(self.rotation.choose(rng).copied().unwrap_or(self.basic));
        }
        roster
    }
}
