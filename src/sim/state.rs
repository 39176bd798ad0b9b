//! Game state and core simulation types
//!
//! The state owns the level grid and every entity collection. Entities refer
//! to each other only through ids; anything cross-cutting (spawning, grid
//! mutation, sounds) is done by functions taking `&mut GameState`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::blast::BlastSegment;
use super::bomb::Bomb;
use super::collision::PlayArea;
use super::enemy::Enemy;
use super::grid::{EntityId, Grid};
use super::player::Player;
use super::score::ScorePopup;
use super::specials::{PowerUp, SoftBlock, Special};
use crate::assets::{AssetProvider, BuiltinAssets, SpriteTable};
use crate::consts::{CAMERA_LEAD, SCREEN_WIDTH};
use crate::highscores::HighScores;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for a start intent
    Title,
    /// "STAGE n" transition screen
    StageIntro { until_ms: u64 },
    /// Active gameplay
    Playing,
    /// Run ended; a start intent begins a new game
    GameOver,
}

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Footstep while walking left/right
    WalkHorizontal,
    /// Footstep while walking up/down
    WalkVertical,
    BombPlant,
    Explosion,
    PowerUp,
    EnemyKill,
    /// Player struck
    PlayerDeath,
    /// Jingle after the death animation
    Miss,
    StageStart,
    StageClear,
}

/// Looping background tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MusicCue {
    Title,
    Main,
    PowerUp,
}

/// Notifications for the host (audio, UI)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundCue),
    Music(MusicCue),
    MusicStop,
    StageStarted { stage: u32 },
    GameOver { score: u64, rank: Option<usize> },
}

/// Stage countdown shown on the info panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageClock {
    pub seconds_left: u32,
    /// Simulation time of the last one-second tick
    pub ticked_at: u64,
}

impl StageClock {
    pub fn new(seconds: u32, now: u64) -> Self {
        Self {
            seconds_left: seconds,
            ticked_at: now,
        }
    }

    /// Count down one second per 1000ms. Returns true on the tick that hits zero.
    pub fn update(&mut self, now: u64) -> bool {
        if self.seconds_left == 0 || now.saturating_sub(self.ticked_at) < 1000 {
            return false;
        }
        self.ticked_at = now;
        self.seconds_left -= 1;
        self.seconds_left == 0
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Simulation RNG
    pub rng: Pcg32,
    /// Balance constants
    pub tuning: Tuning,
    /// Animation lengths and masks from the asset provider
    pub sprites: SpriteTable,
    /// Simulation clock
    pub time_ms: u64,
    /// Current phase
    pub phase: GamePhase,
    /// Stage number (1-based)
    pub stage: u32,
    /// Power-up concealed in this stage
    pub stage_special: PowerUp,
    /// Level matrix
    pub grid: Grid,
    pub player: Player,
    pub bombs: Vec<Bomb>,
    pub soft_blocks: Vec<SoftBlock>,
    pub specials: Vec<Special>,
    pub blasts: Vec<BlastSegment>,
    pub enemies: Vec<Enemy>,
    pub popups: Vec<ScorePopup>,
    /// Concurrently active score popups (multi-kill bonus)
    pub popup_bonus: u32,
    pub clock: StageClock,
    /// Horizontal camera offset
    pub camera_x: i32,
    /// Whether the stage theme is playing
    pub music_playing: bool,
    /// Top score leaderboard
    pub high_scores: HighScores,
    /// Pending host notifications
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: EntityId,
}

impl GameState {
    /// Title-screen state with default tuning and built-in sprite numbers
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, Tuning::default(), &BuiltinAssets)
    }

    pub fn with_config(seed: u64, tuning: Tuning, assets: &dyn AssetProvider) -> Self {
        let player = Player::new(&tuning, 0);
        let clock = StageClock::new(tuning.stage_seconds, 0);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            sprites: SpriteTable::capture(assets),
            time_ms: 0,
            phase: GamePhase::Title,
            stage: 0,
            stage_special: PowerUp::BombUp,
            grid: Grid::default(),
            player,
            bombs: Vec::new(),
            soft_blocks: Vec::new(),
            specials: Vec::new(),
            blasts: Vec::new(),
            enemies: Vec::new(),
            popups: Vec::new(),
            popup_bonus: 0,
            clock,
            camera_x: 0,
            music_playing: false,
            high_scores: HighScores::new(),
            events: vec![GameEvent::Music(MusicCue::Title)],
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Queue a host notification
    #[inline]
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn sound(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Bounds for the player's top-left corner
    pub fn play_area(&self) -> PlayArea {
        PlayArea::for_grid(self.grid.rows(), self.grid.cols())
    }

    pub fn special(&self, id: EntityId) -> Option<&Special> {
        self.specials.iter().find(|s| s.id == id)
    }

    /// Follow the player horizontally once they pass the camera lead
    pub fn update_camera(&mut self) {
        let x = self.player.pos.x;
        let max_x = self.grid.width_px() - SCREEN_WIDTH + CAMERA_LEAD;
        if (CAMERA_LEAD..=max_x).contains(&x) {
            self.camera_x = x - CAMERA_LEAD;
        }
    }

    /// Record a final score on the leaderboard. Returns the rank achieved.
    pub fn check_top_score(&mut self, score: u64) -> Option<usize> {
        let rank = self.high_scores.add_score(score, self.stage, self.time_ms);
        if let Some(rank) = rank {
            log::info!("Score {} entered the leaderboard at #{}", score, rank);
        }
        rank
    }

    /// Top score so far (0 if none)
    pub fn top_score(&self) -> u64 {
        self.high_scores.top_score().unwrap_or(0)
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.bombs.sort_by_key(|b| b.id);
        self.soft_blocks.sort_by_key(|b| b.id);
        self.specials.sort_by_key(|s| s.id);
        self.blasts.sort_by_key(|b| b.id);
        self.enemies.sort_by_key(|e| e.id);
        self.popups.sort_by_key(|p| p.id);
    }
}
