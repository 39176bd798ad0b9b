//! Blast Maze - A grid maze arcade game with bombs
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, movement, blasts, enemy AI, stages)
//! - `renderer`: Draw pass against an abstract render target
//! - `assets`: Animation frame counts and collision masks
//! - `audio`: Sound cue routing
//! - `tuning`: Data-driven game balance
//! - `highscores`, `settings`: Host-side persistence

pub mod assets;
pub mod audio;
pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (~60 Hz)
    pub const SIM_DT_MS: u64 = 16;

    /// Cell size in pixels
    pub const SIZE: i32 = 64;
    /// Highest row index of the level grid (grid has ROWS + 1 rows)
    pub const ROWS: i32 = 12;
    /// Highest column index of the level grid (grid has COLS + 1 columns)
    pub const COLS: i32 = 30;
    /// Vertical offset of the play field below the info panel
    pub const Y_OFFSET: i32 = 96;

    /// Visible screen width
    pub const SCREEN_WIDTH: i32 = 1280;
    /// Player x at which the camera starts scrolling
    pub const CAMERA_LEAD: i32 = 576;

    /// Player spawn cell (row, col)
    pub const PLAYER_START: (i32, i32) = (3, 2);

    /// Grid snapping tolerance band (px from a grid line)
    pub const SNAP_TOLERANCE: i32 = 12;
}

use consts::{SIZE, Y_OFFSET};

/// Top-left pixel of a grid cell
#[inline]
pub fn cell_to_pixel(row: i32, col: i32) -> IVec2 {
    IVec2::new(col * SIZE, row * SIZE + Y_OFFSET)
}

/// Grid cell (row, col) containing a pixel
#[inline]
pub fn pixel_to_cell(pos: IVec2) -> (i32, i32) {
    ((pos.y - Y_OFFSET).div_euclid(SIZE), pos.x.div_euclid(SIZE))
}

/// True if a top-left pixel position sits exactly on grid lines
#[inline]
pub fn is_grid_aligned(pos: IVec2) -> bool {
    pos.x.rem_euclid(SIZE) == 0 && (pos.y - Y_OFFSET).rem_euclid(SIZE) == 0
}
