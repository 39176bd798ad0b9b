//! Draw pass
//!
//! The game never touches pixels. `render` walks the state and issues
//! `(image, position)` blits against a `RenderTarget`; the host rasterizes.

mod image;

pub use image::ImageKey;

use glam::IVec2;

use crate::consts::{ROWS, SCREEN_WIDTH, SIZE, Y_OFFSET};
use crate::sim::{BlastPiece, Cell, GamePhase, GameState, Grid, PlayerAction};

/// Full window height: info panel plus the level
pub const SCREEN_HEIGHT: i32 = Y_OFFSET + (ROWS + 1) * SIZE;

/// Width of one digit glyph
const DIGIT_WIDTH: i32 = 32;

/// Anything that can draw an image at a screen position
pub trait RenderTarget {
    fn blit(&mut self, image: ImageKey, pos: IVec2);
}

/// Recorded draw calls, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawList {
    pub calls: Vec<(ImageKey, IVec2)>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl RenderTarget for DrawList {
    fn blit(&mut self, image: ImageKey, pos: IVec2) {
        self.calls.push((image, pos));
    }
}

/// Render the current frame
pub fn render(state: &GameState, target: &mut dyn RenderTarget) {
    match state.phase {
        GamePhase::Title => target.blit(ImageKey::TitleScreen, IVec2::ZERO),
        GamePhase::GameOver => target.blit(ImageKey::GameOverScreen, IVec2::ZERO),
        GamePhase::StageIntro { .. } => render_stage_intro(state.stage, target),
        GamePhase::Playing => render_level(state, target),
    }
}

/// "STAGE n" on a black screen
fn render_stage_intro(stage: u32, target: &mut dyn RenderTarget) {
    let y = SCREEN_HEIGHT / 2 - SIZE;
    target.blit(ImageKey::StageWord, IVec2::new(SCREEN_WIDTH / 2 - 4 * SIZE, y));
    let digits = digits(stage);
    let x0 = if digits.len() == 1 {
        SCREEN_WIDTH / 2 + SIZE
    } else {
        SCREEN_WIDTH / 2 + DIGIT_WIDTH
    };
    for (i, d) in digits.into_iter().enumerate() {
        target.blit(ImageKey::Digit(d), IVec2::new(x0 + i as i32 * DIGIT_WIDTH, y));
    }
}

fn digits(n: u32) -> Vec<u8> {
    n.to_string().bytes().map(|b| b - b'0').collect()
}

/// Screen-space blit with the camera applied; off-screen images are skipped
struct Camera<'a> {
    target: &'a mut dyn RenderTarget,
    x: i32,
}

impl Camera<'_> {
    fn blit(&mut self, image: ImageKey, world: IVec2) {
        let pos = IVec2::new(world.x - self.x, world.y);
        if pos.x + SIZE <= 0 || pos.x >= SCREEN_WIDTH {
            return;
        }
        self.target.blit(image, pos);
    }
}

fn render_level(state: &GameState, target: &mut dyn RenderTarget) {
    let mut cam = Camera {
        target,
        x: state.camera_x,
    };

    for (row, col, cell) in state.grid.iter() {
        if cell == Cell::Hard {
            cam.blit(ImageKey::HardBlock, Grid::cell_rect(row, col).top_left());
        }
    }

    for special in &state.specials {
        cam.blit(ImageKey::PowerUp(special.kind), special.rect().top_left());
    }

    for block in &state.soft_blocks {
        let image = match &block.destroying {
            Some(anim) => ImageKey::SoftBlockCrumble(anim.frame),
            None => ImageKey::SoftBlock,
        };
        cam.blit(image, block.rect().top_left());
    }

    for bomb in &state.bombs {
        cam.blit(ImageKey::Bomb(bomb.anim.frame), bomb.rect().top_left());
    }

    for blast in &state.blasts {
        let frame = blast.anim.frame;
        let image = match blast.piece {
            BlastPiece::Centre => ImageKey::BlastCentre(frame),
            BlastPiece::Mid(dir) => ImageKey::BlastMid(dir, frame),
            BlastPiece::End(dir) => ImageKey::BlastEnd(dir, frame),
        };
        cam.blit(image, blast.rect().top_left());
    }

    for enemy in &state.enemies {
        let image = if enemy.destroyed {
            ImageKey::EnemyDeath(enemy.kind, enemy.anim.frame)
        } else {
            ImageKey::EnemyWalk(enemy.kind, enemy.direction, enemy.anim.frame)
        };
        cam.blit(image, enemy.pos);
    }

    let player = &state.player;
    if player.is_visible() {
        let image = match player.action {
            PlayerAction::Walk(dir) => ImageKey::PlayerWalk(dir, player.anim.frame),
            PlayerAction::Dying => ImageKey::PlayerDeath(player.anim.frame),
        };
        cam.blit(image, player.pos);
    }

    for popup in &state.popups {
        cam.blit(ImageKey::Score(popup.payout()), popup.pos);
    }
}
