//! Image keys handed to the render target

use crate::sim::{Direction, EnemyKind, PowerUp};

/// Which image to draw. Animated images carry their frame index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKey {
    TitleScreen,
    GameOverScreen,
    /// "STAGE" word on the intro screen
    StageWord,
    Digit(u8),

    HardBlock,
    SoftBlock,
    SoftBlockCrumble(usize),
    PowerUp(PowerUp),
    Bomb(usize),
    BlastCentre(usize),
    BlastMid(Direction, usize),
    BlastEnd(Direction, usize),

    PlayerWalk(Direction, usize),
    PlayerDeath(usize),
    EnemyWalk(EnemyKind, Direction, usize),
    EnemyDeath(EnemyKind, usize),
    /// Floating score popup showing this value
    Score(u64),
}
