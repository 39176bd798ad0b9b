//! Asset provider contract
//!
//! The simulation owns no image or sound bytes. It only needs to know how
//! many frames each animation has (to time deaths, blasts and fuses) and how
//! large each sprite's collision mask is. A host that loads real sprite
//! sheets implements [`AssetProvider`]; [`BuiltinAssets`] carries the stock
//! numbers.

use serde::{Deserialize, Serialize};

/// Animations whose length the simulation depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anim {
    PlayerWalk,
    PlayerDeath,
    EnemyWalk,
    EnemyDeath,
    Bomb,
    Blast,
    SoftBlockDestroy,
}

/// Sprite kinds that take part in deadly collisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKind {
    Player,
    Enemy,
    Blast,
}

/// Supplies animation lengths and collision masks
pub trait AssetProvider {
    /// Number of frames in an animation (at least 1)
    fn frame_count(&self, anim: Anim) -> usize;

    /// Collision mask of a sprite, as an inset from its 64px box
    fn mask_inset(&self, sprite: SpriteKind) -> i32 {
        let _ = sprite;
        0
    }
}

/// Stock sprite sheet numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinAssets;

impl AssetProvider for BuiltinAssets {
    fn frame_count(&self, anim: Anim) -> usize {
        match anim {
            Anim::PlayerWalk => 3,
            Anim::PlayerDeath => 7,
            Anim::EnemyWalk => 3,
            Anim::EnemyDeath => 5,
            Anim::Bomb => 3,
            Anim::Blast => 5,
            Anim::SoftBlockDestroy => 6,
        }
    }

    fn mask_inset(&self, sprite: SpriteKind) -> i32 {
        match sprite {
            SpriteKind::Player => 10,
            SpriteKind::Enemy => 6,
            SpriteKind::Blast => 4,
        }
    }
}

/// Snapshot of everything the simulation reads from the asset provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteTable {
    pub player_walk: usize,
    pub player_death: usize,
    pub enemy_walk: usize,
    pub enemy_death: usize,
    pub bomb: usize,
    pub blast: usize,
    pub soft_block_destroy: usize,
    pub player_mask: i32,
    pub enemy_mask: i32,
    pub blast_mask: i32,
}

impl Default for SpriteTable {
    fn default() -> Self {
        Self::capture(&BuiltinAssets)
    }
}

impl SpriteTable {
    /// Read every value the simulation needs from a provider
    pub fn capture(provider: &dyn AssetProvider) -> Self {
        let frames = |anim| provider.frame_count(anim).max(1);
        Self {
            player_walk: frames(Anim::PlayerWalk),
            player_death: frames(Anim::PlayerDeath),
            enemy_walk: frames(Anim::EnemyWalk),
            enemy_death: frames(Anim::EnemyDeath),
            bomb: frames(Anim::Bomb),
            blast: frames(Anim::Blast),
            soft_block_destroy: frames(Anim::SoftBlockDestroy),
            player_mask: provider.mask_inset(SpriteKind::Player).max(0),
            enemy_mask: provider.mask_inset(SpriteKind::Enemy).max(0),
            blast_mask: provider.mask_inset(SpriteKind::Blast).max(0),
        }
    }

    pub fn frames(&self, anim: Anim) -> usize {
        match anim {
            Anim::PlayerWalk => self.player_walk,
            Anim::PlayerDeath => self.player_death,
            Anim::EnemyWalk => self.enemy_walk,
            Anim::EnemyDeath => self.enemy_death,
            Anim::Bomb => self.bomb,
            Anim::Blast => self.blast,
            Anim::SoftBlockDestroy => self.soft_block_destroy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptySheets;

    impl AssetProvider for EmptySheets {
        fn frame_count(&self, _anim: Anim) -> usize {
            0
        }

        fn mask_inset(&self, _sprite: SpriteKind) -> i32 {
            -3
        }
    }

    #[test]
    fn test_capture_clamps_degenerate_provider() {
        let table = SpriteTable::capture(&EmptySheets);
        assert_eq!(table.frames(Anim::Blast), 1);
        assert_eq!(table.player_death, 1);
        assert_eq!(table.blast_mask, 0);
    }

    #[test]
    fn test_default_matches_builtin() {
        let table = SpriteTable::default();
        assert_eq!(table.frames(Anim::Blast), BuiltinAssets.frame_count(Anim::Blast));
        assert_eq!(table.enemy_mask, 6);
    }
}
