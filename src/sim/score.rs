//! Floating score popups
//!
//! Kill points are not credited immediately: each kill spawns a popup that
//! pays out when it expires. Popups that overlap in time pay double.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::anim::elapsed;
use super::grid::EntityId;
use super::state::GameState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorePopup {
    pub id: EntityId,
    /// Top-left pixel position
    pub pos: IVec2,
    /// Base value
    pub value: u64,
    /// Spawned while another popup was showing
    pub doubled: bool,
    pub born_at: u64,
}

impl ScorePopup {
    /// What this popup credits on expiry
    pub fn payout(&self) -> u64 {
        if self.doubled { self.value * 2 } else { self.value }
    }
}

/// Show a popup; concurrent popups all become doubled
pub fn spawn_popup(state: &mut GameState, pos: IVec2, value: u64) {
    let doubled = state.popup_bonus > 0;
    if doubled {
        for popup in &mut state.popups {
            popup.doubled = true;
        }
    }
    let id = state.next_entity_id();
    state.popups.push(ScorePopup {
        id,
        pos,
        value,
        doubled,
        born_at: state.time_ms,
    });
    state.popup_bonus += 1;
}

/// Credit and remove expired popups
pub fn update_popups(state: &mut GameState) {
    let now = state.time_ms;
    let lifetime = state.tuning.popup_ms;
    let mut credit = 0;
    let mut expired = 0;
    state.popups.retain(|p| {
        if elapsed(now, p.born_at, lifetime) {
            credit += p.payout();
            expired += 1;
            false
        } else {
            true
        }
    });
    state.player.score += credit;
    state.popup_bonus = state.popup_bonus.saturating_sub(expired);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_out(state: &mut GameState) {
        state.time_ms += state.tuning.popup_ms;
        update_popups(state);
    }

    #[test]
    fn test_single_popup_pays_base_value() {
        let mut state = GameState::new(1);
        spawn_popup(&mut state, IVec2::ZERO, 100);
        state.time_ms = 999;
        update_popups(&mut state);
        assert_eq!(state.player.score, 0);
        state.time_ms = 1000;
        update_popups(&mut state);
        assert_eq!(state.player.score, 100);
        assert_eq!(state.popup_bonus, 0);
        assert!(state.popups.is_empty());
    }

    #[test]
    fn test_concurrent_popups_pay_double() {
        let mut state = GameState::new(1);
        spawn_popup(&mut state, IVec2::ZERO, 100);
        state.time_ms = 300;
        spawn_popup(&mut state, IVec2::ZERO, 200);
        assert!(state.popups.iter().all(|p| p.doubled));
        state.time_ms = 1300;
        update_popups(&mut state);
        assert_eq!(state.player.score, 600);
        assert_eq!(state.popup_bonus, 0);
    }

    #[test]
    fn test_counter_recovers_between_kills() {
        let mut state = GameState::new(1);
        spawn_popup(&mut state, IVec2::ZERO, 100);
        run_out(&mut state);
        spawn_popup(&mut state, IVec2::ZERO, 100);
        assert!(!state.popups[0].doubled);
        run_out(&mut state);
        assert_eq!(state.player.score, 200);
    }
}
