//! Leaderboard snapshot
//!
//! A ranked, truncated projection of the player and bots by radius. It is
//! derived state refreshed on a frame cadence, never read by the simulation.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::game::state::{EntityId, WorldState};

/// One leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub id: EntityId,
    pub name: String,
    /// Radius floored to an integer
    pub score: u32,
    pub is_player: bool,
}

/// Top-N contenders by radius, largest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardSnapshot {
    pub rows: SmallVec<[LeaderboardRow; 8]>,
    /// Frame the snapshot was taken on
    pub frame: u64,
}

impl LeaderboardSnapshot {
    /// Rank the player and all bots by radius descending and keep the top `size`
    pub fn compute(state: &WorldState, size: usize) -> Self {
        let mut ranked: Vec<_> = state.contenders().collect();
        ranked.sort_by(|a, b| b.radius.total_cmp(&a.radius));

        let rows = ranked
            .into_iter()
            .take(size)
            .map(|e| LeaderboardRow {
                id: e.id.clone(),
                name: e.display_name().to_string(),
                score: score_for_radius(e.radius),
                is_player: e.is_player(),
            })
            .collect();

        Self {
            rows,
            frame: state.frame,
        }
    }

    /// Empty until the first refresh
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 1-based rank of the player, if on the board
    pub fn player_rank(&self) -> Option<usize> {
        self.rows.iter().position(|r| r.is_player).map(|i| i + 1)
    }
}

/// Whether the leaderboard is due on this frame
#[inline]
pub fn refresh_due(frame: u64, interval: u64) -> bool {
    interval > 0 && frame % interval == 0
}

/// Score shown for a radius: floor(r), never negative
#[inline]
pub fn score_for_radius(radius: f32) -> u32 {
    if radius.is_finite() && radius > 0.0 {
        radius.floor() as u32
    } else {
        0
    }
}
