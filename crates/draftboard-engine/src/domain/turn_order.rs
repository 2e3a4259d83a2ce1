//! Turn order calculator.
//!
//! Whose turn it is is never stored. It is recomputed from the ledger length
//! on every read and inside every placement transaction, which keeps it
//! correct after an undo or an interrupted write.

use draftboard_core::model::{OrderingMode, Participant, TeamId};
use serde::Serialize;

/// The slot the next pick will occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Turn {
    /// 1-based round.
    pub round: i32,
    /// 1-based slot within the round.
    pub pick_in_round: i32,
    /// 1-based season-wide sequence number.
    pub overall_pick_number: i32,
    /// The on-the-clock team; `None` when there are no participants.
    pub team_id: Option<TeamId>,
}

impl Turn {
    /// Sentinel returned for an empty participant list. A draft cannot proceed
    /// from it.
    pub const NO_PARTICIPANTS: Self = Self {
        round: 1,
        pick_in_round: 1,
        overall_pick_number: 1,
        team_id: None,
    };
}

/// Computes the next turn.
///
/// `participants` must be ordered by ascending position and `picks_made` is
/// the current ledger length for the season. Snake mode walks odd-indexed
/// rounds in descending position; `Linear` and `Custom` always ascend.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn compute_turn(mode: OrderingMode, participants: &[Participant], picks_made: usize) -> Turn {
    let count = participants.len();
    if count == 0 {
        return Turn::NO_PARTICIPANTS;
    }

    let round_index = picks_made / count;
    let pick_index = picks_made % count;
    let descending = mode == OrderingMode::Snake && round_index % 2 == 1;
    let slot = if descending {
        count - 1 - pick_index
    } else {
        pick_index
    };

    Turn {
        round: (round_index + 1) as i32,
        pick_in_round: (pick_index + 1) as i32,
        overall_pick_number: (picks_made + 1) as i32,
        team_id: Some(participants[slot].team_id),
    }
}
