//! Read helpers over a season's pick ledger.

use std::collections::HashMap;

use draftboard_core::model::{DraftSession, ItemId, Pick, TeamId};

/// The team that claimed `item_id`, if any.
#[must_use]
pub fn claimed_by(picks: &[Pick], item_id: ItemId) -> Option<TeamId> {
    picks
        .iter()
        .find(|pick| pick.item_id == item_id)
        .map(|pick| pick.team_id)
}

/// Every claimed item and the team that holds it.
#[must_use]
pub fn claims(picks: &[Pick]) -> HashMap<ItemId, TeamId> {
    picks
        .iter()
        .map(|pick| (pick.item_id, pick.team_id))
        .collect()
}

/// The pick with the highest overall number.
#[must_use]
pub fn last_pick(picks: &[Pick]) -> Option<&Pick> {
    picks.iter().max_by_key(|pick| pick.overall_pick_number)
}

/// A team's picks in draft order.
#[must_use]
pub fn picks_for_team(picks: &[Pick], team_id: TeamId) -> Vec<Pick> {
    let mut owned: Vec<Pick> = picks
        .iter()
        .filter(|pick| pick.team_id == team_id)
        .cloned()
        .collect();
    owned.sort_by_key(|pick| pick.overall_pick_number);
    owned
}

/// Advisory: whether the configured round cap has been reached. Placement
/// never consults this.
#[must_use]
pub fn rounds_complete(session: &DraftSession, participant_count: usize, picks_made: usize) -> bool {
    match session.round_count {
        Some(rounds) if participant_count > 0 => {
            let rounds = usize::try_from(rounds).unwrap_or(0);
            picks_made >= rounds * participant_count
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn pick(overall: i32, team_id: TeamId, item_id: ItemId) -> Pick {
        Pick {
            id: i64::from(overall),
            season_id: 1,
            round: 1,
            pick_in_round: overall,
            overall_pick_number: overall,
            team_id,
            item_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_claimed_by_finds_owner() {
        let ledger = vec![pick(1, 10, 25), pick(2, 20, 4)];

        assert_eq!(claimed_by(&ledger, 4), Some(20));
        assert_eq!(claimed_by(&ledger, 5), None);
    }

    #[test]
    fn test_last_pick_uses_overall_number_not_row_order() {
        let ledger = vec![pick(2, 20, 4), pick(1, 10, 25)];

        assert_eq!(last_pick(&ledger).map(|p| p.item_id), Some(4));
        assert!(last_pick(&[]).is_none());
    }

    #[test]
    fn test_picks_for_team_are_in_draft_order() {
        let ledger = vec![pick(4, 10, 7), pick(2, 20, 4), pick(1, 10, 25)];

        let items: Vec<ItemId> = picks_for_team(&ledger, 10).iter().map(|p| p.item_id).collect();

        assert_eq!(items, vec![25, 7]);
    }

    #[test]
    fn test_rounds_complete_is_advisory_flag() {
        let session = DraftSession {
            round_count: Some(2),
            ..DraftSession::new(1)
        };

        assert!(!rounds_complete(&session, 3, 5));
        assert!(rounds_complete(&session, 3, 6));
        assert!(!rounds_complete(&DraftSession::new(1), 3, 600));
        assert!(!rounds_complete(&session, 0, 6));
    }
}
