//! Participant seating: joining, shuffling and manual reordering.

use std::collections::HashSet;

use draftboard_core::error::DomainError;
use draftboard_core::model::{Participant, SeasonId, TeamId};
use draftboard_core::rng::DeterministicRng;

/// Seats for roster teams that are not yet participants, appended after the
/// current highest position in roster order. Existing seats never move.
#[must_use]
pub fn plan_new_participants(
    season_id: SeasonId,
    existing: &[Participant],
    roster: &[TeamId],
) -> Vec<Participant> {
    let seated: HashSet<TeamId> = existing.iter().map(|p| p.team_id).collect();
    let mut next_position = existing.iter().map(|p| p.position).max().unwrap_or(0);
    let mut planned = Vec::new();

    for team_id in roster {
        if seated.contains(team_id) || planned.iter().any(|p: &Participant| p.team_id == *team_id)
        {
            continue;
        }
        next_position += 1;
        planned.push(Participant {
            season_id,
            team_id: *team_id,
            position: next_position,
            is_ready: false,
        });
    }
    planned
}

/// Unbiased in-place Fisher–Yates shuffle.
#[allow(clippy::cast_possible_truncation)]
pub fn shuffle_order(team_ids: &mut [TeamId], rng: &mut dyn DeterministicRng) {
    for i in (1..team_ids.len()).rev() {
        let j = rng.next_u32_range(0, i as u32) as usize;
        team_ids.swap(i, j);
    }
}

/// Checks that `proposed` seats exactly the current participants, once each.
///
/// # Errors
///
/// Returns `DomainError::Validation` for duplicates, missing teams or teams
/// that are not participants.
pub fn validate_manual_order(
    existing: &[Participant],
    proposed: &[TeamId],
) -> Result<(), DomainError> {
    let seated: HashSet<TeamId> = existing.iter().map(|p| p.team_id).collect();
    let mut seen = HashSet::new();

    for team_id in proposed {
        if !seated.contains(team_id) {
            return Err(DomainError::Validation(format!(
                "team {team_id} is not a draft participant"
            )));
        }
        if !seen.insert(*team_id) {
            return Err(DomainError::Validation(format!(
                "team {team_id} appears more than once"
            )));
        }
    }
    if seen.len() != seated.len() {
        return Err(DomainError::Validation(format!(
            "order must list all {} participants, got {}",
            seated.len(),
            seen.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftboard_test_support::{MockRng, SequenceRng};

    fn seat(team_id: TeamId, position: i32) -> Participant {
        Participant {
            season_id: 1,
            team_id,
            position,
            is_ready: false,
        }
    }

    #[test]
    fn test_new_teams_are_appended_after_max_position() {
        let existing = vec![seat(10, 1), seat(20, 2)];

        let planned = plan_new_participants(1, &existing, &[10, 20, 30, 40]);

        assert_eq!(planned, vec![seat(30, 3), seat(40, 4)]);
    }

    #[test]
    fn test_first_sync_seats_roster_in_order() {
        let planned = plan_new_participants(1, &[], &[5, 3, 9]);

        assert_eq!(planned, vec![seat(5, 1), seat(3, 2), seat(9, 3)]);
    }

    #[test]
    fn test_duplicate_roster_entries_are_seated_once() {
        let planned = plan_new_participants(1, &[], &[5, 5]);

        assert_eq!(planned, vec![seat(5, 1)]);
    }

    #[test]
    fn test_shuffle_applies_scripted_swaps() {
        // i=3 swaps with 0, i=2 with 2, i=1 with 0.
        let mut order = vec![1, 2, 3, 4];
        let mut rng = SequenceRng::new(vec![0, 2, 0]);

        shuffle_order(&mut order, &mut rng);

        assert_eq!(order, vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut order = vec![11, 12, 13, 14, 15, 16];

        shuffle_order(&mut order, &mut MockRng);

        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![11, 12, 13, 14, 15, 16]);
    }

    #[test]
    fn test_manual_order_must_be_exact_permutation() {
        let existing = vec![seat(10, 1), seat(20, 2), seat(30, 3)];

        assert!(validate_manual_order(&existing, &[30, 10, 20]).is_ok());
        assert!(validate_manual_order(&existing, &[30, 10]).is_err());
        assert!(validate_manual_order(&existing, &[30, 10, 10]).is_err());
        assert!(validate_manual_order(&existing, &[30, 10, 99]).is_err());
    }
}
