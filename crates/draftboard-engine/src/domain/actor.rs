//! The resolved caller of a draft operation.

use draftboard_core::error::DomainError;
use draftboard_core::model::{TeamId, UserId};

/// Who is acting, which team they manage in the season, and whether they
/// hold commissioner powers there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Authenticated user.
    pub user_id: UserId,
    /// Team managed in the season, if any.
    pub team_id: Option<TeamId>,
    /// League owner, commissioner or superadmin.
    pub is_commissioner: bool,
}

impl Actor {
    /// Commissioner-only operations.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Forbidden` for non-commissioners.
    pub fn require_commissioner(&self) -> Result<(), DomainError> {
        if !self.is_commissioner {
            return Err(DomainError::Forbidden(
                "only the league commissioner can do that".to_owned(),
            ));
        }
        Ok(())
    }

    /// The team this actor manages.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Forbidden` when the actor manages no team.
    pub fn require_team(&self) -> Result<TeamId, DomainError> {
        self.team_id.ok_or_else(|| {
            DomainError::Forbidden("you do not manage a team in this season".to_owned())
        })
    }

    /// Acting on `team_id` requires managing it or being commissioner.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Forbidden` otherwise.
    pub fn require_manages(&self, team_id: TeamId) -> Result<(), DomainError> {
        if self.is_commissioner || self.team_id == Some(team_id) {
            return Ok(());
        }
        Err(DomainError::Forbidden(format!(
            "you do not manage team {team_id}"
        )))
    }
}
