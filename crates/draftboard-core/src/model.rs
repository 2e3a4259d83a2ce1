//! Persisted draft records.
//!
//! These are the shapes the draft store reads and writes. Rules that govern
//! how they change live in the engine crate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Season identifier (owned by the season directory).
pub type SeasonId = i64;
/// League identifier (owned by the season directory).
pub type LeagueId = i64;
/// Team identifier (owned by the season directory).
pub type TeamId = i64;
/// Catalog item identifier (owned by the item catalog).
pub type ItemId = i64;
/// Authenticated user identifier.
pub type UserId = i64;
/// Ledger row identifier.
pub type PickId = i64;

/// Lifecycle status of a draft session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    /// Created, nobody has readied up.
    NotStarted,
    /// At least one participant is ready.
    Lobby,
    /// Picks are being accepted.
    InProgress,
    /// Picks are suspended by the commissioner.
    Paused,
    /// Terminal.
    Completed,
}

impl DraftStatus {
    /// Stable storage name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Lobby => "lobby",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    /// `true` while the draft has not been started.
    #[must_use]
    pub fn is_pre_draft(self) -> bool {
        matches!(self, Self::NotStarted | Self::Lobby)
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "lobby" => Ok(Self::Lobby),
            "in_progress" => Ok(Self::InProgress),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            other => Err(DomainError::Validation(format!(
                "unknown draft status: {other}"
            ))),
        }
    }
}

/// How the turn order traverses participants from round to round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingMode {
    /// Direction reverses every round.
    Snake,
    /// Always ascending by position.
    Linear,
    /// Reserved for non-positional orderings; currently behaves as `Linear`.
    Custom,
}

impl OrderingMode {
    /// Stable storage name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Snake => "snake",
            Self::Linear => "linear",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for OrderingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderingMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snake" => Ok(Self::Snake),
            "linear" => Ok(Self::Linear),
            "custom" => Ok(Self::Custom),
            other => Err(DomainError::Validation(format!(
                "unknown ordering mode: {other}"
            ))),
        }
    }
}

/// One draft session per season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftSession {
    /// The season this draft belongs to.
    pub season_id: SeasonId,
    /// Current lifecycle status.
    pub status: DraftStatus,
    /// Turn-order traversal mode.
    pub ordering_mode: OrderingMode,
    /// Scheduled start, informational.
    pub starts_at: Option<DateTime<Utc>>,
    /// Advisory per-pick clock.
    pub pick_timer_seconds: Option<i32>,
    /// Advisory round cap; never enforced by placement.
    pub round_count: Option<i32>,
}

impl DraftSession {
    /// The record `ensure_session` creates for a season seen for the first time.
    #[must_use]
    pub fn new(season_id: SeasonId) -> Self {
        Self {
            season_id,
            status: DraftStatus::NotStarted,
            ordering_mode: OrderingMode::Snake,
            starts_at: None,
            pick_timer_seconds: None,
            round_count: None,
        }
    }
}

/// A team's seat in the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    /// The season.
    pub season_id: SeasonId,
    /// The team.
    pub team_id: TeamId,
    /// 1-based turn-order position, contiguous across the season.
    pub position: i32,
    /// Lobby ready flag.
    pub is_ready: bool,
}

/// A committed ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pick {
    /// Monotonic row id.
    pub id: PickId,
    /// The season.
    pub season_id: SeasonId,
    /// 1-based round.
    pub round: i32,
    /// 1-based slot within the round.
    pub pick_in_round: i32,
    /// 1-based, gapless, season-wide sequence number.
    pub overall_pick_number: i32,
    /// The team the pick is attributed to.
    pub team_id: TeamId,
    /// The claimed catalog item.
    pub item_id: ItemId,
    /// When the pick was placed.
    pub created_at: DateTime<Utc>,
}

/// A ledger row about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPick {
    /// The season.
    pub season_id: SeasonId,
    /// 1-based round.
    pub round: i32,
    /// 1-based slot within the round.
    pub pick_in_round: i32,
    /// Derived from ledger length, never client supplied.
    pub overall_pick_number: i32,
    /// The on-the-clock team.
    pub team_id: TeamId,
    /// The claimed catalog item.
    pub item_id: ItemId,
    /// When the pick was placed.
    pub created_at: DateTime<Utc>,
}

impl NewPick {
    /// Attaches the row id assigned by the store.
    #[must_use]
    pub fn into_pick(self, id: PickId) -> Pick {
        Pick {
            id,
            season_id: self.season_id,
            round: self.round,
            pick_in_round: self.pick_in_round,
            overall_pick_number: self.overall_pick_number,
            team_id: self.team_id,
            item_id: self.item_id,
            created_at: self.created_at,
        }
    }
}
