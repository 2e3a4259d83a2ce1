//! Commands for the draft context.

use draftboard_core::command::Command;
use draftboard_core::model::{ItemId, SeasonId, TeamId};
use uuid::Uuid;

use super::actor::Actor;
use super::settings::SettingsPatch;

/// Command for a team manager to draft an item on their own turn.
#[derive(Debug, Clone)]
pub struct SubmitPick {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The season whose draft is targeted.
    pub season_id: SeasonId,
    /// Who is acting.
    pub actor: Actor,
    /// The item being drafted.
    pub item_id: ItemId,
}

impl Command for SubmitPick {
    fn command_type(&self) -> &'static str {
        "draft.submit_pick"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn season_id(&self) -> SeasonId {
        self.season_id
    }
}

/// Command for a commissioner to place a pick on behalf of the team on the clock.
#[derive(Debug, Clone)]
pub struct ForcePick {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The season whose draft is targeted.
    pub season_id: SeasonId,
    /// Who is acting.
    pub actor: Actor,
    /// The item being drafted.
    pub item_id: ItemId,
    /// Team to draft for; must be the team on the clock when set.
    pub team_id: Option<TeamId>,
}

impl Command for ForcePick {
    fn command_type(&self) -> &'static str {
        "draft.force_pick"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn season_id(&self) -> SeasonId {
        self.season_id
    }
}

/// Command to remove the most recent pick.
#[derive(Debug, Clone)]
pub struct UndoLastPick {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The season whose draft is targeted.
    pub season_id: SeasonId,
    /// Who is acting.
    pub actor: Actor,
}

impl Command for UndoLastPick {
    fn command_type(&self) -> &'static str {
        "draft.undo_last_pick"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn season_id(&self) -> SeasonId {
        self.season_id
    }
}

/// Command to auto-pick for the team on the clock.
#[derive(Debug, Clone)]
pub struct AdvanceDraft {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The season whose draft is targeted.
    pub season_id: SeasonId,
    /// Who is acting.
    pub actor: Actor,
}

impl Command for AdvanceDraft {
    fn command_type(&self) -> &'static str {
        "draft.advance"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn season_id(&self) -> SeasonId {
        self.season_id
    }
}

/// Command to randomly reshuffle draft positions.
#[derive(Debug, Clone)]
pub struct RerollOrder {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The season whose draft is targeted.
    pub season_id: SeasonId,
    /// Who is acting.
    pub actor: Actor,
}

impl Command for RerollOrder {
    fn command_type(&self) -> &'static str {
        "draft.reroll_order"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn season_id(&self) -> SeasonId {
        self.season_id
    }
}

/// Command to set draft positions explicitly.
#[derive(Debug, Clone)]
pub struct ReorderParticipants {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The season whose draft is targeted.
    pub season_id: SeasonId,
    /// Who is acting.
    pub actor: Actor,
    /// Every participant, first pick first.
    pub team_ids: Vec<TeamId>,
}

impl Command for ReorderParticipants {
    fn command_type(&self) -> &'static str {
        "draft.reorder_participants"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn season_id(&self) -> SeasonId {
        self.season_id
    }
}

/// Command to patch draft settings before the draft begins.
#[derive(Debug, Clone)]
pub struct UpdateSettings {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The season whose draft is targeted.
    pub season_id: SeasonId,
    /// Who is acting.
    pub actor: Actor,
    /// Fields to change.
    pub patch: SettingsPatch,
}

impl Command for UpdateSettings {
    fn command_type(&self) -> &'static str {
        "draft.update_settings"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn season_id(&self) -> SeasonId {
        self.season_id
    }
}

/// Command to open the draft for picks.
#[derive(Debug, Clone)]
pub struct StartDraft {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The season whose draft is targeted.
    pub season_id: SeasonId,
    /// Who is acting.
    pub actor: Actor,
}

impl Command for StartDraft {
    fn command_type(&self) -> &'static str {
        "draft.start"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn season_id(&self) -> SeasonId {
        self.season_id
    }
}

/// Command to pause an in-progress draft.
#[derive(Debug, Clone)]
pub struct PauseDraft {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The season whose draft is targeted.
    pub season_id: SeasonId,
    /// Who is acting.
    pub actor: Actor,
}

impl Command for PauseDraft {
    fn command_type(&self) -> &'static str {
        "draft.pause"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn season_id(&self) -> SeasonId {
        self.season_id
    }
}

/// Command to resume a paused draft.
#[derive(Debug, Clone)]
pub struct ResumeDraft {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The season whose draft is targeted.
    pub season_id: SeasonId,
    /// Who is acting.
    pub actor: Actor,
}

impl Command for ResumeDraft {
    fn command_type(&self) -> &'static str {
        "draft.resume"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn season_id(&self) -> SeasonId {
        self.season_id
    }
}

/// Command to close the draft.
#[derive(Debug, Clone)]
pub struct EndDraft {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The season whose draft is targeted.
    pub season_id: SeasonId,
    /// Who is acting.
    pub actor: Actor,
}

impl Command for EndDraft {
    fn command_type(&self) -> &'static str {
        "draft.end"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn season_id(&self) -> SeasonId {
        self.season_id
    }
}

/// Command to flip a team's lobby ready flag.
#[derive(Debug, Clone)]
pub struct ToggleReady {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The season whose draft is targeted.
    pub season_id: SeasonId,
    /// Who is acting.
    pub actor: Actor,
    /// The team whose flag flips.
    pub team_id: TeamId,
}

impl Command for ToggleReady {
    fn command_type(&self) -> &'static str {
        "draft.toggle_ready"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn season_id(&self) -> SeasonId {
        self.season_id
    }
}

/// Command to replace a team's watchlist.
#[derive(Debug, Clone)]
pub struct UpdateWatchlist {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The season whose draft is targeted.
    pub season_id: SeasonId,
    /// Who is acting.
    pub actor: Actor,
    /// The watchlist owner.
    pub team_id: TeamId,
    /// Items in preference order.
    pub item_ids: Vec<ItemId>,
}

impl Command for UpdateWatchlist {
    fn command_type(&self) -> &'static str {
        "draft.update_watchlist"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn season_id(&self) -> SeasonId {
        self.season_id
    }
}
