//! Draft session state machine.
//!
//! ```text
//! NotStarted ─┬─ start ─▶ InProgress ◀─ resume ─ Paused
//! Lobby ──────┘             │   └──── pause ────▶  │
//!                           └──── end ─▶ Completed ◀┘
//! ```

use draftboard_core::error::DomainError;
use draftboard_core::model::{DraftSession, DraftStatus};

/// A commissioner-driven lifecycle change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `NotStarted`/`Lobby` → `InProgress`.
    Start,
    /// `InProgress` → `Paused`.
    Pause,
    /// `Paused` → `InProgress`.
    Resume,
    /// `InProgress`/`Paused` → `Completed`, idempotent once completed.
    End,
}

impl Transition {
    /// Name used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::End => "end",
        }
    }
}

/// Result of a permitted transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The session moves to the given status.
    Changed(DraftStatus),
    /// Already in the target status; nothing to write.
    Unchanged,
}

/// Decides the status a transition leads to.
///
/// # Errors
///
/// Returns `DomainError::Conflict` when the transition is not allowed from
/// `current`, or when starting with no participants.
pub fn transition(
    current: DraftStatus,
    transition: Transition,
    participant_count: usize,
) -> Result<TransitionOutcome, DomainError> {
    use DraftStatus::{Completed, InProgress, Lobby, NotStarted, Paused};

    match (transition, current) {
        (Transition::Start, NotStarted | Lobby) => {
            if participant_count == 0 {
                return Err(DomainError::Conflict(
                    "cannot start a draft without participants".to_owned(),
                ));
            }
            Ok(TransitionOutcome::Changed(InProgress))
        }
        (Transition::Start, _) => Err(DomainError::Conflict(format!(
            "cannot start a draft that is {current}"
        ))),
        (Transition::Pause, InProgress) => Ok(TransitionOutcome::Changed(Paused)),
        (Transition::Pause, _) => Err(DomainError::Conflict(format!(
            "cannot pause a draft that is {current}"
        ))),
        (Transition::Resume, Paused) => Ok(TransitionOutcome::Changed(InProgress)),
        (Transition::Resume, _) => Err(DomainError::Conflict("draft is not paused".to_owned())),
        (Transition::End, InProgress | Paused) => Ok(TransitionOutcome::Changed(Completed)),
        (Transition::End, Completed) => Ok(TransitionOutcome::Unchanged),
        (Transition::End, NotStarted | Lobby) => {
            Err(DomainError::Conflict("draft has not started".to_owned()))
        }
    }
}

/// Status after a participant readies up: a fresh session enters the lobby.
#[must_use]
pub fn status_after_ready(current: DraftStatus) -> DraftStatus {
    match current {
        DraftStatus::NotStarted => DraftStatus::Lobby,
        other => other,
    }
}

/// Picks are only accepted while the draft is in progress.
///
/// # Errors
///
/// Returns `DomainError::Conflict` otherwise.
pub fn ensure_accepting_picks(session: &DraftSession) -> Result<(), DomainError> {
    if session.status != DraftStatus::InProgress {
        return Err(DomainError::Conflict(format!(
            "draft is not in progress (status: {})",
            session.status
        )));
    }
    Ok(())
}

/// Settings and participant order are frozen once the draft starts or the
/// first pick exists.
///
/// # Errors
///
/// Returns `DomainError::Conflict` when either condition holds.
pub fn ensure_rules_mutable(session: &DraftSession, picks_made: usize) -> Result<(), DomainError> {
    if !session.status.is_pre_draft() {
        return Err(DomainError::Conflict(format!(
            "draft rules are locked once the draft has started (status: {})",
            session.status
        )));
    }
    if picks_made > 0 {
        return Err(DomainError::Conflict(format!(
            "draft rules are locked once picks exist ({picks_made} made)"
        )));
    }
    Ok(())
}
