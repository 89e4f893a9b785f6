use serde::{Deserialize, Serialize};

/// Two-step confirmation guarding a full reset of the score sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetState {
    #[default]
    Idle,
    PendingConfirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetAction {
    Request,
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetTransition {
    pub next: ResetState,
    /// Whether the caller must now clear every record.
    pub clear: bool,
}

impl ResetState {
    pub fn apply(self, action: ResetAction) -> ResetTransition {
        match (self, action) {
            (_, ResetAction::Request) => ResetTransition {
                next: ResetState::PendingConfirm,
                clear: false,
            },
            (ResetState::PendingConfirm, ResetAction::Confirm) => ResetTransition {
                next: ResetState::Idle,
                clear: true,
            },
            (_, ResetAction::Confirm) | (_, ResetAction::Cancel) => ResetTransition {
                next: ResetState::Idle,
                clear: false,
            },
        }
    }

    pub fn is_pending(self) -> bool {
        self == ResetState::PendingConfirm
    }
}
