use serde::Serialize;
use std::fmt;

/// Phase of the edit cycle.
///
/// `Idle -> AwaitingResponse -> Validating -> Applying -> Idle`, with error
/// (and cancellation) exits back to `Idle` from every non-idle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    #[default]
    Idle,
    AwaitingResponse,
    Validating,
    Applying,
}

impl CycleState {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingResponse => "awaiting_response",
            Self::Validating => "validating",
            Self::Applying => "applying",
        }
    }

    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether `self -> next` is an edge of the cycle.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::AwaitingResponse)
                | (Self::AwaitingResponse, Self::Validating)
                | (Self::Validating, Self::Applying)
                | (Self::AwaitingResponse | Self::Validating | Self::Applying, Self::Idle)
        )
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
