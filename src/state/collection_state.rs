/// Collection run state definitions
///
/// A single `collect` call walks this machine from `Idle` to one of the
/// terminal states `Done`, `Cancelled` or `Fatal`.
use std::fmt;

/// Represents the current phase of a collection run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionState {
    // ===== Setup States =====
    /// Run created, nothing requested yet
    Idle,

    /// Looking for post links (homepage, frame, feed, listing)
    Discovering,

    /// Filtering candidates against the date window
    Planning,

    // ===== Per-Candidate States =====
    /// Requesting a candidate's page
    Fetching,

    /// Deriving title, date and body from a fetched page
    Extracting,

    /// Checking identity against the store and saving
    Gating,

    // ===== Terminal States =====
    /// Every planned candidate was processed
    Done,

    /// The stop signal ended the run early
    Cancelled,

    /// Discovery retrieved no page, or the store failed
    Fatal,
}

impl CollectionState {
    /// Returns true if the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Fatal)
    }

    /// Returns true while a candidate is being processed
    pub fn is_per_candidate(&self) -> bool {
        matches!(self, Self::Fetching | Self::Extracting | Self::Gating)
    }

    /// Returns true if moving from `self` to `next` is a legal step
    ///
    /// Any non-terminal state may stop (`Cancelled`) or fail (`Fatal`).
    /// The per-candidate states cycle freely, since a skipped candidate
    /// goes straight back to `Fetching` for the next one.
    pub fn can_transition_to(&self, next: CollectionState) -> bool {
        use CollectionState::*;

        if self.is_terminal() {
            return false;
        }

        match (self, next) {
            (_, Cancelled) | (_, Fatal) => true,
            (Idle, Discovering) => true,
            (Discovering, Planning) => true,
            (Planning, Fetching) | (Planning, Done) => true,
            (Fetching, Fetching) | (Fetching, Extracting) => true,
            (Extracting, Gating) | (Extracting, Fetching) => true,
            (Gating, Fetching) => true,
            (current, Done) => current.is_per_candidate(),
            _ => false,
        }
    }

    /// Converts the state to a stable string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Planning => "planning",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Gating => "gating",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for CollectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
