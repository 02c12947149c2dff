/// Traversal phase definitions for a single listing
///
/// A listing moves through `Init → Expanding → Extracting → Done`, or
/// directly `Init → Done` when a non-empty result is already stored.
use std::fmt;

/// Current phase of a listing traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalPhase {
    /// Checking the store for an existing result
    Init,

    /// Clicking "load more" until a stop condition holds
    Expanding,

    /// Reading records from the fully expanded document
    Extracting,

    /// Finished (either skipped or persisted)
    Done,
}

impl TraversalPhase {
    /// Returns true once no further work happens for the listing
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if the transition `self -> next` is part of the state machine
    pub fn can_transition_to(&self, next: TraversalPhase) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::Expanding)
                | (Self::Init, Self::Done)
                | (Self::Expanding, Self::Expanding)
                | (Self::Expanding, Self::Extracting)
                | (Self::Extracting, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Expanding => "expanding",
            Self::Extracting => "extracting",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TraversalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why the expand loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// No load-more control in the document
    ControlAbsent,

    /// The control's holder carries the hidden class
    ControlHidden,

    /// A background response carried the URI-too-long signature
    NetworkError,

    /// The configured expansion bound was reached
    ExpansionLimit,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ControlAbsent => "control_absent",
            Self::ControlHidden => "control_hidden",
            Self::NetworkError => "network_error",
            Self::ExpansionLimit => "expansion_limit",
        }
    }

    /// Returns true if the listing was exhausted rather than cut short
    pub fn is_exhaustive(&self) -> bool {
        matches!(self, Self::ControlAbsent | Self::ControlHidden)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
