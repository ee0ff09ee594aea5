use crate::*;
use num_enum::TryFromPrimitive;
use std::str::FromStr;

/// Election stage
///
/// Stages only ever move forward: Registration → Voting → Tallying → Completed.
#[derive(
    Serialize,
    Deserialize,
    TryFromPrimitive,
    Copy,
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Stage {
    Registration = 0,
    Voting = 1,
    Tallying = 2,
    Completed = 3,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Registration,
        Stage::Voting,
        Stage::Tallying,
        Stage::Completed,
    ];

    /// Numeric form used by external callers
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Parse a stage from its ordinal
    pub fn from_ordinal(ordinal: u8) -> Result<Self, Error> {
        Stage::try_from_primitive(ordinal).map_err(|_| Error::UnknownStage(ordinal.to_string()))
    }

    /// The stage following this one, if any
    pub fn next(self) -> Option<Stage> {
        Stage::from_ordinal(self.ordinal() + 1).ok()
    }

    /// Whether an election in this stage may move to `target`.
    ///
    /// Movement is monotonic: the target ordinal must not be lower than the current one.
    pub fn can_advance_to(self, target: Stage) -> bool {
        target >= self
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Registration => "registration",
            Stage::Voting => "voting",
            Stage::Tallying => "tallying",
            Stage::Completed => "completed",
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Registration
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Accepts a stage name (any case) or its ordinal
impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(ordinal) = s.parse::<u8>() {
            return Stage::from_ordinal(ordinal);
        }
        Stage::ALL
            .iter()
            .copied()
            .find(|stage| stage.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownStage(s.to_owned()))
    }
}
