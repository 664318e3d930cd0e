use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Countdown mode of the timer. Doubles as the `sessionType` of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Work,
    Break,
    LongBreak,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Work, Phase::Break, Phase::LongBreak];

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Break => "break",
            Phase::LongBreak => "long_break",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Focus",
            Phase::Break => "Short Break",
            Phase::LongBreak => "Long Break",
        }
    }

    pub fn is_work(self) -> bool {
        self == Phase::Work
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(Phase::Work),
            "break" => Ok(Phase::Break),
            "long_break" => Ok(Phase::LongBreak),
            other => Err(ValidationError::UnknownSessionType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_session_types() {
        assert_eq!(serde_json::to_string(&Phase::LongBreak).unwrap(), "\"long_break\"");
        let parsed: Phase = serde_json::from_str("\"break\"").unwrap();
        assert_eq!(parsed, Phase::Break);
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert_eq!("work".parse::<Phase>(), Ok(Phase::Work));
        assert_eq!(
            "nap".parse::<Phase>(),
            Err(ValidationError::UnknownSessionType("nap".into()))
        );
    }
}
