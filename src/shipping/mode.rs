//! Log shipping mode

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether new entries are buffered to disk or sent right away
///
/// Every shipper starts `Silent`; the mode is never restored from a
/// previous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Append entries to the day partition
    #[default]
    Silent,
    /// Transmit entries immediately
    Active,
}

impl LogMode {
    pub fn to_str(&self) -> &'static str {
        match self {
            LogMode::Silent => "silent",
            LogMode::Active => "active",
        }
    }
}

impl fmt::Display for LogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" => Ok(LogMode::Silent),
            "active" => Ok(LogMode::Active),
            _ => Err(format!("Invalid log mode: '{}'", s)),
        }
    }
}
