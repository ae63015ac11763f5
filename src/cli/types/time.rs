//! Time-related types for fantasy basketball seasons and scoring periods.

use crate::error::{HoopsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for Season years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Season(pub u16);

impl Season {
    pub fn new(year: u16) -> Self {
        Self(year)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl Default for Season {
    fn default() -> Self {
        Self(2024)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Season {
    type Err = HoopsError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.parse()?))
    }
}

/// Type-safe wrapper for Week numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Week(pub u16);

impl Week {
    pub fn new(week: u16) -> Self {
        Self(week)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl Default for Week {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Week {
    type Err = HoopsError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Scoring period a roster or stat line covers.
///
/// Yahoo reports coverage as `coverage_type` plus a `week`, `date` or `season` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "coverage", content = "value", rename_all = "lowercase")]
pub enum Period {
    Week(Week),
    /// ISO date (`YYYY-MM-DD`), used for daily rosters.
    Date(String),
    Season(Season),
}

impl Period {
    /// Fragment used inside store keys; zero-padded so keys sort chronologically.
    pub fn key_fragment(&self) -> String {
        match self {
            Period::Week(w) => format!("w{:03}", w.as_u16()),
            Period::Date(d) => format!("d{}", d),
            Period::Season(s) => format!("s{}", s),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Week(w) => write!(f, "week {}", w),
            Period::Date(d) => write!(f, "date {}", d),
            Period::Season(s) => write!(f, "season {}", s),
        }
    }
}

impl From<Week> for Period {
    fn from(week: Week) -> Self {
        Period::Week(week)
    }
}
