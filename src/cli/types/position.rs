//! Fantasy basketball position types and utilities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fantasy basketball positions and roster slots.
///
/// # Position Types
///
/// - **Individual positions**: PG, SG, SF, PF, C
/// - **Flexible positions**: G (PG/SG), F (SF/PF), Util (any)
/// - **Roster slots**: BN (bench), IL / IL+ (injured list), NA (not active)
///
/// Yahoo occasionally introduces slot names per season; those are kept verbatim
/// in [`Position::Other`] rather than rejected.
///
/// # Examples
///
/// ```rust
/// use fantasy_hoops::Position;
///
/// let pg: Position = "PG".parse().unwrap();
/// assert_eq!(pg, Position::PG);
/// assert!(Position::G.covers(&Position::PG));
/// assert_eq!(Position::ILPlus.to_string(), "IL+");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    PG,
    SG,
    G,
    SF,
    PF,
    F,
    C,
    Util,
    BN,
    IL,
    ILPlus,
    NA,
    Other(String),
}

impl Position {
    /// Whether a player eligible at `other` may fill this slot.
    pub fn covers(&self, other: &Position) -> bool {
        match self {
            Position::G => matches!(other, Position::PG | Position::SG | Position::G),
            Position::F => matches!(other, Position::SF | Position::PF | Position::F),
            Position::Util | Position::BN => other.is_playing_position(),
            _ => self == other,
        }
    }

    /// Slots that hold players without counting them as active.
    pub fn is_reserve_slot(&self) -> bool {
        matches!(self, Position::IL | Position::ILPlus | Position::NA)
    }

    fn is_playing_position(&self) -> bool {
        matches!(
            self,
            Position::PG
                | Position::SG
                | Position::G
                | Position::SF
                | Position::PF
                | Position::F
                | Position::C
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::PG => "PG",
            Position::SG => "SG",
            Position::G => "G",
            Position::SF => "SF",
            Position::PF => "PF",
            Position::F => "F",
            Position::C => "C",
            Position::Util => "Util",
            Position::BN => "BN",
            Position::IL => "IL",
            Position::ILPlus => "IL+",
            Position::NA => "NA",
            Position::Other(s) => s.as_str(),
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Position {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.to_uppercase().as_str() {
            "PG" => Position::PG,
            "SG" => Position::SG,
            "G" => Position::G,
            "SF" => Position::SF,
            "PF" => Position::PF,
            "F" => Position::F,
            "C" => Position::C,
            "UTIL" => Position::Util,
            "BN" | "BENCH" => Position::BN,
            "IL" | "IR" => Position::IL,
            "IL+" | "ILPLUS" => Position::ILPlus,
            "NA" => Position::NA,
            _ => Position::Other(trimmed.to_string()),
        })
    }
}

impl From<String> for Position {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(p) => p,
            Err(never) => match never {},
        }
    }
}

impl From<Position> for String {
    fn from(p: Position) -> Self {
        p.to_string()
    }
}
