//! Planet codes used as column keys of a planetary matrix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the nine classical planets, identified by its two-letter code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlanetCode {
    Su,
    Mo,
    Ma,
    Me,
    Ju,
    Ve,
    Sa,
    Ra,
    Ke,
}

impl PlanetCode {
    /// All planet codes in their conventional column order.
    pub const ALL: [PlanetCode; 9] = [
        PlanetCode::Su,
        PlanetCode::Mo,
        PlanetCode::Ma,
        PlanetCode::Me,
        PlanetCode::Ju,
        PlanetCode::Ve,
        PlanetCode::Sa,
        PlanetCode::Ra,
        PlanetCode::Ke,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanetCode::Su => "Su",
            PlanetCode::Mo => "Mo",
            PlanetCode::Ma => "Ma",
            PlanetCode::Me => "Me",
            PlanetCode::Ju => "Ju",
            PlanetCode::Ve => "Ve",
            PlanetCode::Sa => "Sa",
            PlanetCode::Ra => "Ra",
            PlanetCode::Ke => "Ke",
        }
    }
}

impl fmt::Display for PlanetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a recognised planet code or name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown planet code: '{0}'")]
pub struct UnknownPlanet(pub String);

impl FromStr for PlanetCode {
    type Err = UnknownPlanet;

    /// Accepts the two-letter code or the English planet name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Su" | "Sun" => Ok(PlanetCode::Su),
            "Mo" | "Moon" => Ok(PlanetCode::Mo),
            "Ma" | "Mars" => Ok(PlanetCode::Ma),
            "Me" | "Mercury" => Ok(PlanetCode::Me),
            "Ju" | "Jupiter" => Ok(PlanetCode::Ju),
            "Ve" | "Venus" => Ok(PlanetCode::Ve),
            "Sa" | "Saturn" => Ok(PlanetCode::Sa),
            "Ra" | "Rahu" => Ok(PlanetCode::Ra),
            "Ke" | "Ketu" => Ok(PlanetCode::Ke),
            other => Err(UnknownPlanet(other.to_string())),
        }
    }
}
