use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Transport mode understood by the routing service.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportProfile {
    #[default]
    Driving,
    Cycling,
    Walking,
}

impl TransportProfile {
    pub const ALL: [Self; 3] = [Self::Driving, Self::Cycling, Self::Walking];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Cycling => "cycling",
            Self::Walking => "walking",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "driving" | "car" => Ok(Self::Driving),
            "cycling" | "bike" | "bicycle" => Ok(Self::Cycling),
            "walking" | "foot" => Ok(Self::Walking),
            other => Err(Error::invalid_input(format!(
                "unknown transport profile '{other}', expected driving, cycling or walking"
            ))),
        }
    }
}

impl FromStr for TransportProfile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TransportProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
