use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::{clamp_score, Classification};
use crate::weights::Thresholds;

/// Classification tier. Lead time and colour are fixed per tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    A1,
    A2,
    A3,
    B1,
    B2,
    C1,
}

impl Tier {
    /// Declaration order of the threshold cascade.
    pub const ALL: [Tier; 6] = [Tier::A1, Tier::A2, Tier::A3, Tier::B1, Tier::B2, Tier::C1];

    pub fn code(&self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::A3 => "A3",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
        }
    }

    pub fn lead_time(&self) -> &'static str {
        match self {
            Self::A1 => "2–3 weken",
            Self::A2 => "3–4 weken",
            Self::A3 => "4–6 weken",
            Self::B1 => "4–5 weken",
            Self::B2 => "5–7 weken",
            Self::C1 => "8–12 weken",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::A1 => "#16a34a",
            Self::A2 => "#22c55e",
            Self::A3 => "#84cc16",
            Self::B1 => "#f59e0b",
            Self::B2 => "#f97316",
            Self::C1 => "#ef4444",
        }
    }

    pub fn label(&self) -> String {
        format!("{} — {}", self.code(), self.lead_time())
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Error)]
#[error("unknown tier: {0}")]
pub struct TierParseError(pub String);

impl FromStr for Tier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Tier::ALL
            .into_iter()
            .find(|tier| tier.code() == normalized)
            .ok_or_else(|| TierParseError(s.to_string()))
    }
}

/// First tier whose bound is >= the clamped score, checked A1 through B2 in
/// order; anything above B2 is C1. Thresholds are not required to be sorted.
pub fn classify_tier(score: f64, thresholds: &Thresholds) -> Tier {
    let score = clamp_score(score);
    Tier::ALL
        .into_iter()
        .filter(|tier| *tier != Tier::C1)
        .find(|tier| score <= thresholds.bound(*tier))
        .unwrap_or(Tier::C1)
}

pub fn classify(score: f64, thresholds: &Thresholds) -> Classification {
    let tier = classify_tier(score, thresholds);
    Classification {
        code: tier,
        lead: tier.lead_time().to_string(),
        color: tier.color().to_string(),
        label: tier.label(),
    }
}
