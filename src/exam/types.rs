use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    VeryHard,
}

impl Difficulty {
    /// Bucket order used by generation.
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::VeryHard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::VeryHard => "very-hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "very-hard" | "very_hard" | "veryhard" => Ok(Self::VeryHard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Requested question count per difficulty bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DifficultyDistribution {
    #[serde(default)]
    pub easy: u32,
    #[serde(default)]
    pub medium: u32,
    #[serde(default)]
    pub hard: u32,
    #[serde(default)]
    pub very_hard: u32,
}

impl DifficultyDistribution {
    pub fn count(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
            Difficulty::VeryHard => self.very_hard,
        }
    }

    /// Buckets with a positive count, in [`Difficulty::ALL`] order.
    pub fn buckets(&self) -> impl Iterator<Item = (Difficulty, u32)> + '_ {
        Difficulty::ALL
            .into_iter()
            .map(|d| (d, self.count(d)))
            .filter(|(_, count)| *count > 0)
    }

    pub fn requested_difficulties(&self) -> Vec<Difficulty> {
        self.buckets().map(|(d, _)| d).collect()
    }

    pub fn total(&self) -> u32 {
        Difficulty::ALL.iter().map(|d| self.count(*d)).sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    #[default]
    Normal,
    #[serde(alias = "incorrect")]
    IncorrectOnly,
    #[serde(alias = "skipped")]
    SkippedOnly,
}
