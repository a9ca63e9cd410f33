//! Medal types and per-type tallies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MedalType {
    Gold,
    Silver,
    Bronze,
}

impl MedalType {
    pub const ALL: [MedalType; 3] = [MedalType::Gold, MedalType::Silver, MedalType::Bronze];

    /// Label used in the `medal_type` column and as the `medals_total` header.
    pub fn column(self) -> &'static str {
        match self {
            MedalType::Gold => "Gold Medal",
            MedalType::Silver => "Silver Medal",
            MedalType::Bronze => "Bronze Medal",
        }
    }

    /// Short display name.
    pub fn short(self) -> &'static str {
        match self {
            MedalType::Gold => "Gold",
            MedalType::Silver => "Silver",
            MedalType::Bronze => "Bronze",
        }
    }

    /// Parse a dataset label such as `"Gold Medal"`.
    pub fn from_column(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.column() == label.trim())
    }
}

impl fmt::Display for MedalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for MedalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.trim_end_matches(" medal") {
            "gold" | "g" => Ok(MedalType::Gold),
            "silver" | "s" => Ok(MedalType::Silver),
            "bronze" | "b" => Ok(MedalType::Bronze),
            _ => Err(format!("unknown medal type: {}", s)),
        }
    }
}

/// Gold, silver and bronze counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedalTally {
    pub gold: i64,
    pub silver: i64,
    pub bronze: i64,
}

impl MedalTally {
    pub fn new(gold: i64, silver: i64, bronze: i64) -> Self {
        Self { gold, silver, bronze }
    }

    pub fn total(&self) -> i64 {
        self.gold + self.silver + self.bronze
    }

    pub fn get(&self, medal: MedalType) -> i64 {
        match medal {
            MedalType::Gold => self.gold,
            MedalType::Silver => self.silver,
            MedalType::Bronze => self.bronze,
        }
    }

    pub fn add(&mut self, medal: MedalType, count: i64) {
        match medal {
            MedalType::Gold => self.gold += count,
            MedalType::Silver => self.silver += count,
            MedalType::Bronze => self.bronze += count,
        }
    }

    /// Counts in Gold, Silver, Bronze order.
    pub fn by_type(&self) -> [(MedalType, i64); 3] {
        MedalType::ALL.map(|m| (m, self.get(m)))
    }
}

impl AddAssign for MedalTally {
    fn add_assign(&mut self, rhs: Self) {
        self.gold += rhs.gold;
        self.silver += rhs.silver;
        self.bronze += rhs.bronze;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_medal_type() {
        assert_eq!("gold".parse::<MedalType>(), Ok(MedalType::Gold));
        assert_eq!("Silver Medal".parse::<MedalType>(), Ok(MedalType::Silver));
        assert_eq!("B".parse::<MedalType>(), Ok(MedalType::Bronze));
        assert!("platinum".parse::<MedalType>().is_err());
        assert_eq!(MedalType::from_column("Bronze Medal"), Some(MedalType::Bronze));
        assert_eq!(MedalType::from_column("Bronze"), None);
    }

    #[test]
    fn test_display_order() {
        let mut medals = vec![MedalType::Bronze, MedalType::Gold, MedalType::Silver];
        medals.sort();
        assert_eq!(medals, MedalType::ALL.to_vec());
    }

    #[test]
    fn test_tally_total_matches_parts() {
        let mut tally = MedalTally::new(3, 2, 1);
        tally.add(MedalType::Bronze, 4);
        tally += MedalTally::new(1, 1, 1);
        assert_eq!(tally, MedalTally::new(4, 3, 6));
        assert_eq!(tally.total(), tally.by_type().iter().map(|(_, n)| n).sum::<i64>());
    }
}
