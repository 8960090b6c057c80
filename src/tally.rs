use std::fmt;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

/// The fixed set of teams a visitor can vote for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VoteTeam {
    Chiefs,
    Bills,
    Eagles,
    Commanders,
}

impl VoteTeam {
    pub const ALL: [VoteTeam; 4] = [
        VoteTeam::Chiefs,
        VoteTeam::Bills,
        VoteTeam::Eagles,
        VoteTeam::Commanders,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VoteTeam::Chiefs => "Chiefs",
            VoteTeam::Bills => "Bills",
            VoteTeam::Eagles => "Eagles",
            VoteTeam::Commanders => "Commanders",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|team| team.as_str() == name)
    }

    pub fn index(self) -> usize {
        match self {
            VoteTeam::Chiefs => 0,
            VoteTeam::Bills => 1,
            VoteTeam::Eagles => 2,
            VoteTeam::Commanders => 3,
        }
    }
}

impl fmt::Display for VoteTeam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VoteTally {
    counts: [u64; 4],
}

impl VoteTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_counts(counts: [u64; 4]) -> Self {
        Self { counts }
    }

    pub fn get(&self, team: VoteTeam) -> u64 {
        self.counts[team.index()]
    }

    pub fn set(&mut self, team: VoteTeam, count: u64) {
        self.counts[team.index()] = count;
    }

    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .fold(0u64, |acc, count| acc.saturating_add(*count))
    }

    /// Share of the total for `team` as `round(count / total * 100)` in floating point.
    /// Zero when nobody has voted.
    pub fn percentage(&self, team: VoteTeam) -> u8 {
        rounded_percentage(self.get(team), self.total())
    }

    pub fn percentages(&self) -> [u8; 4] {
        VoteTeam::ALL.map(|team| self.percentage(team))
    }
}

fn rounded_percentage(count: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let share = count.min(total) as f64 / total as f64;
    (share * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Parses a backend tally body.
///
/// Teams missing from the body count as zero and unknown keys are skipped.
/// Anything that is not a non-negative integer count is rejected, as is a
/// body whose counts do not fit in a `u64` total.
pub fn parse_tally_json(raw: &str) -> Result<VoteTally> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid tally json")?;
    let Value::Object(entries) = root else {
        return Err(anyhow!("tally must be a json object"));
    };

    let mut tally = VoteTally::new();
    let mut total = 0u64;
    for (key, value) in &entries {
        let Some(team) = VoteTeam::from_name(key) else {
            log::debug!("ignoring unknown tally key {key:?}");
            continue;
        };
        let count = value
            .as_u64()
            .ok_or_else(|| anyhow!("invalid count for {team}: {value}"))?;
        total = total
            .checked_add(count)
            .ok_or_else(|| anyhow!("tally total overflows at {team}"))?;
        tally.set(team, count);
    }
    for team in VoteTeam::ALL {
        if !entries.contains_key(team.as_str()) {
            log::debug!("tally has no entry for {team}, using 0");
        }
    }
    Ok(tally)
}
