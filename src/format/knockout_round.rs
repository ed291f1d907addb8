// Playoff format: field size, series lengths per round and bracket behaviour.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
#[serde(default)]
pub struct PlayoffFormat {
    pub field_size: u16,
    pub series_lengths_by_round: Vec<u8>,   // Best-of-N for each round, first round first.
    pub reseeding: bool,
    pub by_conference: bool,
    pub allow_even_series: bool,    // A tied even series plays deciding games until someone reaches the threshold.
}

impl Default for PlayoffFormat {
    fn default() -> Self {
        Self {
            field_size: 16,
            series_lengths_by_round: vec![7, 7, 7, 7],
            reseeding: false,
            by_conference: true,
            allow_even_series: false,
        }
    }
}

impl PlayoffFormat {
    pub fn build(field_size: u16, series_lengths_by_round: Vec<u8>, reseeding: bool) -> Self {
        Self {
            field_size: field_size,
            series_lengths_by_round: series_lengths_by_round,
            reseeding: reseeding,
            by_conference: false,
            allow_even_series: false,
        }
    }

    pub fn rounds(&self) -> usize {
        self.series_lengths_by_round.len()
    }

    // Number of first-round slots. Always a power of two.
    pub fn slots(&self) -> u32 {
        match self.rounds() {
            0 => 0,
            n if n >= 16 => u32::MAX,
            n => 1 << n,
        }
    }

    // Top seeds that skip the first round.
    pub fn byes(&self) -> u32 {
        self.slots().saturating_sub(self.field_size as u32)
    }

    // Best-of-N for the given zero-based round. Rounds past the configured ones use the last length.
    pub fn series_length(&self, round: usize) -> u8 {
        match self.series_lengths_by_round.get(round) {
            Some(n) => *n,
            None => self.series_lengths_by_round.last().copied().unwrap_or(1),
        }
    }

    // Wins needed to take a series in the given round.
    pub fn wins_required(&self, round: usize) -> u8 {
        wins_required(self.series_length(round))
    }
}

// Majority threshold of a best-of-N series: ceil((N + 1) / 2).
pub fn wins_required(series_length: u8) -> u8 {
    series_length / 2 + 1
}
