// How happy each team's owner is. Updated once at the end of every season.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{format::OwnerMoodFormat, types::TeamId};

const INITIAL_MOOD: f64 = 0.5;

// Weights of the season signals.
const WINS_WEIGHT: f64 = 0.25;
const PLAYOFFS_WEIGHT: f64 = 0.2;
const MONEY_WEIGHT: f64 = 0.15;

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PlayoffResult {
    Missed,
    Eliminated { rounds_won: u8, rounds: u8 },
    Champion,
}

// What the owner looks at when the season ends.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq)]
pub struct SeasonSignals {
    pub win_pct: f64,
    pub playoffs: PlayoffResult,
    pub financial_health: f64,  // -1 is a disaster, 1 is as good as it gets.
}

// How much each signal moved the mood.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, Copy, PartialEq)]
pub struct MoodComponents {
    pub wins: f64,
    pub playoffs: f64,
    pub money: f64,
}

impl MoodComponents {
    pub fn total(&self) -> f64 {
        self.wins + self.playoffs + self.money
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq)]
pub struct MoodState {
    pub mood: f64,
    pub last_update: Option<MoodComponents>,
}

impl Default for MoodState {
    fn default() -> Self {
        Self { mood: INITIAL_MOOD, last_update: None }
    }
}

// Get the contribution of each signal before sensitivity and limits.
pub fn components(signals: &SeasonSignals) -> MoodComponents {
    let win_pct = finite_or_zero(signals.win_pct).clamp(0.0, 1.0);

    let playoffs = match signals.playoffs {
        PlayoffResult::Missed => -PLAYOFFS_WEIGHT,
        PlayoffResult::Eliminated { rounds_won, rounds } if rounds > 0 => {
            PLAYOFFS_WEIGHT * rounds_won.min(rounds) as f64 / rounds as f64
        }
        PlayoffResult::Eliminated { .. } => 0.0,
        PlayoffResult::Champion => PLAYOFFS_WEIGHT,
    };

    MoodComponents {
        wins: WINS_WEIGHT * (win_pct - 0.5) / 0.5,
        playoffs: playoffs,
        money: MONEY_WEIGHT * finite_or_zero(signals.financial_health).clamp(-1.0, 1.0),
    }
}

// Get the state after a season. The change is limited by the format and the mood stays within [0, 1].
pub fn next_state(state: &MoodState, signals: &SeasonSignals, format: &OwnerMoodFormat) -> MoodState {
    let components = components(signals);
    let limit = format.max_delta.abs();
    let delta = (components.total() * format.sensitivity).clamp(-limit, limit);
    let delta = finite_or_zero(delta);

    MoodState {
        mood: (state.mood + delta).clamp(0.0, 1.0),
        last_update: Some(components),
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

// Every owner's mood in the league.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
pub struct OwnerMoodTracker {
    moods: BTreeMap<TeamId, MoodState>,
}

impl OwnerMoodTracker {
    pub fn build() -> Self {
        Self::default()
    }

    // Get the mood of a team. Teams seen for the first time have a neutral owner.
    pub fn get(&self, team_id: TeamId) -> MoodState {
        self.moods.get(&team_id).copied().unwrap_or_default()
    }

    pub fn update(&mut self, team_id: TeamId, signals: &SeasonSignals, format: &OwnerMoodFormat) -> MoodState {
        let state = next_state(&self.get(team_id), signals, format);
        debug!(team_id, mood = state.mood, "owner mood updated");

        self.moods.insert(team_id, state);
        return state;
    }
}
