// A single scheduled game. The result comes from outside; the calendar only records it.

use serde::{Deserialize, Serialize};

use crate::types::{Day, GameId, SeriesId, TeamId};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    RegularSeason,
    Playoffs { round: u8, series: SeriesId },
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win(TeamId),
    Tie,
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub home: TeamId,
    pub away: TeamId,
    pub day: Day,
    pub phase: Phase,
    pub outcome: Option<Outcome>,
}

// Basics.
impl Game {
    pub fn build(id: GameId, home: TeamId, away: TeamId, day: Day, phase: Phase) -> Self {
        Self {
            id: id,
            home: home,
            away: away,
            day: day,
            phase: phase,
            outcome: None,
        }
    }

    pub fn is_played(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home == team_id || self.away == team_id
    }

    pub fn is_playoff(&self) -> bool {
        matches!(self.phase, Phase::Playoffs { .. })
    }

    // Get the series of a playoff game.
    pub fn series(&self) -> Option<SeriesId> {
        match self.phase {
            Phase::Playoffs { series, .. } => Some(series),
            Phase::RegularSeason => None,
        }
    }

    // Get the opponent of the given team, if the team plays in this game.
    pub fn opponent_of(&self, team_id: TeamId) -> Option<TeamId> {
        if self.home == team_id { Some(self.away) }
        else if self.away == team_id { Some(self.home) }
        else { None }
    }

    pub fn winner(&self) -> Option<TeamId> {
        match self.outcome {
            Some(Outcome::Win(id)) => Some(id),
            _ => None,
        }
    }
}
