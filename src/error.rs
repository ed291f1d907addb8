use thiserror::Error;

use crate::types::{Day, GameId, TeamId};

// A single broken configuration rule. The validator collects all of them at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigViolation {
    pub rule: &'static str,
    pub message: String,
}

impl ConfigViolation {
    pub fn build(rule: &'static str, message: impl Into<String>) -> Self {
        Self { rule, message: message.into() }
    }
}

impl std::fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.rule, self.message)
    }
}

#[derive(Error, Debug)]
pub enum LeagueError {
    #[error("invalid configuration: {}", join_violations(.0))]
    InvalidConfiguration(Vec<ConfigViolation>),

    #[error("team {team_id} would play {generated} games, expected {expected}")]
    ConstraintUnsatisfiable { team_id: TeamId, generated: u16, expected: u16 },

    #[error("{remaining} games could not be placed within {days} days")]
    SchedulingDeadlock { remaining: usize, days: Day },

    #[error("{eligible} teams eligible, playoff field needs {required}")]
    InsufficientTeams { eligible: usize, required: usize },

    #[error("game {0} does not exist or already has a result")]
    UnknownOrAlreadyResolvedGame(GameId),

    #[error("game {0} already exists in the schedule")]
    DuplicateGame(GameId),

    #[error("team {team_id} already plays on day {day}")]
    DoubleBooked { team_id: TeamId, day: Day },

    #[error("invalid result for game {game_id}: {reason}")]
    InvalidResult { game_id: GameId, reason: String },

    #[error("cannot {action} during {phase}")]
    InvalidPhase { action: &'static str, phase: &'static str },

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

fn join_violations(violations: &[ConfigViolation]) -> String {
    violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; ")
}

pub type Result<T> = std::result::Result<T, LeagueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_lists_every_violation() {
        let err = LeagueError::InvalidConfiguration(vec![
            ConfigViolation::build("series_length", "round 1 has even length 4"),
            ConfigViolation::build("playoff_field", "field of 9 does not fit 2 rounds"),
        ]);

        let text = err.to_string();
        assert!(text.contains("series_length: round 1 has even length 4"));
        assert!(text.contains("playoff_field: field of 9 does not fit 2 rounds"));
    }
}
