// League configuration. Every component takes the parts it needs from here explicitly.
pub mod round_robin;
pub mod knockout_round;
pub mod validator;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    error::Result,
    format::{knockout_round::PlayoffFormat, round_robin::RoundRobinFormat},
    season::ranking::RankCriteria,
    time::Cadence,
};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
#[serde(default)]
pub struct LeagueConfig {
    pub cadence: Cadence,
    pub start_date: Option<Date>,   // Calendar date of day 0, if the league wants real dates.
    pub round_robin: RoundRobinFormat,
    pub playoffs: PlayoffFormat,
    pub tiebreaker_order: Vec<RankCriteria>,
    pub owner_mood: OwnerMoodFormat,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            cadence: Cadence::Day,
            start_date: None,
            round_robin: RoundRobinFormat::default(),
            playoffs: PlayoffFormat::default(),
            tiebreaker_order: RankCriteria::default_order(),
            owner_mood: OwnerMoodFormat::default(),
        }
    }
}

impl LeagueConfig {
    // Parse the configuration from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// How strongly owners react to a season.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
#[serde(default)]
pub struct OwnerMoodFormat {
    pub sensitivity: f64,
    pub max_delta: f64,     // Largest change a single season can cause, in either direction.
}

impl Default for OwnerMoodFormat {
    fn default() -> Self {
        Self { sensitivity: 1.0, max_delta: 0.5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = LeagueConfig::from_json(r#"{
            "cadence": "week",
            "round_robin": { "games_per_team": 17, "season_length": 18 },
            "playoffs": { "field_size": 14, "series_lengths_by_round": [1, 1, 1, 1], "reseeding": true },
            "tiebreaker_order": ["win_pct", "head_to_head", "point_differential"]
        }"#).unwrap();

        assert_eq!(config.cadence, Cadence::Week);
        assert_eq!(config.round_robin.games_per_team, 17);
        assert_eq!(config.round_robin.points_for_win, 2);
        assert_eq!(config.playoffs.field_size, 14);
        assert!(config.playoffs.reseeding);
        assert_eq!(config.tiebreaker_order.len(), 3);
        assert_eq!(config.owner_mood, OwnerMoodFormat::default());
    }

    #[test]
    fn test_malformed_json_is_a_config_error() {
        let err = LeagueConfig::from_json(r#"{ "cadence": "fortnight" }"#).unwrap_err();
        assert!(matches!(err, crate::error::LeagueError::Config(_)));
    }

    #[test]
    fn test_json_survives_a_trip() {
        let config = LeagueConfig::default();
        let back = LeagueConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, back);
    }
}
