// Pre-flight checks for a league configuration.
// Every rule is checked, so the caller gets the full list of problems at once.

use std::collections::HashSet;

use crate::{
    error::{ConfigViolation, LeagueError, Result},
    format::LeagueConfig,
    team::{self, Team},
};

// Check the configuration against the roster. Pure: the same input always gives the same answer.
pub fn validate(config: &LeagueConfig, roster: &[Team]) -> Result<()> {
    let mut violations = Vec::new();

    check_roster(roster, &mut violations);
    check_regular_season(config, roster, &mut violations);
    check_series_lengths(config, &mut violations);
    check_playoff_field(config, roster, &mut violations);
    check_owner_mood(config, &mut violations);

    if violations.is_empty() {
        return Ok(());
    }
    return Err(LeagueError::InvalidConfiguration(violations));
}

// Team ids must be unique and dense.
fn check_roster(roster: &[Team], violations: &mut Vec<ConfigViolation>) {
    if roster.len() < 2 {
        violations.push(ConfigViolation::build("roster", format!("league needs at least 2 teams, has {}", roster.len())));
    }

    let mut seen = HashSet::new();
    for team in roster {
        if !seen.insert(team.id) {
            violations.push(ConfigViolation::build("roster", format!("team id {} appears more than once", team.id)));
        }
        else if team.id as usize >= roster.len() {
            violations.push(ConfigViolation::build("roster", format!("team id {} is not dense for {} teams", team.id, roster.len())));
        }
    }
}

fn check_regular_season(config: &LeagueConfig, roster: &[Team], violations: &mut Vec<ConfigViolation>) {
    let rr = &config.round_robin;

    if rr.games_per_team == 0 {
        violations.push(ConfigViolation::build("games_per_team", "must be positive"));
    }

    if rr.season_length < rr.games_per_team {
        violations.push(ConfigViolation::build("season_length",
            format!("{} slots cannot fit {} games per team", rr.season_length, rr.games_per_team)));
    }

    for team in roster {
        let required = rr.required_games_for(team, roster);
        if required != rr.games_per_team {
            violations.push(ConfigViolation::build("matchup_requirements",
                format!("team {} gets {} games from the per-opponent rules, games_per_team is {}", team.id, required, rr.games_per_team)));
        }
    }
}

// Series must be positive and odd, unless even series are explicitly allowed.
fn check_series_lengths(config: &LeagueConfig, violations: &mut Vec<ConfigViolation>) {
    let playoffs = &config.playoffs;

    if playoffs.series_lengths_by_round.is_empty() {
        violations.push(ConfigViolation::build("series_lengths_by_round", "at least one playoff round is needed"));
    }

    for (i, length) in playoffs.series_lengths_by_round.iter().enumerate() {
        if *length == 0 {
            violations.push(ConfigViolation::build("series_lengths_by_round", format!("round {} has length 0", i + 1)));
        }
        else if length % 2 == 0 && !playoffs.allow_even_series {
            violations.push(ConfigViolation::build("series_lengths_by_round",
                format!("round {} has even length {} but allow_even_series is off", i + 1, length)));
        }
    }
}

// The field has to fit the bracket, with byes only in the first round.
fn check_playoff_field(config: &LeagueConfig, roster: &[Team], violations: &mut Vec<ConfigViolation>) {
    let playoffs = &config.playoffs;
    let field = playoffs.field_size as u32;
    let rounds = playoffs.rounds();

    if field < 2 {
        violations.push(ConfigViolation::build("playoff_field_size", "at least 2 teams must qualify"));
        return;
    }
    if rounds == 0 { return; }
    if rounds > 15 {
        violations.push(ConfigViolation::build("series_lengths_by_round", format!("{rounds} rounds is more than supported")));
        return;
    }

    let slots = playoffs.slots();
    if field > slots || field <= slots / 2 {
        violations.push(ConfigViolation::build("playoff_field_size",
            format!("{} teams do not fit {} rounds: field must be above {} and at most {}", field, rounds, slots / 2, slots)));
    }

    if field as usize > roster.len() {
        violations.push(ConfigViolation::build("playoff_field_size",
            format!("{} qualifiers but only {} teams", field, roster.len())));
    }

    if playoffs.by_conference {
        check_conference_playoffs(config, roster, violations);
    }
}

fn check_conference_playoffs(config: &LeagueConfig, roster: &[Team], violations: &mut Vec<ConfigViolation>) {
    let playoffs = &config.playoffs;
    let conferences = team::conferences(roster);
    let count = conferences.len() as u32;
    if count == 0 { return; }

    if !count.is_power_of_two() {
        violations.push(ConfigViolation::build("playoffs_by_conference",
            format!("{count} conferences cannot split a bracket evenly")));
        return;
    }

    let slots = playoffs.slots();
    if slots / count < 2 {
        violations.push(ConfigViolation::build("playoffs_by_conference",
            format!("{} rounds are not enough for {} conference brackets", playoffs.rounds(), count)));
        return;
    }

    if playoffs.field_size as u32 % count != 0 {
        violations.push(ConfigViolation::build("playoffs_by_conference",
            format!("field of {} does not divide between {} conferences", playoffs.field_size, count)));
        return;
    }

    let per_conference = playoffs.field_size as usize / count as usize;
    for conference in conferences {
        let teams = roster.iter().filter(|t| t.conference == conference).count();
        if teams < per_conference {
            violations.push(ConfigViolation::build("playoffs_by_conference",
                format!("conference {conference} has {teams} teams, {per_conference} must qualify")));
        }
    }
}

fn check_owner_mood(config: &LeagueConfig, violations: &mut Vec<ConfigViolation>) {
    let mood = &config.owner_mood;
    if !(mood.sensitivity >= 0.0) {
        violations.push(ConfigViolation::build("owner_mood", "sensitivity must be a non-negative number"));
    }
    if !(mood.max_delta > 0.0 && mood.max_delta <= 1.0) {
        violations.push(ConfigViolation::build("owner_mood", "max_delta must be in (0, 1]"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{knockout_round::PlayoffFormat, round_robin::RoundRobinFormat};

    fn four_teams() -> Vec<Team> {
        (0..4).map(|i| Team::build(i, 0, 0)).collect()
    }

    fn single_round_robin() -> LeagueConfig {
        LeagueConfig {
            round_robin: RoundRobinFormat::build(3, 3, 1, 0, 0),
            playoffs: PlayoffFormat::build(4, vec![3, 3], false),
            ..Default::default()
        }
    }

    fn rules(err: LeagueError) -> Vec<&'static str> {
        match err {
            LeagueError::InvalidConfiguration(v) => v.iter().map(|v| v.rule).collect(),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_valid_configuration() {
        assert!(validate(&single_round_robin(), &four_teams()).is_ok());
    }

    #[test]
    fn test_all_violations_reported_in_one_pass() {
        let mut config = single_round_robin();
        config.round_robin.games_per_team = 5;
        config.playoffs.series_lengths_by_round = vec![4, 3];
        config.playoffs.field_size = 9;

        let found = rules(validate(&config, &four_teams()).unwrap_err());
        assert!(found.contains(&"matchup_requirements"));
        assert!(found.contains(&"series_lengths_by_round"));
        assert!(found.contains(&"playoff_field_size"));
        assert!(found.contains(&"season_length"));
    }

    #[test]
    fn test_even_series_allowed_with_flag() {
        let mut config = single_round_robin();
        config.playoffs.series_lengths_by_round = vec![2, 4];
        assert!(validate(&config, &four_teams()).is_err());

        config.playoffs.allow_even_series = true;
        assert!(validate(&config, &four_teams()).is_ok());
    }

    #[test]
    fn test_byes_limited_to_first_round() {
        let mut config = single_round_robin();
        let roster: Vec<Team> = (0..8).map(|i| Team::build(i, 0, 0)).collect();
        config.round_robin = RoundRobinFormat::build(7, 10, 1, 0, 0);

        // 3 teams over 2 rounds is one bye out of 4 slots: fine.
        config.playoffs.field_size = 3;
        assert!(validate(&config, &roster).is_ok());

        // 2 teams over 2 rounds would need a bye against a bye.
        config.playoffs.field_size = 2;
        assert_eq!(rules(validate(&config, &roster).unwrap_err()), vec!["playoff_field_size"]);
    }

    #[test]
    fn test_conference_playoffs_need_power_of_two() {
        let roster: Vec<Team> = (0..9).map(|i| Team::build(i, (i / 3) as u8, 0)).collect();
        let config = LeagueConfig {
            round_robin: RoundRobinFormat::build(8, 10, 1, 1, 1),
            playoffs: PlayoffFormat { by_conference: true, ..PlayoffFormat::build(6, vec![1, 1, 1], false) },
            ..Default::default()
        };

        assert_eq!(rules(validate(&config, &roster).unwrap_err()), vec!["playoffs_by_conference"]);
    }

    #[test]
    fn test_balanced_game_counts_pass() {
        // Two conferences, two divisions each, three teams per division.
        let roster: Vec<Team> = (0..12).map(|i| Team::build(i, (i / 6) as u8, ((i / 3) % 2) as u8)).collect();

        for games_per_team in [11, 16, 24, 40] {
            let config = LeagueConfig {
                round_robin: RoundRobinFormat::for_roster(games_per_team, &roster).unwrap(),
                playoffs: PlayoffFormat::build(8, vec![1, 3, 5], false),
                ..Default::default()
            };
            assert!(validate(&config, &roster).is_ok(), "{games_per_team} games");
        }
    }

    #[test]
    fn test_roster_ids_dense_and_unique() {
        let roster = vec![Team::build(0, 0, 0), Team::build(0, 0, 0), Team::build(7, 0, 0)];
        let found = rules(validate(&single_round_robin(), &roster).unwrap_err());
        assert_eq!(found.iter().filter(|r| **r == "roster").count(), 2);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let mut config = single_round_robin();
        config.playoffs.field_size = 7;

        let first = validate(&config, &four_teams()).unwrap_err().to_string();
        let second = validate(&config, &four_teams()).unwrap_err().to_string();
        assert_eq!(first, second);
    }
}
