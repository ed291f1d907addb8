// Functions and methods for ranking teams within a season and turning the ranking into playoff seeds.

use std::{cmp::Ordering, collections::{BTreeMap, HashMap}};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::{
    error::{LeagueError, Result},
    format::{round_robin::RoundRobinFormat, LeagueConfig},
    game::Outcome,
    season::schedule::ScheduleStore,
    team::{self, Team},
    types::{ConferenceId, TeamId},
};

// What ranking criteria a league has, in priority order.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RankCriteria {
    WinPct,
    Points,
    Wins,
    Losses,
    HeadToHead,
    DivisionRecord,
    ConferenceRecord,
    PointDifferential,
    PointsScored,
    PointsAllowed,
}

impl RankCriteria {
    // Only criteria that standings built from the schedule can tell apart.
    pub fn default_order() -> Vec<Self> {
        vec![
            RankCriteria::WinPct,
            RankCriteria::HeadToHead,
            RankCriteria::DivisionRecord,
            RankCriteria::ConferenceRecord,
        ]
    }

    // Whether the criterium reads scores. The schedule only knows who won, so these need standings from outside.
    pub fn needs_scores(&self) -> bool {
        matches!(self, RankCriteria::PointDifferential | RankCriteria::PointsScored | RankCriteria::PointsAllowed)
    }
}

// Wins, losses and ties against some subset of opponents.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub wins: u16,
    pub losses: u16,
    pub ties: u16,
}

impl Record {
    pub fn games(&self) -> u16 {
        self.wins + self.losses + self.ties
    }

    // Compare win percentages without floats. Better record first.
    fn compare(&self, other: &Record) -> Ordering {
        compare_pct(self.wins, self.ties, self.games(), other.wins, other.ties, other.games())
    }
}

// Compare (wins + ties / 2) / games of two teams, better first. Teams with no games count as .500.
fn compare_pct(a_wins: u16, a_ties: u16, a_games: u16, b_wins: u16, b_ties: u16, b_games: u16) -> Ordering {
    let a_half_points = match a_games { 0 => 1, _ => 2 * a_wins as u64 + a_ties as u64 };
    let b_half_points = match b_games { 0 => 1, _ => 2 * b_wins as u64 + b_ties as u64 };
    let a_games = a_games.max(1) as u64;
    let b_games = b_games.max(1) as u64;

    // a_half / (2 * a_games) against b_half / (2 * b_games).
    (b_half_points * a_games).cmp(&(a_half_points * b_games))
}

// One row of the standings table.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
#[serde(default)]
pub struct TeamStanding {
    pub team_id: TeamId,
    pub wins: u16,
    pub losses: u16,
    pub ties: u16,
    pub ot_losses: u16,
    pub points_for: u32,
    pub points_against: u32,
    pub division: Record,
    pub conference: Record,
    pub head_to_head: BTreeMap<TeamId, Record>,
}

// Basics.
impl TeamStanding {
    pub fn build(team_id: TeamId, wins: u16, losses: u16, ties: u16) -> Self {
        Self {
            team_id: team_id,
            wins: wins,
            losses: losses,
            ties: ties,
            ..Default::default()
        }
    }

    pub fn games(&self) -> u16 {
        self.wins + self.losses + self.ties + self.ot_losses
    }

    pub fn all_losses(&self) -> u16 {
        self.losses + self.ot_losses
    }

    pub fn win_pct(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            games => (self.wins as f64 + self.ties as f64 / 2.0) / games as f64,
        }
    }

    pub fn point_differential(&self) -> i64 {
        self.points_for as i64 - self.points_against as i64
    }

    pub fn points(&self, rr: &RoundRobinFormat) -> u16 {
        rr.points(self.wins, self.ties, self.ot_losses, self.losses)
    }

    pub fn against(&self, opponent: TeamId) -> Record {
        self.head_to_head.get(&opponent).copied().unwrap_or_default()
    }
}

type CmpFunc = fn (&TeamStanding, &TeamStanding, &RoundRobinFormat) -> Ordering;

// Compare functions here. Ordering::Less means the first team ranks higher.

fn compare_win_pct(a: &TeamStanding, b: &TeamStanding, _rr: &RoundRobinFormat) -> Ordering {
    compare_pct(a.wins, a.ties, a.games(), b.wins, b.ties, b.games())
}

fn compare_points(a: &TeamStanding, b: &TeamStanding, rr: &RoundRobinFormat) -> Ordering {
    b.points(rr).cmp(&a.points(rr))
}

fn compare_wins(a: &TeamStanding, b: &TeamStanding, _rr: &RoundRobinFormat) -> Ordering {
    b.wins.cmp(&a.wins)
}

fn compare_losses(a: &TeamStanding, b: &TeamStanding, _rr: &RoundRobinFormat) -> Ordering {
    a.all_losses().cmp(&b.all_losses())
}

fn compare_head_to_head(a: &TeamStanding, b: &TeamStanding, _rr: &RoundRobinFormat) -> Ordering {
    let a_vs_b = a.against(b.team_id);
    let b_vs_a = b.against(a.team_id);
    b_vs_a.wins.cmp(&a_vs_b.wins)
}

fn compare_division_record(a: &TeamStanding, b: &TeamStanding, _rr: &RoundRobinFormat) -> Ordering {
    a.division.compare(&b.division)
}

fn compare_conference_record(a: &TeamStanding, b: &TeamStanding, _rr: &RoundRobinFormat) -> Ordering {
    a.conference.compare(&b.conference)
}

// Score based. Rows from `Standings::from_schedule` are always level on these.
fn compare_point_differential(a: &TeamStanding, b: &TeamStanding, _rr: &RoundRobinFormat) -> Ordering {
    b.point_differential().cmp(&a.point_differential())
}

fn compare_points_scored(a: &TeamStanding, b: &TeamStanding, _rr: &RoundRobinFormat) -> Ordering {
    b.points_for.cmp(&a.points_for)
}

fn compare_points_allowed(a: &TeamStanding, b: &TeamStanding, _rr: &RoundRobinFormat) -> Ordering {
    a.points_against.cmp(&b.points_against)
}

lazy_static! {
    // The available sort functions.
    static ref SORT_FUNCTIONS: HashMap<RankCriteria, CmpFunc> = {
        let mut functions: HashMap<RankCriteria, CmpFunc> = HashMap::new();
        functions.insert(RankCriteria::WinPct, compare_win_pct);
        functions.insert(RankCriteria::Points, compare_points);
        functions.insert(RankCriteria::Wins, compare_wins);
        functions.insert(RankCriteria::Losses, compare_losses);
        functions.insert(RankCriteria::HeadToHead, compare_head_to_head);
        functions.insert(RankCriteria::DivisionRecord, compare_division_record);
        functions.insert(RankCriteria::ConferenceRecord, compare_conference_record);
        functions.insert(RankCriteria::PointDifferential, compare_point_differential);
        functions.insert(RankCriteria::PointsScored, compare_points_scored);
        functions.insert(RankCriteria::PointsAllowed, compare_points_allowed);
        functions
    };
}

// Compare two teams with the criteria in priority order. Team id settles anything left.
pub fn compare_teams(a: &TeamStanding, b: &TeamStanding, criteria: &[RankCriteria], rr: &RoundRobinFormat) -> Ordering {
    let mut order = Ordering::Equal;
    for criterium in criteria.iter() {
        order = SORT_FUNCTIONS[criterium](a, b, rr);
        if order.is_ne() { break; }
    }
    order.then(a.team_id.cmp(&b.team_id))
}

// Rank the given teams. Each team is inserted into its place instead of sorting the whole list again.
pub fn rank<'a>(teams: impl IntoIterator<Item = &'a TeamStanding>, criteria: &[RankCriteria], rr: &RoundRobinFormat) -> Vec<&'a TeamStanding> {
    let mut ranked: Vec<&TeamStanding> = Vec::new();
    for team in teams {
        let position = ranked.partition_point(|other| compare_teams(other, team, criteria, rr).is_lt());
        ranked.insert(position, team);
    }
    return ranked;
}

// The standings table of a season.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq)]
pub struct Standings {
    teams: BTreeMap<TeamId, TeamStanding>,
}

// Basics.
impl Standings {
    pub fn build(rows: Vec<TeamStanding>) -> Self {
        Self { teams: rows.into_iter().map(|row| (row.team_id, row)).collect() }
    }

    pub fn get(&self, team_id: TeamId) -> Option<&TeamStanding> {
        self.teams.get(&team_id)
    }

    pub fn rows(&self) -> impl Iterator<Item = &TeamStanding> + '_ {
        self.teams.values()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

// Functional.
impl Standings {
    // Build the standings from the played regular season games of a schedule.
    pub fn from_schedule(store: &ScheduleStore, roster: &[Team]) -> Self {
        let mut standings = Self::build(roster.iter().map(|t| TeamStanding::build(t.id, 0, 0, 0)).collect());
        for game in store.regular_season_games() {
            if let Some(outcome) = game.outcome {
                standings.record_game(game.home, game.away, outcome, roster);
            }
        }
        return standings;
    }

    // Update the standings after a game.
    pub fn record_game(&mut self, home: TeamId, away: TeamId, outcome: Outcome, roster: &[Team]) {
        let (same_division, same_conference) = match (team::find(roster, home), team::find(roster, away)) {
            (Some(h), Some(a)) => (h.same_division(a), h.same_conference(a)),
            _ => (false, false),
        };

        for (team_id, opponent) in [(home, away), (away, home)] {
            let row = self.teams.entry(team_id).or_insert_with(|| TeamStanding::build(team_id, 0, 0, 0));
            let apply = |record: &mut Record| match outcome {
                Outcome::Win(winner) if winner == team_id => record.wins += 1,
                Outcome::Win(_) => record.losses += 1,
                Outcome::Tie => record.ties += 1,
            };

            match outcome {
                Outcome::Win(winner) if winner == team_id => row.wins += 1,
                Outcome::Win(_) => row.losses += 1,
                Outcome::Tie => row.ties += 1,
            }

            apply(row.head_to_head.entry(opponent).or_default());
            if same_division { apply(&mut row.division); }
            if same_conference { apply(&mut row.conference); }
        }
    }

    // Get every team in the league in ranked order.
    pub fn league_ranking(&self, config: &LeagueConfig) -> Vec<TeamId> {
        rank(self.teams.values(), &config.tiebreaker_order, &config.round_robin)
            .into_iter().map(|t| t.team_id).collect()
    }
}

// A team's position going into the playoffs.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    pub team_id: TeamId,
    pub rank: u16,
    pub conference: Option<ConferenceId>,
}

// Get the seeds for each playoff group: one group per conference, or a single league-wide group.
pub fn calculate_seeds(standings: &Standings, roster: &[Team], config: &LeagueConfig) -> Result<Vec<Vec<Seed>>> {
    let playoffs = &config.playoffs;

    if !playoffs.by_conference {
        let eligible: Vec<&TeamStanding> = roster.iter().filter_map(|t| standings.get(t.id)).collect();
        let group = seed_group(eligible, None, playoffs.field_size as usize, config)?;
        return Ok(vec![group]);
    }

    let conferences = team::conferences(roster);
    let per_conference = playoffs.field_size as usize / conferences.len().max(1);

    let mut groups = Vec::new();
    for conference in conferences {
        let eligible: Vec<&TeamStanding> = roster.iter()
            .filter(|t| t.conference == conference)
            .filter_map(|t| standings.get(t.id))
            .collect();
        groups.push(seed_group(eligible, Some(conference), per_conference, config)?);
    }
    return Ok(groups);
}

fn seed_group(eligible: Vec<&TeamStanding>, conference: Option<ConferenceId>, field: usize, config: &LeagueConfig) -> Result<Vec<Seed>> {
    if eligible.len() < field {
        return Err(LeagueError::InsufficientTeams { eligible: eligible.len(), required: field });
    }

    let ranked = rank(eligible, &config.tiebreaker_order, &config.round_robin);
    let seeds = ranked.iter().take(field).enumerate().map(|(i, team)| Seed {
        team_id: team.team_id,
        rank: (i + 1) as u16,
        conference: conference,
    }).collect();

    return Ok(seeds);
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::format::knockout_round::PlayoffFormat;

    fn config(field_size: u16, by_conference: bool) -> LeagueConfig {
        LeagueConfig {
            playoffs: PlayoffFormat { by_conference: by_conference, ..PlayoffFormat::build(field_size, vec![1, 1], false) },
            ..Default::default()
        }
    }

    fn roster() -> Vec<Team> {
        (0..6).map(|i| Team::build(i, (i / 3) as u8, 0)).collect()
    }

    #[test]
    fn test_win_pct_counts_ties_as_half() {
        let a = TeamStanding::build(0, 5, 5, 2);
        let b = TeamStanding::build(1, 6, 6, 0);
        assert_eq!(compare_win_pct(&a, &b, &RoundRobinFormat::default()), Ordering::Equal);
        assert_eq!(a.win_pct(), 0.5);
    }

    #[test]
    fn test_head_to_head_breaks_tie() {
        let mut standings = Standings::build(vec![TeamStanding::build(0, 5, 5, 0), TeamStanding::build(1, 5, 5, 0)]);
        let roster = vec![Team::build(0, 0, 0), Team::build(1, 0, 0)];
        standings.record_game(0, 1, Outcome::Win(1), &roster);

        let order = vec![RankCriteria::HeadToHead];
        let ranked = rank(standings.rows(), &order, &RoundRobinFormat::default());
        assert_eq!(ranked[0].team_id, 1);
    }

    #[test]
    fn test_full_tie_falls_back_to_team_id() {
        let standings = Standings::build((0..4).rev().map(|i| TeamStanding::build(i, 3, 3, 0)).collect());
        let ids = standings.league_ranking(&LeagueConfig::default());
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_default_order_works_without_scores() {
        use crate::game::{Game, Phase};

        assert!(RankCriteria::default_order().iter().all(|c| !c.needs_scores()));
        assert!(RankCriteria::PointDifferential.needs_scores());

        // Head to head separates the two teams on .500.
        let roster = vec![Team::build(0, 0, 0), Team::build(1, 0, 0), Team::build(2, 0, 1), Team::build(3, 0, 1)];
        let mut store = ScheduleStore::from_games(vec![
            Game::build(0, 0, 1, 0, Phase::RegularSeason),
            Game::build(1, 2, 3, 0, Phase::RegularSeason),
            Game::build(2, 2, 0, 1, Phase::RegularSeason),
            Game::build(3, 1, 3, 1, Phase::RegularSeason),
        ]).unwrap();
        store.complete(0, Outcome::Win(0)).unwrap();
        store.complete(1, Outcome::Win(3)).unwrap();
        store.complete(2, Outcome::Win(2)).unwrap();
        store.complete(3, Outcome::Win(3)).unwrap();

        let standings = Standings::from_schedule(&store, &roster);
        assert!(standings.rows().all(|row| row.points_for == 0 && row.point_differential() == 0));
        assert_eq!(standings.league_ranking(&LeagueConfig::default()), vec![3, 2, 0, 1]);
    }

    #[test]
    fn test_criteria_priority() {
        let mut a = TeamStanding::build(0, 8, 2, 0);
        a.points_for = 100;
        let mut b = TeamStanding::build(1, 7, 3, 0);
        b.points_for = 300;
        let rr = RoundRobinFormat::default();

        assert!(compare_teams(&a, &b, &[RankCriteria::WinPct, RankCriteria::PointsScored], &rr).is_lt());
        assert!(compare_teams(&a, &b, &[RankCriteria::PointsScored, RankCriteria::WinPct], &rr).is_gt());
    }

    #[test]
    fn test_points_use_the_format_table() {
        let mut a = TeamStanding::build(0, 10, 10, 0);
        a.ot_losses = 4;
        let b = TeamStanding::build(1, 11, 13, 0);
        let rr = RoundRobinFormat::default();

        // 24 points against 22 points, even though b won more games.
        assert!(compare_teams(&a, &b, &[RankCriteria::Points], &rr).is_lt());
        assert!(compare_teams(&a, &b, &[RankCriteria::Wins], &rr).is_gt());
    }

    #[test]
    fn test_league_wide_seeds() {
        let standings = Standings::build(vec![
            TeamStanding::build(0, 2, 8, 0),
            TeamStanding::build(1, 9, 1, 0),
            TeamStanding::build(2, 5, 5, 0),
            TeamStanding::build(3, 7, 3, 0),
            TeamStanding::build(4, 1, 9, 0),
            TeamStanding::build(5, 6, 4, 0),
        ]);

        let groups = calculate_seeds(&standings, &roster(), &config(4, false)).unwrap();
        assert_eq!(groups.len(), 1);
        let ids: Vec<TeamId> = groups[0].iter().map(|s| s.team_id).collect();
        let ranks: Vec<u16> = groups[0].iter().map(|s| s.rank).collect();
        assert_eq!(ids, vec![1, 3, 5, 2]);
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_conference_seeds() {
        let standings = Standings::build((0..6).map(|i| TeamStanding::build(i, i, 10 - i, 0)).collect());
        let groups = calculate_seeds(&standings, &roster(), &config(4, true)).unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].iter().map(|s| s.team_id).collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(groups[1].iter().map(|s| s.team_id).collect::<Vec<_>>(), vec![5, 4]);
        assert_eq!(groups[1][0].conference, Some(1));
    }

    #[test]
    fn test_insufficient_teams() {
        let standings = Standings::build((0..3).map(|i| TeamStanding::build(i, 1, 1, 0)).collect());
        let err = calculate_seeds(&standings, &roster(), &config(4, false)).unwrap_err();
        assert!(matches!(err, LeagueError::InsufficientTeams { eligible: 3, required: 4 }));
    }

    #[test]
    fn test_from_schedule_records() {
        use crate::game::{Game, Phase};

        let roster = vec![Team::build(0, 0, 0), Team::build(1, 0, 0), Team::build(2, 1, 0)];
        let mut store = ScheduleStore::from_games(vec![
            Game::build(0, 0, 1, 0, Phase::RegularSeason),
            Game::build(1, 2, 0, 1, Phase::RegularSeason),
            Game::build(2, 1, 2, 2, Phase::RegularSeason),
        ]).unwrap();
        store.complete(0, Outcome::Win(1)).unwrap();
        store.complete(1, Outcome::Tie).unwrap();

        let standings = Standings::from_schedule(&store, &roster);
        let zero = standings.get(0).unwrap();
        assert_eq!((zero.wins, zero.losses, zero.ties), (0, 1, 1));
        assert_eq!(zero.division, Record { wins: 0, losses: 1, ties: 0 });
        assert_eq!(zero.conference.games(), 1);
        assert_eq!(zero.against(2).ties, 1);
        assert_eq!(standings.get(2).unwrap().conference.games(), 0);
        assert_eq!(standings.len(), 3);

        let seeds = calculate_seeds(&standings, &roster, &config(3, false)).unwrap();
        let unique: HashSet<TeamId> = seeds[0].iter().map(|s| s.team_id).collect();
        assert_eq!(unique.len(), 3);
    }
}
