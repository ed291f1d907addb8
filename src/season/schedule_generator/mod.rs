// Generating the regular season: which teams meet, how often, and who hosts.

mod balance;
pub mod calendar;
mod sorting;

use std::collections::HashMap;

use rand::{seq::SliceRandom, Rng};
use tracing::{debug, info};

use crate::{
    error::{LeagueError, Result},
    format::round_robin::{Bucket, RoundRobinFormat},
    team::Team,
    types::TeamId,
};

// A game between two teams before it has a date. Home team first.
pub type Matchup = [TeamId; 2];

// Generate every regular season matchup the format requires.
// The same roster, format, season index and random source always give the same result.
pub fn generate_matchups<R: Rng + ?Sized>(roster: &[Team], rr: &RoundRobinFormat, season_index: u32, rng: &mut R) -> Result<Vec<Matchup>> {
    let mut match_pool = Vec::new();
    let mut odd_pairs = Vec::new();

    for (i, team1) in roster.iter().enumerate() {
        for team2 in roster[i + 1..].iter() {
            let requirement = rr.requirement(Bucket::of(team1, team2));

            // Complete home-and-away legs.
            for _ in 0..requirement.home_games_each() {
                match_pool.push([team1.id, team2.id]);
                match_pool.push([team2.id, team1.id]);
            }

            if requirement.has_odd_game() {
                odd_pairs.push([team1.id, team2.id]);
            }
        }
    }

    let even_games = match_pool.len();
    match_pool.append(&mut balance::orient(odd_pairs, season_index));
    debug!(even_games, odd_games = match_pool.len() - even_games, "matchups generated");

    let schedule_data = TeamScheduleData::generate(roster, &match_pool);
    for team in roster {
        let data = &schedule_data[&team.id];
        if data.match_count() != rr.games_per_team {
            return Err(LeagueError::ConstraintUnsatisfiable {
                team_id: team.id,
                generated: data.match_count(),
                expected: rr.games_per_team,
            });
        }
    }

    match_pool.shuffle(rng);
    info!(teams = roster.len(), games = match_pool.len(), "regular season matchups ready");
    return Ok(match_pool);
}

// How many games a team has at home and away, and against whom.
#[derive(Debug)]
#[derive(Default, Clone)]
pub struct TeamScheduleData {
    pub team_id: TeamId,
    home_matches: Vec<TeamId>,   // Contains teams that the team plays against home.
    away_matches: Vec<TeamId>,   // Contains teams that the team plays against away.
}

// Methods
impl TeamScheduleData {
    // Counts saturate, so an impossible format shows up as a wrong count instead of an overflow.
    pub fn home_match_count(&self) -> u16 {
        u16::try_from(self.home_matches.len()).unwrap_or(u16::MAX)
    }

    pub fn away_match_count(&self) -> u16 {
        u16::try_from(self.away_matches.len()).unwrap_or(u16::MAX)
    }

    // Add home and away matches together.
    pub fn match_count(&self) -> u16 {
        self.home_match_count().saturating_add(self.away_match_count())
    }

    // Get the difference between home and away matches.
    // Positive values indicate there are more home matches.
    // Negative values indicate there are more away matches.
    pub fn home_away_difference(&self) -> i32 {
        self.home_match_count() as i32 - self.away_match_count() as i32
    }

    // Get how many games the team plays against the given opponent.
    pub fn games_against(&self, opponent: TeamId) -> usize {
        self.home_matches.iter().chain(self.away_matches.iter()).filter(|id| **id == opponent).count()
    }
}

// Static
impl TeamScheduleData {
    // Tally the matchups of every team on the roster.
    pub fn generate(roster: &[Team], match_pool: &[Matchup]) -> HashMap<TeamId, Self> {
        let mut schedule_data: HashMap<TeamId, Self> = roster.iter()
            .map(|t| (t.id, Self { team_id: t.id, ..Default::default() }))
            .collect();

        for [home, away] in match_pool.iter() {
            if let Some(data) = schedule_data.get_mut(home) { data.home_matches.push(*away); }
            if let Some(data) = schedule_data.get_mut(away) { data.away_matches.push(*home); }
        }

        return schedule_data;
    }
}
