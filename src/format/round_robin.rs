// The regular season format: how many games, against whom, and how they are scored.

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigViolation, LeagueError, Result},
    team::Team,
    types::Day,
};

// Which kind of opponent a pair of teams is for each other.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Division,
    Conference,
    CrossConference,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Division, Bucket::Conference, Bucket::CrossConference];

    pub fn of(a: &Team, b: &Team) -> Self {
        if a.same_division(b) { Bucket::Division }
        else if a.same_conference(b) { Bucket::Conference }
        else { Bucket::CrossConference }
    }
}

// How many times each pair of teams in a bucket plays.
#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MatchupRequirement {
    pub bucket: Bucket,
    pub games_per_opponent: u8,
}

impl MatchupRequirement {
    // Home games guaranteed to each team of the pair. An odd game is decided by balancing.
    pub fn home_games_each(&self) -> u8 {
        self.games_per_opponent / 2
    }

    pub fn has_odd_game(&self) -> bool {
        self.games_per_opponent % 2 != 0
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
#[serde(default)]
pub struct RoundRobinFormat {
    pub games_per_team: u16,
    pub season_length: Day,     // Calendar slots available for the regular season.
    pub division_games_per_opponent: u8,
    pub conference_games_per_opponent: u8,
    pub cross_conference_games_per_opponent: u8,
    pub points_for_win: u16,
    pub points_for_tie: u16,
    pub points_for_ot_loss: u16,
    pub points_for_loss: u16,
}

impl Default for RoundRobinFormat {
    fn default() -> Self {
        Self {
            games_per_team: 82,
            season_length: 165,
            division_games_per_opponent: 4,
            conference_games_per_opponent: 3,
            cross_conference_games_per_opponent: 2,
            points_for_win: 2,
            points_for_tie: 1,
            points_for_ot_loss: 1,
            points_for_loss: 0,
        }
    }
}

// Basics.
impl RoundRobinFormat {
    pub fn build(games_per_team: u16, season_length: Day, division: u8, conference: u8, cross_conference: u8) -> Self {
        Self {
            games_per_team: games_per_team,
            season_length: season_length,
            division_games_per_opponent: division,
            conference_games_per_opponent: conference,
            cross_conference_games_per_opponent: cross_conference,
            ..Default::default()
        }
    }

    // Work out the games per opponent for a roster so that every team gets `games_per_team` games.
    // Closer opponents never play less often than farther ones, and the counts are as even as possible.
    // Every team needs the same number of division, conference and other opponents.
    pub fn for_roster(games_per_team: u16, roster: &[Team]) -> Result<Self> {
        let [division, conference, cross] = opponent_counts(roster)?;
        let games = games_per_team as u32;
        let most = |opponents: u32| if opponents == 0 { 0 } else { (games / opponents).min(u8::MAX as u32) };

        for cross_games in (0..=most(cross)).rev() {
            for conference_games in (0..=most(conference)).rev() {
                let used = cross_games * cross + conference_games * conference;
                if used > games { continue; }

                let left = games - used;
                let division_games = match division {
                    0 if left == 0 => 0,
                    0 => continue,
                    _ if left % division == 0 => left / division,
                    _ => continue,
                };
                if division_games > u8::MAX as u32 { continue; }

                // Buckets nobody is in do not count for the order.
                let counts = [(division, division_games), (conference, conference_games), (cross, cross_games)];
                let present: Vec<u32> = counts.iter().filter(|(n, _)| *n > 0).map(|(_, g)| *g).collect();
                if present.windows(2).any(|w| w[0] < w[1]) { continue; }

                let season_length = games_per_team.saturating_mul(2).saturating_sub(1).max(games_per_team);
                return Ok(Self::build(
                    games_per_team,
                    season_length,
                    division_games as u8,
                    conference_games as u8,
                    cross_games as u8,
                ));
            }
        }

        Err(LeagueError::InvalidConfiguration(vec![ConfigViolation::build(
            "games_per_team",
            format!("{games_per_team} games cannot be split between {division} division, {conference} conference and {cross} other opponents"),
        )]))
    }

    pub fn requirement(&self, bucket: Bucket) -> MatchupRequirement {
        let games_per_opponent = match bucket {
            Bucket::Division => self.division_games_per_opponent,
            Bucket::Conference => self.conference_games_per_opponent,
            Bucket::CrossConference => self.cross_conference_games_per_opponent,
        };

        MatchupRequirement { bucket: bucket, games_per_opponent: games_per_opponent }
    }

    pub fn requirements(&self) -> Vec<MatchupRequirement> {
        Bucket::ALL.iter().map(|b| self.requirement(*b)).collect()
    }
}

// Functional.
impl RoundRobinFormat {
    // Get how many games the requirements give the team, given who else is in the league.
    // Saturates at the largest game count.
    pub fn required_games_for(&self, team: &Team, roster: &[Team]) -> u16 {
        let mut total: u32 = 0;
        for other in roster.iter().filter(|t| t.id != team.id) {
            total += self.requirement(Bucket::of(team, other)).games_per_opponent as u32;
        }
        return u16::try_from(total).unwrap_or(u16::MAX);
    }

    // Get how many games there should be in the regular season in total.
    pub fn total_games(&self, roster: &[Team]) -> usize {
        let sum: usize = roster.iter().map(|t| self.required_games_for(t, roster) as usize).sum();
        return sum / 2;
    }

    pub fn points(&self, wins: u16, ties: u16, ot_losses: u16, losses: u16) -> u16 {
        wins * self.points_for_win +
        ties * self.points_for_tie +
        ot_losses * self.points_for_ot_loss +
        losses * self.points_for_loss
    }
}

// Get how many division, conference and other opponents each team has. Fails if teams differ.
fn opponent_counts(roster: &[Team]) -> Result<[u32; 3]> {
    let mut shared: Option<[u32; 3]> = None;

    for team in roster {
        let mut counts = [0u32; 3];
        for other in roster.iter().filter(|t| t.id != team.id) {
            match Bucket::of(team, other) {
                Bucket::Division => counts[0] += 1,
                Bucket::Conference => counts[1] += 1,
                Bucket::CrossConference => counts[2] += 1,
            }
        }

        match shared {
            None => shared = Some(counts),
            Some(first) if first != counts => {
                return Err(LeagueError::InvalidConfiguration(vec![ConfigViolation::build(
                    "matchup_requirements",
                    format!("team {} has {:?} division, conference and other opponents, others have {:?}", team.id, counts, first),
                )]));
            }
            _ => {}
        }
    }

    return Ok(shared.unwrap_or_default());
}
