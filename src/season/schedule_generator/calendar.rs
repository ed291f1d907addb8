// Giving every matchup a day. A team never plays twice on the same day.

use tracing::{debug, warn};

use crate::{
    error::{LeagueError, Result},
    season::schedule_generator::{sorting::{self, Candidate, TeamCalendar}, Matchup},
    types::{convert, Day, TeamId},
};

// Place the matchups on days starting from `first_day`, using at most `season_length` days.
// Each day takes every waiting matchup whose teams are still free, most urgent first.
pub fn assign_days(matchups: &[Matchup], first_day: Day, season_length: Day) -> Result<Vec<(Day, Matchup)>> {
    let mut teams = team_calendars(matchups);
    let mut pool: Vec<usize> = (0..matchups.len()).collect();
    let mut assigned = Vec::with_capacity(matchups.len());

    for offset in 0..season_length {
        if pool.is_empty() { break; }

        let days_left = season_length - offset;
        if let Some(team) = teams.iter().find(|t| t.remaining > days_left) {
            warn!(team_id = team.team_id, remaining = team.remaining, days_left, "team cannot fit its games");
            return Err(LeagueError::SchedulingDeadlock { remaining: pool.len(), days: season_length });
        }

        let day = first_day.checked_add(offset)
            .ok_or(LeagueError::SchedulingDeadlock { remaining: pool.len(), days: season_length })?;

        let mut candidates: Vec<Candidate> = pool.iter()
            .map(|i| Candidate::build(*i, &matchups[*i], &teams, days_left))
            .collect();
        sorting::sort_default(&mut candidates);

        let mut busy = vec![false; teams.len()];
        let mut placed = vec![false; matchups.len()];
        for candidate in candidates {
            let [home, away] = matchups[candidate.index];
            if busy[home as usize] || busy[away as usize] { continue; }

            busy[home as usize] = true;
            busy[away as usize] = true;
            teams[home as usize].play(true);
            teams[away as usize].play(false);
            placed[candidate.index] = true;
            assigned.push((day, [home, away]));
        }

        pool.retain(|i| !placed[*i]);
    }

    if !pool.is_empty() {
        warn!(remaining = pool.len(), season_length, "regular season does not fit the calendar");
        return Err(LeagueError::SchedulingDeadlock { remaining: pool.len(), days: season_length });
    }

    debug!(games = assigned.len(), "days assigned");
    return Ok(assigned);
}

// Count the games of every team appearing in the matchups. Team ids index the result.
fn team_calendars(matchups: &[Matchup]) -> Vec<TeamCalendar> {
    let team_count = matchups.iter().flatten().max().map_or(0, |id| *id as usize + 1);
    let mut teams: Vec<TeamCalendar> = (0..team_count)
        .map(|i| TeamCalendar::build(convert::int::<usize, TeamId>(i)))
        .collect();

    for [home, away] in matchups.iter() {
        teams[*home as usize].remaining += 1;
        teams[*away as usize].remaining += 1;
    }

    return teams;
}
