// Functions for ordering the matchups that are still waiting for a day.
use std::cmp::Ordering;

use crate::{season::schedule_generator::Matchup, types::{Day, TeamId}};

// How far a team has got in the calendar.
#[derive(Debug)]
#[derive(Default, Clone)]
pub struct TeamCalendar {
    pub team_id: TeamId,
    pub remaining: u16,
    streak: i16,    // Positive for consecutive home games, negative for consecutive away games.
}

impl TeamCalendar {
    pub fn build(team_id: TeamId) -> Self {
        Self { team_id: team_id, ..Default::default() }
    }

    // Mark a game as placed for this team.
    pub fn play(&mut self, home: bool) {
        self.remaining -= 1;
        self.streak = match (home, self.streak) {
            (true, s) if s > 0 => s + 1,
            (true, _) => 1,
            (false, s) if s < 0 => s - 1,
            (false, _) => -1,
        };
    }

    // How long the streak gets if the team plays the given kind of game next.
    fn streak_after(&self, home: bool) -> u16 {
        let same_kind = (home && self.streak > 0) || (!home && self.streak < 0);
        if same_kind { self.streak.unsigned_abs() } else { 0 }
    }
}

// A matchup waiting in the pool, with the numbers it is sorted by.
#[derive(Debug)]
#[derive(Clone, Copy)]
pub struct Candidate {
    pub index: usize,   // Position of the matchup in the pool.
    slack: i32,         // Spare days of the busier team.
    streak: u16,        // How much the game would extend home or away streaks.
}

impl Candidate {
    pub fn build(index: usize, matchup: &Matchup, teams: &[TeamCalendar], days_left: Day) -> Self {
        let home = &teams[matchup[0] as usize];
        let away = &teams[matchup[1] as usize];
        let busiest = home.remaining.max(away.remaining);

        Self {
            index: index,
            slack: i32::from(days_left) - i32::from(busiest),
            streak: home.streak_after(true) + away.streak_after(false),
        }
    }
}

// The type that pieces of sort functions use.
type CmpFunc = fn(&Candidate, &Candidate) -> Ordering;

// Compare the slack. Matchup whose teams have fewer days to spare comes first.
fn compare_slack(a: &Candidate, b: &Candidate) -> Ordering {
    return a.slack.cmp(&b.slack);
}

// Compare streaks. Matchup that breaks home or away streaks comes first.
fn compare_streak(a: &Candidate, b: &Candidate) -> Ordering {
    return a.streak.cmp(&b.streak);
}

// Keep pool order.
fn compare_index(a: &Candidate, b: &Candidate) -> Ordering {
    return a.index.cmp(&b.index);
}

const SORT_FUNCTIONS: [CmpFunc; 3] = [compare_slack, compare_streak, compare_index];

// Sort the candidates in the order they should be tried.
pub fn sort_default(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        for func in SORT_FUNCTIONS.iter() {
            let ordering = func(a, b);
            if ordering.is_ne() { return ordering; }
        }
        Ordering::Equal
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams(remaining: &[u16]) -> Vec<TeamCalendar> {
        remaining.iter().enumerate().map(|(i, r)| {
            let mut team = TeamCalendar::build(i as TeamId);
            team.remaining = *r;
            team
        }).collect()
    }

    #[test]
    fn test_least_slack_first() {
        let teams = teams(&[1, 1, 5, 1]);
        let mut candidates = vec![
            Candidate::build(0, &[0, 1], &teams, 6),
            Candidate::build(1, &[2, 3], &teams, 6),
        ];
        sort_default(&mut candidates);
        assert_eq!(candidates[0].index, 1);
    }

    #[test]
    fn test_streak_breaker_first() {
        let mut teams = teams(&[3, 3]);
        teams[0].play(true);
        teams[1].play(false);

        let mut candidates = vec![
            Candidate::build(0, &[0, 1], &teams, 4),
            Candidate::build(1, &[1, 0], &teams, 4),
        ];
        sort_default(&mut candidates);
        assert_eq!(candidates[0].index, 1);
    }

    #[test]
    fn test_streak_counting() {
        let mut team = TeamCalendar::build(0);
        team.remaining = 4;
        team.play(true);
        team.play(true);
        assert_eq!(team.streak_after(true), 2);
        assert_eq!(team.streak_after(false), 0);

        team.play(false);
        assert_eq!(team.streak_after(false), 1);
        assert_eq!(team.remaining, 1);
    }
}
