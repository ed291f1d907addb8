// The season's schedule: every game, ordered by day and then by insertion.
// Only the season appends to it; everything else reads.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::{
    error::{LeagueError, Result},
    game::{Game, Outcome, Phase},
    types::{Day, GameId, SeriesId, TeamId},
};

#[derive(Debug, Serialize)]
#[derive(Default, Clone)]
pub struct ScheduleStore {
    games: Vec<Game>,
    #[serde(skip)]
    positions: HashMap<GameId, usize>,
    #[serde(skip)]
    bookings: HashSet<(Day, TeamId)>,
    next_id: GameId,
}

// Basics.
impl ScheduleStore {
    pub fn build() -> Self {
        Self::default()
    }

    // Rebuild a store from games kept elsewhere, applying the same checks as an append.
    pub fn from_games(games: Vec<Game>) -> Result<Self> {
        let mut store = Self::build();
        store.append(games)?;
        return Ok(store);
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    // The id the next created game should get.
    pub fn next_id(&self) -> GameId {
        self.next_id
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn get(&self, id: GameId) -> Option<&Game> {
        self.positions.get(&id).map(|i| &self.games[*i])
    }
}

// Writing.
impl ScheduleStore {
    // Add games to the schedule. Either every game is added or none are.
    pub fn append(&mut self, games: Vec<Game>) -> Result<()> {
        let mut new_ids = HashSet::new();
        let mut new_bookings = HashSet::new();

        for game in games.iter() {
            if self.positions.contains_key(&game.id) || !new_ids.insert(game.id) {
                return Err(LeagueError::DuplicateGame(game.id));
            }

            for team_id in [game.home, game.away] {
                let booking = (game.day, team_id);
                if self.bookings.contains(&booking) || !new_bookings.insert(booking) {
                    return Err(LeagueError::DoubleBooked { team_id: team_id, day: game.day });
                }
            }
        }

        let count = games.len();
        for game in games {
            // Stays at the last id once it is taken, so the next created game is refused as a duplicate.
            self.next_id = self.next_id.max(game.id.saturating_add(1));

            // Games on the same day stay in insertion order.
            let position = self.games.partition_point(|g| g.day <= game.day);
            self.games.insert(position, game);
        }

        self.bookings.extend(new_bookings);
        self.reindex();

        debug!(count, total = self.games.len(), "games appended to schedule");
        return Ok(());
    }

    // Record the result of a game.
    pub fn complete(&mut self, game_id: GameId, outcome: Outcome) -> Result<&Game> {
        let position = match self.positions.get(&game_id) {
            Some(i) if !self.games[*i].is_played() => *i,
            _ => return Err(LeagueError::UnknownOrAlreadyResolvedGame(game_id)),
        };

        let game = &mut self.games[position];
        match outcome {
            Outcome::Win(team_id) if !game.involves(team_id) => {
                return Err(LeagueError::InvalidResult {
                    game_id: game_id,
                    reason: format!("team {team_id} does not play in this game"),
                });
            }
            Outcome::Tie if game.is_playoff() => {
                return Err(LeagueError::InvalidResult {
                    game_id: game_id,
                    reason: "playoff games cannot end in a tie".to_string(),
                });
            }
            _ => {}
        }

        game.outcome = Some(outcome);
        return Ok(game);
    }

    fn reindex(&mut self) {
        self.positions = self.games.iter().enumerate().map(|(i, g)| (g.id, i)).collect();
    }
}

// Queries. None of these change anything.
impl ScheduleStore {
    // Get all games on the given day.
    pub fn games_on_day(&self, day: Day) -> &[Game] {
        let start = self.games.partition_point(|g| g.day < day);
        let end = self.games.partition_point(|g| g.day <= day);
        &self.games[start..end]
    }

    // Get at most `count` unplayed games from the given day onwards.
    // The iterator can be cloned to start over.
    pub fn upcoming(&self, from_day: Day, count: usize) -> impl Iterator<Item = &Game> + Clone + '_ {
        let start = self.games.partition_point(|g| g.day < from_day);
        self.games[start..].iter().filter(|g| !g.is_played()).take(count)
    }

    // Get the games a team still has to play.
    pub fn remaining_for_team(&self, team_id: TeamId) -> impl Iterator<Item = &Game> + Clone + '_ {
        self.games.iter().filter(move |g| !g.is_played() && g.involves(team_id))
    }

    // Get all games of a playoff series.
    pub fn series_games(&self, series_id: SeriesId) -> impl Iterator<Item = &Game> + '_ {
        self.games.iter().filter(move |g| g.series() == Some(series_id))
    }

    pub fn has_unplayed_in_series(&self, series_id: SeriesId) -> bool {
        self.series_games(series_id).any(|g| !g.is_played())
    }

    // Get the first day that still has an unplayed game.
    pub fn current_day(&self) -> Option<Day> {
        self.games.iter().find(|g| !g.is_played()).map(|g| g.day)
    }

    pub fn last_day(&self) -> Option<Day> {
        self.games.last().map(|g| g.day)
    }

    // Get the first day after everything already scheduled.
    pub fn next_free_day(&self) -> Day {
        match self.last_day() {
            Some(day) => day + 1,
            None => 0,
        }
    }

    // Get how many days still have games to be played.
    pub fn days_left(&self) -> usize {
        let days: BTreeSet<Day> = self.games.iter().filter(|g| !g.is_played()).map(|g| g.day).collect();
        days.len()
    }

    pub fn regular_season_games(&self) -> impl Iterator<Item = &Game> + '_ {
        self.games.iter().filter(|g| g.phase == Phase::RegularSeason)
    }

    pub fn is_regular_season_over(&self) -> bool {
        self.regular_season_games().all(|g| g.is_played())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regular(id: GameId, home: TeamId, away: TeamId, day: Day) -> Game {
        Game::build(id, home, away, day, Phase::RegularSeason)
    }

    fn sample_store() -> ScheduleStore {
        ScheduleStore::from_games(vec![
            regular(0, 0, 1, 0),
            regular(1, 2, 3, 0),
            regular(2, 0, 2, 1),
            regular(3, 1, 3, 1),
            regular(4, 3, 0, 2),
        ]).unwrap()
    }

    #[test]
    fn test_games_are_ordered_by_day_then_insertion() {
        let mut store = sample_store();
        store.append(vec![regular(5, 4, 5, 0), regular(6, 4, 5, 1)]).unwrap();

        let order: Vec<GameId> = store.games().iter().map(|g| g.id).collect();
        assert_eq!(order, vec![0, 1, 5, 2, 3, 6, 4]);
        assert_eq!(store.get(6).unwrap().day, 1);
        assert_eq!(store.next_id(), 7);
    }

    #[test]
    fn test_duplicate_id_rejects_whole_batch() {
        let mut store = sample_store();
        let err = store.append(vec![regular(9, 4, 5, 3), regular(2, 6, 7, 3)]).unwrap_err();

        assert!(matches!(err, LeagueError::DuplicateGame(2)));
        assert_eq!(store.len(), 5);
        assert!(store.get(9).is_none());
    }

    #[test]
    fn test_largest_game_id() {
        let mut store = ScheduleStore::from_games(vec![regular(GameId::MAX, 0, 1, 0)]).unwrap();
        assert_eq!(store.next_id(), GameId::MAX);

        let err = store.append(vec![regular(store.next_id(), 2, 3, 1)]).unwrap_err();
        assert!(matches!(err, LeagueError::DuplicateGame(id) if id == GameId::MAX));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_double_booking_rejected() {
        let mut store = sample_store();
        let err = store.append(vec![regular(7, 0, 5, 2)]).unwrap_err();
        assert!(matches!(err, LeagueError::DoubleBooked { team_id: 0, day: 2 }));

        let err = store.append(vec![regular(7, 5, 6, 4), regular(8, 6, 7, 4)]).unwrap_err();
        assert!(matches!(err, LeagueError::DoubleBooked { team_id: 6, day: 4 }));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_games_on_day() {
        let store = sample_store();
        let ids: Vec<GameId> = store.games_on_day(1).iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(store.games_on_day(8).is_empty());
    }

    #[test]
    fn test_upcoming_skips_played_and_restarts() {
        let mut store = sample_store();
        store.complete(2, Outcome::Win(0)).unwrap();

        let upcoming = store.upcoming(1, 2);
        let first: Vec<GameId> = upcoming.clone().map(|g| g.id).collect();
        let again: Vec<GameId> = upcoming.map(|g| g.id).collect();
        assert_eq!(first, vec![3, 4]);
        assert_eq!(first, again);
    }

    #[test]
    fn test_remaining_for_team() {
        let mut store = sample_store();
        store.complete(0, Outcome::Tie).unwrap();

        let ids: Vec<GameId> = store.remaining_for_team(0).map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_complete_rejects_unknown_and_resolved() {
        let mut store = sample_store();
        assert!(matches!(store.complete(42, Outcome::Tie), Err(LeagueError::UnknownOrAlreadyResolvedGame(42))));

        store.complete(1, Outcome::Win(3)).unwrap();
        assert!(matches!(store.complete(1, Outcome::Win(2)), Err(LeagueError::UnknownOrAlreadyResolvedGame(1))));
        assert_eq!(store.get(1).unwrap().outcome, Some(Outcome::Win(3)));
    }

    #[test]
    fn test_complete_rejects_outsider_and_playoff_tie() {
        let mut store = sample_store();
        assert!(matches!(store.complete(0, Outcome::Win(3)), Err(LeagueError::InvalidResult { .. })));
        assert!(!store.get(0).unwrap().is_played());

        store.append(vec![Game::build(10, 0, 1, 5, Phase::Playoffs { round: 1, series: 0 })]).unwrap();
        assert!(matches!(store.complete(10, Outcome::Tie), Err(LeagueError::InvalidResult { .. })));
        assert!(store.has_unplayed_in_series(0));
    }

    #[test]
    fn test_day_bookkeeping() {
        let mut store = sample_store();
        assert_eq!(store.current_day(), Some(0));
        assert_eq!(store.next_free_day(), 3);
        assert_eq!(store.days_left(), 3);

        store.complete(0, Outcome::Win(0)).unwrap();
        store.complete(1, Outcome::Win(2)).unwrap();
        assert_eq!(store.current_day(), Some(1));
        assert_eq!(store.days_left(), 2);
        assert!(!store.is_regular_season_over());
    }

    #[test]
    fn test_empty_store() {
        let store = ScheduleStore::build();
        assert_eq!(store.current_day(), None);
        assert_eq!(store.next_free_day(), 0);
        assert_eq!(store.upcoming(0, 10).count(), 0);
    }
}
