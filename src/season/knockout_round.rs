// The playoff bracket: best-of-N series stored in a flat list, first round first, with links to the
// series that feed them and the series their winner moves on to.

use std::{cmp::Ordering, ops::Range};

use ordinal::ToOrdinal as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{ConfigViolation, LeagueError, Result},
    format::knockout_round::PlayoffFormat,
    game::{Game, Phase},
    season::{ranking::Seed, schedule::ScheduleStore},
    types::{convert, ConferenceId, GameId, SeriesId, TeamId},
};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BracketTeam {
    pub team_id: TeamId,
    pub seed: u16,
    pub conference: Option<ConferenceId>,
    pub ranking: u16,   // Position in the league-wide ranking. Decides between teams of different conferences.
}

impl BracketTeam {
    // Order two teams so that the better seed comes first.
    pub fn compare(&self, other: &Self) -> Ordering {
        if self.conference == other.conference {
            return self.seed.cmp(&other.seed).then(self.ranking.cmp(&other.ranking));
        }
        return self.ranking.cmp(&other.ranking);
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Team(BracketTeam),
    Bye,
    WinnerOf(SeriesId),
    Reseeded,   // Filled by seed once the previous round is over.
}

impl Slot {
    pub fn team(&self) -> Option<&BracketTeam> {
        match self {
            Slot::Team(team) => Some(team),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeriesState {
    Pending,
    Ready,
    InProgress,
    Complete,
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
pub struct Series {
    pub id: SeriesId,
    pub round: u8,
    pub slots: [Slot; 2],   // Once both are teams, the better seed is first.
    pub wins: [u8; 2],
    pub series_length: u8,
    pub wins_required: u8,
    pub games_scheduled: u8,
    pub state: SeriesState,
    pub winner: Option<BracketTeam>,
    pub parent: Option<SeriesId>,
    pub feeders: Option<[SeriesId; 2]>,
}

// Basics.
impl Series {
    fn build(id: SeriesId, round: u8, slots: [Slot; 2], series_length: u8, wins_required: u8) -> Self {
        Self {
            id: id,
            round: round,
            slots: slots,
            wins: [0, 0],
            series_length: series_length,
            wins_required: wins_required,
            games_scheduled: 0,
            state: SeriesState::Pending,
            winner: None,
            parent: None,
            feeders: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == SeriesState::Complete
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SeriesState::Ready | SeriesState::InProgress)
    }

    // Check if one of the slots is a bye.
    pub fn is_bye(&self) -> bool {
        self.slots.contains(&Slot::Bye)
    }

    pub fn teams(&self) -> Option<[BracketTeam; 2]> {
        match self.slots {
            [Slot::Team(a), Slot::Team(b)] => Some([a, b]),
            _ => None,
        }
    }

    // Get the team that lost the series.
    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.winner?;
        let [a, b] = self.teams()?;
        if a.team_id == winner.team_id { Some(b.team_id) } else { Some(a.team_id) }
    }

    fn side_of(&self, team_id: TeamId) -> Option<usize> {
        self.slots.iter().position(|s| s.team().is_some_and(|t| t.team_id == team_id))
    }
}

// Functional.
impl Series {
    // Put the teams in, better seed first. A lone team against a bye goes through at once.
    fn fill(&mut self, slots: [Slot; 2]) {
        self.slots = slots;

        match slots {
            [Slot::Team(a), Slot::Team(b)] => {
                if b.compare(&a).is_lt() { self.slots = [Slot::Team(b), Slot::Team(a)]; }
                self.state = SeriesState::Ready;
            }
            [Slot::Team(team), Slot::Bye] | [Slot::Bye, Slot::Team(team)] => {
                self.slots = [Slot::Team(team), Slot::Bye];
                self.winner = Some(team);
                self.state = SeriesState::Complete;
            }
            _ => {}
        }
    }

    // Get the home and away team of the next game.
    // The better seed hosts the first game, and hosts alternate after that.
    fn next_hosts(&self) -> Option<[TeamId; 2]> {
        let [better, worse] = self.teams()?;
        match self.games_scheduled % 2 {
            0 => Some([better.team_id, worse.team_id]),
            _ => Some([worse.team_id, better.team_id]),
        }
    }

    // Count a won game. Returns true if that decided the series.
    fn record_win(&mut self, side: usize) -> bool {
        self.wins[side] += 1;
        if self.wins[side] < self.wins_required {
            self.state = SeriesState::InProgress;
            return false;
        }

        self.state = SeriesState::Complete;
        self.winner = self.slots[side].team().copied();
        return true;
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[derive(Clone, PartialEq)]
pub struct Bracket {
    pub series: Vec<Series>,
    pub rounds: u8,
    pub current_round: u8,
    pub champion: Option<BracketTeam>,
    groups: usize,          // Conferences that play their own part of the bracket. 1 for a league-wide bracket.
    slots_per_group: usize,
    reseeding: bool,
}

// Basics.
impl Bracket {
    // Build the bracket from the seeds of each playoff group.
    // Each group fills an equal, contiguous part of the first round, so group winners only meet in the last rounds.
    pub fn build(groups: &[Vec<Seed>], ranking: &[TeamId], format: &PlayoffFormat) -> Result<Self> {
        let rounds = format.rounds();
        let slots = convert::int::<u32, usize>(format.slots());
        let group_count = groups.len();

        if rounds == 0 || rounds > 15 || group_count == 0 || !group_count.is_power_of_two() || slots / group_count < 2 {
            return Err(LeagueError::InvalidConfiguration(vec![ConfigViolation::build(
                "playoff_bracket",
                format!("{group_count} seed groups do not fit a bracket of {rounds} rounds"),
            )]));
        }

        let team_count: usize = groups.iter().map(|g| g.len()).sum();
        if team_count < format.field_size as usize {
            return Err(LeagueError::InsufficientTeams { eligible: team_count, required: format.field_size as usize });
        }

        let slots_per_group = slots / group_count;
        if let Some(group) = groups.iter().find(|g| g.len() > slots_per_group || g.len() * 2 <= slots_per_group) {
            return Err(LeagueError::InvalidConfiguration(vec![ConfigViolation::build(
                "playoff_field_size",
                format!("a group of {} teams does not fit {} slots", group.len(), slots_per_group),
            )]));
        }

        let mut bracket = Self {
            series: Vec::with_capacity(slots - 1),
            rounds: convert::int::<usize, u8>(rounds),
            current_round: 1,
            champion: None,
            groups: group_count,
            slots_per_group: slots_per_group,
            reseeding: format.reseeding,
        };

        bracket.create_first_round(groups, ranking, format);
        bracket.create_later_rounds(format);

        debug!(series = bracket.series.len(), rounds, "bracket built");
        return Ok(bracket);
    }

    fn create_first_round(&mut self, groups: &[Vec<Seed>], ranking: &[TeamId], format: &PlayoffFormat) {
        let order = seed_order(self.slots_per_group);
        let length = format.series_length(0);
        let wins_required = format.wins_required(0);

        for group in groups.iter() {
            for pair in order.chunks(2) {
                let id = convert::int::<usize, SeriesId>(self.series.len());
                let mut series = Series::build(id, 1, [Slot::Bye, Slot::Bye], length, wins_required);
                series.fill([seed_slot(group, pair[0], ranking), seed_slot(group, pair[1], ranking)]);
                self.series.push(series);
            }
        }
    }

    fn create_later_rounds(&mut self, format: &PlayoffFormat) {
        let mut previous = 0..self.series.len();

        for round in 2..=self.rounds {
            let start = self.series.len();
            let reseeded = self.reseeding && self.is_within_group(round);

            for i in (previous.start..previous.end).step_by(2) {
                let feeders = [convert::int::<usize, SeriesId>(i), convert::int::<usize, SeriesId>(i + 1)];
                let id = convert::int::<usize, SeriesId>(self.series.len());

                let slots = match reseeded {
                    true => [Slot::Reseeded, Slot::Reseeded],
                    false => [Slot::WinnerOf(feeders[0]), Slot::WinnerOf(feeders[1])],
                };

                let index = round as usize - 1;
                let mut series = Series::build(id, round, slots, format.series_length(index), format.wins_required(index));

                // Reseeded series get their links once the teams are known.
                if !reseeded {
                    series.feeders = Some(feeders);
                    self.series[i].parent = Some(id);
                    self.series[i + 1].parent = Some(id);
                }
                self.series.push(series);
            }

            previous = start..self.series.len();
        }
    }

    // Get the range of series ids in the given round.
    pub fn round_range(&self, round: u8) -> Range<usize> {
        let slots = self.groups * self.slots_per_group;
        let start = slots - (slots >> (round - 1));
        let end = slots - (slots >> round);
        start..end
    }

    pub fn round_series(&self, round: u8) -> &[Series] {
        &self.series[self.round_range(round)]
    }

    pub fn get(&self, series_id: SeriesId) -> Option<&Series> {
        self.series.get(series_id as usize)
    }

    pub fn champion(&self) -> Option<TeamId> {
        self.champion.map(|t| t.team_id)
    }

    // Get every team that made the playoffs.
    pub fn teams(&self) -> Vec<BracketTeam> {
        self.round_series(1).iter().flat_map(|s| s.slots.iter().filter_map(|slot| slot.team().copied())).collect()
    }

    // Get how many rounds the team got through. A bye counts as a round.
    pub fn rounds_won(&self, team_id: TeamId) -> u8 {
        let won = self.series.iter().filter(|s| s.winner.is_some_and(|w| w.team_id == team_id)).count();
        convert::int::<usize, u8>(won)
    }

    // Check whether series of the given round only have teams from the same group.
    fn is_within_group(&self, round: u8) -> bool {
        (1usize << round) <= self.slots_per_group
    }

    pub fn is_round_complete(&self, round: u8) -> bool {
        self.round_series(round).iter().all(|s| s.is_complete())
    }
}

// Functional.
impl Bracket {
    // Create the next game of every series that is waiting for one, on the first free day of the schedule.
    // The bracket is not changed; call `mark_scheduled` once the games are in the schedule.
    pub fn plan_day(&self, store: &ScheduleStore) -> Vec<Game> {
        let day = store.next_free_day();
        let mut next_id: GameId = store.next_id();
        let mut games = Vec::new();

        for series in self.series.iter().filter(|s| s.is_active()) {
            if store.has_unplayed_in_series(series.id) { continue; }

            if let Some([home, away]) = series.next_hosts() {
                let phase = Phase::Playoffs { round: series.round, series: series.id };
                games.push(Game::build(next_id, home, away, day, phase));
                next_id = next_id.saturating_add(1);
            }
        }

        return games;
    }

    // The series stays ready until a game is decided.
    pub fn mark_scheduled(&mut self, games: &[Game]) {
        for series_id in games.iter().filter_map(|g| g.series()) {
            if let Some(series) = self.series.get_mut(series_id as usize) {
                series.games_scheduled += 1;
            }
        }
    }

    // Count the result of a completed playoff game.
    pub fn record_game(&mut self, game: &Game) -> Result<()> {
        let invalid = |reason: &str| LeagueError::InvalidResult { game_id: game.id, reason: reason.to_string() };

        let (series_id, winner) = match (game.series(), game.winner()) {
            (Some(series_id), Some(winner)) => (series_id, winner),
            _ => return Err(invalid("not a decided playoff game")),
        };

        let series = self.series.get_mut(series_id as usize).ok_or_else(|| invalid("series does not exist"))?;
        if !series.is_active() || series.games_scheduled == 0 {
            return Err(invalid("series has no game going on"));
        }

        let side = series.side_of(winner).ok_or_else(|| invalid("winner does not play in the series"))?;
        if series.record_win(side) {
            info!(series = series_id, round = series.round, winner, wins = ?series.wins, "series decided");
        }

        return Ok(());
    }

    // Move the winners of a finished round on, or crown the champion after the final.
    // Returns false if the current round is still going.
    pub fn advance(&mut self) -> bool {
        if self.champion.is_some() || !self.is_round_complete(self.current_round) {
            return false;
        }

        if self.current_round == self.rounds {
            let final_range = self.round_range(self.rounds);
            self.champion = self.series[final_range.start].winner;
            info!(champion = ?self.champion(), "playoffs over");
            return true;
        }

        let next = self.current_round + 1;
        match self.reseeding && self.is_within_group(next) {
            true => self.reseed(next),
            false => self.fill_from_feeders(next),
        }

        self.current_round = next;
        info!(round = next, name = %round_name(next, self.rounds), "playoff round starts");
        return true;
    }

    fn fill_from_feeders(&mut self, round: u8) {
        for i in self.round_range(round) {
            let Some([a, b]) = self.series[i].feeders else { continue };
            let slots = [self.winner_slot(a), self.winner_slot(b)];
            self.series[i].fill(slots);
        }
    }

    fn winner_slot(&self, series_id: SeriesId) -> Slot {
        match self.series[series_id as usize].winner {
            Some(team) => Slot::Team(team),
            None => Slot::WinnerOf(series_id),
        }
    }

    // Pair the best remaining seed of each group with the worst one,
    // and link each new series to the series its teams came from.
    fn reseed(&mut self, round: u8) {
        let previous = self.round_range(round - 1);
        let next = self.round_range(round);
        let per_group_previous = previous.len() / self.groups;
        let per_group_next = next.len() / self.groups;

        for group in 0..self.groups {
            let start = previous.start + group * per_group_previous;
            let mut winners: Vec<(SeriesId, BracketTeam)> = self.series[start..start + per_group_previous].iter()
                .filter_map(|s| s.winner.map(|w| (s.id, w)))
                .collect();
            winners.sort_by(|a, b| a.1.compare(&b.1));

            let count = winners.len();
            for i in 0..per_group_next.min(count / 2) {
                let index = next.start + group * per_group_next + i;
                let (better_from, better) = winners[i];
                let (worse_from, worse) = winners[count - 1 - i];

                let series = &mut self.series[index];
                series.fill([Slot::Team(better), Slot::Team(worse)]);
                series.feeders = Some([better_from, worse_from]);
                let id = series.id;

                self.series[better_from as usize].parent = Some(id);
                self.series[worse_from as usize].parent = Some(id);
            }
        }
    }
}

// Get the name of a round for display.
pub fn round_name(round: u8, total_rounds: u8) -> String {
    match total_rounds.saturating_sub(round) {
        0 => "Final".to_string(),
        1 => "Semi Final".to_string(),
        2 => "Quarter Final".to_string(),
        _ => format!("{} Round", (round as usize).to_ordinal_string()),
    }
}

// Get the seeds of a group in first round order. Neighbours play each other, and the top two seeds
// can only meet in the group's last round.
fn seed_order(slots: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < slots {
        let size = order.len() * 2;
        order = order.iter().flat_map(|s| [*s, size + 1 - *s]).collect();
    }
    return order;
}

// Get the slot of the given seed: the team, or a bye if the group has fewer teams.
fn seed_slot(group: &[Seed], seed: usize, ranking: &[TeamId]) -> Slot {
    match group.get(seed - 1) {
        Some(s) => {
            let position = ranking.iter().position(|id| *id == s.team_id).unwrap_or(ranking.len());
            Slot::Team(BracketTeam {
                team_id: s.team_id,
                seed: s.rank,
                conference: s.conference,
                ranking: u16::try_from(position).unwrap_or(u16::MAX),
            })
        }
        None => Slot::Bye,
    }
}
