// A league season from the first generated game to the champion.
// The season owns the schedule, and every change to it goes through here.
pub mod knockout_round;
pub mod ranking;
pub mod schedule;
pub mod schedule_generator;

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::Date;
use tracing::info;

use crate::{
    error::{LeagueError, Result},
    format::{validator, LeagueConfig},
    game::{Game, Outcome, Phase},
    owner_mood::{MoodState, OwnerMoodTracker, PlayoffResult, SeasonSignals},
    team::Team,
    types::{convert, Day, GameId, TeamId},
};

use self::{
    knockout_round::Bracket,
    ranking::{Standings, TeamStanding},
    schedule::ScheduleStore,
    schedule_generator::calendar,
};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeasonPhase {
    #[default]
    Created,
    RegularSeason,
    Playoffs,
    Finished,
}

impl SeasonPhase {
    pub fn name(&self) -> &'static str {
        match self {
            SeasonPhase::Created => "created",
            SeasonPhase::RegularSeason => "regular season",
            SeasonPhase::Playoffs => "playoffs",
            SeasonPhase::Finished => "finished",
        }
    }
}

// What happened when the playoffs were pushed forward.
#[derive(Debug)]
#[derive(Clone, PartialEq, Eq)]
pub enum PlayoffProgress {
    Scheduled { day: Day, games: Vec<GameId> },
    Waiting,    // Every active series still has an unplayed game.
    Champion(TeamId),
}

#[derive(Debug, Serialize)]
#[derive(Clone)]
pub struct Season {
    pub index: u32,
    config: LeagueConfig,
    roster: Vec<Team>,
    schedule: ScheduleStore,
    standings: Standings,
    bracket: Option<Bracket>,
    phase: SeasonPhase,
}

// Basics.
impl Season {
    // Build a season. The configuration is checked against the roster first.
    pub fn build(index: u32, config: LeagueConfig, roster: Vec<Team>) -> Result<Self> {
        validator::validate(&config, &roster)?;

        let standings = Standings::build(roster.iter().map(|t| TeamStanding::build(t.id, 0, 0, 0)).collect());
        return Ok(Self {
            index: index,
            config: config,
            roster: roster,
            schedule: ScheduleStore::build(),
            standings: standings,
            bracket: None,
            phase: SeasonPhase::Created,
        });
    }

    pub fn config(&self) -> &LeagueConfig {
        &self.config
    }

    pub fn roster(&self) -> &[Team] {
        &self.roster
    }

    pub fn schedule(&self) -> &ScheduleStore {
        &self.schedule
    }

    pub fn standings(&self) -> &Standings {
        &self.standings
    }

    pub fn bracket(&self) -> Option<&Bracket> {
        self.bracket.as_ref()
    }

    pub fn phase(&self) -> SeasonPhase {
        self.phase
    }

    pub fn champion(&self) -> Option<TeamId> {
        self.bracket.as_ref().and_then(|b| b.champion())
    }

    // Get the calendar date of a game, if the league has a start date.
    pub fn date_of_game(&self, game_id: GameId) -> Option<Date> {
        let game = self.schedule.get(game_id)?;
        crate::time::date_of_day(self.config.start_date?, self.config.cadence, game.day)
    }

    fn require_phase(&self, expected: SeasonPhase, action: &'static str) -> Result<()> {
        if self.phase != expected {
            return Err(LeagueError::InvalidPhase { action: action, phase: self.phase.name() });
        }
        return Ok(());
    }
}

// Functional.
impl Season {
    // Generate the regular season and put it in the schedule. Returns the number of games.
    pub fn generate_regular_season<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<usize> {
        self.require_phase(SeasonPhase::Created, "generate the regular season")?;
        let rr = &self.config.round_robin;

        let matchups = schedule_generator::generate_matchups(&self.roster, rr, self.index, rng)?;
        let assigned = calendar::assign_days(&matchups, self.schedule.next_free_day(), rr.season_length)?;

        let first_id = self.schedule.next_id();
        let games: Vec<Game> = assigned.into_iter().enumerate()
            .map(|(i, (day, [home, away]))| {
                Game::build(first_id.saturating_add(convert::int::<usize, GameId>(i)), home, away, day, Phase::RegularSeason)
            })
            .collect();

        let count = games.len();
        self.schedule.append(games)?;
        self.phase = SeasonPhase::RegularSeason;

        info!(season = self.index, games = count, last_day = ?self.schedule.last_day(), "regular season scheduled");
        return Ok(count);
    }

    // Record the result of a game and update the standings or the bracket.
    pub fn report_result(&mut self, game_id: GameId, outcome: Outcome) -> Result<&Game> {
        let mut game = match self.schedule.get(game_id) {
            Some(game) if !game.is_played() => game.clone(),
            _ => return Err(LeagueError::UnknownOrAlreadyResolvedGame(game_id)),
        };
        game.outcome = Some(outcome);

        // The bracket is updated on a copy, so a rejected result leaves everything as it was.
        let bracket = match (game.is_playoff(), &self.bracket) {
            (true, Some(bracket)) => {
                let mut bracket = bracket.clone();
                bracket.record_game(&game)?;
                Some(bracket)
            }
            (true, None) => return Err(LeagueError::InvalidPhase { action: "report a playoff result", phase: self.phase.name() }),
            (false, _) => None,
        };

        self.schedule.complete(game_id, outcome)?;

        match bracket {
            Some(bracket) => self.bracket = Some(bracket),
            None => self.standings.record_game(game.home, game.away, outcome, &self.roster),
        }

        return self.schedule.get(game_id).ok_or(LeagueError::UnknownOrAlreadyResolvedGame(game_id));
    }

    // Seed the teams and build the bracket once the regular season is over.
    // Standings from outside replace the ones built from the schedule.
    pub fn start_playoffs(&mut self, standings: Option<Standings>) -> Result<&Bracket> {
        self.require_phase(SeasonPhase::RegularSeason, "start the playoffs")?;
        if !self.schedule.is_regular_season_over() {
            return Err(LeagueError::InvalidPhase { action: "start the playoffs", phase: self.phase.name() });
        }

        let standings = standings.unwrap_or_else(|| self.standings.clone());
        let seeds = ranking::calculate_seeds(&standings, &self.roster, &self.config)?;
        let league_ranking = standings.league_ranking(&self.config);
        let bracket = Bracket::build(&seeds, &league_ranking, &self.config.playoffs)?;

        info!(season = self.index, teams = self.config.playoffs.field_size, rounds = bracket.rounds, "playoffs start");
        self.standings = standings;
        self.phase = SeasonPhase::Playoffs;
        let bracket: &Bracket = self.bracket.insert(bracket);
        return Ok(bracket);
    }

    // Move finished rounds on and schedule the next day of playoff games.
    pub fn advance_playoffs(&mut self) -> Result<PlayoffProgress> {
        if let (SeasonPhase::Finished, Some(champion)) = (self.phase, self.champion()) {
            return Ok(PlayoffProgress::Champion(champion));
        }
        self.require_phase(SeasonPhase::Playoffs, "advance the playoffs")?;

        let bracket = self.bracket.as_mut()
            .ok_or(LeagueError::InvalidPhase { action: "advance the playoffs", phase: "regular season" })?;

        if bracket.advance() {
            if let Some(champion) = bracket.champion() {
                self.phase = SeasonPhase::Finished;
                return Ok(PlayoffProgress::Champion(champion));
            }
        }

        let games = bracket.plan_day(&self.schedule);
        if games.is_empty() {
            return Ok(PlayoffProgress::Waiting);
        }

        let day = self.schedule.next_free_day();
        let ids: Vec<GameId> = games.iter().map(|g| g.id).collect();
        self.schedule.append(games.clone())?;
        bracket.mark_scheduled(&games);

        info!(day, games = ids.len(), round = bracket.current_round, "playoff day scheduled");
        return Ok(PlayoffProgress::Scheduled { day: day, games: ids });
    }

    // Get what each owner saw this season.
    pub fn season_signals(&self, financial_health: &HashMap<TeamId, f64>) -> Result<Vec<(TeamId, SeasonSignals)>> {
        self.require_phase(SeasonPhase::Finished, "judge the season")?;
        let bracket = self.bracket.as_ref()
            .ok_or(LeagueError::InvalidPhase { action: "judge the season", phase: self.phase.name() })?;
        let playoff_teams = bracket.teams();

        let signals = self.roster.iter().map(|team| {
            let win_pct = match self.standings.get(team.id) {
                Some(row) if row.games() > 0 => row.win_pct(),
                _ => 0.5,
            };

            let playoffs = if bracket.champion() == Some(team.id) {
                PlayoffResult::Champion
            }
            else if playoff_teams.iter().any(|t| t.team_id == team.id) {
                PlayoffResult::Eliminated { rounds_won: bracket.rounds_won(team.id), rounds: bracket.rounds }
            }
            else {
                PlayoffResult::Missed
            };

            (team.id, SeasonSignals {
                win_pct: win_pct,
                playoffs: playoffs,
                financial_health: financial_health.get(&team.id).copied().unwrap_or(0.0),
            })
        }).collect();

        return Ok(signals);
    }

    // Update every owner's mood once the champion is known.
    pub fn update_owner_moods(&self, tracker: &mut OwnerMoodTracker, financial_health: &HashMap<TeamId, f64>) -> Result<Vec<(TeamId, MoodState)>> {
        let signals = self.season_signals(financial_health)?;
        let moods = signals.iter()
            .map(|(team_id, s)| (*team_id, tracker.update(*team_id, s, &self.config.owner_mood)))
            .collect();

        info!(season = self.index, teams = self.roster.len(), "owner moods updated");
        return Ok(moods);
    }
}
