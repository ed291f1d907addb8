// Teams as far as the calendar is concerned.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{ConferenceId, DivisionId, TeamId};

#[derive(Debug, Serialize, Deserialize)]
#[derive(Default, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: TeamId,
    pub conference: ConferenceId,
    pub division: DivisionId,
    #[serde(default)]
    pub name: String,
}

impl Team {
    pub fn build(id: TeamId, conference: ConferenceId, division: DivisionId) -> Self {
        Self {
            id: id,
            conference: conference,
            division: division,
            ..Default::default()
        }
    }

    // Give the team a display name.
    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    // Whether the two teams share a division. Division ids are scoped to their conference.
    pub fn same_division(&self, other: &Team) -> bool {
        self.conference == other.conference && self.division == other.division
    }

    pub fn same_conference(&self, other: &Team) -> bool {
        self.conference == other.conference
    }
}

// Get the distinct conferences of the roster in ascending order.
pub fn conferences(roster: &[Team]) -> Vec<ConferenceId> {
    let set: BTreeSet<ConferenceId> = roster.iter().map(|t| t.conference).collect();
    return set.into_iter().collect();
}

// Find a team by its id. Rosters are dense, so the id is normally the index.
pub fn find(roster: &[Team], id: TeamId) -> Option<&Team> {
    match roster.get(id as usize) {
        Some(team) if team.id == id => Some(team),
        _ => roster.iter().find(|t| t.id == id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_division_is_scoped_to_conference() {
        let a = Team::build(0, 0, 1);
        let b = Team::build(1, 1, 1);
        let c = Team::build(2, 0, 1);

        assert!(!a.same_division(&b));
        assert!(a.same_division(&c));
        assert!(a.same_conference(&c));
    }

    #[test]
    fn test_conferences_are_distinct_and_sorted() {
        let roster = vec![Team::build(0, 1, 0), Team::build(1, 0, 0), Team::build(2, 1, 1)];
        assert_eq!(conferences(&roster), vec![0, 1]);
    }
}
