use std::collections::HashMap;

use chrono::NaiveDate;

use crate::data_loader::Match;

// Fixed, sorted team list. A team's position here is its slot in every rating vector.
#[derive(Debug, Clone)]
pub struct TeamVocabulary {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl TeamVocabulary {
    #[cfg(test)]
    pub fn from_matches(matches: &[Match]) -> Self {
        Self::with_teams(matches, &[])
    }

    pub fn with_teams(matches: &[Match], extra_teams: &[String]) -> Self {
        let mut names: Vec<String> = matches
            .iter()
            .flat_map(|m| [m.home_team.clone(), m.away_team.clone()])
            .chain(extra_teams.iter().cloned())
            .collect();
        names.sort();
        names.dedup();

        let index = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();

        Self { names, index }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    pub fn index_of(&self, team: &str) -> Option<usize> {
        self.index.get(team).copied()
    }
}

// What a team played around a given date. All values are positions in the match table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub prev: Option<usize>,
    pub current: Option<usize>,
    pub next: Option<usize>,
}

// Per team, the chronological list of match table positions the team played in.
// Expects the match table sorted by date.
#[derive(Debug, Clone)]
pub struct MatchIndex {
    team_matches: Vec<Vec<usize>>,
}

impl MatchIndex {
    pub fn new(matches: &[Match], teams: &TeamVocabulary) -> Self {
        let mut team_matches = vec![Vec::new(); teams.len()];

        for (idx, m) in matches.iter().enumerate() {
            for team in [&m.home_team, &m.away_team] {
                if let Some(team_idx) = teams.index_of(team) {
                    team_matches[team_idx].push(idx);
                }
            }
        }

        for list in &mut team_matches {
            list.sort_by_key(|&idx| matches[idx].date);
        }

        Self { team_matches }
    }

    pub fn matches_for(&self, team: usize) -> &[usize] {
        self.team_matches.get(team).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first_match_date(&self, team: usize, matches: &[Match]) -> Option<NaiveDate> {
        self.matches_for(team).first().map(|&idx| matches[idx].date)
    }

    // A team counts as playing on `date` only if it has exactly one match that day.
    // Otherwise the nearest match strictly before and strictly after are returned.
    pub fn neighbor_at(&self, team: usize, date: NaiveDate, matches: &[Match]) -> Neighbors {
        let list = self.matches_for(team);
        let start = list.partition_point(|&idx| matches[idx].date < date);
        let end = list.partition_point(|&idx| matches[idx].date <= date);

        if end - start == 1 {
            Neighbors {
                prev: start.checked_sub(1).map(|i| list[i]),
                current: Some(list[start]),
                next: list.get(start + 1).copied(),
            }
        } else {
            Neighbors {
                prev: start.checked_sub(1).map(|i| list[i]),
                current: None,
                next: list.get(end).copied(),
            }
        }
    }
}
