use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::data_loader::Match;
use crate::match_index::{MatchIndex, TeamVocabulary};

// De-duplicated set of match table positions judged relevant for one rating date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchWindow {
    pub date: NaiveDate,
    pub matches: Vec<usize>,
}

impl MatchWindow {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[cfg(test)]
    pub fn contains(&self, match_idx: usize) -> bool {
        self.matches.binary_search(&match_idx).is_ok()
    }
}

// Every team brings its match on `date` plus one match either side of it. Teams that
// did not play bring their last match before and their first match after instead.
// That keeps idle teams connected to the teams playing today through shared opponents.
pub fn build_window(date: NaiveDate, teams: &TeamVocabulary, index: &MatchIndex, matches: &[Match]) -> MatchWindow {
    let mut used: BTreeSet<usize> = BTreeSet::new();

    for team in 0..teams.len() {
        let neighbors = index.neighbor_at(team, date, matches);
        used.extend(neighbors.prev);
        used.extend(neighbors.current);
        used.extend(neighbors.next);
    }

    MatchWindow {
        date,
        matches: used.into_iter().collect(),
    }
}
