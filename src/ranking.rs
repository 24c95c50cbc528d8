use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::data_loader::{global_home_advantage, Match};
use crate::error::{RatingError, Result};
use crate::match_index::{MatchIndex, TeamVocabulary};
use crate::rating_context::RatingContext;
use crate::rating_series::RatingSeries;
use crate::solver::solve;
use crate::util::mean;
use crate::window::{build_window, MatchWindow};

// Static season state. Built once, read-only for the whole rolling pass.
#[derive(Debug, Clone)]
pub struct League {
    matches: Vec<Match>,
    teams: TeamVocabulary,
    index: MatchIndex,
    home_advantage: f64,
}

impl League {
    pub fn new(matches: Vec<Match>) -> Result<Self> {
        Self::with_teams(matches, &[])
    }

    // Extra teams join the vocabulary even without a single match.
    pub fn with_teams(mut matches: Vec<Match>, extra_teams: &[String]) -> Result<Self> {
        matches.sort_by_key(|m| m.date);

        let teams = TeamVocabulary::with_teams(&matches, extra_teams);
        if teams.is_empty() {
            return Err(RatingError::EmptyVocabulary);
        }

        let index = MatchIndex::new(&matches, &teams);
        let home_advantage = global_home_advantage(&matches);

        Ok(Self { matches, teams, index, home_advantage })
    }

    #[cfg(test)]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    #[cfg(test)]
    pub fn teams(&self) -> &TeamVocabulary {
        &self.teams
    }

    #[cfg(test)]
    pub fn home_advantage(&self) -> f64 {
        self.home_advantage
    }

    // Match days from the point every team has played, without the last day of the season.
    pub fn rating_dates(&self) -> Vec<NaiveDate> {
        let mut start = None;
        for team in 0..self.teams.len() {
            match self.index.first_match_date(team, &self.matches) {
                Some(first) => start = start.max(Some(first)),
                None => {
                    warn!("{} has no matches, no rating dates can be computed", self.teams.name(team));
                    return Vec::new();
                }
            }
        }
        let Some(start) = start else { return Vec::new() };

        let mut dates: Vec<NaiveDate> = self.matches.iter().map(|m| m.date).filter(|d| *d >= start).collect();
        dates.dedup();
        dates.pop();
        dates
    }

    pub fn window_for(&self, date: NaiveDate) -> MatchWindow {
        build_window(date, &self.teams, &self.index, &self.matches)
    }

    // Window, fit, normalize for a single date. Independent of every other date.
    pub fn rate_date(&self, date: NaiveDate, ranking_context: &RatingContext) -> Result<Vec<f64>> {
        let window = self.window_for(date);
        let solution = solve(&window, &self.matches, &self.teams, self.home_advantage, &ranking_context.lbfgs_options())?;

        debug!(
            %date,
            window = window.len(),
            loss = solution.loss,
            iterations = solution.iterations,
            "solved rating window"
        );

        Ok(normalize(solution.ratings))
    }

    pub fn run(&self, ranking_context: &RatingContext) -> RatingSeries {
        info!("Global home advantage: {:.4}", self.home_advantage);

        let dates = self.rating_dates();
        info!(dates = dates.len(), teams = self.teams.len(), "starting rolling ratings");

        let results: Vec<(NaiveDate, Result<Vec<f64>>)> = if ranking_context.parallel {
            dates.par_iter().map(|&d| (d, self.rate_date(d, ranking_context))).collect()
        } else {
            dates.iter().map(|&d| (d, self.rate_date(d, ranking_context))).collect()
        };

        let mut series = RatingSeries::new(&ranking_context.logo_path_template);
        for (date, result) in results {
            match result {
                Ok(ratings) => series.append(date, &self.teams, &ratings),
                Err(e) => warn!("{e}, skipping {date}"),
            }
        }

        series
    }
}

// Flip so positive means stronger, then center on zero. The order matters.
pub fn normalize(mut ratings: Vec<f64>) -> Vec<f64> {
    for r in ratings.iter_mut() {
        *r = -*r;
    }

    let centre = mean(&ratings);
    for r in ratings.iter_mut() {
        *r -= centre;
    }

    ratings
}
