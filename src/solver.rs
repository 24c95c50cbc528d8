use crate::data_loader::Match;
use crate::error::{RatingError, Result};
use crate::match_index::TeamVocabulary;
use crate::optimizer::{minimize, LbfgsOptions};
use crate::window::MatchWindow;

// A window match reduced to what the loss needs: vocabulary slots and the target margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixture {
    pub home: usize,
    pub away: usize,
    pub target: f64,
}

pub fn window_fixtures(window: &MatchWindow, matches: &[Match], teams: &TeamVocabulary) -> Vec<Fixture> {
    window
        .matches
        .iter()
        .filter_map(|&idx| {
            let m = &matches[idx];
            Some(Fixture {
                home: teams.index_of(&m.home_team)?,
                away: teams.index_of(&m.away_team)?,
                target: m.target,
            })
        })
        .collect()
}

// Mean squared error of `r[home] - r[away] + home_adv` against the targets.
// Writes the gradient over the full rating vector; teams without a fixture get zero.
pub fn loss(ratings: &[f64], fixtures: &[Fixture], home_adv: f64, grad: &mut [f64]) -> f64 {
    grad.iter_mut().for_each(|g| *g = 0.0);
    if fixtures.is_empty() {
        return 0.0;
    }

    let n = fixtures.len() as f64;
    let mut total = 0.0;
    for f in fixtures {
        let err = ratings[f.home] - ratings[f.away] + home_adv - f.target;
        total += err * err;
        grad[f.home] += 2.0 * err / n;
        grad[f.away] -= 2.0 * err / n;
    }
    total / n
}

#[derive(Debug, Clone)]
pub struct Solution {
    pub ratings: Vec<f64>,
    pub loss: f64,
    pub iterations: usize,
}

// Fits one rating per vocabulary team from a zero start. Only window teams feel the loss,
// so every other team comes back at exactly zero.
pub fn solve(window: &MatchWindow, matches: &[Match], teams: &TeamVocabulary, home_adv: f64, options: &LbfgsOptions) -> Result<Solution> {
    let fixtures = window_fixtures(window, matches, teams);
    if fixtures.is_empty() {
        return Err(RatingError::EmptyWindow(window.date));
    }

    let result = minimize(
        |ratings: &[f64], grad: &mut [f64]| loss(ratings, &fixtures, home_adv, grad),
        vec![0.0; teams.len()],
        options,
    );

    if !result.converged {
        return Err(RatingError::NonConvergence {
            date: window.date,
            message: result.message,
        });
    }

    Ok(Solution {
        ratings: result.x,
        loss: result.value,
        iterations: result.iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn loss_and_gradient_match_hand_computation() {
        let fixtures = [
            Fixture { home: 0, away: 1, target: 1.0 },
            Fixture { home: 1, away: 0, target: -1.0 },
        ];
        let mut grad = [9.0; 3];
        let value = loss(&[0.5, 0.0, 4.0], &fixtures, 0.25, &mut grad);

        // errors: 0.5 + 0.25 - 1 = -0.25 and -0.5 + 0.25 + 1 = 0.75
        assert!((value - (0.0625 + 0.5625) / 2.0).abs() < 1e-12);
        assert!((grad[0] - (-0.25 - 0.75)).abs() < 1e-12);
        assert!((grad[1] - (0.25 + 0.75)).abs() < 1e-12);
        assert_eq!(grad[2], 0.0);
    }

    #[test]
    fn absent_teams_keep_zero_start() {
        let matches = vec![
            Match::new(day(4), "Arsenal", "Chelsea", -0.75),
            Match::new(day(11), "Chelsea", "Arsenal", 0.25),
            Match::new(day(18), "Everton", "Fulham", 0.5),
        ];
        let teams = TeamVocabulary::from_matches(&matches);
        let window = MatchWindow { date: day(11), matches: vec![0, 1] };

        let solution = solve(&window, &matches, &teams, 0.0, &LbfgsOptions::default()).unwrap();
        assert_eq!(solution.ratings[teams.index_of("Everton").unwrap()], 0.0);
        assert_eq!(solution.ratings[teams.index_of("Fulham").unwrap()], 0.0);

        // Arsenal - Chelsea should reproduce both targets as closely as possible
        let diff = solution.ratings[0] - solution.ratings[1];
        assert!((diff - (-0.5)).abs() < 1e-5);
    }

    #[test]
    fn empty_window_is_an_error() {
        let matches = vec![Match::new(day(4), "Arsenal", "Chelsea", -0.75)];
        let teams = TeamVocabulary::from_matches(&matches);
        let window = MatchWindow { date: day(4), matches: Vec::new() };

        let err = solve(&window, &matches, &teams, 0.0, &LbfgsOptions::default()).unwrap_err();
        assert!(matches!(err, RatingError::EmptyWindow(d) if d == day(4)));
    }

    #[test]
    fn non_convergence_names_the_date() {
        let matches = vec![
            Match::new(day(4), "Arsenal", "Chelsea", -0.75),
            Match::new(day(4), "Everton", "Fulham", 0.5),
        ];
        let teams = TeamVocabulary::from_matches(&matches);
        let window = MatchWindow { date: day(4), matches: vec![0, 1] };
        let options = LbfgsOptions { max_iterations: 0, ..LbfgsOptions::default() };

        match solve(&window, &matches, &teams, 0.0, &options) {
            Err(RatingError::NonConvergence { date, message }) => {
                assert_eq!(date, day(4));
                assert_eq!(message, "iteration limit reached");
            }
            other => panic!("expected non-convergence, got {other:?}"),
        }
    }
}
