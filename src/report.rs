use crate::rating_series::{RatingPoint, RatingSeries};

// Standings on the last rated date, strongest first
pub fn latest_standings(series: &RatingSeries) -> Vec<&RatingPoint> {
    let Some(date) = series.latest_date() else { return Vec::new() };

    let mut standings: Vec<&RatingPoint> = series.on_date(date).collect();
    standings.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    standings
}

pub fn output_report(series: &RatingSeries) {
    let standings = latest_standings(series);
    let Some(first) = standings.first() else {
        println!("No ratings were computed");
        return;
    };

    println!("Ratings on {}", first.date);
    for (i, p) in standings.iter().enumerate() {
        println!("|{0:3}. | {1:20} | {2:7.3} | {3:40}",
            i + 1,
            p.team,
            p.rating,
            p.display_path,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::Match;
    use crate::match_index::TeamVocabulary;
    use chrono::NaiveDate;

    #[test]
    fn standings_use_last_date_only() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
        let teams = TeamVocabulary::from_matches(&[
            Match::new(day(1), "Brighton", "Everton", -0.5),
            Match::new(day(1), "Wolves", "Fulham", 0.0),
        ]);

        let mut series = RatingSeries::new("logos/{team}.png");
        series.append(day(1), &teams, &[0.9, -0.3, -0.3, -0.3]);
        series.append(day(8), &teams, &[-0.1, 0.4, 0.2, -0.5]);

        let order: Vec<&str> = latest_standings(&series).iter().map(|p| p.team.as_str()).collect();
        assert_eq!(order, ["Everton", "Fulham", "Brighton", "Wolves"]);
        assert!(latest_standings(&RatingSeries::new("{team}")).is_empty());
    }
}
