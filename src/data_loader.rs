use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::error::{RatingError, Result};

// Date formats seen in the handicap table. The regression step writes ISO dates, the raw feed is UK day-first.
// `%Y` also accepts two digits ("24" would become year 24), so the short form has to go first.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y"];

// One row of the handicap table as it comes out of the regression step. Any other column is ignored.
#[derive(Deserialize, Debug)]
struct MatchRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "HomeTeam")]
    home_team: String,
    #[serde(rename = "AwayTeam")]
    away_team: String,
    #[serde(rename = "Handicap_Pred", deserialize_with = "deserialize_number_from_string")]
    target: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    // Regression-adjusted handicap, home minus away framing
    pub target: f64,
}

#[cfg(test)]
impl Match {
    pub fn new(date: NaiveDate, home_team: &str, away_team: &str, target: f64) -> Self {
        Self {
            date,
            home_team: home_team.to_owned(),
            away_team: away_team.to_owned(),
            target,
        }
    }

    pub fn is_in_game(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }
}

pub fn load_matches<P: AsRef<Path>>(file_path: P) -> Result<Vec<Match>> {
    let file = File::open(file_path)?;
    read_matches(file)
}

// Reads the handicap table and returns the matches sorted chronologically.
// Same-day matches keep their file order.
pub fn read_matches<R: Read>(reader: R) -> Result<Vec<Match>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut matches = Vec::new();

    for (row, record) in csv_reader.deserialize::<MatchRecord>().enumerate() {
        let record = record?;
        let date = parse_date(&record.date).ok_or_else(|| RatingError::InvalidDate {
            row: row + 1,
            value: record.date.clone(),
        })?;

        matches.push(Match {
            date,
            home_team: record.home_team,
            away_team: record.away_team,
            target: record.target,
        });
    }

    matches.sort_by_key(|m| m.date);
    Ok(matches)
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    // Timestamps like "2024-08-16 00:00:00" only carry the day we care about
    let value = value.split_whitespace().next().unwrap_or(value);

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

// League-wide home advantage: mean target over every match of the season.
pub fn global_home_advantage(matches: &[Match]) -> f64 {
    if matches.is_empty() {
        return 0.0;
    }
    matches.iter().map(|m| m.target).sum::<f64>() / matches.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Date,HomeTeam,AwayTeam,GoalDiff,AHh,PCAHH,Residual,Adjustment,Handicap_Pred
2024-08-17,Ipswich,Liverpool,-2,1.25,1.95,-3.25,0.1,1.35
2024-08-16,Man United,Fulham,1,-1.0,2.02,2.0,0.05,-0.95
2024-08-17,Arsenal,Wolves,2,-1.75,1.92,3.75,-0.02,\"-1.77\"
";

    #[test]
    fn reads_and_sorts_handicap_table() {
        let matches = read_matches(TABLE.as_bytes()).expect("table should parse");
        assert_eq!(matches.len(), 3);

        assert_eq!(matches[0].home_team, "Man United");
        assert_eq!(matches[0].date, NaiveDate::from_ymd_opt(2024, 8, 16).unwrap());

        // Same-day matches stay in file order
        assert_eq!(matches[1].home_team, "Ipswich");
        assert_eq!(matches[2].home_team, "Arsenal");
        assert!((matches[2].target + 1.77).abs() < 1e-12);
    }

    #[test]
    fn parses_day_first_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 8, 16);
        assert_eq!(parse_date("16/08/2024"), expected);
        assert_eq!(parse_date("16/08/24"), expected);
        assert_eq!(parse_date("2024-08-16 00:00:00"), expected);
        assert_eq!(parse_date("August 16th"), None);
    }

    #[test]
    fn short_years_sort_with_iso_dates() {
        let table = "Date,HomeTeam,AwayTeam,Handicap_Pred\n\
                     18/08/24,Chelsea,Man City,0.75\n\
                     2024-08-17,Arsenal,Wolves,-1.5\n";
        let matches = read_matches(table.as_bytes()).expect("table should parse");

        assert_eq!(matches[0].home_team, "Arsenal");
        assert_eq!(matches[1].date, NaiveDate::from_ymd_opt(2024, 8, 18).unwrap());
        assert_eq!(parse_date("01/05/99"), NaiveDate::from_ymd_opt(1999, 5, 1));
    }

    #[test]
    fn bad_date_reports_row() {
        let table = "Date,HomeTeam,AwayTeam,Handicap_Pred\n2024-08-16,A,B,0.5\nyesterday,B,A,0.1\n";
        match read_matches(table.as_bytes()) {
            Err(RatingError::InvalidDate { row, value }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected invalid date, got {other:?}"),
        }
    }

    #[test]
    fn home_advantage_is_mean_target() {
        let matches = read_matches(TABLE.as_bytes()).unwrap();
        let expected = (1.35 - 0.95 - 1.77) / 3.0;
        assert!((global_home_advantage(&matches) - expected).abs() < 1e-12);
        assert_eq!(global_home_advantage(&[]), 0.0);
    }
}
