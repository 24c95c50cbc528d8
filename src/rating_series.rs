use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::match_index::TeamVocabulary;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RatingPoint {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Rating")]
    pub rating: f64,
    #[serde(rename = "LogoPath")]
    pub display_path: String,
}

// "Nott'm Forest" -> "Nottm_Forest", substituted for `{team}` in the template
pub fn display_path(team: &str, template: &str) -> String {
    let sanitized = team.replace(' ', "_").replace('\'', "");
    template.replace("{team}", &sanitized)
}

// Append-only output table. One contiguous block of teams per rated date.
#[derive(Debug, Clone)]
pub struct RatingSeries {
    template: String,
    points: Vec<RatingPoint>,
}

impl RatingSeries {
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
            points: Vec::new(),
        }
    }

    pub fn append(&mut self, date: NaiveDate, teams: &TeamVocabulary, ratings: &[f64]) {
        debug_assert_eq!(teams.len(), ratings.len());
        debug_assert!(self.points.last().map_or(true, |p| p.date < date));

        for (team, &rating) in teams.names().iter().zip(ratings) {
            self.points.push(RatingPoint {
                date,
                team: team.clone(),
                rating,
                display_path: display_path(team, &self.template),
            });
        }
    }

    #[cfg(test)]
    pub fn points(&self) -> &[RatingPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[cfg(test)]
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.points.iter().map(|p| p.date).collect();
        dates.dedup();
        dates
    }

    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &RatingPoint> {
        self.points.iter().filter(move |p| p.date == date)
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for point in &self.points {
            csv_writer.serialize(point)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
