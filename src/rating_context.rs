use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::optimizer::LbfgsOptions;

// Everything the rolling pass can be tuned with. Fields missing from a config file keep their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingContext {
    pub data_path: String,
    pub output_path: String,
    pub logo_path_template: String,

    pub max_iterations: usize,
    pub history_size: usize,
    pub gradient_tolerance: f64,
    pub function_tolerance: f64,

    // Rating dates are independent of each other, so they can be solved on the rayon pool
    pub parallel: bool,
}

impl Default for RatingContext {
    fn default() -> Self {
        Self {
            data_path: "data/E0_with_handicap.csv".to_string(),
            output_path: "data/rolling_team_ratings.csv".to_string(),
            logo_path_template: "logos/{team}.png".to_string(),

            max_iterations: 15_000,
            history_size: 10,
            gradient_tolerance: 1e-8,
            function_tolerance: 1e-12,

            parallel: false,
        }
    }
}

impl RatingContext {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn lbfgs_options(&self) -> LbfgsOptions {
        LbfgsOptions {
            max_iterations: self.max_iterations,
            history_size: self.history_size,
            gradient_tolerance: self.gradient_tolerance,
            function_tolerance: self.function_tolerance,
        }
    }
}
