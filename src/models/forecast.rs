//! Daily forecast summaries built from 3-hour samples

use super::ForecastSample;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of calendar days kept in a [`DailyForecast`]
pub const MAX_FORECAST_DAYS: usize = 5;

/// High/low summary for one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Date key as found in the provider timestamps (`YYYY-MM-DD`)
    pub date: String,
    pub high: f64,
    pub low: f64,
    /// Taken from the sample that set the current `high`
    pub description: Option<String>,
    pub icon: Option<String>,
}

impl DailySummary {
    /// Empty summary: high at -inf, low at +inf, no condition yet
    #[must_use]
    pub fn new(date: &str) -> Self {
        Self {
            date: date.to_string(),
            high: f64::NEG_INFINITY,
            low: f64::INFINITY,
            description: None,
            icon: None,
        }
    }

    /// Fold one sample into the running high/low.
    ///
    /// Only a strictly greater temperature replaces the condition, so on a
    /// tie the earliest sample keeps it. Low updates never touch the condition.
    pub fn record(&mut self, sample: &ForecastSample) {
        if sample.temperature > self.high {
            self.high = sample.temperature;
            self.description = Some(sample.description.clone());
            self.icon = Some(sample.icon.clone());
        }
        if sample.temperature < self.low {
            self.low = sample.temperature;
        }
    }

    #[must_use]
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// `Mon, Jan 01` style label, or the raw key if it is not a date
    #[must_use]
    pub fn display_date(&self) -> String {
        self.calendar_date()
            .map_or_else(|| self.date.clone(), |date| date.format("%a, %b %d").to_string())
    }
}

/// Ordered daily summaries, in the order their dates first appeared
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    days: Vec<DailySummary>,
}

impl DailyForecast {
    /// Aggregate raw samples in one left-to-right pass.
    ///
    /// Days are kept in first-seen order and truncated to the first
    /// [`MAX_FORECAST_DAYS`] dates encountered, whatever their chronology.
    #[must_use]
    pub fn from_samples(samples: &[ForecastSample]) -> Self {
        let mut days: Vec<DailySummary> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for sample in samples {
            let date = sample.date_key();
            let position = match index.get(date) {
                Some(&position) => position,
                None => {
                    days.push(DailySummary::new(date));
                    index.insert(date.to_string(), days.len() - 1);
                    days.len() - 1
                }
            };
            days[position].record(sample);
        }

        days.truncate(MAX_FORECAST_DAYS);
        Self { days }
    }

    #[must_use]
    pub fn days(&self) -> &[DailySummary] {
        &self.days
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailySummary> {
        self.days.iter()
    }

    #[must_use]
    pub fn get(&self, date: &str) -> Option<&DailySummary> {
        self.days.iter().find(|day| day.date == date)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// An empty forecast is a valid result, not a failure
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
