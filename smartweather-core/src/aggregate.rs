//! Collapses 3-hour forecast samples into per-day min/max summaries.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate, TimeZone};

use crate::model::ForecastSample;

/// Number of days shown or exported. Consumers truncate, the aggregator does not.
pub const FORECAST_DAYS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
}

impl DailySummary {
    fn widen(&mut self, temp: f64) {
        self.min_temp_c = self.min_temp_c.min(temp);
        self.max_temp_c = self.max_temp_c.max(temp);
    }
}

/// Aggregate by calendar date in the local system timezone.
pub fn aggregate_daily(samples: &[ForecastSample]) -> Vec<DailySummary> {
    aggregate_daily_in(samples, &Local)
}

/// Aggregate by calendar date in `tz`.
///
/// Dates come out in first-seen order, not calendar order. Samples without a
/// timestamp or temperature, or with an out-of-range timestamp, are skipped.
pub fn aggregate_daily_in<Tz: TimeZone>(samples: &[ForecastSample], tz: &Tz) -> Vec<DailySummary> {
    let mut days: Vec<DailySummary> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for sample in samples {
        let (Some(ts), Some(temp)) = (sample.timestamp, sample.temp_c) else {
            tracing::debug!(?sample, "skipping incomplete forecast sample");
            continue;
        };
        let Some(utc) = DateTime::from_timestamp(ts, 0) else {
            tracing::debug!(ts, "skipping forecast sample with invalid timestamp");
            continue;
        };
        let date = utc.with_timezone(tz).date_naive();

        match index.get(&date) {
            Some(&i) => days[i].widen(temp),
            None => {
                index.insert(date, days.len());
                days.push(DailySummary {
                    date,
                    min_temp_c: temp,
                    max_temp_c: temp,
                });
            }
        }
    }

    days
}
