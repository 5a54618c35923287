//! CSV export of the aggregated daily forecast.

use std::{
    fmt, fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::{
    aggregate::{DailySummary, FORECAST_DAYS, aggregate_daily},
    model::WeatherSnapshot,
};

const HEADER: &str = "date,min_temp,max_temp";

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Written(PathBuf),
    NoData,
    Failed(String),
}

impl ExportOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, ExportOutcome::Written(_))
    }
}

impl fmt::Display for ExportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportOutcome::Written(path) => write!(f, "CSV exported: {}", path.display()),
            ExportOutcome::NoData => f.write_str("No forecast data to export."),
            ExportOutcome::Failed(reason) => write!(f, "Failed to export CSV: {reason}"),
        }
    }
}

/// `"New  York "` becomes `"new_york"`.
pub fn safe_file_stem(city: &str) -> String {
    city.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

pub fn export_file_name(city: &str) -> String {
    format!("{}_forecast.csv", safe_file_stem(city))
}

/// Aggregate the snapshot's forecast and export it into `dir`, naming the
/// file after `city`.
pub fn export_snapshot(city: &str, snapshot: &WeatherSnapshot, dir: &Path) -> ExportOutcome {
    if !snapshot.has_forecast() {
        return ExportOutcome::NoData;
    }
    export_csv(city, &aggregate_daily(&snapshot.forecast), dir)
}

/// Write at most [`FORECAST_DAYS`] summaries to `<dir>/<safe_city>_forecast.csv`.
///
/// Nothing is written when `summaries` is empty.
pub fn export_csv(city: &str, summaries: &[DailySummary], dir: &Path) -> ExportOutcome {
    if summaries.is_empty() {
        return ExportOutcome::NoData;
    }

    let path = dir.join(export_file_name(city));
    match write_csv(&path, summaries) {
        Ok(()) => {
            tracing::info!(path = %path.display(), rows = summaries.len().min(FORECAST_DAYS), "exported forecast");
            ExportOutcome::Written(path)
        }
        Err(err) => ExportOutcome::Failed(format!("{err:#}")),
    }
}

fn write_csv(path: &Path, summaries: &[DailySummary]) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("could not create {}", path.display()))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "{HEADER}")?;
    for day in summaries.iter().take(FORECAST_DAYS) {
        writeln!(out, "{},{:.2},{:.2}", day.date, day.min_temp_c, day.max_temp_c)?;
    }
    out.flush()
        .with_context(|| format!("could not write {}", path.display()))?;
    Ok(())
}
