//! User-defined alert rules and their evaluation against a snapshot.
//!
//! Rule grammar (case-insensitive, trimmed):
//! - `temp<NUMBER`: current temperature strictly below NUMBER °C
//! - `temp>NUMBER`: current temperature strictly above NUMBER °C
//! - `rain`: any forecast sample mentions rain, showers or drizzle
//!
//! Anything else is kept in the book but never fires.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::model::WeatherSnapshot;

const RAIN_WORDS: [&str; 3] = ["rain", "shower", "drizzle"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlertRule {
    TempBelow(f64),
    TempAbove(f64),
    RainExpected,
    /// Unknown text or an unparseable threshold.
    Unrecognized,
}

impl AlertRule {
    pub fn parse(text: &str) -> Self {
        let rule = normalize(text);

        if rule == "rain" {
            return AlertRule::RainExpected;
        }
        if let Some(v) = rule.strip_prefix("temp<") {
            return parse_threshold(v).map_or(AlertRule::Unrecognized, AlertRule::TempBelow);
        }
        if let Some(v) = rule.strip_prefix("temp>") {
            return parse_threshold(v).map_or(AlertRule::Unrecognized, AlertRule::TempAbove);
        }
        AlertRule::Unrecognized
    }

    /// Message for this rule against `snapshot`, if it fires.
    pub fn check(&self, snapshot: &WeatherSnapshot) -> Option<String> {
        let city = &snapshot.city;
        match *self {
            AlertRule::TempBelow(v) => snapshot
                .temperature_c
                .filter(|t| *t < v)
                .map(|t| format!("Temp Alert: {city} current {t:.1}°C < {v:.1}°C")),
            AlertRule::TempAbove(v) => snapshot
                .temperature_c
                .filter(|t| *t > v)
                .map(|t| format!("Temp Alert: {city} current {t:.1}°C > {v:.1}°C")),
            AlertRule::RainExpected => rain_expected(snapshot)
                .then(|| format!("Rain Alert: Rain expected in {city} in the forecast.")),
            AlertRule::Unrecognized => None,
        }
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn parse_threshold(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn rain_expected(snapshot: &WeatherSnapshot) -> bool {
    snapshot.forecast.iter().any(|sample| {
        let desc = sample.condition.to_lowercase();
        RAIN_WORDS.iter().any(|w| desc.contains(w))
    })
}

/// Ordered, deduplicated list of rule texts, optionally mirrored to a file.
#[derive(Debug, Default)]
pub struct AlertBook {
    rules: Vec<String>,
    path: Option<PathBuf>,
}

impl AlertBook {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the book backed by `path` (one rule per line). A missing or
    /// unreadable file yields an empty book.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let rules = match read_rules(&path) {
            Ok(rules) => rules,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %format!("{err:#}"), "failed to load alerts");
                Vec::new()
            }
        };
        Self {
            rules,
            path: Some(path),
        }
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns `false` when the normalized text is empty or already present.
    pub fn add_rule(&mut self, text: &str) -> bool {
        let rule = normalize(text);
        if rule.is_empty() || self.rules.contains(&rule) {
            return false;
        }
        if AlertRule::parse(&rule) == AlertRule::Unrecognized {
            tracing::debug!(%rule, "storing rule that will never trigger");
        }
        self.rules.push(rule);
        self.persist();
        true
    }

    /// Remove by 1-based position.
    pub fn remove_rule(&mut self, index: usize) -> bool {
        if index == 0 || index > self.rules.len() {
            return false;
        }
        self.rules.remove(index - 1);
        self.persist();
        true
    }

    /// Triggered messages in stored rule order.
    pub fn evaluate(&self, snapshot: &WeatherSnapshot) -> Vec<String> {
        self.rules
            .iter()
            .filter_map(|text| AlertRule::parse(text).check(snapshot))
            .collect()
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(err) = write_rules(path, &self.rules) {
            tracing::warn!(path = %path.display(), error = %format!("{err:#}"), "failed to save alerts");
        }
    }
}

fn read_rules(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read alerts file: {}", path.display()))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn write_rules(path: &Path, rules: &[String]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create alerts directory: {}", parent.display()))?;
    }

    let mut file = fs::File::create(path)
        .with_context(|| format!("Failed to write alerts file: {}", path.display()))?;
    for rule in rules {
        writeln!(file, "{rule}")?;
    }
    Ok(())
}
