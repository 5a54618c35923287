//! Terminal rendering of snapshots, daily summaries and alerts.

use std::fmt::Write;

use console::style;
use smartweather_core::{DailySummary, FORECAST_DAYS, WeatherSnapshot};

pub fn summary(snapshot: &WeatherSnapshot, daily: &[DailySummary]) -> String {
    let mut out = String::new();

    let title = style(format!("Weather for {}", snapshot.city)).cyan();
    let _ = write!(out, "\n{} {title} - ", condition_emoji(&snapshot.condition));

    match snapshot.temperature_c {
        Some(t) => {
            let _ = write!(out, "{}", style(format!("{t:.1}°C")).yellow());
        }
        None => out.push_str("N/A"),
    }
    if let Some(feels) = snapshot.feels_like_c {
        let _ = write!(out, " (Feels like {})", style(format!("{feels:.1}°C")).magenta());
    }
    if let Some(humidity) = snapshot.humidity_pct {
        let _ = write!(out, "  Humidity: {}", style(format!("{humidity}%")).green());
    }
    if let Some(wind) = snapshot.wind_speed_mps {
        let _ = write!(out, "  Wind: {}", style(format!("{wind:.1} m/s")).cyan());
    }
    let _ = writeln!(out, "  Condition: {}", style(&snapshot.condition).yellow());

    if !snapshot.has_forecast() {
        out.push_str("No forecast data available.\n");
        return out;
    }

    let days = &daily[..daily.len().min(FORECAST_DAYS)];

    out.push_str("\n5-day aggregated forecast:\n");
    for day in days {
        let _ = writeln!(
            out,
            " {} - {}/{} {}",
            day.date,
            style(format!("{:.1}", day.min_temp_c)).green(),
            style(format!("{:.1}", day.max_temp_c)).yellow(),
            day_emoji(day.max_temp_c),
        );
    }

    out.push_str("\n5-day highs (ASCII):\n");
    for day in days {
        let _ = writeln!(
            out,
            "{} | {} {}",
            day.date,
            bar(day.max_temp_c),
            style(format!("{:.1}°C", day.max_temp_c)).yellow(),
        );
    }

    out
}

pub fn alert_line(message: &str) -> String {
    format!("{} {message}", style("[ALERT]").red())
}

pub fn alert_list(rules: &[String]) -> String {
    if rules.is_empty() {
        return "No alerts set.".to_string();
    }
    let mut out = String::from("Saved alerts:");
    for (i, rule) in rules.iter().enumerate() {
        let _ = write!(out, "\n {}) {rule}", i + 1);
    }
    out
}

pub fn condition_emoji(condition: &str) -> &'static str {
    let d = condition.to_lowercase();

    if contains_any(&d, &["clear"]) {
        "☀️"
    } else if contains_any(&d, &["cloud"]) {
        "☁️"
    } else if contains_any(&d, &["rain", "shower", "drizzle"]) {
        "🌧️"
    } else if contains_any(&d, &["thunder"]) {
        "⛈️"
    } else if contains_any(&d, &["snow"]) {
        "❄️"
    } else if contains_any(&d, &["mist", "fog", "haze"]) {
        "🌫️"
    } else {
        "🌤️"
    }
}

fn contains_any(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| haystack.contains(w))
}

pub fn day_emoji(max_temp_c: f64) -> &'static str {
    match max_temp_c {
        t if t >= 35.0 => "🔥",
        t if t >= 30.0 => "☀️",
        t if t >= 25.0 => "🌤️",
        t if t >= 20.0 => "🌦️",
        t if t >= 10.0 => "🧥",
        _ => "❄️",
    }
}

/// Longest bar drawn, whatever the temperature.
const MAX_BAR: f64 = 200.0;

/// One `#` per whole degree of the daily high; nothing below zero.
fn bar(max_temp_c: f64) -> String {
    let n = max_temp_c.round().clamp(0.0, MAX_BAR) as usize;
    "#".repeat(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartweather_core::ForecastSample;

    fn day(date: &str, min: f64, max: f64) -> DailySummary {
        DailySummary {
            date: date.parse().expect("valid date"),
            min_temp_c: min,
            max_temp_c: max,
        }
    }

    #[test]
    fn emoji_for_conditions() {
        assert_eq!(condition_emoji("Clear sky"), "☀️");
        assert_eq!(condition_emoji("broken clouds"), "☁️");
        assert_eq!(condition_emoji("light drizzle"), "🌧️");
        assert_eq!(condition_emoji("thunderstorm"), "⛈️");
        assert_eq!(condition_emoji("light snow"), "❄️");
        assert_eq!(condition_emoji("haze"), "🌫️");
        assert_eq!(condition_emoji(""), "🌤️");
    }

    #[test]
    fn emoji_for_day_highs() {
        assert_eq!(day_emoji(35.0), "🔥");
        assert_eq!(day_emoji(30.0), "☀️");
        assert_eq!(day_emoji(19.9), "🧥");
        assert_eq!(day_emoji(-3.0), "❄️");
    }

    #[test]
    fn bars_round_and_clamp() {
        assert_eq!(bar(3.4), "###");
        assert_eq!(bar(2.5), "###");
        assert_eq!(bar(-5.0), "");
        assert_eq!(bar(1e300).len(), 200);
        assert_eq!(bar(f64::NAN), "");
    }

    #[test]
    fn empty_snapshot_renders_placeholders() {
        let out = summary(&WeatherSnapshot::empty("Nowhere"), &[]);
        assert!(out.contains("Weather for Nowhere"));
        assert!(out.contains("N/A"));
        assert!(!out.contains("Humidity"));
        assert!(out.contains("No forecast data available."));
    }

    #[test]
    fn summary_caps_days() {
        let mut snapshot = WeatherSnapshot::empty("Oslo");
        snapshot.forecast.push(ForecastSample::new(0, 1.0, ""));
        let daily: Vec<_> = (1..=7)
            .map(|d| day(&format!("2024-01-0{d}"), 0.0, d as f64))
            .collect();

        let out = summary(&snapshot, &daily);
        assert!(out.contains("2024-01-05"));
        assert!(!out.contains("2024-01-06"));
        assert!(out.contains("2024-01-03 | ### "));
    }

    #[test]
    fn alert_list_is_numbered() {
        let rules = vec!["temp<20".to_string(), "rain".to_string()];
        assert_eq!(alert_list(&rules), "Saved alerts:\n 1) temp<20\n 2) rain");
        assert_eq!(alert_list(&[]), "No alerts set.");
    }
}
