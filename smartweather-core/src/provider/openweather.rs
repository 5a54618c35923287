use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::model::{ForecastSample, WeatherSnapshot};

use super::WeatherProvider;

const BASE_URL: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// GET `/data/2.5/{endpoint}` for `city` and return the raw body.
    async fn get_json(&self, endpoint: &str, city: &str) -> Result<String> {
        let url = format!("{}/data/2.5/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {endpoint} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {} request failed with status {}: {}",
                endpoint,
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, city: &str) -> Result<WeatherSnapshot> {
        let current = self.get_json("weather", city).await?;
        let forecast = self.get_json("forecast", city).await?;
        tracing::debug!(city, "fetched current weather and forecast");

        parse_snapshot(city, &current, &forecast)
    }
}

/// Build a snapshot from the raw `weather` and `forecast` documents.
///
/// Only a body that is not JSON at all is an error. Every field is read on its
/// own, so a wrongly typed field is treated as absent without losing its
/// neighbours. Forecast entries that are not objects are dropped.
pub fn parse_snapshot(city: &str, current_body: &str, forecast_body: &str) -> Result<WeatherSnapshot> {
    let current: Value =
        serde_json::from_str(current_body).context("Failed to parse OpenWeather current JSON")?;
    let forecast: Value =
        serde_json::from_str(forecast_body).context("Failed to parse OpenWeather forecast JSON")?;

    Ok(snapshot_from_values(city, current, forecast))
}

pub fn snapshot_from_values(city: &str, current: Value, forecast: Value) -> WeatherSnapshot {
    if !current.is_object() {
        tracing::warn!(city, "unexpected current weather shape, ignoring it");
    }

    // Some payloads carry `temp`/`feels_like` at the top level instead of under `main`.
    let main_or_top = |field: &str| {
        current
            .get("main")
            .and_then(|m| m.get(field))
            .and_then(Value::as_f64)
            .or_else(|| current.get(field).and_then(Value::as_f64))
    };

    WeatherSnapshot {
        city: city.to_string(),
        temperature_c: main_or_top("temp"),
        feels_like_c: main_or_top("feels_like"),
        humidity_pct: current
            .pointer("/main/humidity")
            .and_then(as_integer)
            .and_then(|h| u8::try_from(h).ok()),
        wind_speed_mps: current.pointer("/wind/speed").and_then(Value::as_f64),
        condition: description(&current).unwrap_or_default(),
        forecast: forecast_samples(city, &forecast),
    }
}

fn forecast_samples(city: &str, forecast: &Value) -> Vec<ForecastSample> {
    let Some(list) = forecast.get("list").and_then(Value::as_array) else {
        tracing::warn!(city, "forecast has no entry list, ignoring it");
        return Vec::new();
    };

    list.iter()
        .filter_map(|entry| {
            if !entry.is_object() {
                tracing::debug!(city, %entry, "skipping malformed forecast entry");
                return None;
            }
            Some(ForecastSample {
                timestamp: entry.get("dt").and_then(as_integer),
                temp_c: entry.pointer("/main/temp").and_then(Value::as_f64),
                condition: description(entry).unwrap_or_default(),
            })
        })
        .collect()
}

fn description(value: &Value) -> Option<String> {
    value
        .pointer("/weather/0/description")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Integer value, also accepting a float with no fractional part (`1700000000.0`).
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
