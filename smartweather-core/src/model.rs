use serde::{Deserialize, Serialize};

/// A single 3-hour forecast entry as received from the provider.
///
/// Either field may be missing when the source entry was incomplete; such
/// samples are skipped by the daily aggregator but still take part in the
/// rain scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Unix epoch seconds.
    pub timestamp: Option<i64>,
    pub temp_c: Option<f64>,
    #[serde(default)]
    pub condition: String,
}

impl ForecastSample {
    pub fn new(timestamp: i64, temp_c: f64, condition: impl Into<String>) -> Self {
        Self {
            timestamp: Some(timestamp),
            temp_c: Some(temp_c),
            condition: condition.into(),
        }
    }
}

/// Current conditions plus the forecast samples for one city at one fetch time.
///
/// Every measurement is optional: a snapshot with nothing in it is still valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub temperature_c: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub humidity_pct: Option<u8>,
    pub wind_speed_mps: Option<f64>,
    #[serde(default)]
    pub condition: String,
    /// Chronological as received.
    #[serde(default)]
    pub forecast: Vec<ForecastSample>,
}

impl WeatherSnapshot {
    pub fn empty(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            ..Self::default()
        }
    }

    pub fn has_forecast(&self) -> bool {
        !self.forecast.is_empty()
    }

    /// Built-in offline snapshot used by the `sample` command.
    pub fn sample() -> Self {
        Self {
            city: "SampleCity".to_string(),
            temperature_c: Some(30.2),
            feels_like_c: Some(31.1),
            humidity_pct: Some(65),
            wind_speed_mps: Some(2.3),
            condition: "clear sky".to_string(),
            forecast: vec![
                ForecastSample::new(1_700_000_000, 31.0, ""),
                ForecastSample::new(1_700_038_800, 29.5, ""),
                ForecastSample::new(1_700_125_200, 28.0, ""),
            ],
        }
    }
}
