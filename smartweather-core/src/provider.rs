use crate::{Config, WeatherSnapshot, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of fresh weather data for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch(&self, city: &str) -> anyhow::Result<WeatherSnapshot>;
}

pub fn missing_key_message() -> String {
    format!(
        "No OpenWeather API key configured.\n\
             Hint: run `smartweather configure` or set {}.",
        crate::config::API_KEY_ENV
    )
}

/// Construct the OpenWeather provider from config (or `OPENWEATHER_API_KEY`).
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config
        .api_key()
        .ok_or_else(|| anyhow::anyhow!(missing_key_message()))?;

    Ok(Box::new(OpenWeatherProvider::new(api_key)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_message_has_hint() {
        let msg = missing_key_message();
        assert!(msg.contains("No OpenWeather API key configured"));
        assert!(msg.contains("Hint: run `smartweather configure`"));
        assert!(msg.contains("OPENWEATHER_API_KEY"));
    }

    #[test]
    fn provider_from_config_works_when_key_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let provider = provider_from_config(&cfg);
        assert!(provider.is_ok());
    }
}
