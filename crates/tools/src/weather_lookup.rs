//! Weather lookup tool — deterministic local weather data.
//!
//! In production this would call a real weather API (OpenWeatherMap, etc.).
//! The local generator returns plausible weather keyed on the city name so
//! the reasoning loop can be exercised end-to-end without network access.

use async_trait::async_trait;
use memoclaw_core::error::ToolError;
use memoclaw_core::tool::Tool;

pub struct WeatherLookupTool;

#[async_trait]
impl Tool for WeatherLookupTool {
    fn name(&self) -> &str {
        "weather_lookup"
    }

    fn usage(&self) -> &str {
        "Get the current weather for a specific city. Input: the city name, e.g. 'London'."
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let city = input.trim();
        if city.is_empty() {
            return Err(ToolError::InvalidInput(
                "a city name is required, e.g. 'London'".into(),
            ));
        }

        Ok(describe_weather(city))
    }
}

/// Generate deterministic weather based on the city name hash.
fn describe_weather(city: &str) -> String {
    let hash: u32 = city
        .to_lowercase()
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));

    let conditions = [
        "clear",
        "partly cloudy",
        "overcast",
        "light rain",
        "heavy rain",
        "thunderstorms",
        "snow",
        "foggy",
    ];

    let temp_c = ((hash % 40) as i32) - 5; // -5 to 34°C
    let humidity = 30 + (hash % 60);
    let wind_kmh = 5 + (hash % 30);
    let condition = conditions[(hash as usize / 7) % conditions.len()];

    format!(
        "Current weather in {city}: {temp_c}°C, {condition}, humidity {humidity}%, wind {wind_kmh} km/h."
    )
}
