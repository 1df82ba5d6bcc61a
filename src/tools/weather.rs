// ABOUTME: WeatherTool - current weather for coordinates via open-meteo.
// ABOUTME: No credential required; provider failures are encoded, not thrown.

use async_trait::async_trait;
use serde::Deserialize;

use crate::tool::{Tool, ToolResult};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Tool for fetching the current temperature at a coordinate pair.
pub struct WeatherTool {
    client: reqwest::Client,
    base_url: String,
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherTool {
    /// Create a new WeatherTool.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: FORECAST_URL.to_string(),
        }
    }

    /// Create with a custom reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: FORECAST_URL.to_string(),
        }
    }

    /// Point at a different forecast endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather_from_coords"
    }

    fn description(&self) -> &str {
        "Get the current weather"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "latitude": { "type": "number" },
                "longitude": { "type": "number" }
            },
            "required": ["latitude", "longitude"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        #[derive(Deserialize)]
        struct Params {
            latitude: f64,
            longitude: f64,
        }

        let params: Params = serde_json::from_value(params)?;

        let url = format!(
            "{}?latitude={}&longitude={}&current=temperature_2m,wind_speed_10m&hourly=temperature_2m,relative_humidity_2m,wind_speed_10m",
            self.base_url, params.latitude, params.longitude
        );

        let response = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                return Ok(ToolResult::error_json(
                    "provider unavailable",
                    format!("weather lookup failed: {}", e),
                ));
            }
        };

        if !response.status().is_success() {
            return Ok(ToolResult::error_json(
                "provider error",
                format!("weather provider returned {}", response.status()),
            ));
        }

        let data: serde_json::Value = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                return Ok(ToolResult::error_json(
                    "provider error",
                    format!("failed to read weather response: {}", e),
                ));
            }
        };

        let temp = data["current"]["temperature_2m"].clone();
        Ok(ToolResult::text(
            serde_json::json!({ "temp": temp }).to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_both_coordinates() {
        let tool = WeatherTool::new();
        let schema = tool.schema();
        let required: Vec<_> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(required, vec!["latitude", "longitude"]);
    }

    #[tokio::test]
    async fn test_unreachable_provider_encodes_error() {
        let tool = WeatherTool::new().with_base_url("http://127.0.0.1:1/forecast");
        let result = tool
            .execute(serde_json::json!({ "latitude": 10, "longitude": 20 }))
            .await
            .unwrap();

        assert!(result.is_error);
        let value: serde_json::Value = serde_json::from_str(&result.content).unwrap();
        assert_eq!(value["error"], "provider unavailable");
    }
}
