// ABOUTME: Calendar tools - read and create events on the primary Google
// ABOUTME: calendar, authorized through the shared credential broker.

use async_trait::async_trait;
use serde::Deserialize;

use crate::credential::CredentialBroker;
use crate::tool::{Tool, ToolResult};

const CALENDAR_URL: &str = "https://www.googleapis.com/calendar/v3";

fn not_authenticated() -> ToolResult {
    ToolResult::error_json(
        "not authenticated",
        "no Google credential is active; authorize calendar access first",
    )
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("Failed to create HTTP client")
}

/// Tool for listing events on the primary calendar in a date range.
pub struct GetCalendarEventsTool {
    client: reqwest::Client,
    base_url: String,
    broker: CredentialBroker,
}

impl GetCalendarEventsTool {
    /// Create a calendar read tool bound to a credential broker handle.
    pub fn new(broker: CredentialBroker) -> Self {
        Self {
            client: http_client(),
            base_url: CALENDAR_URL.to_string(),
            broker,
        }
    }

    /// Point at a different calendar endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Tool for GetCalendarEventsTool {
    fn name(&self) -> &str {
        "get_calendar_events"
    }

    fn description(&self) -> &str {
        "Retrieves events from the primary calendar for a specified date range"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "start_time": {
                    "type": "string",
                    "description": "Start date/time in ISO 8601 format (e.g., 2024-07-30T09:00:00Z)"
                },
                "end_time": {
                    "type": "string",
                    "description": "End date/time in ISO 8601 format (e.g., 2024-07-30T17:00:00Z)"
                }
            },
            "required": ["start_time", "end_time"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        #[derive(Deserialize)]
        struct Params {
            start_time: String,
            end_time: String,
        }

        let params: Params = serde_json::from_value(params)?;

        // Hard precondition: no credential, no network call.
        let token = match self.broker.require().await {
            Ok(token) => token,
            Err(_) => return Ok(not_authenticated()),
        };

        let url = format!("{}/calendars/primary/events", self.base_url);
        let response = match self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("timeMin", params.start_time.as_str()),
                ("timeMax", params.end_time.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                return Ok(ToolResult::error_json(
                    "provider unavailable",
                    format!("calendar lookup failed: {}", e),
                ));
            }
        };

        if !response.status().is_success() {
            return Ok(ToolResult::error_json(
                "provider error",
                format!("calendar provider returned {}", response.status()),
            ));
        }

        let data: serde_json::Value = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                return Ok(ToolResult::error_json(
                    "provider error",
                    format!("failed to read calendar response: {}", e),
                ));
            }
        };

        let events: Vec<serde_json::Value> = data["items"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|event| {
                        serde_json::json!({
                            "summary": event["summary"],
                            "start": event["start"]["dateTime"],
                            "end": event["end"]["dateTime"],
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        if events.is_empty() {
            return Ok(ToolResult::text(
                serde_json::json!({ "message": "No events in the requested range." }).to_string(),
            ));
        }

        Ok(ToolResult::text(serde_json::to_string(&events)?))
    }
}

/// Tool for creating an event on the primary calendar.
pub struct CreateCalendarEventTool {
    client: reqwest::Client,
    base_url: String,
    broker: CredentialBroker,
}

impl CreateCalendarEventTool {
    /// Create a calendar write tool bound to a credential broker handle.
    pub fn new(broker: CredentialBroker) -> Self {
        Self {
            client: http_client(),
            base_url: CALENDAR_URL.to_string(),
            broker,
        }
    }

    /// Point at a different calendar endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Tool for CreateCalendarEventTool {
    fn name(&self) -> &str {
        "create_calendar_event"
    }

    fn description(&self) -> &str {
        "Creates a new event in the primary calendar"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "The title of the event"
                },
                "start_time": {
                    "type": "string",
                    "description": "Start date/time in ISO 8601 format (e.g., 2024-07-30T09:00:00Z)"
                },
                "end_time": {
                    "type": "string",
                    "description": "End date/time in ISO 8601 format (e.g., 2024-07-30T10:00:00Z)"
                },
                "attendees": {
                    "type": "array",
                    "description": "A list of attendees' email addresses",
                    "items": { "type": "string" }
                }
            },
            "required": ["title", "start_time", "end_time"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        #[derive(Deserialize)]
        struct Params {
            title: String,
            start_time: String,
            end_time: String,
            #[serde(default)]
            attendees: Vec<String>,
        }

        let params: Params = serde_json::from_value(params)?;

        // Hard precondition: no credential, no network call. The write is
        // not retried here; the executor invokes this handler at most once.
        let token = match self.broker.require().await {
            Ok(token) => token,
            Err(_) => return Ok(not_authenticated()),
        };

        let body = serde_json::json!({
            "summary": params.title,
            "start": { "dateTime": params.start_time },
            "end": { "dateTime": params.end_time },
            "attendees": params.attendees.iter()
                .map(|email| serde_json::json!({ "email": email }))
                .collect::<Vec<_>>(),
        });

        let url = format!("{}/calendars/primary/events", self.base_url);
        let response = match self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                return Ok(ToolResult::error_json(
                    "provider unavailable",
                    format!("calendar write failed: {}", e),
                ));
            }
        };

        if !response.status().is_success() {
            return Ok(ToolResult::error_json(
                "provider error",
                format!("calendar provider returned {}", response.status()),
            ));
        }

        let created: serde_json::Value = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                return Ok(ToolResult::error_json(
                    "provider error",
                    format!("failed to read calendar response: {}", e),
                ));
            }
        };

        Ok(ToolResult::text(
            serde_json::json!({
                "status": "success",
                "eventId": created["id"],
                "message": format!("Created '{}'.", params.title),
            })
            .to_string(),
        ))
    }
}
