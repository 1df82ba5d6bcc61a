// ABOUTME: PersonSearchTool - looks up a person by name and optional company
// ABOUTME: through SerpAPI, with a structured demo fallback when keyless.

use async_trait::async_trait;
use serde::Deserialize;

use crate::tool::{Tool, ToolResult};

const SEARCH_URL: &str = "https://serpapi.com/search.json";

/// Tool for searching public information about a person.
pub struct PersonSearchTool {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl PersonSearchTool {
    /// Create a new PersonSearchTool. Without an API key every call
    /// resolves to the demo fallback payload, with no network I/O.
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: SEARCH_URL.to_string(),
            api_key,
        }
    }

    /// Create with a custom reqwest client.
    pub fn with_client(client: reqwest::Client, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: SEARCH_URL.to_string(),
            api_key,
        }
    }

    /// Point at a different search endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn fallback(name: &str, company: Option<&str>, query: &str) -> ToolResult {
        ToolResult::text(
            serde_json::json!({
                "message": "Could not retrieve detailed information. This is a demo response.",
                "searchQuery": match company {
                    Some(company) => format!("{} at {}", name, company),
                    None => name.to_string(),
                },
                "possibleInfo": {
                    "name": name,
                    "company": company.unwrap_or("Unknown"),
                    "note": format!("Simulated data for query '{}'. Configure a search API key for real results.", query),
                },
            })
            .to_string(),
        )
    }
}

#[async_trait]
impl Tool for PersonSearchTool {
    fn name(&self) -> &str {
        "find_person_info"
    }

    fn description(&self) -> &str {
        "Search for information about a person given their name and company"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Full name of the person to search for"
                },
                "company": {
                    "type": "string",
                    "description": "Company name the person is associated with"
                }
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        #[derive(Deserialize)]
        struct Params {
            name: String,
            company: Option<String>,
        }

        let params: Params = serde_json::from_value(params)?;

        let query = match &params.company {
            Some(company) => format!(
                "{} {}",
                urlencoding::encode(&params.name),
                urlencoding::encode(company)
            ),
            None => urlencoding::encode(&params.name).to_string(),
        };

        let Some(api_key) = &self.api_key else {
            return Ok(Self::fallback(
                &params.name,
                params.company.as_deref(),
                &query,
            ));
        };

        let url = format!("{}?q={}&api_key={}", self.base_url, query, api_key);
        let response = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                return Ok(ToolResult::error(
                    serde_json::json!({
                        "error": "Error searching for person information",
                        "message": e.to_string(),
                        "searchQuery": query,
                    })
                    .to_string(),
                ));
            }
        };

        if !response.status().is_success() {
            return Ok(Self::fallback(
                &params.name,
                params.company.as_deref(),
                &query,
            ));
        }

        let data: serde_json::Value = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                return Ok(ToolResult::error(
                    serde_json::json!({
                        "error": "Error searching for person information",
                        "message": e.to_string(),
                        "searchQuery": query,
                    })
                    .to_string(),
                ));
            }
        };

        let results = data["organic_results"]
            .as_array()
            .map(|all| all.iter().take(3).cloned().collect::<Vec<_>>())
            .unwrap_or_default();

        Ok(ToolResult::text(
            serde_json::json!({
                "searchResults": results,
                "knowledgeGraph": data.get("knowledge_graph").cloned().unwrap_or(serde_json::Value::Null),
                "searchQuery": query,
            })
            .to_string(),
        ))
    }
}
