//! Outbound Notion API client.
//!
//! One client is constructed per verification attempt, holding the submitted
//! bearer token; nothing is shared across requests except the underlying
//! `reqwest` connection pool. Every call is attempted exactly once; any
//! non-2xx response or transport failure is terminal for the attempt.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

const API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// Title given to the disposable page created to prove write access.
pub const PROBE_PAGE_TITLE: &str = "🧪 Setup Test - You can delete this";

#[derive(Error, Debug)]
pub enum NotionError {
    #[error("Notion API returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Request to Notion failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Identity of the integration bot, from `GET /users/me`.
#[derive(Clone, Debug, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Database metadata, from `GET /databases/{id}`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DatabaseMeta {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RichText>,
    #[serde(default)]
    pub properties: HashMap<String, PropertySpec>,
}

impl DatabaseMeta {
    /// Display title, or a placeholder when the database has none.
    pub fn title_text(&self) -> String {
        let text: String = self.title.iter().map(|t| t.plain_text.as_str()).collect();
        if text.is_empty() {
            "Your Database".to_string()
        } else {
            text
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

/// One declared property of a database. Only the type tag matters here.
#[derive(Clone, Debug, Deserialize)]
pub struct PropertySpec {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreatedPage {
    pub id: String,
}

/// Seam over the external workspace API, so the verification sequence can be
/// exercised against a scripted double.
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    /// Confirm the bearer token is accepted by the service.
    async fn verify_identity(&self) -> Result<Identity, NotionError>;

    /// Fetch the target database's declared properties and title.
    async fn fetch_database(&self, database_id: &str) -> Result<DatabaseMeta, NotionError>;

    /// Create one disposable page in the database, proving write access.
    async fn create_probe_page(&self, database_id: &str) -> Result<CreatedPage, NotionError>;
}

pub struct NotionClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl NotionClient {
    pub fn new(http: reqwest::Client, token: impl Into<String>) -> Self {
        Self {
            http,
            token: token.into(),
            base_url: API_BASE.to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, NotionError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, NotionError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, NotionError> {
        let status = response.status();
        if !status.is_success() {
            let body = clip_body(response.text().await.unwrap_or_default());
            return Err(NotionError::Api { status, body });
        }
        Ok(response.json().await?)
    }
}

/// Non-success bodies can be whole HTML error pages from intermediaries;
/// keep only the start, since the text ends up in logs and flash messages.
fn clip_body(body: String) -> String {
    const LIMIT: usize = 300;
    if body.chars().count() <= LIMIT {
        return body;
    }
    let clipped: String = body.chars().take(LIMIT).collect();
    format!("{}…", clipped)
}

/// Request body for the probe page: a single title property, labeled so the
/// user knows the entry is a disposable artifact of setup.
fn probe_page_payload(database_id: &str) -> serde_json::Value {
    serde_json::json!({
        "parent": { "database_id": database_id },
        "properties": {
            "Name": {
                "title": [{ "text": { "content": PROBE_PAGE_TITLE } }]
            }
        }
    })
}

#[async_trait]
impl WorkspaceApi for NotionClient {
    async fn verify_identity(&self) -> Result<Identity, NotionError> {
        self.get_json("/users/me").await
    }

    async fn fetch_database(&self, database_id: &str) -> Result<DatabaseMeta, NotionError> {
        self.get_json(&format!("/databases/{}", database_id)).await
    }

    async fn create_probe_page(&self, database_id: &str) -> Result<CreatedPage, NotionError> {
        self.post_json("/pages", &probe_page_payload(database_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_payload_targets_database_and_labels_the_page() {
        let payload = probe_page_payload("db-123");
        assert_eq!(payload["parent"]["database_id"], "db-123");
        assert_eq!(
            payload["properties"]["Name"]["title"][0]["text"]["content"],
            PROBE_PAGE_TITLE
        );
    }

    #[test]
    fn long_error_bodies_are_clipped() {
        let page = "x".repeat(2000);
        let clipped = clip_body(page);
        assert_eq!(clipped.chars().count(), 301);
        assert!(clipped.ends_with('…'));

        assert_eq!(clip_body("unauthorized".to_string()), "unauthorized");
    }

    #[test]
    fn database_title_joins_rich_text_fragments() {
        let db = DatabaseMeta {
            id: "db-1".to_string(),
            title: vec![
                RichText {
                    plain_text: "Task ".to_string(),
                },
                RichText {
                    plain_text: "Tracker".to_string(),
                },
            ],
            properties: HashMap::new(),
        };
        assert_eq!(db.title_text(), "Task Tracker");
    }

    #[test]
    fn untitled_database_gets_a_placeholder() {
        let db = DatabaseMeta {
            id: "db-1".to_string(),
            ..Default::default()
        };
        assert_eq!(db.title_text(), "Your Database");
    }

    #[test]
    fn database_meta_parses_notion_response_shape() {
        let raw = serde_json::json!({
            "object": "database",
            "id": "abc-123",
            "title": [{ "plain_text": "Tasks", "type": "text" }],
            "properties": {
                "Name": { "id": "title", "type": "title", "title": {} },
                "Progress": { "id": "x1", "type": "status", "status": {} }
            }
        });
        let db: DatabaseMeta = serde_json::from_value(raw).unwrap();
        assert_eq!(db.id, "abc-123");
        assert_eq!(db.properties["Progress"].kind, "status");
        assert_eq!(db.title_text(), "Tasks");
    }
}
