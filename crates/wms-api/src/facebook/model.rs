//! Graph API response shapes.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A Graph listing: one page of `data` plus the cursor links.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    pub paging: Option<Paging>,
}

impl<T> Default for GraphList<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            paging: None,
        }
    }
}

impl<T> GraphList<T> {
    pub fn next_url(&self) -> Option<&str> {
        self.paging.as_ref().and_then(|p| p.next.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paging {
    pub next: Option<String>,
}

/// Entry of `/me/accounts`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphPage {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphUser {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphConversation {
    pub id: String,
    #[serde(default)]
    pub participants: GraphList<GraphUser>,
    #[serde(default)]
    pub messages: GraphList<GraphMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphMessage {
    pub id: String,
    pub message: Option<String>,
    pub from: Option<GraphUser>,
    pub created_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphPost {
    pub id: String,
    pub message: Option<String>,
    pub created_time: Option<String>,
    #[serde(default)]
    pub comments: GraphList<GraphComment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphComment {
    pub id: String,
    pub message: Option<String>,
    pub from: Option<GraphUser>,
    pub created_time: String,
    pub parent: Option<GraphRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphRef {
    pub id: String,
}

/// `{"error": {...}}` body returned with a failed Graph call.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorEnvelope {
    pub error: GraphErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorBody {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub code: Option<i64>,
}

/// Parse a Graph timestamp such as `2024-01-05T09:30:00+0000`.
pub fn parse_graph_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
