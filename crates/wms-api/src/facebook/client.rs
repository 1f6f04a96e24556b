use std::{sync::Arc, time::Duration};

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::model::{GraphConversation, GraphErrorEnvelope, GraphList, GraphPage, GraphPost};
use crate::{config::FacebookConfig, error::ApiError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CONVERSATION_FIELDS: &str = "participants,messages{id,message,from,to,created_time}";
const POST_FIELDS: &str = "id,message,created_time,comments{id,message,from,created_time,parent}";
const PAGE_FIELDS: &str = "id,name,category,access_token";

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{message} (type {kind}, code {code})")]
    Api {
        message: String,
        kind: String,
        code: i64,
    },
    #[error("unexpected response ({status}): {body}")]
    Unexpected { status: u16, body: String },
}

impl From<GraphError> for ApiError {
    fn from(err: GraphError) -> Self {
        Self::Graph(err.to_string())
    }
}

/// Facebook Graph API client. Cheap to clone.
#[derive(Clone)]
pub struct GraphClient {
    inner: Arc<GraphClientInner>,
}

struct GraphClientInner {
    client: reqwest::Client,
    base_url: String,
    max_pages: usize,
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.inner.base_url)
            .field("max_pages", &self.inner.max_pages)
            .finish_non_exhaustive()
    }
}

impl GraphClient {
    pub fn new(config: &FacebookConfig) -> Result<Self, GraphError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(GraphClientInner {
                client,
                base_url: format!(
                    "{}/{}",
                    config.graph_url.trim_end_matches('/'),
                    config.api_version
                ),
                max_pages: config.max_pages.max(1),
            }),
        })
    }

    /// Absolute URL of a Graph path, e.g. `me/accounts`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// Pages the user token manages, with their page access tokens.
    pub async fn pages(&self, user_token: &str) -> Result<Vec<GraphPage>, GraphError> {
        self.get_paginated("me/accounts", user_token, PAGE_FIELDS)
            .await
    }

    /// Conversations of a page with every page of their participants and
    /// messages.
    pub async fn conversations(
        &self,
        page_id: &str,
        page_token: &str,
    ) -> Result<Vec<GraphConversation>, GraphError> {
        let mut conversations: Vec<GraphConversation> = self
            .get_paginated(&format!("{page_id}/conversations"), page_token, CONVERSATION_FIELDS)
            .await?;

        for conversation in &mut conversations {
            self.follow(&mut conversation.participants, &conversation.id)
                .await?;
            self.follow(&mut conversation.messages, &conversation.id)
                .await?;
        }

        Ok(conversations)
    }

    /// Posts of a page with every page of their comments.
    pub async fn posts(&self, page_id: &str, page_token: &str) -> Result<Vec<GraphPost>, GraphError> {
        let mut posts: Vec<GraphPost> = self
            .get_paginated(&format!("{page_id}/posts"), page_token, POST_FIELDS)
            .await?;

        for post in &mut posts {
            self.follow(&mut post.comments, &post.id).await?;
        }

        Ok(posts)
    }

    /// Fetch a listing and follow `paging.next` until it runs out or the
    /// configured page limit is reached.
    pub async fn get_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
        fields: &str,
    ) -> Result<Vec<T>, GraphError> {
        let first = self
            .inner
            .client
            .get(self.endpoint(path))
            .query(&[("fields", fields), ("access_token", access_token)]);
        let mut listing: GraphList<T> = self.send(first).await?;
        self.follow(&mut listing, path).await?;

        Ok(listing.data)
    }

    /// Append the pages behind `listing`'s `paging.next` links to its `data`,
    /// counting `listing` itself as the first page. Works for nested edges
    /// such as a conversation's `messages` too.
    pub async fn follow<T: DeserializeOwned>(
        &self,
        listing: &mut GraphList<T>,
        source: &str,
    ) -> Result<(), GraphError> {
        let mut next = listing.next_url().map(str::to_owned);
        listing.paging = None;
        let mut fetched = 1;

        while let Some(url) = next.take() {
            if fetched >= self.inner.max_pages {
                tracing::debug!(source, fetched, "Stopped following Graph pagination at the page limit");
                break;
            }

            let mut page: GraphList<T> = self.send(self.inner.client.get(url)).await?;
            listing.data.append(&mut page.data);
            next = page.next_url().map(str::to_owned);
            fetched += 1;
        }

        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, GraphError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<GraphErrorEnvelope>(&body) {
            Ok(envelope) => Err(GraphError::Api {
                message: envelope.error.message,
                kind: envelope.error.kind.unwrap_or_else(|| "unknown".to_string()),
                code: envelope.error.code.unwrap_or_default(),
            }),
            Err(_) => Err(GraphError::Unexpected {
                status: status.as_u16(),
                body,
            }),
        }
    }
}
