//! Pull pages, conversations and comments from the Graph API into the local
//! tables. Every upsert is keyed on the Facebook id, so a sync can be re-run
//! at any time.

use serde::Serialize;
use serde_json::json;
use sqlx::{PgConnection, PgPool};

use wms_db::{models::FacebookPage, repositories::facebook as facebook_repo};

use super::{
    client::GraphClient,
    model::{GraphConversation, GraphPost, GraphUser, parse_graph_time},
};
use crate::{error::ApiError, metrics};

const ACTION_SYNC_PAGES: &str = "sync_pages";
const ACTION_SYNC_PAGE: &str = "sync_page";

/// New rows stored while syncing one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageSyncCounts {
    pub users: u32,
    pub messages: u32,
    pub comments: u32,
}

impl PageSyncCounts {
    fn add(&mut self, other: Self) {
        self.users += other.users;
        self.messages += other.messages;
        self.comments += other.comments;
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    pub pages: usize,
    pub synced_pages: usize,
    pub failed_pages: usize,
    #[serde(flatten)]
    pub counts: PageSyncCounts,
}

/// Refresh the list of managed pages, then sync each of them. A failing page
/// is recorded in the activity log and the remaining pages still run.
pub async fn sync_all(
    pool: &PgPool,
    graph: &GraphClient,
    user_token: &str,
) -> Result<SyncSummary, ApiError> {
    let pages = match sync_pages(pool, graph, user_token).await {
        Ok(pages) => pages,
        Err(err) => {
            log_outcome(pool, None, ACTION_SYNC_PAGES, Err(&err), &json!({})).await;
            metrics::record_facebook_sync(false);
            return Err(err);
        }
    };

    let mut summary = SyncSummary {
        pages: pages.len(),
        ..SyncSummary::default()
    };

    for page in &pages {
        match sync_page(pool, graph, page).await {
            Ok(counts) => {
                summary.synced_pages += 1;
                summary.counts.add(counts);
            }
            Err(err) => {
                summary.failed_pages += 1;
                tracing::warn!(page_id = %page.page_id, error = %err, "Facebook page sync failed");
            }
        }
    }

    log_outcome(
        pool,
        None,
        ACTION_SYNC_PAGES,
        Ok(()),
        &serde_json::to_value(&summary).unwrap_or_default(),
    )
    .await;

    Ok(summary)
}

/// Upsert the pages the user token manages.
pub async fn sync_pages(
    pool: &PgPool,
    graph: &GraphClient,
    user_token: &str,
) -> Result<Vec<FacebookPage>, ApiError> {
    let remote = graph.pages(user_token).await?;

    let mut pages = Vec::with_capacity(remote.len());
    for page in &remote {
        let stored = facebook_repo::upsert_page(
            pool,
            &page.id,
            &page.name,
            page.category.as_deref(),
            page.access_token.as_deref(),
        )
        .await?;
        pages.push(stored);
    }

    tracing::info!(count = pages.len(), "Facebook pages refreshed");

    Ok(pages)
}

/// Sync the conversations and post comments of one stored page.
pub async fn sync_page(
    pool: &PgPool,
    graph: &GraphClient,
    page: &FacebookPage,
) -> Result<PageSyncCounts, ApiError> {
    let result = fetch_and_store(pool, graph, page).await;

    let details = match &result {
        Ok(counts) => serde_json::to_value(counts).unwrap_or_default(),
        Err(_) => json!({ "page_id": page.page_id }),
    };
    log_outcome(
        pool,
        Some(page),
        ACTION_SYNC_PAGE,
        result.as_ref().map(|_| ()),
        &details,
    )
    .await;
    metrics::record_facebook_sync(result.is_ok());

    result
}

async fn fetch_and_store(
    pool: &PgPool,
    graph: &GraphClient,
    page: &FacebookPage,
) -> Result<PageSyncCounts, ApiError> {
    let token = page.access_token.as_deref().ok_or_else(|| {
        ApiError::BadRequest(format!("Page {} has no access token", page.page_id))
    })?;

    let conversations = graph.conversations(&page.page_id, token).await?;
    let posts = graph.posts(&page.page_id, token).await?;

    let mut tx = pool.begin().await?;
    let mut counts = PageSyncCounts::default();

    for conversation in &conversations {
        counts.add(store_conversation(&mut tx, page, conversation).await?);
    }
    for post in &posts {
        counts.add(store_post(&mut tx, page, post).await?);
    }
    facebook_repo::mark_page_synced(&mut *tx, page.id).await?;

    tx.commit().await?;

    tracing::info!(
        page_id = %page.page_id,
        users = counts.users,
        messages = counts.messages,
        comments = counts.comments,
        "Facebook page synced"
    );

    Ok(counts)
}

async fn store_user(
    conn: &mut PgConnection,
    page: &FacebookPage,
    user: &GraphUser,
) -> Result<u32, ApiError> {
    // The page shows up as a participant of its own conversations
    if user.id == page.page_id {
        return Ok(0);
    }

    let inserted = facebook_repo::upsert_user(
        &mut *conn,
        &user.id,
        user.name.as_deref(),
        user.email.as_deref(),
    )
    .await?;

    Ok(u32::from(inserted))
}

async fn store_conversation(
    conn: &mut PgConnection,
    page: &FacebookPage,
    conversation: &GraphConversation,
) -> Result<PageSyncCounts, ApiError> {
    let mut counts = PageSyncCounts::default();

    for participant in &conversation.participants.data {
        counts.users += store_user(conn, page, participant).await?;
    }

    for message in &conversation.messages.data {
        let Some(created_time) = parse_graph_time(&message.created_time) else {
            tracing::warn!(message_id = %message.id, "Skipping message with unreadable timestamp");
            continue;
        };
        if let Some(sender) = &message.from {
            counts.users += store_user(conn, page, sender).await?;
        }

        let inserted = facebook_repo::upsert_message(
            &mut *conn,
            &message.id,
            page.id,
            &conversation.id,
            message.from.as_ref().map(|u| u.id.as_str()),
            message.from.as_ref().and_then(|u| u.name.as_deref()),
            message.message.as_deref(),
            created_time,
        )
        .await?;
        counts.messages += u32::from(inserted);
    }

    Ok(counts)
}

async fn store_post(
    conn: &mut PgConnection,
    page: &FacebookPage,
    post: &GraphPost,
) -> Result<PageSyncCounts, ApiError> {
    let mut counts = PageSyncCounts::default();

    for comment in &post.comments.data {
        let Some(created_time) = parse_graph_time(&comment.created_time) else {
            tracing::warn!(comment_id = %comment.id, "Skipping comment with unreadable timestamp");
            continue;
        };
        if let Some(author) = &comment.from {
            counts.users += store_user(conn, page, author).await?;
        }

        let inserted = facebook_repo::upsert_comment(
            &mut *conn,
            &comment.id,
            page.id,
            &post.id,
            comment.parent.as_ref().map(|p| p.id.as_str()),
            comment.from.as_ref().map(|u| u.id.as_str()),
            comment.from.as_ref().and_then(|u| u.name.as_deref()),
            comment.message.as_deref(),
            created_time,
        )
        .await?;
        counts.comments += u32::from(inserted);
    }

    Ok(counts)
}

/// Write a `facebook_activity_logs` row. Failures to log are only traced.
async fn log_outcome(
    pool: &PgPool,
    page: Option<&FacebookPage>,
    action: &str,
    outcome: Result<(), &ApiError>,
    details: &serde_json::Value,
) {
    let (status, message) = match outcome {
        Ok(()) => ("success", None),
        Err(err) => ("error", Some(err.to_string())),
    };

    if let Err(e) = facebook_repo::log_activity(
        pool,
        page.map(|p| p.id),
        action,
        status,
        message.as_deref(),
        details,
    )
    .await
    {
        tracing::error!(error = %e, action, "Failed to write Facebook activity log");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let mut total = PageSyncCounts::default();
        total.add(PageSyncCounts {
            users: 1,
            messages: 2,
            comments: 0,
        });
        total.add(PageSyncCounts {
            users: 0,
            messages: 1,
            comments: 4,
        });

        assert_eq!(
            total,
            PageSyncCounts {
                users: 1,
                messages: 3,
                comments: 4
            }
        );
    }

    #[test]
    fn test_summary_serializes_flat() {
        let summary = SyncSummary {
            pages: 2,
            synced_pages: 1,
            failed_pages: 1,
            counts: PageSyncCounts {
                users: 3,
                messages: 5,
                comments: 0,
            },
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["failed_pages"], 1);
        assert_eq!(value["messages"], 5);
    }
}
