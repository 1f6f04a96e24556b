//! Background jobs for periodic maintenance tasks.

use std::time::Duration;

use sqlx::PgPool;
use tokio::{task::JoinHandle, time::interval};
use wms_db::repositories::auth as auth_repo;

use crate::{ApiState, facebook::sync};

const TOKEN_CLEANUP_DELAY: Duration = Duration::from_secs(3600);
const TOKEN_CLEANUP_PERIOD: Duration = Duration::from_secs(6 * 3600);
const FACEBOOK_SYNC_DELAY: Duration = Duration::from_secs(60);

/// Start all background jobs
///
/// Returns the join handles so they can be aborted on shutdown
pub fn start_background_jobs(state: &ApiState) -> Vec<JoinHandle<()>> {
    let mut handles = vec![tokio::spawn(periodic_token_cleanup_job(state.pool.clone()))];

    match (
        state.facebook.sync_interval_minutes,
        state.facebook.user_access_token.is_some(),
    ) {
        (Some(minutes), true) if minutes > 0 => {
            handles.push(tokio::spawn(periodic_facebook_sync_job(
                state.clone(),
                Duration::from_secs(minutes * 60),
            )));
        }
        (Some(_), false) => {
            tracing::warn!("FACEBOOK_SYNC_INTERVAL_MINUTES is set without FACEBOOK_USER_ACCESS_TOKEN; sync job disabled");
        }
        _ => {}
    }

    handles
}

/// Delete expired refresh tokens every 6 hours
async fn periodic_token_cleanup_job(pool: PgPool) {
    // Wait before the first run to avoid startup contention
    tokio::time::sleep(TOKEN_CLEANUP_DELAY).await;

    let mut interval = interval(TOKEN_CLEANUP_PERIOD);

    loop {
        interval.tick().await;

        match auth_repo::cleanup_expired_refresh_tokens(&pool).await {
            Ok(deleted) if deleted > 0 => {
                tracing::info!(deleted, "Expired refresh tokens cleaned up");
            }
            Ok(_) => {
                tracing::debug!("Token cleanup complete: no expired tokens found");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to run periodic token cleanup");
            }
        }
    }
}

/// Run the full Facebook sync on a fixed interval
async fn periodic_facebook_sync_job(state: ApiState, period: Duration) {
    tokio::time::sleep(FACEBOOK_SYNC_DELAY).await;

    let mut interval = interval(period);

    loop {
        interval.tick().await;

        let Some(token) = state.facebook.user_access_token.as_deref() else {
            return;
        };

        match sync::sync_all(&state.pool, &state.graph, token).await {
            Ok(summary) => {
                tracing::info!(
                    pages = summary.pages,
                    failed = summary.failed_pages,
                    messages = summary.counts.messages,
                    comments = summary.counts.comments,
                    "Scheduled Facebook sync complete"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Scheduled Facebook sync failed");
            }
        }
    }
}
