//! Points and level recalculation.
//!
//! A user's cached `points` and `level` are derived data: the sum of their
//! approved activity logs, mapped onto the level bracket table. Any change
//! that could alter the approved total (a new log, a review decision, a
//! points edit) should be followed by [`PointsRecalculator::recalculate`].
//! Recalculation is idempotent, so concurrent calls for the same user
//! converge on the same result.

use std::sync::Arc;

use encore_core::activity::approved_total;
use encore_core::error::CoreError;
use encore_core::levels::{bracket_issues, select_level, Level};
use encore_core::types::{LevelId, UserId};
use encore_db::models::user::{PointsUpdate, User};
use encore_db::repositories::{ActivityLogRepo, LevelRepo, UserRepo};
use encore_db::{DataStore, StoreError};
use encore_events::bus::EVENT_LEVEL_ADVANCED;
use encore_events::{EventBus, StudioEvent};
use serde::Serialize;
use serde_json::json;

/// Result of a recalculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointsSummary {
    pub total_points: i64,
    pub level: Level,
    /// Level cached on the user before this call.
    pub previous_level: Option<LevelId>,
    /// True when no bracket contained the total and the last one was used.
    pub fallback: bool,
}

impl PointsSummary {
    pub fn level_changed(&self) -> bool {
        self.previous_level != Some(self.level.id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecalcError {
    /// Reading the user, logs or levels failed. Nothing was written.
    #[error("Recalculation failed for user {user_id}: {source}")]
    Fetch {
        user_id: UserId,
        #[source]
        source: StoreError,
    },

    /// The level table is empty.
    #[error(transparent)]
    Configuration(#[from] CoreError),

    /// The totals were computed but could not be saved.
    #[error("Computed {} points for user {user_id} but saving failed: {source}", .summary.total_points)]
    Persist {
        user_id: UserId,
        summary: Box<PointsSummary>,
        #[source]
        source: StoreError,
    },
}

/// Recomputes and stores a user's points total and level.
pub struct PointsRecalculator {
    store: Arc<dyn DataStore>,
    events: Option<Arc<EventBus>>,
}

impl PointsRecalculator {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self {
            store,
            events: None,
        }
    }

    /// Publish `level.advanced` events on `bus` when a user changes level.
    pub fn with_events(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Recompute `user_id`'s total from approved logs, pick the level, and
    /// write both to the user row.
    ///
    /// An unknown user id totals zero logs. On [`RecalcError::Persist`] the
    /// computed summary is still available to the caller.
    pub async fn recalculate(&self, user_id: &str) -> Result<PointsSummary, RecalcError> {
        let store = self.store.as_ref();
        let fetch_failed = |source: StoreError| {
            tracing::error!(user_id, error = %source, "Points recalculation fetch failed");
            RecalcError::Fetch {
                user_id: user_id.to_string(),
                source,
            }
        };

        let user = UserRepo::find_by_id(store, user_id)
            .await
            .map_err(fetch_failed)?;
        let logs = ActivityLogRepo::list_approved_for_user(store, user_id)
            .await
            .map_err(fetch_failed)?;
        let total_points = approved_total(logs.iter().map(|log| (log.status, log.points)));

        let levels = LevelRepo::list_ordered(store)
            .await
            .map_err(fetch_failed)?;
        for issue in bracket_issues(&levels) {
            tracing::warn!(?issue, "Level brackets are misconfigured");
        }
        let selection = select_level(&levels, total_points)?;
        if selection.is_fallback() {
            tracing::warn!(
                user_id,
                total_points,
                level_id = selection.level().id,
                "No level bracket contains the total, using the last level"
            );
        }

        let summary = PointsSummary {
            total_points,
            level: selection.level().clone(),
            previous_level: user.as_ref().and_then(|u| u.level),
            fallback: selection.is_fallback(),
        };

        let update = PointsUpdate {
            points: total_points,
            level: summary.level.id,
        };
        if let Err(source) = UserRepo::set_points(store, user_id, update).await {
            tracing::error!(user_id, error = %source, "Failed to save recalculated points");
            return Err(RecalcError::Persist {
                user_id: user_id.to_string(),
                summary: Box::new(summary),
                source,
            });
        }

        tracing::info!(
            user_id,
            total_points,
            level_id = summary.level.id,
            approved_logs = logs.len(),
            "Recalculated points"
        );

        if let Some(user) = user.as_ref().filter(|_| summary.level_changed()) {
            self.publish_level_change(user, &summary);
        }

        Ok(summary)
    }

    fn publish_level_change(&self, user: &User, summary: &PointsSummary) {
        let Some(bus) = &self.events else {
            return;
        };
        let name = match user.full_name() {
            name if name.is_empty() => "User".to_string(),
            name => name,
        };
        let level_name = summary.level.display_name();
        bus.publish(
            StudioEvent::new(EVENT_LEVEL_ADVANCED)
                .for_user(user.id.clone())
                .with_payload(json!({
                    "level_id": summary.level.id,
                    "level_name": level_name,
                    "previous_level": summary.previous_level,
                    "total_points": summary.total_points,
                    "message": format!("{name} advanced to {level_name}!"),
                })),
        );
    }
}
