use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-user aggregate, one row per user. `total_entries` only ever grows and
/// is maintained with an atomic upsert so concurrent saves cannot lose an
/// increment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserStats {
    pub user_id: Uuid,
    pub total_entries: i64,
    pub join_date: DateTime<Utc>,
    pub last_entry_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_entries: i64,
    pub join_date: Option<DateTime<Utc>>,
    pub last_entry_date: Option<DateTime<Utc>>,
    /// Recomputed from entry dates on every request, never persisted.
    pub streak: u32,
    /// Progress toward the 30-day journaling goal, 0.0..=1.0.
    pub monthly_goal_progress: f64,
}
