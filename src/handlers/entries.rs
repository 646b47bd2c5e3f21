use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::journal::streak::compute_streak;
use crate::models::entry::{CreateEntryRequest, EntryQuery, JournalEntry};
use crate::models::stats::{StatsResponse, UserStats};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CreateEntryResponse {
    pub entry: JournalEntry,
    pub stats: UserStats,
}

/// Save a journal entry. The entry insert and the stats upsert run in one
/// transaction: either both are visible or neither is, and the counter
/// increment happens in SQL so concurrent saves cannot lose an update.
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateEntryRequest>,
) -> AppResult<Json<CreateEntryResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if body.text.trim().is_empty() {
        return Err(AppError::Validation("Journal text must not be empty".into()));
    }
    if let Some(mood) = &body.mood {
        mood.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
    }

    let now = Utc::now();
    let (mood, mood_intensity, mood_context) = match &body.mood {
        Some(m) => (
            Some(m.mood.clone()),
            Some(m.intensity),
            m.context.clone(),
        ),
        None => (None, None, None),
    };

    let mut tx = state.db.begin().await?;

    let entry = sqlx::query_as::<_, JournalEntry>(
        r#"
        INSERT INTO journal_entries (id, user_id, text, mood, mood_intensity, mood_context, emotions, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.text)
    .bind(&mood)
    .bind(mood_intensity)
    .bind(&mood_context)
    .bind(sqlx::types::Json(&body.emotions))
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let stats = sqlx::query_as::<_, UserStats>(
        r#"
        INSERT INTO user_stats (user_id, total_entries, join_date, last_entry_date)
        VALUES ($1, 1, $2, $2)
        ON CONFLICT (user_id) DO UPDATE SET
            total_entries = user_stats.total_entries + 1,
            last_entry_date = $2
        RETURNING *
        "#,
    )
    .bind(auth_user.id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(user_id = %auth_user.id, entry_id = %entry.id, "Journal entry saved");

    Ok(Json(CreateEntryResponse { entry, stats }))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<EntryQuery>,
) -> AppResult<Json<Vec<JournalEntry>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let entries = sqlx::query_as::<_, JournalEntry>(
        r#"
        SELECT * FROM journal_entries
        WHERE user_id = $1 AND created_at::date BETWEEN $2 AND $3
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<StatsResponse>> {
    let stats = sqlx::query_as::<_, UserStats>(
        "SELECT * FROM user_stats WHERE user_id = $1",
    )
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?;

    // Streak is derived, not persisted: distinct entry dates, newest first.
    let dates = sqlx::query_scalar::<_, NaiveDate>(
        r#"
        SELECT DISTINCT created_at::date AS entry_date FROM journal_entries
        WHERE user_id = $1
        ORDER BY entry_date DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    let today = Utc::now().date_naive();
    let streak = compute_streak(&dates, today);

    Ok(Json(StatsResponse {
        total_entries: stats.as_ref().map(|s| s.total_entries).unwrap_or(0),
        join_date: stats.as_ref().map(|s| s.join_date),
        last_entry_date: stats.as_ref().map(|s| s.last_entry_date),
        streak,
        monthly_goal_progress: (f64::from(streak) / 30.0).min(1.0),
    }))
}
