//! 기분 기록 핸들러

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use mindnest_core::policy::{Operation, Table};
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::models::MoodLog;
use crate::state::AppState;
use crate::{access, auth};

#[derive(Debug, Deserialize)]
pub struct ListMoodsQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMoodRequest {
    pub mood_level: i32,
    pub note: Option<String>,
}

/// 내 기분 기록 목록 (기간 필터 지원)
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListMoodsQuery>,
) -> Result<Json<Vec<MoodLog>>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::MoodLogs, Operation::Select)?;
    let uid = access::owner_id(scope, &identity)?;

    let logs: Vec<MoodLog> = sqlx::query_as(
        "SELECT * FROM mood_logs \
         WHERE user_id = $1 \
           AND ($2::timestamptz IS NULL OR logged_at >= $2) \
           AND ($3::timestamptz IS NULL OR logged_at <= $3) \
         ORDER BY logged_at DESC",
    )
    .bind(uid)
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(logs))
}

/// 기분 기록 생성
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateMoodRequest>,
) -> Result<(StatusCode, Json<MoodLog>)> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let uid = identity.subject().ok_or_else(|| ApiError::Unauthorized {
        message: "authentication required".to_string(),
    })?;
    access::require_insert(&state, &identity, Table::MoodLogs, uid)?;

    if !(1..=5).contains(&req.mood_level) {
        return Err(ApiError::BadRequest {
            message: "mood_level must be between 1 and 5".to_string(),
        });
    }

    let log: MoodLog = sqlx::query_as(
        "INSERT INTO mood_logs (user_id, mood_level, note) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(uid)
    .bind(req.mood_level)
    .bind(&req.note)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(log)))
}

/// 기분 기록 조회
pub async fn get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<MoodLog>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::MoodLogs, Operation::Select)?;
    let uid = access::owner_id(scope, &identity)?;

    let log: Option<MoodLog> =
        sqlx::query_as("SELECT * FROM mood_logs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(uid)
            .fetch_optional(&state.db)
            .await?;

    log.map(Json).ok_or_else(|| ApiError::NotFound {
        message: "mood log not found".to_string(),
    })
}

/// 기분 기록 삭제
pub async fn delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::MoodLogs, Operation::Delete)?;
    let uid = access::owner_id(scope, &identity)?;

    let result = sqlx::query("DELETE FROM mood_logs WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(uid)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            message: "mood log not found".to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
