//! 스트레스 이벤트 핸들러

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use mindnest_core::policy::{Operation, Table};
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::models::StressEvent;
use crate::state::AppState;
use crate::{access, auth};

#[derive(Debug, Deserialize)]
pub struct ListStressQuery {
    pub trigger_tag: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStressRequest {
    pub description: String,
    pub trigger_tag: Option<String>,
    pub intensity: i32,
}

/// 내 스트레스 이벤트 목록 (트리거 태그 필터 지원)
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListStressQuery>,
) -> Result<Json<Vec<StressEvent>>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::StressEvents, Operation::Select)?;
    let uid = access::owner_id(scope, &identity)?;

    let events: Vec<StressEvent> = sqlx::query_as(
        "SELECT * FROM stress_events \
         WHERE user_id = $1 \
           AND ($2::text IS NULL OR trigger_tag = $2) \
           AND ($3::timestamptz IS NULL OR timestamp >= $3) \
           AND ($4::timestamptz IS NULL OR timestamp <= $4) \
         ORDER BY timestamp DESC",
    )
    .bind(uid)
    .bind(&query.trigger_tag)
    .bind(query.start_date)
    .bind(query.end_date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(events))
}

/// 스트레스 이벤트 기록
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateStressRequest>,
) -> Result<(StatusCode, Json<StressEvent>)> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let uid = identity.subject().ok_or_else(|| ApiError::Unauthorized {
        message: "authentication required".to_string(),
    })?;
    access::require_insert(&state, &identity, Table::StressEvents, uid)?;

    if req.description.trim().is_empty() {
        return Err(ApiError::BadRequest {
            message: "description must not be empty".to_string(),
        });
    }
    if !(1..=5).contains(&req.intensity) {
        return Err(ApiError::BadRequest {
            message: "intensity must be between 1 and 5".to_string(),
        });
    }

    let event: StressEvent = sqlx::query_as(
        "INSERT INTO stress_events (user_id, description, trigger_tag, intensity) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(uid)
    .bind(&req.description)
    .bind(&req.trigger_tag)
    .bind(req.intensity)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// 스트레스 이벤트 조회
pub async fn get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<StressEvent>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::StressEvents, Operation::Select)?;
    let uid = access::owner_id(scope, &identity)?;

    let event: Option<StressEvent> =
        sqlx::query_as("SELECT * FROM stress_events WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(uid)
            .fetch_optional(&state.db)
            .await?;

    event.map(Json).ok_or_else(|| ApiError::NotFound {
        message: "stress event not found".to_string(),
    })
}

/// 스트레스 이벤트 삭제
pub async fn delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::StressEvents, Operation::Delete)?;
    let uid = access::owner_id(scope, &identity)?;

    let result = sqlx::query("DELETE FROM stress_events WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(uid)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            message: "stress event not found".to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
