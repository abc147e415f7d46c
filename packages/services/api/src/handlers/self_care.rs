//! 셀프케어 활동 핸들러

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use mindnest_core::policy::{Operation, Table};
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::models::SelfCareActivity;
use crate::state::AppState;
use crate::{access, auth};

#[derive(Debug, Deserialize)]
pub struct ListSelfCareQuery {
    pub completed: Option<bool>,
    pub scheduled_after: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSelfCareRequest {
    pub name: String,
    pub description: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSelfCareRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_completed: Option<bool>,
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// 내 셀프케어 활동 목록 (완료/예정일 필터 지원)
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListSelfCareQuery>,
) -> Result<Json<Vec<SelfCareActivity>>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::SelfCareActivities, Operation::Select)?;
    let uid = access::owner_id(scope, &identity)?;

    let activities: Vec<SelfCareActivity> = sqlx::query_as(
        "SELECT * FROM self_care_activities \
         WHERE user_id = $1 \
           AND ($2::boolean IS NULL OR is_completed = $2) \
           AND ($3::timestamptz IS NULL OR scheduled_for >= $3) \
         ORDER BY created_at DESC",
    )
    .bind(uid)
    .bind(query.completed)
    .bind(query.scheduled_after)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(activities))
}

/// 셀프케어 활동 생성
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateSelfCareRequest>,
) -> Result<(StatusCode, Json<SelfCareActivity>)> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let uid = identity.subject().ok_or_else(|| ApiError::Unauthorized {
        message: "authentication required".to_string(),
    })?;
    access::require_insert(&state, &identity, Table::SelfCareActivities, uid)?;

    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest {
            message: "name must not be empty".to_string(),
        });
    }

    let activity: SelfCareActivity = sqlx::query_as(
        "INSERT INTO self_care_activities (user_id, name, description, scheduled_for) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(uid)
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.scheduled_for)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(activity)))
}

/// 셀프케어 활동 조회
pub async fn get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<SelfCareActivity>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::SelfCareActivities, Operation::Select)?;
    let uid = access::owner_id(scope, &identity)?;

    let activity: Option<SelfCareActivity> =
        sqlx::query_as("SELECT * FROM self_care_activities WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(uid)
            .fetch_optional(&state.db)
            .await?;

    activity.map(Json).ok_or_else(|| ApiError::NotFound {
        message: "self-care activity not found".to_string(),
    })
}

/// 셀프케어 활동 부분 수정
///
/// is_completed를 true로 바꾸면 completed_at이 기록되고,
/// false로 되돌리면 지워집니다.
pub async fn update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSelfCareRequest>,
) -> Result<Json<SelfCareActivity>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::SelfCareActivities, Operation::Update)?;
    let uid = access::owner_id(scope, &identity)?;

    let activity: Option<SelfCareActivity> = sqlx::query_as(
        "UPDATE self_care_activities SET \
             name = COALESCE($3, name), \
             description = COALESCE($4, description), \
             scheduled_for = COALESCE($5, scheduled_for), \
             is_completed = COALESCE($6, is_completed), \
             completed_at = CASE \
                 WHEN $6 IS TRUE AND is_completed IS FALSE THEN now() \
                 WHEN $6 IS FALSE THEN NULL \
                 ELSE completed_at \
             END \
         WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(uid)
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.scheduled_for)
    .bind(req.is_completed)
    .fetch_optional(&state.db)
    .await?;

    activity.map(Json).ok_or_else(|| ApiError::NotFound {
        message: "self-care activity not found".to_string(),
    })
}

/// 셀프케어 활동 삭제
pub async fn delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::SelfCareActivities, Operation::Delete)?;
    let uid = access::owner_id(scope, &identity)?;

    let result = sqlx::query("DELETE FROM self_care_activities WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(uid)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            message: "self-care activity not found".to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
