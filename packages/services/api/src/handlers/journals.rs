//! 일기 핸들러

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use mindnest_core::policy::{Operation, Table};
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::models::JournalEntry;
use crate::state::AppState;
use crate::{access, auth};

#[derive(Debug, Deserialize)]
pub struct CreateJournalRequest {
    pub title: Option<String>,
    pub content: String,
    pub mood: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJournalRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mood: Option<String>,
}

/// 내 일기 목록 (최신순)
pub async fn list(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<JournalEntry>>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::JournalEntries, Operation::Select)?;
    let uid = access::owner_id(scope, &identity)?;

    let entries: Vec<JournalEntry> = sqlx::query_as(
        "SELECT * FROM journal_entries WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(uid)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

/// 일기 작성
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateJournalRequest>,
) -> Result<(StatusCode, Json<JournalEntry>)> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let uid = identity.subject().ok_or_else(|| ApiError::Unauthorized {
        message: "authentication required".to_string(),
    })?;
    access::require_insert(&state, &identity, Table::JournalEntries, uid)?;

    if req.content.trim().is_empty() {
        return Err(ApiError::BadRequest {
            message: "content must not be empty".to_string(),
        });
    }

    let entry: JournalEntry = sqlx::query_as(
        "INSERT INTO journal_entries (user_id, title, content, mood) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(uid)
    .bind(&req.title)
    .bind(&req.content)
    .bind(&req.mood)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// 일기 조회
pub async fn get(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<JournalEntry>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::JournalEntries, Operation::Select)?;
    let uid = access::owner_id(scope, &identity)?;

    let entry: Option<JournalEntry> =
        sqlx::query_as("SELECT * FROM journal_entries WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(uid)
            .fetch_optional(&state.db)
            .await?;

    entry.map(Json).ok_or_else(|| ApiError::NotFound {
        message: "journal entry not found".to_string(),
    })
}

/// 일기 수정
pub async fn update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(req): Json<UpdateJournalRequest>,
) -> Result<Json<JournalEntry>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::JournalEntries, Operation::Update)?;
    let uid = access::owner_id(scope, &identity)?;

    let entry: Option<JournalEntry> = sqlx::query_as(
        "UPDATE journal_entries SET \
             title = COALESCE($3, title), \
             content = COALESCE($4, content), \
             mood = COALESCE($5, mood), \
             updated_at = now() \
         WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(uid)
    .bind(&req.title)
    .bind(&req.content)
    .bind(&req.mood)
    .fetch_optional(&state.db)
    .await?;

    entry.map(Json).ok_or_else(|| ApiError::NotFound {
        message: "journal entry not found".to_string(),
    })
}

/// 일기 삭제
pub async fn delete(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::JournalEntries, Operation::Delete)?;
    let uid = access::owner_id(scope, &identity)?;

    let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(uid)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound {
            message: "journal entry not found".to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
