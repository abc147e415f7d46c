//! 사용자 핸들러

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use mindnest_core::policy::{Operation, RowScope, Table};
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::models::User;
use crate::state::AppState;
use crate::{access, auth};

#[derive(Debug, Deserialize)]
pub struct UpdateMeRequest {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub wellness_goals: Option<String>,
}

/// 내 프로필 조회
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<User>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::Users, Operation::Select)?;
    let uid = access::owner_id(scope, &identity)?;

    let user: User = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(uid)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(user))
}

/// 사용자 조회
///
/// 슈퍼유저는 모든 사용자를, 일반 사용자는 본인만 볼 수 있습니다.
/// 스코프 밖의 행은 존재 여부를 드러내지 않고 404를 돌려줍니다.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<User>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::Users, Operation::Select)?;

    let user: Option<User> = match scope {
        RowScope::All => {
            sqlx::query_as("SELECT * FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&state.db)
                .await?
        }
        RowScope::Owner { column, user_id } => {
            sqlx::query_as(&format!("SELECT * FROM users WHERE id = $1 AND {} = $2", column))
                .bind(id)
                .bind(user_id)
                .fetch_optional(&state.db)
                .await?
        }
    };

    user.map(Json).ok_or_else(|| ApiError::NotFound {
        message: "user not found".to_string(),
    })
}

/// 내 프로필 수정
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<UpdateMeRequest>,
) -> Result<Json<User>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::Users, Operation::Update)?;
    let uid = access::owner_id(scope, &identity)?;

    let user: User = sqlx::query_as(
        "UPDATE users SET \
             full_name = COALESCE($2, full_name), \
             bio = COALESCE($3, bio), \
             avatar_url = COALESCE($4, avatar_url), \
             wellness_goals = COALESCE($5, wellness_goals), \
             updated_at = now() \
         WHERE id = $1 RETURNING *",
    )
    .bind(uid)
    .bind(&req.full_name)
    .bind(&req.bio)
    .bind(&req.avatar_url)
    .bind(&req.wellness_goals)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(user))
}
