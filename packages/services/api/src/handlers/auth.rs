//! 인증 핸들러 (가입/로그인)

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::error::{ApiError, Result};
use crate::models::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}

/// 가입
///
/// users 테이블의 insert 정책은 거부이므로, 가입은 정책 계층을 거치지
/// 않는 서비스 권한 경로로만 수행됩니다.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<User>> {
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(ApiError::BadRequest {
            message: "invalid email address".to_string(),
        });
    }
    if req.password.len() < 8 {
        return Err(ApiError::BadRequest {
            message: "password must be at least 8 characters".to_string(),
        });
    }

    let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Conflict {
            message: "email already registered".to_string(),
        });
    }

    let hashed = auth::hash_password(&req.password)?;

    // 사전 중복 검사는 동시 가입과 경합하므로, 유니크 제약 위반을 409로 변환
    let user: User = sqlx::query_as(
        "INSERT INTO users (email, hashed_password, full_name) \
         VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&req.email)
    .bind(&hashed)
    .bind(&req.full_name)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict {
                message: "email already registered".to_string(),
            }
        } else {
            e.into()
        }
    })?;

    tracing::info!(user_id = user.id, "registered new user");

    Ok(Json(user))
}

/// 로그인
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?;

    // 존재하지 않는 계정과 비밀번호 불일치를 구분하지 않는다
    let user = user
        .filter(|u| auth::verify_password(&req.password, &u.hashed_password))
        .ok_or_else(|| ApiError::Unauthorized {
            message: "incorrect email or password".to_string(),
        })?;

    if !user.is_active {
        return Err(ApiError::Forbidden {
            message: "account is deactivated".to_string(),
        });
    }

    let (token, expires_at) =
        auth::issue_token(&state.db, user.id, state.config.token_ttl_secs).await?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer",
        expires_at,
    }))
}

/// 로그아웃 (제시된 토큰 폐기)
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    // 신원 확인을 먼저 거쳐 유효한 토큰만 폐기 대상이 된다
    auth::authenticate(&state.db, &headers).await?;

    if let Some(token) = auth::bearer_token(&headers) {
        auth::revoke_token(&state.db, token).await?;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Postgres 유니크 제약 위반 (SQLSTATE 23505)
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => is_unique_violation_code(db.code().as_deref()),
        _ => false,
    }
}

fn is_unique_violation_code(code: Option<&str>) -> bool {
    code == Some("23505")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_detection() {
        assert!(is_unique_violation_code(Some("23505")));
        assert!(!is_unique_violation_code(Some("23503")));
        assert!(!is_unique_violation_code(None));

        // DB 에러가 아닌 sqlx 에러는 충돌로 취급하지 않는다
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
