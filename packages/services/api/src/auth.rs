//! 인증
//!
//! argon2 비밀번호 해시와 불투명 베어러 토큰을 사용합니다.
//! 토큰은 access_tokens 테이블에 저장되고 TTL이 지나면 무효입니다.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use mindnest_core::policy::Identity;
use mindnest_core::Error;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, Result};

/// 비밀번호 해시 (PHC 문자열)
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal {
            message: format!("password hashing failed: {}", e),
        })?;
    Ok(hash.to_string())
}

/// 비밀번호 검증
pub fn verify_password(password: &str, hashed: &str) -> bool {
    PasswordHash::new(hashed)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Authorization 헤더에서 베어러 토큰 추출
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// 만료 토큰 정리 SQL (발급 시마다 수행)
const SWEEP_EXPIRED_TOKENS_SQL: &str = "DELETE FROM access_tokens WHERE expires_at < now()";

/// 새 액세스 토큰 발급
///
/// 발급 전에 만료된 토큰을 정리해 테이블이 무한히 자라지 않게 합니다.
pub async fn issue_token(
    db: &PgPool,
    user_id: i64,
    ttl_secs: i64,
) -> Result<(String, DateTime<Utc>)> {
    sqlx::query(SWEEP_EXPIRED_TOKENS_SQL).execute(db).await?;

    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::seconds(ttl_secs);

    sqlx::query("INSERT INTO access_tokens (token, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(&token)
        .bind(user_id)
        .bind(expires_at)
        .execute(db)
        .await?;

    Ok((token, expires_at))
}

/// 토큰 폐기 (로그아웃)
///
/// 토큰이 이미 없어도 성공으로 처리합니다.
pub async fn revoke_token(db: &PgPool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM access_tokens WHERE token = $1")
        .bind(token)
        .execute(db)
        .await?;

    Ok(())
}

/// 요청 헤더에서 신원 확정
///
/// 토큰 소유자의 is_superuser를 인증 시점에 한 번 조회해 Identity에
/// 싣습니다. 이후 정책 평가는 DB를 다시 보지 않습니다.
pub async fn authenticate(db: &PgPool, headers: &HeaderMap) -> Result<Identity> {
    let token = bearer_token(headers).ok_or(ApiError::Core(Error::InvalidToken {
        reason: "missing bearer token".to_string(),
    }))?;

    let row: Option<(i64, bool, bool, DateTime<Utc>)> = sqlx::query_as(
        "SELECT u.id, u.is_superuser, u.is_active, t.expires_at \
         FROM access_tokens t JOIN users u ON u.id = t.user_id \
         WHERE t.token = $1",
    )
    .bind(token)
    .fetch_optional(db)
    .await?;

    let (user_id, is_superuser, is_active, expires_at) =
        row.ok_or(ApiError::Core(Error::InvalidToken {
            reason: "unknown token".to_string(),
        }))?;

    if expires_at < Utc::now() {
        return Err(ApiError::Core(Error::TokenExpired));
    }

    if !is_active {
        return Err(ApiError::Forbidden {
            message: "account is deactivated".to_string(),
        });
    }

    Ok(Identity::user(user_id).with_superuser(is_superuser))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hashed = hash_password("correct horse battery staple").unwrap();
        assert!(hashed.starts_with("$argon2"));
        assert!(verify_password("correct horse battery staple", &hashed));
        assert!(!verify_password("wrong password", &hashed));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_token_sweep_deletes_expired_rows_only() {
        assert!(SWEEP_EXPIRED_TOKENS_SQL.starts_with("DELETE FROM access_tokens"));
        assert!(SWEEP_EXPIRED_TOKENS_SQL.ends_with("WHERE expires_at < now()"));
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", "Bearer abc-123".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc-123"));

        headers.insert("authorization", "Basic abc-123".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }
}
