//! API 설정

use std::env;

/// API 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 서버 포트
    pub port: u16,

    /// Postgres 연결 URL
    pub database_url: String,

    /// 액세스 토큰 TTL (초)
    pub token_ttl_secs: i64,
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            port: env::var("MINDNEST_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()?,

            database_url: env::var("MINDNEST_DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/mindnest".to_string()),

            token_ttl_secs: env::var("MINDNEST_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "1800".to_string())
                .parse()
                .unwrap_or(1800),
        })
    }
}
