//! API 앱 상태

use mindnest_core::policy::AccessPolicySet;
use sqlx::PgPool;

use crate::config::Config;
use crate::db;

/// 앱 상태
///
/// 모든 핸들러에서 공유하는 상태입니다.
pub struct AppState {
    /// 설정
    pub config: Config,

    /// Postgres 연결 풀
    pub db: PgPool,

    /// 접근 정책 집합 (정적, 런타임 불변)
    pub policies: AccessPolicySet,
}

impl AppState {
    /// 새 상태 생성 (DB 연결 + 마이그레이션 적용)
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db = db::connect(&config.database_url).await?;

        Ok(Self {
            config: config.clone(),
            db,
            policies: AccessPolicySet::mindnest(),
        })
    }
}
