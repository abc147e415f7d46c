//! DB 연결 및 마이그레이션

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// 연결 풀 생성 후 마이그레이션 적용
pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use mindnest_core::policy::AccessPolicySet;
    use mindnest_core::rls;

    /// 주석/빈 줄을 제거하고 비교 가능한 형태로 정규화
    fn normalize(sql: &str) -> Vec<String> {
        sql.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("--"))
            .map(str::to_string)
            .collect()
    }

    /// 마이그레이션 파일의 RLS DDL은 코드의 정책 집합에서 렌더링한
    /// 결과와 한 문장도 다르지 않아야 한다.
    #[test]
    fn test_row_policy_migration_matches_policy_set() {
        let migration = include_str!("../migrations/0002_row_policies.sql");
        let rendered = rls::policy_sql(&AccessPolicySet::mindnest());

        assert_eq!(normalize(migration), normalize(&rendered));
    }
}
