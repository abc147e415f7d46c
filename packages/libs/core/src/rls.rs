//! Postgres row-level security 전사
//!
//! 정책 집합을 `CREATE POLICY` DDL로 옮깁니다. 요청 신원은 세션 설정
//! `mindnest.user_id`, 슈퍼유저 여부는 `mindnest.is_superuser`로 전달된다고
//! 가정합니다. 둘 다 인증 시점에 한 번 설정되며, 정책 술어는 users를 다시
//! 조회하지 않습니다. users에 붙는 정책이 users를 서브쿼리로 읽으면
//! Postgres가 정책 확장 단계에서 재귀로 판정해 모든 조회를 중단시킵니다
//! (42P17). 술어가 `Deny`인 쌍은 정책을 만들지 않으며, RLS 활성화 상태에서
//! 정책 부재 = 거부입니다.

use crate::policy::{AccessPolicySet, Operation, Predicate, Table};

/// 세션 설정에서 현재 사용자 ID를 읽는 SQL 식
const IDENTITY_SQL: &str = "current_setting('mindnest.user_id', true)::bigint";

/// 세션 설정에서 슈퍼유저 여부를 읽는 SQL 식 (미설정 시 NULL = 비허용)
const SUPERUSER_SQL: &str = "current_setting('mindnest.is_superuser', true)::boolean";

/// 정책 집합 전체를 RLS DDL로 렌더링
///
/// 출력은 마이그레이션 파일에 그대로 들어갈 수 있는 형태입니다.
pub fn policy_sql(set: &AccessPolicySet) -> String {
    let mut out = String::new();

    for (table, policies) in set.iter() {
        out.push_str(&format!(
            "ALTER TABLE {} ENABLE ROW LEVEL SECURITY;\n",
            table.as_str()
        ));

        for op in Operation::ALL {
            if let Some(stmt) = policy_stmt(table, op, policies.get(op)) {
                out.push_str(&stmt);
                out.push('\n');
            }
        }

        out.push('\n');
    }

    out
}

/// 테이블/작업 쌍 하나의 CREATE POLICY 문 (Deny면 None)
fn policy_stmt(table: Table, op: Operation, predicate: Predicate) -> Option<String> {
    let condition = match predicate {
        Predicate::Deny => return None,
        Predicate::SelfRow => format!("id = {IDENTITY_SQL}"),
        Predicate::SelfRowOrSuperuser => format!("id = {IDENTITY_SQL} OR {SUPERUSER_SQL}"),
        Predicate::OwnerRow | Predicate::OwnerInsert => format!("user_id = {IDENTITY_SQL}"),
    };

    // INSERT는 WITH CHECK만, UPDATE는 USING + WITH CHECK (수정 후 행도
    // 신원 소유여야 함), SELECT/DELETE는 USING만 가진다.
    let stmt = match op {
        Operation::Insert => format!(
            "CREATE POLICY {}_{} ON {} FOR INSERT WITH CHECK ({});",
            table.as_str(),
            op.as_str(),
            table.as_str(),
            condition
        ),
        Operation::Update => format!(
            "CREATE POLICY {}_{} ON {} FOR UPDATE USING ({}) WITH CHECK ({});",
            table.as_str(),
            op.as_str(),
            table.as_str(),
            condition,
            condition
        ),
        Operation::Select | Operation::Delete => format!(
            "CREATE POLICY {}_{} ON {} FOR {} USING ({});",
            table.as_str(),
            op.as_str(),
            table.as_str(),
            op.as_str().to_uppercase(),
            condition
        ),
    };

    Some(stmt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rls_enabled_on_every_table() {
        let sql = policy_sql(&AccessPolicySet::mindnest());

        for table in Table::ALL {
            let expected = format!("ALTER TABLE {} ENABLE ROW LEVEL SECURITY;", table.as_str());
            assert!(sql.contains(&expected), "missing: {expected}");
        }
    }

    #[test]
    fn test_denied_pairs_have_no_policy() {
        let sql = policy_sql(&AccessPolicySet::mindnest());

        assert!(!sql.contains("users_insert"));
        assert!(!sql.contains("users_delete"));
    }

    #[test]
    fn test_insert_policies_use_with_check_only() {
        let sql = policy_sql(&AccessPolicySet::mindnest());

        assert!(sql.contains(
            "CREATE POLICY journal_entries_insert ON journal_entries FOR INSERT \
             WITH CHECK (user_id = current_setting('mindnest.user_id', true)::bigint);"
        ));
        assert!(!sql.contains("FOR INSERT USING"));
    }

    #[test]
    fn test_update_policies_check_both_sides() {
        let sql = policy_sql(&AccessPolicySet::mindnest());

        for line in sql.lines().filter(|l| l.contains("FOR UPDATE")) {
            assert!(line.contains("USING ("), "no USING: {line}");
            assert!(line.contains("WITH CHECK ("), "no WITH CHECK: {line}");
        }
    }

    #[test]
    fn test_users_select_allows_superuser_branch() {
        let sql = policy_sql(&AccessPolicySet::mindnest());
        let line = sql
            .lines()
            .find(|l| l.starts_with("CREATE POLICY users_select"))
            .expect("users_select policy missing");

        assert!(line.contains("current_setting('mindnest.is_superuser', true)::boolean"));
        assert!(line.contains("id = current_setting('mindnest.user_id', true)::bigint"));
    }

    /// users에 붙는 정책이 users를 다시 읽으면 Postgres가 재귀로 판정한다.
    #[test]
    fn test_users_policies_never_query_users() {
        let sql = policy_sql(&AccessPolicySet::mindnest());

        for line in sql.lines().filter(|l| l.contains(" ON users ")) {
            assert!(!line.contains("FROM users"), "recursive qual: {line}");
            assert!(!line.contains("SELECT 1"), "subquery in users policy: {line}");
        }
    }
}
