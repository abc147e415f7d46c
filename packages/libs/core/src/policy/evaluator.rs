//! 정책 평가기
//!
//! 요청 신원에 대해 테이블/작업 규칙을 평가합니다.

use super::context::Identity;
use super::set::{AccessPolicySet, Operation, Predicate, Table};

/// 쿼리 계층이 적용해야 하는 행 스코프
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowScope {
    /// 제한 없음 (슈퍼유저의 users 읽기)
    All,

    /// `column == user_id`인 행만
    Owner {
        column: &'static str,
        user_id: i64,
    },
}

impl RowScope {
    /// 소유자 스코프라면 그 사용자 ID
    pub fn owner_id(&self) -> Option<i64> {
        match self {
            RowScope::All => None,
            RowScope::Owner { user_id, .. } => Some(*user_id),
        }
    }
}

/// 정책 평가 결과
#[derive(Debug, Clone)]
pub struct EvalResult {
    /// 허용 여부
    pub allowed: bool,

    /// 허용 시 적용할 행 스코프
    pub scope: Option<RowScope>,

    /// 거부 사유 (allowed=false인 경우)
    pub reason: Option<String>,
}

impl EvalResult {
    /// 제한 없는 허용
    pub fn allow() -> Self {
        Self {
            allowed: true,
            scope: Some(RowScope::All),
            reason: None,
        }
    }

    /// 스코프 지정 허용
    pub fn allow_scoped(scope: RowScope) -> Self {
        Self {
            allowed: true,
            scope: Some(scope),
            reason: None,
        }
    }

    /// 거부
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            scope: None,
            reason: Some(reason.into()),
        }
    }
}

/// 정책 평가기
///
/// 정책 집합과 요청 신원을 기반으로 접근을 허용/거부합니다.
pub struct PolicyEvaluator<'a> {
    set: &'a AccessPolicySet,
}

impl<'a> PolicyEvaluator<'a> {
    /// 새 평가기 생성
    pub fn new(set: &'a AccessPolicySet) -> Self {
        Self { set }
    }

    /// SELECT/UPDATE/DELETE 평가
    ///
    /// 허용 시 결과의 `scope`를 쿼리 WHERE 절에 반드시 반영해야 합니다.
    /// INSERT는 새 행의 소유자가 필요하므로 `check_insert`를 사용합니다.
    pub fn evaluate(&self, table: Table, op: Operation, identity: &Identity) -> EvalResult {
        match self.set.rule(table, op) {
            Predicate::Deny => EvalResult::deny(format!(
                "{} is not permitted on {}",
                op.as_str(),
                table.as_str()
            )),

            Predicate::SelfRow => match identity.subject() {
                Some(sub) => EvalResult::allow_scoped(RowScope::Owner {
                    column: "id",
                    user_id: sub,
                }),
                None => EvalResult::deny("authentication required"),
            },

            Predicate::SelfRowOrSuperuser => match identity.subject() {
                Some(_) if identity.is_superuser() => EvalResult::allow(),
                Some(sub) => EvalResult::allow_scoped(RowScope::Owner {
                    column: "id",
                    user_id: sub,
                }),
                None => EvalResult::deny("authentication required"),
            },

            Predicate::OwnerRow => match identity.subject() {
                Some(sub) => EvalResult::allow_scoped(RowScope::Owner {
                    column: "user_id",
                    user_id: sub,
                }),
                None => EvalResult::deny("authentication required"),
            },

            // INSERT 술어는 행 스코프가 없다
            Predicate::OwnerInsert => {
                EvalResult::deny("insert requires the new row's owner; use check_insert")
            }
        }
    }

    /// INSERT 평가
    ///
    /// 새 행의 `user_id`가 요청 신원과 일치해야 허용합니다.
    pub fn check_insert(
        &self,
        table: Table,
        identity: &Identity,
        new_row_user_id: i64,
    ) -> EvalResult {
        match self.set.rule(table, Operation::Insert) {
            Predicate::Deny => EvalResult::deny(format!(
                "insert is not permitted on {}",
                table.as_str()
            )),

            Predicate::OwnerInsert => match identity.subject() {
                Some(sub) if sub == new_row_user_id => EvalResult::allow(),
                Some(_) => EvalResult::deny("cannot insert a row owned by another user"),
                None => EvalResult::deny("authentication required"),
            },

            // insert에 행 술어가 바인딩된 경우는 정책 집합 구성 오류
            _ => EvalResult::deny("no applicable insert rule"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> AccessPolicySet {
        AccessPolicySet::mindnest()
    }

    #[test]
    fn test_owner_scope_excludes_other_users() {
        let set = set();
        let evaluator = PolicyEvaluator::new(&set);
        let u1 = Identity::user(1);

        for op in [Operation::Select, Operation::Update, Operation::Delete] {
            let result = evaluator.evaluate(Table::JournalEntries, op, &u1);
            assert!(result.allowed);
            assert_eq!(
                result.scope,
                Some(RowScope::Owner {
                    column: "user_id",
                    user_id: 1
                })
            );
        }
    }

    #[test]
    fn test_anonymous_is_denied_everywhere() {
        let set = set();
        let evaluator = PolicyEvaluator::new(&set);
        let anon = Identity::anonymous();

        for table in Table::ALL {
            for op in [Operation::Select, Operation::Update, Operation::Delete] {
                let result = evaluator.evaluate(table, op, &anon);
                assert!(!result.allowed, "{}/{}", table.as_str(), op.as_str());
            }
            let result = evaluator.check_insert(table, &anon, 1);
            assert!(!result.allowed);
        }
    }

    #[test]
    fn test_insert_for_self_allowed_for_other_denied() {
        let set = set();
        let evaluator = PolicyEvaluator::new(&set);
        let u1 = Identity::user(1);

        let result = evaluator.check_insert(Table::JournalEntries, &u1, 1);
        assert!(result.allowed);

        // U1이 user_id=U2로 journal entry를 insert → 거부
        let result = evaluator.check_insert(Table::JournalEntries, &u1, 2);
        assert!(!result.allowed);
        assert!(result.reason.unwrap().contains("another user"));
    }

    #[test]
    fn test_superuser_reads_all_user_rows() {
        let set = set();
        let evaluator = PolicyEvaluator::new(&set);
        let admin = Identity::user(1).with_superuser(true);

        let result = evaluator.evaluate(Table::Users, Operation::Select, &admin);
        assert!(result.allowed);
        assert_eq!(result.scope, Some(RowScope::All));
    }

    #[test]
    fn test_non_superuser_reads_only_own_user_row() {
        let set = set();
        let evaluator = PolicyEvaluator::new(&set);
        let u1 = Identity::user(1);

        let result = evaluator.evaluate(Table::Users, Operation::Select, &u1);
        assert!(result.allowed);
        assert_eq!(
            result.scope,
            Some(RowScope::Owner {
                column: "id",
                user_id: 1
            })
        );
    }

    #[test]
    fn test_user_delete_denied_even_for_superuser() {
        let set = set();
        let evaluator = PolicyEvaluator::new(&set);
        let admin = Identity::user(1).with_superuser(true);

        let result = evaluator.evaluate(Table::Users, Operation::Delete, &admin);
        assert!(!result.allowed);

        let result = evaluator.check_insert(Table::Users, &admin, 1);
        assert!(!result.allowed);
    }

    #[test]
    fn test_update_own_profile_scoped_to_self() {
        let set = set();
        let evaluator = PolicyEvaluator::new(&set);
        let u1 = Identity::user(42);

        let result = evaluator.evaluate(Table::Users, Operation::Update, &u1);
        assert!(result.allowed);
        assert_eq!(result.scope.unwrap().owner_id(), Some(42));
    }
}
