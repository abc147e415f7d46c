//! 접근 정책 집합
//!
//! 다섯 개 테이블에 대한 작업별 술어를 정의합니다.
//! 정책은 마이그레이션 시점에 한 번 만들어지는 정적 메타데이터이며,
//! 런타임에는 변경되지 않습니다.

use serde::{Deserialize, Serialize};

/// 정책 대상 테이블
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Users,
    JournalEntries,
    MoodLogs,
    StressEvents,
    SelfCareActivities,
}

impl Table {
    /// 정책이 적용되는 모든 테이블
    pub const ALL: [Table; 5] = [
        Table::Users,
        Table::JournalEntries,
        Table::MoodLogs,
        Table::StressEvents,
        Table::SelfCareActivities,
    ];

    /// SQL 테이블 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::JournalEntries => "journal_entries",
            Table::MoodLogs => "mood_logs",
            Table::StressEvents => "stress_events",
            Table::SelfCareActivities => "self_care_activities",
        }
    }
}

/// CRUD 작업 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl Operation {
    /// 모든 작업 타입
    pub const ALL: [Operation; 4] = [
        Operation::Select,
        Operation::Insert,
        Operation::Update,
        Operation::Delete,
    ];

    /// 문자열로 변환
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// 접근 술어
///
/// 각 테이블/작업 쌍에 하나씩 바인딩됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// 항상 거부 (명시적 기본 거부)
    Deny,

    /// identity == row.id
    SelfRow,

    /// identity == row.id, 또는 인증된 슈퍼유저는 전체 행
    SelfRowOrSuperuser,

    /// identity == row.user_id
    OwnerRow,

    /// new_row.user_id == identity (INSERT 전용)
    OwnerInsert,
}

/// 테이블 하나의 작업별 규칙
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TablePolicies {
    pub select: Predicate,
    pub insert: Predicate,
    pub update: Predicate,
    pub delete: Predicate,
}

impl TablePolicies {
    /// 특정 작업의 술어 가져오기
    pub fn get(&self, op: Operation) -> Predicate {
        match op {
            Operation::Select => self.select,
            Operation::Insert => self.insert,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }

    /// 소유자 전용 테이블의 표준 규칙 (journal_entries 등)
    fn owned() -> Self {
        Self {
            select: Predicate::OwnerRow,
            insert: Predicate::OwnerInsert,
            update: Predicate::OwnerRow,
            delete: Predicate::OwnerRow,
        }
    }
}

/// 전체 접근 정책 집합
///
/// 모든 테이블/작업 쌍이 열거되어 있어야 하며, 누락 시 평가기는 거부합니다.
#[derive(Debug, Clone, Serialize)]
pub struct AccessPolicySet {
    tables: [(Table, TablePolicies); 5],
}

impl AccessPolicySet {
    /// MindNest 스키마의 정책 집합
    ///
    /// - users: 본인 행만 읽기/수정, 슈퍼유저는 전체 읽기.
    ///   insert/delete는 정책 없음 = 거부 (가입은 서비스 권한 경로로 수행).
    /// - 소유 테이블 네 개: user_id == identity인 행만 읽기/수정/삭제,
    ///   본인 user_id로만 insert.
    pub fn mindnest() -> Self {
        Self {
            tables: [
                (
                    Table::Users,
                    TablePolicies {
                        select: Predicate::SelfRowOrSuperuser,
                        insert: Predicate::Deny,
                        update: Predicate::SelfRow,
                        delete: Predicate::Deny,
                    },
                ),
                (Table::JournalEntries, TablePolicies::owned()),
                (Table::MoodLogs, TablePolicies::owned()),
                (Table::StressEvents, TablePolicies::owned()),
                (Table::SelfCareActivities, TablePolicies::owned()),
            ],
        }
    }

    /// 테이블의 규칙 묶음 조회
    pub fn table_policies(&self, table: Table) -> Option<&TablePolicies> {
        self.tables
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, p)| p)
    }

    /// 테이블/작업 쌍의 술어 조회 (누락 = 거부)
    pub fn rule(&self, table: Table, op: Operation) -> Predicate {
        self.table_policies(table)
            .map(|p| p.get(op))
            .unwrap_or(Predicate::Deny)
    }

    /// (테이블, 규칙) 순회
    pub fn iter(&self) -> impl Iterator<Item = (Table, &TablePolicies)> {
        self.tables.iter().map(|(t, p)| (*t, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_operation_pair_is_enumerated() {
        let set = AccessPolicySet::mindnest();

        for table in Table::ALL {
            let policies = set.table_policies(table);
            assert!(policies.is_some(), "missing policies for {}", table.as_str());
        }

        // 20쌍 전부 rule()이 명시적 술어를 돌려준다
        for table in Table::ALL {
            for op in Operation::ALL {
                let _ = set.rule(table, op);
            }
        }
    }

    #[test]
    fn test_users_delete_and_insert_are_denied() {
        let set = AccessPolicySet::mindnest();

        assert_eq!(set.rule(Table::Users, Operation::Delete), Predicate::Deny);
        assert_eq!(set.rule(Table::Users, Operation::Insert), Predicate::Deny);
    }

    #[test]
    fn test_owned_tables_share_owner_rules() {
        let set = AccessPolicySet::mindnest();
        let owned = [
            Table::JournalEntries,
            Table::MoodLogs,
            Table::StressEvents,
            Table::SelfCareActivities,
        ];

        for table in owned {
            assert_eq!(set.rule(table, Operation::Select), Predicate::OwnerRow);
            assert_eq!(set.rule(table, Operation::Insert), Predicate::OwnerInsert);
            assert_eq!(set.rule(table, Operation::Update), Predicate::OwnerRow);
            assert_eq!(set.rule(table, Operation::Delete), Predicate::OwnerRow);
        }
    }

    #[test]
    fn test_table_names() {
        assert_eq!(Table::Users.as_str(), "users");
        assert_eq!(Table::SelfCareActivities.as_str(), "self_care_activities");
        assert_eq!(Operation::Select.as_str(), "select");
    }
}
