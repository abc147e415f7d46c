//! 도메인 모델
//!
//! DB 행과 1:1로 대응합니다. 응답 직렬화에도 그대로 쓰이며,
//! 비밀번호 해시는 절대 직렬화되지 않습니다.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// 사용자
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,

    #[serde(skip_serializing)]
    pub hashed_password: String,

    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub wellness_goals: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 일기 항목
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JournalEntry {
    pub id: i64,
    pub user_id: i64,
    pub title: Option<String>,
    pub content: String,
    pub mood: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 기분 기록 (mood_level: 1~5)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MoodLog {
    pub id: i64,
    pub user_id: i64,
    pub mood_level: i32,
    pub note: Option<String>,
    pub logged_at: DateTime<Utc>,
}

/// 스트레스 이벤트 (intensity: 1~5)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StressEvent {
    pub id: i64,
    pub user_id: i64,
    pub description: String,
    pub trigger_tag: Option<String>,
    pub intensity: i32,
    pub timestamp: DateTime<Utc>,
}

/// 셀프케어 활동
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SelfCareActivity {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_omits_password_hash() {
        let user = User {
            id: 1,
            email: "a@example.com".to_string(),
            hashed_password: "$argon2id$...".to_string(),
            full_name: None,
            bio: None,
            avatar_url: None,
            wellness_goals: None,
            is_active: true,
            is_superuser: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["email"], "a@example.com");
    }
}
