//! 분석 핸들러
//!
//! 본인 기록에 대한 집계만 제공합니다. 모든 쿼리는 기분/스트레스/일기
//! 테이블의 select 정책을 거친 소유자 스코프로 제한됩니다.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use mindnest_core::policy::{Operation, Table};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::state::AppState;
use crate::{access, auth};

#[derive(Debug, Deserialize)]
pub struct MoodSummaryQuery {
    /// 집계 기간 (일), 기본 30일
    pub days: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct MoodTrendQuery {
    /// 집계 단위: day | week | month (기본 week)
    pub period: Option<String>,
    pub days: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct StressPatternsQuery {
    pub days: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct MoodSummary {
    pub days: i32,
    pub entry_count: i64,
    pub average_mood: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct MoodTrendPoint {
    pub bucket: String,
    pub average_mood: f64,
}

#[derive(Debug, Serialize)]
pub struct StressPattern {
    pub trigger_tag: String,
    pub frequency: i64,
    pub average_intensity: f64,
}

#[derive(Debug, Serialize)]
pub struct JournalingStreak {
    pub current_streak: i64,
    pub longest_streak: i64,
}

/// 기분 추이 요약
///
/// 최근 N일간 본인 기분 기록의 건수와 평균을 돌려줍니다.
pub async fn mood_summary(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<MoodSummaryQuery>,
) -> Result<Json<MoodSummary>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::MoodLogs, Operation::Select)?;
    let uid = access::owner_id(scope, &identity)?;

    let days = clamp_days(query.days);

    let (entry_count, average_mood): (i64, Option<f64>) = sqlx::query_as(
        "SELECT COUNT(*), AVG(mood_level)::float8 \
         FROM mood_logs \
         WHERE user_id = $1 AND logged_at >= now() - make_interval(days => $2)",
    )
    .bind(uid)
    .bind(days)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(MoodSummary {
        days,
        entry_count,
        average_mood,
    }))
}

/// 기분 추이 (일/주/월 단위 평균)
pub async fn mood_trend(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<MoodTrendQuery>,
) -> Result<Json<Vec<MoodTrendPoint>>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::MoodLogs, Operation::Select)?;
    let uid = access::owner_id(scope, &identity)?;

    let days = clamp_days(query.days);
    let period = query.period.as_deref().unwrap_or("week");
    let format = trend_format(period).ok_or_else(|| ApiError::BadRequest {
        message: "period must be one of day, week, month".to_string(),
    })?;

    let rows: Vec<(String, f64)> = sqlx::query_as(
        "SELECT to_char(logged_at, $3) AS bucket, AVG(mood_level)::float8 \
         FROM mood_logs \
         WHERE user_id = $1 AND logged_at >= now() - make_interval(days => $2) \
         GROUP BY 1 ORDER BY 1",
    )
    .bind(uid)
    .bind(days)
    .bind(format)
    .fetch_all(&state.db)
    .await?;

    let points = rows
        .into_iter()
        .map(|(bucket, average_mood)| MoodTrendPoint {
            bucket,
            average_mood,
        })
        .collect();

    Ok(Json(points))
}

/// 스트레스 트리거 패턴 (태그별 빈도/평균 강도, 빈도 내림차순)
pub async fn stress_patterns(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<StressPatternsQuery>,
) -> Result<Json<Vec<StressPattern>>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::StressEvents, Operation::Select)?;
    let uid = access::owner_id(scope, &identity)?;

    let days = clamp_days(query.days);

    let rows: Vec<(String, i64, f64)> = sqlx::query_as(
        "SELECT trigger_tag, COUNT(*), AVG(intensity)::float8 \
         FROM stress_events \
         WHERE user_id = $1 \
           AND timestamp >= now() - make_interval(days => $2) \
           AND trigger_tag IS NOT NULL \
         GROUP BY trigger_tag ORDER BY COUNT(*) DESC",
    )
    .bind(uid)
    .bind(days)
    .fetch_all(&state.db)
    .await?;

    let patterns = rows
        .into_iter()
        .map(|(trigger_tag, frequency, average_intensity)| StressPattern {
            trigger_tag,
            frequency,
            average_intensity,
        })
        .collect();

    Ok(Json(patterns))
}

/// 일기 연속 작성 일수
pub async fn journaling_streak(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<JournalingStreak>> {
    let identity = auth::authenticate(&state.db, &headers).await?;
    let scope = access::require(&state, &identity, Table::JournalEntries, Operation::Select)?;
    let uid = access::owner_id(scope, &identity)?;

    let rows: Vec<(NaiveDate,)> = sqlx::query_as(
        "SELECT DISTINCT created_at::date FROM journal_entries \
         WHERE user_id = $1 ORDER BY 1 DESC",
    )
    .bind(uid)
    .fetch_all(&state.db)
    .await?;

    let dates: Vec<NaiveDate> = rows.into_iter().map(|(d,)| d).collect();
    let (current_streak, longest_streak) = streaks(&dates, Utc::now().date_naive());

    Ok(Json(JournalingStreak {
        current_streak,
        longest_streak,
    }))
}

/// days 파라미터를 1..=365로 제한 (기본 30)
fn clamp_days(days: Option<i32>) -> i32 {
    days.unwrap_or(30).clamp(1, 365)
}

/// 집계 단위별 to_char 포맷
fn trend_format(period: &str) -> Option<&'static str> {
    match period {
        "day" => Some("YYYY-MM-DD"),
        "week" => Some("IYYY-\"W\"IW"),
        "month" => Some("YYYY-MM"),
        _ => None,
    }
}

/// 연속 작성 일수 계산
///
/// `dates`는 중복 없는 내림차순 날짜 목록. 오늘이나 어제 항목이 없으면
/// 현재 스트릭은 0이고, 최장 스트릭은 전체 구간에서 계산합니다.
fn streaks(dates: &[NaiveDate], today: NaiveDate) -> (i64, i64) {
    let first = match dates.first() {
        Some(d) => *d,
        None => return (0, 0),
    };

    let mut longest = 1i64;
    let mut run = 1i64;
    for pair in dates.windows(2) {
        if pair[0] - pair[1] == Duration::days(1) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    let current = if first == today || first == today - Duration::days(1) {
        let mut streak = 1i64;
        for pair in dates.windows(2) {
            if pair[0] - pair[1] == Duration::days(1) {
                streak += 1;
            } else {
                break;
            }
        }
        streak
    } else {
        0
    };

    (current, longest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_clamp_days_bounds() {
        assert_eq!(clamp_days(None), 30);
        assert_eq!(clamp_days(Some(0)), 1);
        assert_eq!(clamp_days(Some(400)), 365);
        assert_eq!(clamp_days(Some(7)), 7);
    }

    #[test]
    fn test_trend_format_accepts_known_periods_only() {
        assert_eq!(trend_format("day"), Some("YYYY-MM-DD"));
        assert_eq!(trend_format("week"), Some("IYYY-\"W\"IW"));
        assert_eq!(trend_format("month"), Some("YYYY-MM"));
        assert_eq!(trend_format("year"), None);
        assert_eq!(trend_format(""), None);
    }

    #[test]
    fn test_streak_empty_history() {
        assert_eq!(streaks(&[], date(2026, 8, 31)), (0, 0));
    }

    #[test]
    fn test_streak_counts_consecutive_days_from_today() {
        let today = date(2026, 8, 31);
        let dates = [
            date(2026, 8, 31),
            date(2026, 8, 30),
            date(2026, 8, 29),
            date(2026, 8, 26),
        ];
        assert_eq!(streaks(&dates, today), (3, 3));
    }

    #[test]
    fn test_streak_allows_yesterday_as_anchor() {
        let today = date(2026, 8, 31);
        let dates = [date(2026, 8, 30), date(2026, 8, 29)];
        assert_eq!(streaks(&dates, today), (2, 2));
    }

    #[test]
    fn test_stale_history_resets_current_but_keeps_longest() {
        let today = date(2026, 8, 31);
        let dates = [
            date(2026, 8, 20),
            date(2026, 8, 19),
            date(2026, 8, 18),
            date(2026, 8, 17),
            date(2026, 8, 10),
        ];
        assert_eq!(streaks(&dates, today), (0, 4));
    }
}
