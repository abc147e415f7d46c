//! 핸들러용 접근 제어 어댑터
//!
//! 정책 평가 결과를 HTTP 에러와 쿼리 스코프로 변환합니다.

use mindnest_core::policy::{Identity, Operation, PolicyEvaluator, RowScope, Table};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// 테이블/작업 접근 허용 확인, 허용 시 행 스코프 반환
///
/// 핸들러는 반환된 스코프를 쿼리 WHERE 절에 반드시 반영해야 합니다.
pub fn require(
    state: &AppState,
    identity: &Identity,
    table: Table,
    op: Operation,
) -> Result<RowScope> {
    let evaluator = PolicyEvaluator::new(&state.policies);
    let result = evaluator.evaluate(table, op, identity);

    if result.allowed {
        Ok(result.scope.unwrap_or(RowScope::All))
    } else {
        Err(deny(identity, result.reason))
    }
}

/// INSERT 허용 확인 (새 행의 user_id가 신원과 일치해야 함)
pub fn require_insert(
    state: &AppState,
    identity: &Identity,
    table: Table,
    new_row_user_id: i64,
) -> Result<()> {
    let evaluator = PolicyEvaluator::new(&state.policies);
    let result = evaluator.check_insert(table, identity, new_row_user_id);

    if result.allowed {
        Ok(())
    } else {
        Err(deny(identity, result.reason))
    }
}

/// 소유자 스코프가 요구되는 경로에서 사용자 ID 추출
pub fn owner_id(scope: RowScope, identity: &Identity) -> Result<i64> {
    match scope {
        RowScope::Owner { user_id, .. } => Ok(user_id),
        RowScope::All => identity.subject().ok_or_else(|| ApiError::Unauthorized {
            message: "authentication required".to_string(),
        }),
    }
}

// 익명은 401, 인증된 주체의 거부는 코어 에러(403, ACCESS_DENIED)로 통과
fn deny(identity: &Identity, reason: Option<String>) -> ApiError {
    let message = reason.unwrap_or_else(|| "access denied".to_string());
    if identity.is_authenticated() {
        ApiError::Core(mindnest_core::Error::AccessDenied { reason: message })
    } else {
        ApiError::Unauthorized { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_maps_to_http_status() {
        let anon = Identity::anonymous();
        let user = Identity::user(1);

        assert!(matches!(
            deny(&anon, None),
            ApiError::Unauthorized { .. }
        ));

        match deny(&user, Some("nope".to_string())) {
            ApiError::Core(e) => {
                assert_eq!(e.status_code(), 403);
                assert_eq!(e.code(), "ACCESS_DENIED");
            }
            other => panic!("expected core access-denied error, got {other:?}"),
        }
    }
}
