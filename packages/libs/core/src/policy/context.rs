//! 요청 단위 신원 컨텍스트
//!
//! 인증 제공자가 확정한 현재 주체를 담습니다. 전역 상태가 아니라
//! 요청마다 명시적으로 쿼리 계층에 전달됩니다.

/// 요청 신원
///
/// `superuser` 플래그는 인증 시점에 users 테이블에서 한 번 조회해 확정합니다.
/// 평가기가 술어 안에서 users를 다시 조회하지 않도록 하기 위함입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    sub: Option<i64>,
    superuser: bool,
}

impl Identity {
    /// 익명 신원
    pub fn anonymous() -> Self {
        Self {
            sub: None,
            superuser: false,
        }
    }

    /// 인증된 일반 사용자
    pub fn user(sub: i64) -> Self {
        Self {
            sub: Some(sub),
            superuser: false,
        }
    }

    /// 슈퍼유저 플래그 설정
    pub fn with_superuser(mut self, superuser: bool) -> Self {
        self.superuser = superuser;
        self
    }

    /// 주체 ID (익명이면 None)
    pub fn subject(&self) -> Option<i64> {
        self.sub
    }

    /// 인증 여부
    pub fn is_authenticated(&self) -> bool {
        self.sub.is_some()
    }

    /// 슈퍼유저 여부
    pub fn is_superuser(&self) -> bool {
        self.superuser
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_identity() {
        let id = Identity::anonymous();
        assert!(!id.is_authenticated());
        assert!(!id.is_superuser());
        assert_eq!(id.subject(), None);
    }

    #[test]
    fn test_user_identity() {
        let id = Identity::user(7);
        assert!(id.is_authenticated());
        assert!(!id.is_superuser());
        assert_eq!(id.subject(), Some(7));

        let admin = Identity::user(7).with_superuser(true);
        assert!(admin.is_superuser());
    }
}
