//! 공통 에러 타입
//!
//! MindNest 전체에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// MindNest 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    #[error("access denied: {reason}")]
    AccessDenied { reason: String },

    #[error("token expired")]
    TokenExpired,

    #[error("invalid token: {reason}")]
    InvalidToken { reason: String },
}

impl Error {
    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 401 Unauthorized
            Error::TokenExpired | Error::InvalidToken { .. } => 401,

            // 403 Forbidden
            Error::AccessDenied { .. } => 403,
        }
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::AccessDenied { .. } => "ACCESS_DENIED",
            Error::TokenExpired => "TOKEN_EXPIRED",
            Error::InvalidToken { .. } => "INVALID_TOKEN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_code_mapping() {
        let denied = Error::AccessDenied {
            reason: "not yours".to_string(),
        };
        assert_eq!(denied.status_code(), 403);
        assert_eq!(denied.code(), "ACCESS_DENIED");

        assert_eq!(Error::TokenExpired.status_code(), 401);
        assert_eq!(Error::TokenExpired.code(), "TOKEN_EXPIRED");
        assert_eq!(
            Error::InvalidToken {
                reason: "garbled".to_string()
            }
            .status_code(),
            401
        );
    }
}
