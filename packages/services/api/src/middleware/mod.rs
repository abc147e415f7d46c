//! API 미들웨어
//!
//! 요청 ID 추적 미들웨어를 정의합니다. 클라이언트가 보낸 `x-request-id`를
//! 우선 존중하고, 없거나 형식이 어긋나면 새로 발급합니다. 확정된 ID는
//! task-local로 유지되어 에러 응답 본문에도 실립니다.

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// 클라이언트 제공 ID의 최대 길이
const MAX_REQUEST_ID_LEN: usize = 64;

#[derive(Clone, Debug)]
pub struct RequestId(#[allow(dead_code)] pub String);

tokio::task_local! {
    static REQUEST_ID: String;
}

pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// 클라이언트가 보낸 요청 ID (영숫자/하이픈/밑줄만 허용)
fn inbound_request_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let acceptable = !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    acceptable.then(|| value.to_string())
}

pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = inbound_request_id(req.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());
    req.extensions_mut().insert(RequestId(id.clone()));
    let mut resp = REQUEST_ID
        .scope(id.clone(), async move { next.run(req).await })
        .await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    resp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_request_id_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, "client-trace_01".parse().unwrap());
        assert_eq!(
            inbound_request_id(&headers),
            Some("client-trace_01".to_string())
        );
    }

    #[test]
    fn test_inbound_request_id_rejected() {
        let mut headers = HeaderMap::new();
        assert_eq!(inbound_request_id(&headers), None);

        headers.insert(REQUEST_ID_HEADER, "has spaces".parse().unwrap());
        assert_eq!(inbound_request_id(&headers), None);

        headers.insert(REQUEST_ID_HEADER, "a".repeat(65).parse().unwrap());
        assert_eq!(inbound_request_id(&headers), None);

        headers.insert(REQUEST_ID_HEADER, "".parse().unwrap());
        assert_eq!(inbound_request_id(&headers), None);
    }
}
