//! mindnest-core: MindNest 공통 핵심 라이브러리
//!
//! API 서비스가 사용하는 접근 정책 타입과 평가 로직을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `policy`: 테이블/작업별 접근 정책 정의 및 평가
//! - `rls`: 정책 집합의 PostgreSQL Row-Level Security DDL 렌더링
//! - `error`: 공통 에러 타입

pub mod error;
pub mod policy;
pub mod rls;

pub use error::{Error, Result};
