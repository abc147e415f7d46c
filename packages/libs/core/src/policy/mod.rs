//! 접근 정책 정의 및 평가
//!
//! # 개요
//!
//! 테이블/작업 쌍마다 명시적 허용/거부 규칙을 열거하고, 요청 단위 신원
//! 컨텍스트에 대해 평가합니다. 규칙이 없는 쌍은 기본 거부이며, 기본 거부에
//! 의존하는 대신 모든 쌍을 코드에 명시합니다 (조용한 회귀 방지).
//!
//! # 모듈 구조
//!
//! - `set`: 테이블/작업/술어 타입과 정책 집합
//! - `context`: 요청 단위 신원 컨텍스트
//! - `evaluator`: 정책 평가기

mod context;
mod evaluator;
mod set;

pub use context::Identity;
pub use evaluator::{EvalResult, PolicyEvaluator, RowScope};
pub use set::{AccessPolicySet, Operation, Predicate, Table, TablePolicies};
