//! MindNest API
//!
//! 일기/기분/스트레스/셀프케어 기록을 제공하는 멘탈 웰니스 백엔드입니다.
//! 모든 소유 데이터 접근은 행 단위 정책 평가를 거칩니다.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod access;
mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "mindnest_api=debug,tower_http=debug,axum=trace".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("Starting MindNest API with config: {:?}", config);

    // 앱 상태 초기화 (DB 연결 + 마이그레이션)
    let state = AppState::new(&config).await?;
    let state = Arc::new(state);

    // 라우터 구성
    let app = create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("MindNest API listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// 라우터 생성
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Auth
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/logout", post(handlers::auth::logout))
        // Users
        .route(
            "/api/v1/users/me",
            get(handlers::users::get_me).put(handlers::users::update_me),
        )
        .route("/api/v1/users/:id", get(handlers::users::get_user))
        // Journal entries
        .route(
            "/api/v1/journals",
            get(handlers::journals::list).post(handlers::journals::create),
        )
        .route(
            "/api/v1/journals/:id",
            get(handlers::journals::get)
                .put(handlers::journals::update)
                .delete(handlers::journals::delete),
        )
        // Mood logs
        .route(
            "/api/v1/moods",
            get(handlers::moods::list).post(handlers::moods::create),
        )
        .route(
            "/api/v1/moods/:id",
            get(handlers::moods::get).delete(handlers::moods::delete),
        )
        // Stress events
        .route(
            "/api/v1/stress",
            get(handlers::stress::list).post(handlers::stress::create),
        )
        .route(
            "/api/v1/stress/:id",
            get(handlers::stress::get).delete(handlers::stress::delete),
        )
        // Self-care activities
        .route(
            "/api/v1/self-care",
            get(handlers::self_care::list).post(handlers::self_care::create),
        )
        .route(
            "/api/v1/self-care/:id",
            get(handlers::self_care::get)
                .patch(handlers::self_care::update)
                .delete(handlers::self_care::delete),
        )
        // Analytics
        .route(
            "/api/v1/analytics/mood-summary",
            get(handlers::analytics::mood_summary),
        )
        .route(
            "/api/v1/analytics/mood-trend",
            get(handlers::analytics::mood_trend),
        )
        .route(
            "/api/v1/analytics/stress-patterns",
            get(handlers::analytics::stress_patterns),
        )
        .route(
            "/api/v1/analytics/journaling-streak",
            get(handlers::analytics::journaling_streak),
        )
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(from_fn(middleware::request_id))
        // State
        .with_state(state)
}
