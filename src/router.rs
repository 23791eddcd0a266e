use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::{AppState, middleware::log_errors, routes};

// 冷却事件相关的路由
pub fn cooldown_routes() -> Router<AppState> {
    Router::new()
        .route("/cooldown/set", post(routes::cooldown::set_cooldown))
        .route("/cooldown/get", get(routes::cooldown::get_cooldown))
        .route("/cooldown/del", post(routes::cooldown::del_cooldown))
        .route("/cooldown/check", get(routes::cooldown::check_cooldown))
        .route("/cooldown/sweep", post(routes::cooldown::sweep_expired))
        .route("/cooldown/backup", post(routes::cooldown::backup_now))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let base_uri = format!("/{}", state.config.api_base_uri.trim_matches('/'));

    // axum 不允许在根路径 nest
    let router = if base_uri == "/" {
        Router::new().merge(cooldown_routes())
    } else {
        Router::new().nest(&base_uri, cooldown_routes())
    };

    let router = router
        .route("/health", get(health))
        .layer(axum::middleware::from_fn(log_errors));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    router.with_state(state)
}
