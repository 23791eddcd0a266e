use cooldown_service::{
    AppState,
    config::Config,
    cooldown::{CooldownScheduler, RestoreOutcome},
    router::create_router,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let state = AppState::new(config.clone());

    // 启动时从备份文件恢复，备份文件损坏时拒绝启动以免覆盖数据
    match state.store.restore(&state.registry).await {
        Ok(RestoreOutcome::Restored { tokens, records }) => {
            tracing::info!(tokens, records, "Cooldown data restored");
        }
        Ok(RestoreOutcome::Missing) => {}
        Err(e) => {
            tracing::error!("Failed to restore cooldown data: {}", e);
            std::process::exit(1);
        }
    }

    let scheduler = CooldownScheduler::start(
        state.registry.clone(),
        state.store.clone(),
        config.autoremove_period(),
        config.autobackup_period(),
    );

    let app = create_router(state.clone());

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("Server error: {}", e);
    }

    // 退出前停止定时任务并做最后一次备份
    scheduler
        .shutdown_and_backup(&state.store, &state.registry)
        .await;
    tracing::info!("Cooldown service stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
