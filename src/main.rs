// ==========================================
// 仓库库存驾驶舱 - HTTP 服务主入口
// ==========================================
// 技术栈: tokio + axum
// 系统定位: 只读驾驶舱数据服务
// ==========================================

use anyhow::Context;
use avarias_dashboard::app::{router, AppState};
use avarias_dashboard::config::ConfigManager;
use avarias_dashboard::{logging, perf};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();
    perf::install_slow_stage_threshold();

    tracing::info!("==================================================");
    tracing::info!("{}", avarias_dashboard::APP_NAME);
    tracing::info!("系统版本: {}", avarias_dashboard::VERSION);
    tracing::info!("==================================================");

    let config = ConfigManager::load().context("配置加载失败")?;
    let addr: SocketAddr = config
        .bind
        .parse()
        .with_context(|| format!("无效的监听地址 {}", config.bind))?;

    if !config.source_location(avarias_dashboard::SourceKind::Allocated).is_configured() {
        tracing::warn!("未配置 allocated 数据源（AVARIAS_WORKBOOK_URL / AVARIAS_WORKBOOK_PATH），明细接口将返回 500");
    }

    let state = AppState::new(config).context("应用状态初始化失败")?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("端口绑定失败 {addr}"))?;
    tracing::info!("监听 http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务异常退出")?;

    tracing::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "无法监听退出信号");
    }
}
