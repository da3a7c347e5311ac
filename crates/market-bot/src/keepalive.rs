//! keep-alive HTTP 서버.
//!
//! 호스팅 환경의 유휴 종료를 막기 위한 단일 엔드포인트(`GET /`)만 제공합니다.

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

/// 응답 본문.
pub const RUNNING_MESSAGE: &str = "Market Bot is running!";

async fn running() -> &'static str {
    RUNNING_MESSAGE
}

/// keep-alive 라우터.
pub fn router() -> Router {
    Router::new()
        .route("/", get(running))
        .layer(TraceLayer::new_for_http())
}

/// 리스너에서 서버를 실행합니다. `shutdown`이 취소되면 종료합니다.
pub async fn serve(listener: TcpListener, shutdown: CancellationToken) -> std::io::Result<()> {
    let addr: Option<SocketAddr> = listener.local_addr().ok();
    info!(addr = ?addr, "keep-alive 서버 시작");

    axum::serve(listener, router())
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("keep-alive 서버 종료");
    Ok(())
}
