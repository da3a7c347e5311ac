//! Market Bot 실행 파일.

use std::sync::Arc;

use anyhow::Context as _;
use market_bot::discord::{intents, DiscordHandler};
use market_bot::{keepalive, CommandService, Engine, EngineConfig, Scheduler};
use market_core::{init_logging, AppConfig};
use market_feed::YahooQuoteSource;
use market_notification::DiscordPublisher;
use secrecy::ExposeSecret;
use serenity::all::{Client, Http};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 설정 로드
    let config = AppConfig::from_env().context("설정 로드 실패")?;

    // 2. 로깅 초기화
    init_logging(config.logging.to_log_config())
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;
    info!(
        symbols = config.symbols.len(),
        interval_minutes = config.schedule().minutes(),
        "Market Bot 시작"
    );

    let shutdown = CancellationToken::new();

    // 3. keep-alive 서버
    let addr = format!("{}:{}", config.keepalive.host, config.keepalive.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("keep-alive 서버 바인딩 실패: {}", addr))?;
    let keepalive = tokio::spawn(keepalive::serve(listener, shutdown.clone()));

    // 4. Discord 로그인 확인 (토큰 검증)
    let token = config.discord_token()?.expose_secret().to_string();
    let http = Arc::new(Http::new(&token));
    let bot_user = http
        .get_current_user()
        .await
        .context("Discord 로그인 실패")?;
    info!(user = %bot_user.name, "Discord 인증 완료");

    // 5. 엔진 구성
    let source = Arc::new(YahooQuoteSource::new(&config.feed).context("시세 소스 생성 실패")?);
    let publisher = Arc::new(DiscordPublisher::new(http, bot_user.id));
    let engine = Arc::new(Engine::new(
        source,
        publisher,
        EngineConfig {
            symbols: config.symbols.clone(),
            cleanup_limit: config.discord.cleanup_limit,
            schedule: config.schedule(),
        },
    ));
    let scheduler = Arc::new(Scheduler::new(engine.clone()));
    let commands = Arc::new(CommandService::new(
        engine.clone(),
        scheduler.clone(),
        config.logging.file.clone(),
        config.logs_command.clone(),
    ));

    // 6. 게이트웨이 연결 (ready에서 초기 갱신 및 타이머 시작)
    let handler = DiscordHandler::new(
        config.discord.command_prefix.clone(),
        commands,
        scheduler.clone(),
        config.schedule(),
    );
    let mut client = Client::builder(&token, intents())
        .event_handler(handler)
        .await
        .context("Discord 클라이언트 생성 실패")?;

    let shard_manager = client.shard_manager.clone();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
        shard_manager.shutdown_all().await;
    });

    let result = client.start().await;

    // 7. 정리
    scheduler.stop().await;
    shutdown.cancel();
    match keepalive.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "keep-alive 서버 에러"),
        Err(e) => warn!(error = %e, "keep-alive 태스크 종료 실패"),
    }

    if let Err(e) = result {
        error!(error = %e, "Discord 연결 종료");
        return Err(e).context("Discord 게이트웨이 에러");
    }

    info!("Market Bot 종료");
    Ok(())
}

/// Ctrl+C 또는 SIGTERM 대기.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C 핸들러 설치 실패");
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
                error!(error = %e, "SIGTERM 핸들러 설치 실패");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("Ctrl+C 수신, 종료 중..."),
        _ = terminate => warn!("SIGTERM 수신, 종료 중..."),
    }
}
