//! 채팅 명령어 처리.
//!
//! 플랫폼에 독립적인 명령어 로직입니다. 응답은 [`ReplySink`]로 보내며
//! Discord 어댑터는 이 trait을 구현해 호출한 채널로 전달합니다.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use market_core::{
    DestinationId, ForexPair, LogsCommandConfig, TenantId, ValidationError, GOLD_FUTURES_SYMBOL,
    NASDAQ_100_SYMBOL,
};
use market_notification::{
    render_forex_quote, render_gold_quote, render_nasdaq_quote, replies, BotCommand,
    CommandReply, DistributionResult,
};
use tracing::{error, info, warn};

use crate::engine::{Engine, Scheduler};
use crate::error::{BotError, BotResult};

/// 명령어를 호출한 위치와 사용자 권한.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    /// 호출한 커뮤니티 (DM이면 `None`)
    pub tenant: Option<TenantId>,
    /// 호출한 채널
    pub destination: DestinationId,
    /// 관리자 권한 여부
    pub is_admin: bool,
}

/// 명령어 응답 전송 trait.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// 호출한 채널로 응답을 보냅니다.
    async fn send(&self, reply: CommandReply) -> DistributionResult<()>;
}

/// 명령어 서비스.
pub struct CommandService {
    engine: Arc<Engine>,
    scheduler: Arc<Scheduler>,
    log_file: PathBuf,
    logs: LogsCommandConfig,
}

impl CommandService {
    /// 새 명령어 서비스를 생성합니다.
    pub fn new(
        engine: Arc<Engine>,
        scheduler: Arc<Scheduler>,
        log_file: impl Into<PathBuf>,
        logs: LogsCommandConfig,
    ) -> Self {
        Self {
            engine,
            scheduler,
            log_file: log_file.into(),
            logs,
        }
    }

    /// 명령어를 처리합니다.
    ///
    /// 알 수 없는 명령어는 무시합니다. 처리 중 에러는 로그에 남기고
    /// 사용자에게는 짧은 실패 문구만 보냅니다.
    pub async fn handle(&self, command: BotCommand, invocation: Invocation, sink: &dyn ReplySink) {
        if let BotCommand::Unknown(name) = &command {
            tracing::debug!(command = %name, "알 수 없는 명령어 무시");
            return;
        }

        info!(
            command = command.name(),
            tenant = ?invocation.tenant.map(|t| t.0),
            destination = %invocation.destination,
            "명령어 수신"
        );

        if command.requires_admin() && !invocation.is_admin {
            if let Err(e) = sink.send(CommandReply::text(replies::NOT_ADMIN)).await {
                warn!(error = %e, "응답 전송 실패");
            }
            return;
        }

        if let Err(e) = self.dispatch(&command, invocation, sink).await {
            error!(command = command.name(), error = %e, "명령어 처리 실패");
            if let Err(e) = sink.send(CommandReply::text(replies::GENERIC_FAILURE)).await {
                warn!(error = %e, "응답 전송 실패");
            }
        }
    }

    async fn dispatch(
        &self,
        command: &BotCommand,
        invocation: Invocation,
        sink: &dyn ReplySink,
    ) -> BotResult<()> {
        match command {
            BotCommand::SetupChannel => self.setup_channel(invocation, sink).await,
            BotCommand::MarketUpdate => self.market_update(sink).await,
            BotCommand::SetInterval { minutes } => self.set_interval(minutes.as_deref(), sink).await,
            BotCommand::Logs => self.logs(sink).await,
            BotCommand::Gold => self.gold(sink).await,
            BotCommand::Forex { pair } => self.forex(pair.as_deref(), sink).await,
            BotCommand::Nas100 => self.nas100(sink).await,
            BotCommand::Unknown(_) => Ok(()),
        }
    }

    async fn setup_channel(&self, invocation: Invocation, sink: &dyn ReplySink) -> BotResult<()> {
        let tenant = invocation.tenant.ok_or(BotError::NotInGuild)?;

        sink.send(CommandReply::text(replies::SETUP_DONE)).await?;
        self.engine.setup(tenant, invocation.destination).await?;
        Ok(())
    }

    async fn market_update(&self, sink: &dyn ReplySink) -> BotResult<()> {
        let embeds = self.engine.manual_update().await;
        if embeds.is_empty() {
            return Err(BotError::NoData);
        }
        sink.send(CommandReply::Embeds(embeds)).await?;
        Ok(())
    }

    async fn gold(&self, sink: &dyn ReplySink) -> BotResult<()> {
        let reply = match self.engine.quote(GOLD_FUTURES_SYMBOL).await {
            Ok(quote) => CommandReply::Embeds(vec![render_gold_quote(&quote)]),
            Err(e) => {
                warn!(error = %e, "금 시세 조회 실패");
                CommandReply::text(replies::GOLD_FAILURE)
            }
        };
        sink.send(reply).await?;
        Ok(())
    }

    async fn forex(&self, arg: Option<&str>, sink: &dyn ReplySink) -> BotResult<()> {
        let raw = arg.unwrap_or(ForexPair::DEFAULT);
        let reply = match ForexPair::parse(raw) {
            Some(pair) => match self.engine.quote(&pair.symbol()).await {
                Ok(quote) => CommandReply::Embeds(vec![render_forex_quote(&pair, &quote)]),
                Err(e) => {
                    warn!(pair = %pair, error = %e, "환율 조회 실패");
                    CommandReply::text(replies::FOREX_FAILURE)
                }
            },
            None => {
                info!(arg = raw, "잘못된 통화쌍 형식");
                CommandReply::text(replies::FOREX_FAILURE)
            }
        };
        sink.send(reply).await?;
        Ok(())
    }

    async fn nas100(&self, sink: &dyn ReplySink) -> BotResult<()> {
        let reply = match self.engine.quote(NASDAQ_100_SYMBOL).await {
            Ok(quote) => CommandReply::Embeds(vec![render_nasdaq_quote(&quote)]),
            Err(e) => {
                warn!(error = %e, "나스닥 시세 조회 실패");
                CommandReply::text(replies::NASDAQ_FAILURE)
            }
        };
        sink.send(reply).await?;
        Ok(())
    }

    async fn set_interval(&self, arg: Option<&str>, sink: &dyn ReplySink) -> BotResult<()> {
        let reply = match self.scheduler.set_interval(arg).await {
            Ok(schedule) => replies::interval_set(schedule.minutes()),
            Err(ValidationError::OutOfRange { .. }) => replies::INTERVAL_OUT_OF_RANGE.to_string(),
            Err(e) => {
                info!(error = %e, "잘못된 주기 인자");
                replies::INTERVAL_NOT_A_NUMBER.to_string()
            }
        };
        sink.send(CommandReply::Text(reply)).await?;
        Ok(())
    }

    async fn logs(&self, sink: &dyn ReplySink) -> BotResult<()> {
        let reply = match tokio::fs::read_to_string(&self.log_file).await {
            Ok(content) => self.logs_reply(content),
            Err(e) => {
                warn!(path = %self.log_file.display(), error = %e, "로그 파일 읽기 실패");
                CommandReply::text(replies::LOGS_UNREADABLE)
            }
        };
        sink.send(reply).await?;
        Ok(())
    }

    /// 코드 블록을 포함한 길이가 한도 안이면 인라인, 넘으면 첨부 파일.
    fn logs_reply(&self, content: String) -> CommandReply {
        let inline = format!("```\n{}\n```", content);
        if inline.chars().count() <= self.logs.inline_limit {
            CommandReply::Text(inline)
        } else {
            CommandReply::File {
                text: replies::LOGS_ATTACHED.to_string(),
                filename: self.logs.attachment_name.clone(),
                data: content.into_bytes(),
            }
        }
    }
}
