//! Discord 게이트웨이 어댑터.
//!
//! 메시지 이벤트를 [`CommandService`]로 넘기고, 첫 `ready`에서 초기 갱신과
//! 자동 업데이트 타이머를 시작합니다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use market_core::{DestinationId, Schedule, TenantId};
use market_notification::discord::{classify_error, to_create_embed};
use market_notification::{BotCommand, CommandReply, DistributionResult};
use serenity::all::{
    ChannelId, Context, CreateAttachment, CreateMessage, EventHandler, GatewayIntents, Http,
    Message, MessageId, Ready,
};
use tracing::{info, warn};

use crate::commands::{CommandService, Invocation, ReplySink};
use crate::engine::Scheduler;

/// 봇에 필요한 게이트웨이 intent.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// serenity 이벤트 핸들러.
pub struct DiscordHandler {
    prefix: String,
    commands: Arc<CommandService>,
    scheduler: Arc<Scheduler>,
    initial_schedule: Schedule,
    started: AtomicBool,
}

impl DiscordHandler {
    pub fn new(
        prefix: impl Into<String>,
        commands: Arc<CommandService>,
        scheduler: Arc<Scheduler>,
        initial_schedule: Schedule,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            commands,
            scheduler,
            initial_schedule,
            started: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EventHandler for DiscordHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Discord 로그인 완료");

        // 재연결 시에는 다시 시작하지 않음
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        self.scheduler.launch(self.initial_schedule).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(command) = BotCommand::parse(&self.prefix, &msg.content) else {
            return;
        };
        if matches!(command, BotCommand::Unknown(_)) {
            return;
        }

        let is_admin = if command.requires_admin() {
            is_administrator(&ctx, &msg).await
        } else {
            false
        };

        let invocation = Invocation {
            tenant: msg.guild_id.map(|g| TenantId(g.get())),
            destination: DestinationId(msg.channel_id.get()),
            is_admin,
        };
        let sink = ChannelReply {
            http: ctx.http.clone(),
            channel: msg.channel_id,
            reference: msg.id,
        };

        self.commands.handle(command, invocation, &sink).await;
    }
}

/// 호출한 사용자가 서버 관리자 권한을 가졌는지 확인합니다.
async fn is_administrator(ctx: &Context, msg: &Message) -> bool {
    let Some(guild_id) = msg.guild_id else {
        return false;
    };

    let member = match msg.member(ctx).await {
        Ok(member) => member,
        Err(e) => {
            warn!(guild = %guild_id, error = %e, "멤버 조회 실패");
            return false;
        }
    };

    let cached = guild_id
        .to_guild_cached(&ctx.cache)
        .map(|guild| guild.member_permissions(&member).administrator());
    if let Some(is_admin) = cached {
        return is_admin;
    }

    match guild_id.to_partial_guild(ctx).await {
        Ok(guild) => guild.member_permissions(&member).administrator(),
        Err(e) => {
            warn!(guild = %guild_id, error = %e, "서버 정보 조회 실패");
            false
        }
    }
}

/// 명령어를 보낸 채널로 응답을 보내는 sink.
struct ChannelReply {
    http: Arc<Http>,
    channel: ChannelId,
    reference: MessageId,
}

impl ChannelReply {
    async fn post(&self, message: CreateMessage) -> DistributionResult<()> {
        self.channel
            .send_message(self.http.as_ref(), message)
            .await
            .map(|_| ())
            .map_err(|e| classify_error(DestinationId(self.channel.get()), e))
    }

    fn reply(&self) -> CreateMessage {
        CreateMessage::new().reference_message((self.channel, self.reference))
    }
}

#[async_trait]
impl ReplySink for ChannelReply {
    async fn send(&self, reply: CommandReply) -> DistributionResult<()> {
        match reply {
            CommandReply::Text(text) => self.post(self.reply().content(text)).await,
            CommandReply::Embeds(embeds) => {
                for (i, embed) in embeds.iter().enumerate() {
                    let message = if i == 0 { self.reply() } else { CreateMessage::new() };
                    self.post(message.embed(to_create_embed(embed))).await?;
                }
                Ok(())
            }
            CommandReply::File {
                text,
                filename,
                data,
            } => {
                let attachment = CreateAttachment::bytes(data, filename);
                self.post(self.reply().content(text).add_file(attachment)).await
            }
        }
    }
}
