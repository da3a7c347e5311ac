//! Discord 배포기.
//!
//! serenity REST 클라이언트로 채널의 이전 봇 메시지를 정리하고 임베드를 게시합니다.
//! HTTP 404는 [`DistributionError::DestinationNotFound`], 403은
//! [`DistributionError::Forbidden`]으로 변환되어 레지스트리 자가 치유에 사용됩니다.

use std::sync::Arc;

use async_trait::async_trait;
use market_core::DestinationId;
use serenity::all::{
    ChannelId, CreateEmbed, CreateEmbedFooter, CreateMessage, GetMessages, Http, MessageId, UserId,
};
use tracing::{debug, warn};

use crate::types::{DistributionError, DistributionResult, Embed, Publisher};

/// 플랫폼 중립 임베드를 serenity 빌더로 변환합니다.
pub fn to_create_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new()
        .title(&embed.title)
        .description(&embed.description)
        .colour(embed.color);
    for field in &embed.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer));
    }
    builder
}

/// serenity 에러를 배포 에러로 분류합니다.
pub fn classify_error(destination: DestinationId, err: serenity::Error) -> DistributionError {
    match &err {
        serenity::Error::Http(http_err) => match http_err.status_code().map(|s| s.as_u16()) {
            Some(404) => DistributionError::DestinationNotFound(destination),
            Some(403) => DistributionError::Forbidden(destination),
            Some(429) => DistributionError::RateLimited(destination),
            Some(_) => DistributionError::Platform(err.to_string()),
            None => DistributionError::Network(err.to_string()),
        },
        _ => DistributionError::Platform(err.to_string()),
    }
}

/// Discord 채널 배포기.
pub struct DiscordPublisher {
    http: Arc<Http>,
    bot_user: UserId,
}

impl DiscordPublisher {
    /// 새 배포기를 생성합니다.
    ///
    /// `bot_user`는 정리 대상 메시지를 고르는 데 사용됩니다.
    pub fn new(http: Arc<Http>, bot_user: UserId) -> Self {
        Self { http, bot_user }
    }

    fn channel(destination: DestinationId) -> DistributionResult<ChannelId> {
        // 0은 유효한 Discord ID가 아님
        if destination.0 == 0 {
            return Err(DistributionError::DestinationNotFound(destination));
        }
        Ok(ChannelId::new(destination.0))
    }

    async fn delete_each(&self, channel: ChannelId, ids: &[MessageId]) -> DistributionResult<usize> {
        let mut deleted = 0;
        for id in ids {
            match channel.delete_message(self.http.as_ref(), *id).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    let err = classify_error(DestinationId(channel.get()), e);
                    if err.is_invalid_destination() {
                        return Err(err);
                    }
                    warn!(channel = %channel, message = %id, error = %err, "메시지 삭제 실패");
                }
            }
        }
        Ok(deleted)
    }
}

#[async_trait]
impl Publisher for DiscordPublisher {
    fn name(&self) -> &str {
        "discord"
    }

    async fn clear_recent(&self, destination: DestinationId, limit: u8) -> DistributionResult<usize> {
        let channel = Self::channel(destination)?;

        let messages = channel
            .messages(self.http.as_ref(), GetMessages::new().limit(limit))
            .await
            .map_err(|e| classify_error(destination, e))?;

        let ids: Vec<MessageId> = messages
            .iter()
            .filter(|m| m.author.id == self.bot_user)
            .map(|m| m.id)
            .collect();

        match ids.len() {
            0 => Ok(0),
            1 => self.delete_each(channel, &ids).await,
            n => match channel.delete_messages(self.http.as_ref(), &ids).await {
                Ok(()) => {
                    debug!(channel = %channel, count = n, "이전 메시지 일괄 삭제");
                    Ok(n)
                }
                Err(e) => {
                    let err = classify_error(destination, e);
                    if err.is_invalid_destination() {
                        return Err(err);
                    }
                    // 14일이 지난 메시지는 일괄 삭제 불가
                    warn!(channel = %channel, error = %err, "일괄 삭제 실패, 개별 삭제로 전환");
                    self.delete_each(channel, &ids).await
                }
            },
        }
    }

    async fn publish(&self, destination: DestinationId, embeds: &[Embed]) -> DistributionResult<()> {
        let channel = Self::channel(destination)?;

        for embed in embeds {
            channel
                .send_message(
                    self.http.as_ref(),
                    CreateMessage::new().embed(to_create_embed(embed)),
                )
                .await
                .map_err(|e| classify_error(destination, e))?;
        }

        debug!(channel = %channel, count = embeds.len(), "임베드 게시 완료");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_destination_is_not_found() {
        assert_eq!(
            DiscordPublisher::channel(DestinationId(0)).unwrap_err(),
            DistributionError::DestinationNotFound(DestinationId(0))
        );
        assert_eq!(
            DiscordPublisher::channel(DestinationId(7)).unwrap(),
            ChannelId::new(7)
        );
    }

    #[test]
    fn test_non_http_error_is_platform() {
        let err = classify_error(
            DestinationId(1),
            serenity::Error::Other("gateway closed"),
        );
        assert!(matches!(err, DistributionError::Platform(_)));
        assert!(!err.is_invalid_destination());
    }
}
