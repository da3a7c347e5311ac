//! 봇 프로세스 에러 타입.

use market_core::MarketError;
use market_feed::FeedError;
use market_notification::DistributionError;
use thiserror::Error;

/// 봇 에러.
#[derive(Debug, Error)]
pub enum BotError {
    /// 설정/시작 에러
    #[error(transparent)]
    Market(#[from] MarketError),

    /// 시세 소스 생성 실패
    #[error("시세 소스 생성 실패: {0}")]
    Feed(#[from] FeedError),

    /// 배포/응답 실패
    #[error("배포 실패: {0}")]
    Distribution(#[from] DistributionError),

    /// 서버(길드) 밖에서 호출된 명령어
    #[error("서버 채널에서만 사용할 수 있는 명령어입니다")]
    NotInGuild,

    /// 렌더링할 시세가 없음
    #[error("조회된 시세가 없습니다")]
    NoData,

    /// Discord 클라이언트 에러
    #[error("Discord 에러: {0}")]
    Discord(#[from] Box<serenity::Error>),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serenity::Error> for BotError {
    fn from(err: serenity::Error) -> Self {
        BotError::Discord(Box::new(err))
    }
}

/// 봇 작업을 위한 Result 타입.
pub type BotResult<T> = Result<T, BotError>;
