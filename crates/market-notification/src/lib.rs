//! # Market Notification
//!
//! 시세 요약 렌더링 및 채팅 채널 배포.
//!
//! - 플랫폼 중립 임베드 모델과 [`Publisher`] trait
//! - 외환/금/나스닥 요약 렌더러
//! - 채팅 명령어 파서
//! - Discord 배포기 (serenity)
//!
//! # 채팅 명령어
//!
//! - `!setup_channel` - 현재 채널을 자동 업데이트 대상으로 등록 (관리자)
//! - `!market_update` - 즉시 조회 후 요약 전송
//! - `!set_interval <분>` - 자동 업데이트 주기 변경 (관리자, 1~1440)
//! - `!logs` - 최근 로그 조회 (관리자)

pub mod command;
pub mod discord;
pub mod render;
pub mod types;

pub use command::*;
pub use discord::DiscordPublisher;
pub use render::*;
pub use types::*;
