//! # Market Bot
//!
//! 외환, 금, 나스닥 100 시세를 주기적으로 조회하여 등록된 Discord 채널에 요약을 게시하는 봇.
//!
//! - [`engine`]: 갱신/배포 엔진과 스케줄러
//! - [`commands`]: 채팅 명령어 처리
//! - [`discord`]: serenity 게이트웨이 어댑터
//! - [`keepalive`]: 상태 확인용 HTTP 서버

pub mod commands;
pub mod discord;
pub mod engine;
pub mod error;
pub mod keepalive;

pub use commands::{CommandService, Invocation, ReplySink};
pub use engine::{Engine, EngineConfig, Scheduler};
pub use error::{BotError, BotResult};
