//! # Market Core
//!
//! 마켓 봇의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! - 심볼 정의 (`SymbolSpec`) 및 기본 심볼 테이블
//! - 시세 값 객체 (`Quote`, `DayRange`)
//! - 최신 시세 스냅샷 (`Snapshot`)과 병합 규칙
//! - 테넌트/목적지 식별자
//! - 갱신 주기 (`Schedule`) 검증
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;
