//! 설정 관리.
//!
//! 기본값 → 설정 파일(선택) → `MARKET_BOT__*` 환경 변수 순으로 덮어씁니다.
//! 봇 토큰은 `DISCORD_TOKEN` 환경 변수에서 읽습니다.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{MarketError, MarketResult};
use crate::logging::{LogConfig, LogFormat};
use crate::types::{default_symbols, validate_symbols, Schedule, SymbolSpec};

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// 채팅 플랫폼 설정
    #[serde(default)]
    pub discord: DiscordConfig,
    /// 자동 갱신 설정
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// 시세 소스 설정
    #[serde(default)]
    pub feed: FeedConfig,
    /// keep-alive 서버 설정
    #[serde(default)]
    pub keepalive: KeepAliveConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// `logs` 명령어 설정
    #[serde(default)]
    pub logs_command: LogsCommandConfig,
    /// 조회 대상 심볼
    #[serde(default = "default_symbols")]
    pub symbols: Vec<SymbolSpec>,
}

/// 채팅 플랫폼 설정.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// 봇 토큰
    #[serde(deserialize_with = "deserialize_secret")]
    pub token: Option<SecretString>,
    /// 명령어 접두사
    pub command_prefix: String,
    /// 정리할 최근 메시지 최대 개수
    pub cleanup_limit: u8,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            command_prefix: "!".to_string(),
            cleanup_limit: 10,
        }
    }
}

/// 자동 갱신 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// 기본 갱신 주기 (분)
    pub interval_minutes: i64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_minutes: crate::types::DEFAULT_INTERVAL_MINUTES as i64,
        }
    }
}

/// 시세 소스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    /// API 기본 URL
    pub base_url: String,
    /// 일중 샘플 간격
    pub interval: String,
    /// 조회 범위
    pub range: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            interval: "15m".to_string(),
            range: "1d".to_string(),
            timeout_secs: 10,
        }
    }
}

impl FeedConfig {
    /// 요청 타임아웃을 Duration으로 반환
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// keep-alive 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeepAliveConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 로그 파일 경로
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            file: PathBuf::from("bot.log"),
        }
    }
}

impl LoggingConfig {
    /// 로깅 초기화용 설정으로 변환합니다.
    ///
    /// `LOG_FORMAT` 환경 변수가 있으면 설정 파일의 형식보다 우선합니다.
    pub fn to_log_config(&self) -> LogConfig {
        let format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .or_else(|| self.format.parse().ok())
            .unwrap_or(LogFormat::Compact);
        LogConfig::new(self.level.clone())
            .with_format(format)
            .with_file(self.file.clone())
    }
}

/// `logs` 명령어 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogsCommandConfig {
    /// 인라인으로 보낼 최대 문자 수 (초과 시 첨부 파일)
    pub inline_limit: usize,
    /// 첨부 파일 이름
    pub attachment_name: String,
}

impl Default for LogsCommandConfig {
    fn default() -> Self {
        Self {
            inline_limit: 2000,
            attachment_name: "bot_logs.txt".to_string(),
        }
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(SecretString::from))
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> MarketResult<Self> {
        let builder = config::Config::builder()
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("MARKET_BOT")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("discord.token", std::env::var("DISCORD_TOKEN").ok())?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// `.env`를 읽은 뒤 기본 경로(또는 `MARKET_BOT_CONFIG`)에서 설정을 로드합니다.
    pub fn from_env() -> MarketResult<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var("MARKET_BOT_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    /// 값의 범위를 검증합니다.
    pub fn validate(&self) -> MarketResult<()> {
        Schedule::from_minutes(self.schedule.interval_minutes)
            .map_err(|e| MarketError::Config(format!("schedule.interval_minutes: {}", e)))?;

        validate_symbols(&self.symbols)?;

        if !(1..=100).contains(&self.discord.cleanup_limit) {
            return Err(MarketError::Config(format!(
                "discord.cleanup_limit은 1..=100 이어야 합니다: {}",
                self.discord.cleanup_limit
            )));
        }

        if self.discord.command_prefix.is_empty() {
            return Err(MarketError::Config(
                "discord.command_prefix가 비어 있습니다".to_string(),
            ));
        }

        Ok(())
    }

    /// 검증된 기본 갱신 주기.
    pub fn schedule(&self) -> Schedule {
        Schedule::from_minutes(self.schedule.interval_minutes).unwrap_or_default()
    }

    /// 봇 토큰을 반환합니다. 없으면 시작할 수 없습니다.
    pub fn discord_token(&self) -> MarketResult<&SecretString> {
        self.discord.token.as_ref().ok_or_else(|| {
            MarketError::Startup("DISCORD_TOKEN 환경변수가 설정되지 않았습니다".to_string())
        })
    }
}
