//! 채팅 명령어 파싱 및 응답 모델.
//!
//! 접두사(기본 `!`)로 시작하는 메시지를 [`BotCommand`]로 변환합니다.
//! 명령어 단어는 대소문자를 구분하지 않으며 인자는 공백으로 나눕니다.

use crate::types::Embed;

/// 사용자 응답 문구.
pub mod replies {
    pub const SETUP_DONE: &str = "✅ This channel has been set up for market updates!";
    pub const INTERVAL_NOT_A_NUMBER: &str = "❌ Please specify a valid number of minutes";
    pub const INTERVAL_OUT_OF_RANGE: &str =
        "❌ Please specify an interval between 1 and 1440 minutes (24 hours)";
    pub const LOGS_ATTACHED: &str = "Here are the bot logs:";
    pub const LOGS_UNREADABLE: &str = "❌ Could not read log file";
    pub const NOT_ADMIN: &str = "❌ You need administrator permissions to use this command!";
    pub const GENERIC_FAILURE: &str = "❌ An error occurred while processing your command";
    pub const GOLD_FAILURE: &str = "Couldn't fetch gold price. Try again later.";
    pub const FOREX_FAILURE: &str =
        "Invalid format or API error. Use: !forex BASE/TARGET (e.g., !forex USD/JPY)";
    pub const NASDAQ_FAILURE: &str = "Couldn't fetch NASDAQ data. Try again later.";

    /// 주기 변경 성공 문구.
    pub fn interval_set(minutes: u64) -> String {
        format!("✅ Update interval set to {} minutes", minutes)
    }
}

/// 봇 명령어 타입.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// 현재 채널을 자동 업데이트 대상으로 등록
    SetupChannel,
    /// 즉시 조회 후 요약 전송
    MarketUpdate,
    /// 자동 업데이트 주기 변경 (인자 원문)
    SetInterval { minutes: Option<String> },
    /// 최근 로그 조회
    Logs,
    /// 금 선물 단건 조회
    Gold,
    /// 통화쌍 단건 조회 (인자 원문, 예: "USD/JPY")
    Forex { pair: Option<String> },
    /// 나스닥 100 단건 조회
    Nas100,
    /// 알 수 없는 명령어
    Unknown(String),
}

impl BotCommand {
    /// 텍스트에서 명령어 파싱.
    ///
    /// 접두사로 시작하지 않으면 `None`을 반환합니다.
    pub fn parse(prefix: &str, text: &str) -> Option<Self> {
        let body = text.trim().strip_prefix(prefix)?;

        let mut parts = body.split_whitespace();
        let command = parts.next()?.to_lowercase();

        let parsed = match command.as_str() {
            "setup_channel" => BotCommand::SetupChannel,
            "market_update" => BotCommand::MarketUpdate,
            "set_interval" => BotCommand::SetInterval {
                minutes: parts.next().map(|s| s.to_string()),
            },
            "logs" => BotCommand::Logs,
            "gold" => BotCommand::Gold,
            "forex" => BotCommand::Forex {
                pair: parts.next().map(|s| s.to_string()),
            },
            "nas100" => BotCommand::Nas100,
            _ => BotCommand::Unknown(command),
        };
        Some(parsed)
    }

    /// 관리자 권한이 필요한 명령어인지 확인.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            BotCommand::SetupChannel | BotCommand::SetInterval { .. } | BotCommand::Logs
        )
    }

    /// 명령어 이름 (로그용).
    pub fn name(&self) -> &str {
        match self {
            BotCommand::SetupChannel => "setup_channel",
            BotCommand::MarketUpdate => "market_update",
            BotCommand::SetInterval { .. } => "set_interval",
            BotCommand::Logs => "logs",
            BotCommand::Gold => "gold",
            BotCommand::Forex { .. } => "forex",
            BotCommand::Nas100 => "nas100",
            BotCommand::Unknown(name) => name,
        }
    }
}

/// 명령어 응답.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    /// 일반 텍스트
    Text(String),
    /// 임베드 메시지 (각각 개별 메시지)
    Embeds(Vec<Embed>),
    /// 첨부 파일과 안내 문구
    File {
        text: String,
        filename: String,
        data: Vec<u8>,
    },
}

impl CommandReply {
    /// 텍스트 응답 생성.
    pub fn text(text: impl Into<String>) -> Self {
        CommandReply::Text(text.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(BotCommand::parse("!", "!setup_channel"), Some(BotCommand::SetupChannel));
        assert_eq!(BotCommand::parse("!", "!market_update"), Some(BotCommand::MarketUpdate));
        assert_eq!(BotCommand::parse("!", "  !LOGS  "), Some(BotCommand::Logs));
        assert_eq!(
            BotCommand::parse("!", "!set_interval 30"),
            Some(BotCommand::SetInterval {
                minutes: Some("30".to_string())
            })
        );
        assert_eq!(
            BotCommand::parse("!", "!set_interval"),
            Some(BotCommand::SetInterval { minutes: None })
        );
    }

    #[test]
    fn test_parse_non_commands() {
        assert_eq!(BotCommand::parse("!", "hello"), None);
        assert_eq!(BotCommand::parse("!", "!"), None);
        assert_eq!(
            BotCommand::parse("!", "!silver"),
            Some(BotCommand::Unknown("silver".to_string()))
        );
    }

    #[test]
    fn test_parse_quote_commands() {
        assert_eq!(BotCommand::parse("!", "!gold"), Some(BotCommand::Gold));
        assert_eq!(BotCommand::parse("!", "!NAS100"), Some(BotCommand::Nas100));
        assert_eq!(
            BotCommand::parse("!", "!forex usd/jpy"),
            Some(BotCommand::Forex {
                pair: Some("usd/jpy".to_string())
            })
        );
        assert_eq!(
            BotCommand::parse("!", "!forex"),
            Some(BotCommand::Forex { pair: None })
        );
    }

    #[test]
    fn test_custom_prefix() {
        assert_eq!(BotCommand::parse("$", "$logs"), Some(BotCommand::Logs));
        assert_eq!(BotCommand::parse("$", "!logs"), None);
    }

    #[test]
    fn test_requires_admin() {
        assert!(BotCommand::SetupChannel.requires_admin());
        assert!(BotCommand::Logs.requires_admin());
        assert!(BotCommand::SetInterval { minutes: None }.requires_admin());
        assert!(!BotCommand::MarketUpdate.requires_admin());
        assert!(!BotCommand::Gold.requires_admin());
        assert!(!BotCommand::Forex { pair: None }.requires_admin());
        assert!(!BotCommand::Nas100.requires_admin());
    }

    #[test]
    fn test_interval_reply() {
        assert_eq!(replies::interval_set(30), "✅ Update interval set to 30 minutes");
    }
}
