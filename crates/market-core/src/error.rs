//! 마켓 봇의 공통 에러 타입.
//!
//! 심볼별 조회 실패(`market-feed`)와 목적지별 배포 실패(`market-notification`)는
//! 각 크레이트에서 정의하고, 여기에는 프로세스 전반에서 쓰이는 에러만 둡니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum MarketError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 명령어 인자 검증 실패
    #[error("검증 실패: {0}")]
    Validation(#[from] ValidationError),

    /// 시작 단계 치명적 에러 (로그인 실패 등)
    #[error("시작 실패: {0}")]
    Startup(String),

    /// 파일 I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

/// 핵심 작업을 위한 Result 타입.
pub type MarketResult<T> = Result<T, MarketError>;

/// 사용자 입력 검증 에러.
///
/// 상태 변경 없이 호출한 사용자에게 그대로 보고됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 인자가 누락됨
    #[error("인자가 필요합니다")]
    MissingArgument,

    /// 숫자가 아님
    #[error("숫자가 아닙니다: {0}")]
    NotANumber(String),

    /// 허용 범위를 벗어남
    #[error("{value}은(는) 허용 범위({min}..={max})를 벗어났습니다")]
    OutOfRange { value: i64, min: i64, max: i64 },
}

impl MarketError {
    /// 프로세스를 종료해야 하는 에러인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MarketError::Config(_) | MarketError::Startup(_))
    }
}

impl From<config::ConfigError> for MarketError {
    fn from(err: config::ConfigError) -> Self {
        MarketError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_fatal() {
        assert!(MarketError::Startup("login".to_string()).is_fatal());
        assert!(MarketError::Config("token".to_string()).is_fatal());
        assert!(!MarketError::Validation(ValidationError::MissingArgument).is_fatal());
    }

    #[test]
    fn test_validation_error_message() {
        let err = ValidationError::OutOfRange {
            value: 1441,
            min: 1,
            max: 1440,
        };
        assert!(err.to_string().contains("1441"));
    }
}
