//! 시세 조회 에러 타입.

use std::fmt;

use market_core::InvalidQuote;
use thiserror::Error;

/// 심볼별 조회 실패 원인.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// 네트워크/연결 에러
    Network(String),
    /// 요청 타임아웃
    Timeout,
    /// 성공이 아닌 HTTP 상태 코드
    HttpStatus(u16),
    /// 소스가 반환한 에러
    Api(String),
    /// 파싱/역직렬화 에러
    Parse(String),
    /// 필수 필드 누락
    MissingField(&'static str),
    /// 응답에 데이터가 없음
    NoData,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {}", msg),
            Self::Timeout => write!(f, "request timed out"),
            Self::HttpStatus(code) => write!(f, "HTTP {}", code),
            Self::Api(msg) => write!(f, "source error: {}", msg),
            Self::Parse(msg) => write!(f, "parse error: {}", msg),
            Self::MissingField(field) => write!(f, "missing field: {}", field),
            Self::NoData => write!(f, "no data"),
        }
    }
}

/// 심볼 하나의 조회 실패.
///
/// 심볼과 사람이 읽을 수 있는 원인을 함께 담습니다. 치명적이지 않으며
/// 해당 주기에서 그 심볼만 건너뜁니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{symbol}: {kind}")]
pub struct FetchError {
    /// 실패한 심볼
    pub symbol: String,
    /// 실패 원인
    pub kind: FetchErrorKind,
}

impl FetchError {
    /// 새 조회 에러를 생성합니다.
    pub fn new(symbol: impl Into<String>, kind: FetchErrorKind) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
        }
    }

    /// reqwest 에러를 변환합니다.
    pub fn from_reqwest(symbol: &str, err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FetchErrorKind::Timeout
        } else if err.is_decode() {
            FetchErrorKind::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            FetchErrorKind::HttpStatus(status.as_u16())
        } else {
            FetchErrorKind::Network(err.to_string())
        };
        Self::new(symbol, kind)
    }

    /// 시세 생성 실패를 변환합니다.
    pub fn from_invalid(symbol: &str, err: InvalidQuote) -> Self {
        let kind = match err {
            InvalidQuote::EmptyRange => FetchErrorKind::MissingField("indicators.quote.low/high"),
            InvalidQuote::ZeroPreviousClose => FetchErrorKind::MissingField("chartPreviousClose"),
            InvalidQuote::NonFinite { field } => {
                FetchErrorKind::Parse(format!("non-finite {}", field))
            }
        };
        Self::new(symbol, kind)
    }

    /// 재시도로 해결될 수 있는 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        match &self.kind {
            FetchErrorKind::Network(_) | FetchErrorKind::Timeout => true,
            FetchErrorKind::HttpStatus(code) => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

/// 시세 소스 생성 에러.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP 클라이언트 생성 실패
    #[error("HTTP 클라이언트 생성 실패: {0}")]
    Client(#[from] reqwest::Error),

    /// 잘못된 기본 URL
    #[error("잘못된 기본 URL: {0}")]
    InvalidBaseUrl(String),
}
