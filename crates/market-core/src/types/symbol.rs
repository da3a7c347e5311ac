//! 조회 대상 심볼 정의.
//!
//! 내부 키(렌더러가 사용하는 이름)와 외부 시세 소스 심볼의 쌍으로 구성됩니다.
//! 심볼 집합은 시작 시 한 번 만들어지고 이후 변경되지 않습니다.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::MarketError;

/// 내부 키와 외부 심볼의 불변 쌍.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolSpec {
    /// 내부 키 (예: "EURUSD", "GOLD")
    pub key: String,
    /// 시세 소스 심볼 (예: "EURUSD=X", "GC=F")
    pub symbol: String,
}

impl SymbolSpec {
    /// 새 심볼 정의를 생성합니다.
    pub fn new(key: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            symbol: symbol.into(),
        }
    }
}

impl fmt::Display for SymbolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key, self.symbol)
    }
}

/// 금 선물 (COMEX) 심볼.
pub const GOLD_FUTURES_SYMBOL: &str = "GC=F";
/// 나스닥 100 지수 심볼.
pub const NASDAQ_100_SYMBOL: &str = "^NDX";

/// 기본 심볼 테이블 (외환 7종, 금 3종, 나스닥 100).
pub fn default_symbols() -> Vec<SymbolSpec> {
    [
        // 외환
        ("EURUSD", "EURUSD=X"),
        ("GBPUSD", "GBPUSD=X"),
        ("USDJPY", "JPY=X"),
        ("USDCHF", "CHF=X"),
        ("AUDUSD", "AUDUSD=X"),
        ("USDCAD", "CAD=X"),
        ("NZDUSD", "NZDUSD=X"),
        // 금 선물 및 ETF
        ("GOLD", GOLD_FUTURES_SYMBOL),
        ("GLD", "GLD"),
        ("IAU", "IAU"),
        // 지수
        ("NAS100", NASDAQ_100_SYMBOL),
    ]
    .into_iter()
    .map(|(key, symbol)| SymbolSpec::new(key, symbol))
    .collect()
}

/// 심볼 목록을 검증합니다.
///
/// 키와 심볼이 비어 있으면 안 되고, 내부 키는 중복될 수 없습니다.
pub fn validate_symbols(specs: &[SymbolSpec]) -> Result<(), MarketError> {
    if specs.is_empty() {
        return Err(MarketError::Config("심볼 목록이 비어 있습니다".to_string()));
    }

    let mut seen = HashSet::new();
    for spec in specs {
        if spec.key.trim().is_empty() || spec.symbol.trim().is_empty() {
            return Err(MarketError::Config(format!(
                "비어 있는 심볼 정의: {:?}",
                spec
            )));
        }
        if !seen.insert(spec.key.as_str()) {
            return Err(MarketError::Config(format!(
                "중복된 심볼 키: {}",
                spec.key
            )));
        }
    }

    Ok(())
}

/// 즉석 조회용 통화쌍 (예: "USD/JPY").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForexPair {
    /// 기준 통화
    pub base: String,
    /// 호가 통화
    pub target: String,
}

impl ForexPair {
    /// 명령어 인자가 없을 때 사용하는 통화쌍.
    pub const DEFAULT: &'static str = "USD/EUR";

    /// `BASE/TARGET` 형식을 파싱합니다. 대소문자는 구분하지 않습니다.
    ///
    /// 구분자가 정확히 하나가 아니거나 통화 코드가 비어 있거나 영문자가 아니면 `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_uppercase();
        let (base, target) = upper.split_once('/')?;
        let valid = |code: &str| !code.is_empty() && code.chars().all(|c| c.is_ascii_alphabetic());
        if !valid(base) || !valid(target) {
            return None;
        }

        Some(Self {
            base: base.to_string(),
            target: target.to_string(),
        })
    }

    /// 시세 소스 심볼 (예: "USDJPY=X").
    pub fn symbol(&self) -> String {
        format!("{}{}=X", self.base, self.target)
    }
}

impl fmt::Display for ForexPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_symbols_are_valid() {
        let specs = default_symbols();
        assert_eq!(specs.len(), 11);
        assert!(validate_symbols(&specs).is_ok());
        assert!(specs.iter().any(|s| s.key == "USDJPY" && s.symbol == "JPY=X"));
        assert!(specs.iter().any(|s| s.key == "NAS100" && s.symbol == "^NDX"));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let specs = vec![
            SymbolSpec::new("GOLD", "GC=F"),
            SymbolSpec::new("GOLD", "GLD"),
        ];
        assert!(validate_symbols(&specs).is_err());
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(validate_symbols(&[]).is_err());
        assert!(validate_symbols(&[SymbolSpec::new("", "GLD")]).is_err());
    }

    #[test]
    fn test_forex_pair_parse() {
        let pair = ForexPair::parse("usd/jpy").unwrap();
        assert_eq!(pair.base, "USD");
        assert_eq!(pair.target, "JPY");
        assert_eq!(pair.symbol(), "USDJPY=X");
        assert_eq!(pair.to_string(), "USD/JPY");

        assert_eq!(ForexPair::parse(ForexPair::DEFAULT).unwrap().symbol(), "USDEUR=X");
    }

    #[test]
    fn test_forex_pair_rejects_bad_format() {
        assert_eq!(ForexPair::parse("USDJPY"), None);
        assert_eq!(ForexPair::parse("USD/"), None);
        assert_eq!(ForexPair::parse("USD/JPY/EUR"), None);
        assert_eq!(ForexPair::parse("US1/JPY"), None);
    }
}
