//! 시세 값 객체.
//!
//! `Quote`는 생성 시점에 변동폭과 변동률을 계산하며 이후 변경되지 않습니다.
//! 모든 수치는 유한한 부동소수점 값입니다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 시세 생성 실패 사유.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidQuote {
    /// 유한하지 않은 값
    #[error("유한하지 않은 값: {field}")]
    NonFinite { field: &'static str },

    /// 전일 종가가 0
    #[error("전일 종가가 0입니다")]
    ZeroPreviousClose,

    /// 일중 범위 샘플 없음
    #[error("일중 범위 샘플이 없습니다")]
    EmptyRange,
}

/// 저가/고가 범위.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayRange {
    /// 저가
    pub low: f64,
    /// 고가
    pub high: f64,
}

impl DayRange {
    /// 일중 저가/고가 샘플에서 범위를 계산합니다.
    ///
    /// `None`, 0, 유한하지 않은 샘플은 제외합니다.
    /// 남는 샘플이 없으면 `EmptyRange`를 반환합니다.
    pub fn from_samples(lows: &[Option<f64>], highs: &[Option<f64>]) -> Result<Self, InvalidQuote> {
        let low = usable(lows).fold(f64::INFINITY, f64::min);
        let high = usable(highs).fold(f64::NEG_INFINITY, f64::max);

        if !low.is_finite() || !high.is_finite() {
            return Err(InvalidQuote::EmptyRange);
        }

        Ok(Self { low, high })
    }
}

fn usable(samples: &[Option<f64>]) -> impl Iterator<Item = f64> + '_ {
    samples
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite() && *v != 0.0)
}

/// 한 시점의 시세 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// 현재가
    pub price: f64,
    /// 전일 종가
    pub previous_close: f64,
    /// 변동폭 (`price - previous_close`)
    pub change: f64,
    /// 변동률 (%)
    pub change_percent: f64,
    /// 일중 범위
    pub day_range: DayRange,
    /// 거래량
    pub volume: u64,
    /// 통화 코드
    pub currency: String,
    /// 52주 범위 (소스가 제공한 경우)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_range: Option<DayRange>,
}

impl Quote {
    /// 새 시세를 생성합니다.
    ///
    /// 변동폭과 변동률은 여기서만 계산됩니다.
    pub fn new(
        price: f64,
        previous_close: f64,
        day_range: DayRange,
        volume: u64,
        currency: impl Into<String>,
    ) -> Result<Self, InvalidQuote> {
        check_finite("price", price)?;
        check_finite("previous_close", previous_close)?;
        check_finite("day_low", day_range.low)?;
        check_finite("day_high", day_range.high)?;

        if previous_close == 0.0 {
            return Err(InvalidQuote::ZeroPreviousClose);
        }

        let change = price - previous_close;
        let change_percent = change / previous_close * 100.0;

        Ok(Self {
            price,
            previous_close,
            change,
            change_percent,
            day_range,
            volume,
            currency: currency.into(),
            year_range: None,
        })
    }

    /// 52주 범위를 설정합니다.
    pub fn with_year_range(mut self, year_range: Option<DayRange>) -> Self {
        self.year_range = year_range.filter(|r| r.low.is_finite() && r.high.is_finite());
        self
    }

    /// 상승(또는 보합) 여부.
    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), InvalidQuote> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(InvalidQuote::NonFinite { field })
    }
}
