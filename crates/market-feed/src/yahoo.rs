//! Yahoo Finance 시세 소스.
//!
//! chart API(`/v8/finance/chart/{symbol}`)를 일중 간격으로 조회하여
//! 현재가, 전일 종가, 일중 범위, 거래량을 추출합니다.
//!
//! # 심볼 형식
//!
//! - 외환: "EURUSD=X", "JPY=X"
//! - 선물: "GC=F"
//! - ETF: "GLD", "IAU"
//! - 지수: "^NDX"
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use market_core::FeedConfig;
//! use market_feed::{QuoteSource, YahooQuoteSource};
//!
//! let source = YahooQuoteSource::new(&FeedConfig::default())?;
//! let quote = source.fetch("GC=F").await?;
//! ```

use async_trait::async_trait;
use market_core::{DayRange, FeedConfig, Quote};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::{FeedError, FetchError, FetchErrorKind, FetchResult, QuoteSource};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; market-pulse/0.1)";

/// chart API 응답.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
    regular_market_volume: Option<f64>,
    currency: Option<String>,
    fifty_two_week_low: Option<f64>,
    fifty_two_week_high: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<IndicatorQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct IndicatorQuote {
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
}

/// Yahoo Finance chart API 시세 소스.
pub struct YahooQuoteSource {
    client: reqwest::Client,
    base_url: Url,
    interval: String,
    range: String,
}

impl YahooQuoteSource {
    /// 설정으로 새 시세 소스를 생성합니다.
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| FeedError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FeedError::InvalidBaseUrl(config.base_url.clone()));
        }

        Ok(Self {
            client,
            base_url,
            interval: config.interval.clone(),
            range: config.range.clone(),
        })
    }

    /// 심볼의 chart URL을 만듭니다. 심볼은 경로 세그먼트로 인코딩됩니다.
    fn chart_url(&self, symbol: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", symbol]);
        }
        url.query_pairs_mut()
            .append_pair("interval", &self.interval)
            .append_pair("range", &self.range);
        url
    }

    /// chart 응답을 Quote로 변환합니다.
    fn parse_chart(symbol: &str, response: ChartResponse) -> FetchResult<Quote> {
        if let Some(err) = response.chart.error {
            return Err(FetchError::new(
                symbol,
                FetchErrorKind::Api(format!("{} {}", err.code, err.description)),
            ));
        }

        let result = response
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| FetchError::new(symbol, FetchErrorKind::NoData))?;

        let meta = result.meta;
        let price = meta
            .regular_market_price
            .ok_or_else(|| FetchError::new(symbol, FetchErrorKind::MissingField("regularMarketPrice")))?;
        let previous_close = meta
            .chart_previous_close
            .ok_or_else(|| FetchError::new(symbol, FetchErrorKind::MissingField("chartPreviousClose")))?;
        let volume = meta
            .regular_market_volume
            .filter(|v| v.is_finite() && *v >= 0.0)
            .ok_or_else(|| FetchError::new(symbol, FetchErrorKind::MissingField("regularMarketVolume")))?;

        let samples = result
            .indicators
            .and_then(|i| i.quote.into_iter().next())
            .unwrap_or_default();
        let day_range = DayRange::from_samples(&samples.low, &samples.high)
            .map_err(|e| FetchError::from_invalid(symbol, e))?;

        let year_range = match (meta.fifty_two_week_low, meta.fifty_two_week_high) {
            (Some(low), Some(high)) => Some(DayRange { low, high }),
            _ => None,
        };

        let currency = meta.currency.unwrap_or_else(|| "USD".to_string());

        Quote::new(price, previous_close, day_range, volume as u64, currency)
            .map(|q| q.with_year_range(year_range))
            .map_err(|e| FetchError::from_invalid(symbol, e))
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, symbol: &str) -> FetchResult<Quote> {
        let url = self.chart_url(symbol);
        debug!(symbol, url = %url, "Yahoo Finance 시세 조회");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(symbol, e))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(symbol, e))?;

        // 404 등에서도 chart.error 본문이 오면 그 설명을 우선 사용
        let parsed: Result<ChartResponse, _> = serde_json::from_slice(&body);

        if !status.is_success() {
            if let Ok(ChartResponse {
                chart: Chart {
                    error: Some(err), ..
                },
            }) = parsed
            {
                return Err(FetchError::new(
                    symbol,
                    FetchErrorKind::Api(format!("{} {}", err.code, err.description)),
                ));
            }
            return Err(FetchError::new(
                symbol,
                FetchErrorKind::HttpStatus(status.as_u16()),
            ));
        }

        let chart = parsed
            .map_err(|e| FetchError::new(symbol, FetchErrorKind::Parse(e.to_string())))?;
        Self::parse_chart(symbol, chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> YahooQuoteSource {
        YahooQuoteSource::new(&FeedConfig::default()).unwrap()
    }

    fn parse(symbol: &str, json: serde_json::Value) -> FetchResult<Quote> {
        let response: ChartResponse = serde_json::from_value(json).unwrap();
        YahooQuoteSource::parse_chart(symbol, response)
    }

    #[test]
    fn test_chart_url_encodes_symbol() {
        let url = source().chart_url("GC=F");
        assert_eq!(
            url.as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/GC=F?interval=15m&range=1d"
        );

        let url = source().chart_url("A/B");
        assert!(url.path().ends_with("/chart/A%2FB"));
    }

    #[test]
    fn test_parse_full_chart() {
        let quote = parse(
            "GC=F",
            serde_json::json!({
                "chart": {
                    "result": [{
                        "meta": {
                            "currency": "USD",
                            "regularMarketPrice": 105.0,
                            "chartPreviousClose": 100.0,
                            "regularMarketVolume": 123456,
                            "fiftyTwoWeekLow": 80.0,
                            "fiftyTwoWeekHigh": 120.0
                        },
                        "indicators": {
                            "quote": [{
                                "low": [101.0, null, 0, 99.5],
                                "high": [104.0, 106.5, null, 0]
                            }]
                        }
                    }],
                    "error": null
                }
            }),
        )
        .unwrap();

        assert_eq!(quote.price, 105.0);
        assert_eq!(quote.change, 5.0);
        assert_eq!(quote.change_percent, 5.0);
        assert_eq!(quote.day_range, DayRange { low: 99.5, high: 106.5 });
        assert_eq!(quote.volume, 123_456);
        assert_eq!(quote.currency, "USD");
        assert_eq!(quote.year_range, Some(DayRange { low: 80.0, high: 120.0 }));
    }

    #[test]
    fn test_missing_price_is_failure() {
        let err = parse(
            "GLD",
            serde_json::json!({
                "chart": {
                    "result": [{
                        "meta": { "chartPreviousClose": 100.0, "regularMarketVolume": 1 },
                        "indicators": { "quote": [{ "low": [1.0], "high": [2.0] }] }
                    }]
                }
            }),
        )
        .unwrap_err();

        assert_eq!(err.symbol, "GLD");
        assert_eq!(err.kind, FetchErrorKind::MissingField("regularMarketPrice"));
    }

    #[test]
    fn test_missing_day_range_is_failure() {
        let err = parse(
            "GLD",
            serde_json::json!({
                "chart": {
                    "result": [{
                        "meta": {
                            "regularMarketPrice": 1.0,
                            "chartPreviousClose": 1.0,
                            "regularMarketVolume": 0
                        },
                        "indicators": { "quote": [{ "low": [null], "high": [null] }] }
                    }]
                }
            }),
        )
        .unwrap_err();

        assert!(matches!(err.kind, FetchErrorKind::MissingField(_)));
    }

    #[test]
    fn test_chart_error_is_failure() {
        let err = parse(
            "NOPE",
            serde_json::json!({
                "chart": {
                    "result": null,
                    "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
                }
            }),
        )
        .unwrap_err();

        assert!(matches!(err.kind, FetchErrorKind::Api(_)));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = FeedConfig {
            base_url: "not a url".to_string(),
            ..FeedConfig::default()
        };
        assert!(matches!(
            YahooQuoteSource::new(&config),
            Err(FeedError::InvalidBaseUrl(_))
        ));
    }
}
