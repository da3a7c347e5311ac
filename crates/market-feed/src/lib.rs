//! # Market Feed
//!
//! 외부 시세 소스에서 심볼별 시세를 조회합니다.
//!
//! - [`QuoteSource`] - 시세 소스 trait (심볼 하나 → `Quote` 또는 `FetchError`)
//! - [`YahooQuoteSource`] - Yahoo Finance chart API 구현

pub mod error;
pub mod source;
pub mod yahoo;

pub use error::*;
pub use source::*;
pub use yahoo::YahooQuoteSource;
