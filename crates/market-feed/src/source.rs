//! 시세 소스 trait 정의.

use async_trait::async_trait;
use market_core::Quote;

use crate::FetchError;

/// 시세 조회 작업을 위한 Result 타입.
pub type FetchResult<T> = Result<T, FetchError>;

/// 외부 시세 소스.
///
/// 구현체는 네트워크, 파싱, 필드 누락 등 모든 실패를 `FetchError`로 반환해야 하며
/// 공유 상태를 변경하지 않습니다.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// 소스 이름 반환.
    fn name(&self) -> &str;

    /// 심볼 하나의 현재 시세를 조회합니다.
    ///
    /// # 인자
    /// * `symbol` - 소스 고유 심볼 (예: "GC=F", "EURUSD=X")
    async fn fetch(&self, symbol: &str) -> FetchResult<Quote>;
}
