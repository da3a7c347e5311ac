//! 공유 스냅샷 캐시.

use chrono::{DateTime, Utc};
use market_core::{Quote, Snapshot};
use tokio::sync::RwLock;

/// 예약 경로와 수동 명령 경로가 함께 쓰는 스냅샷 캐시.
///
/// 병합은 쓰기 잠금 안에서 한 번에 적용되므로 읽는 쪽은 부분 병합 상태를 보지 않습니다.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    inner: RwLock<Snapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 현재 스냅샷의 복사본.
    pub async fn snapshot(&self) -> Snapshot {
        self.inner.read().await.clone()
    }

    /// 성공 결과를 병합합니다. 시각이 갱신되면 `true`.
    pub async fn merge(&self, successes: Vec<(String, Quote)>, now: DateTime<Utc>) -> bool {
        self.inner.write().await.merge(successes, now)
    }

    /// 마지막 갱신 시각.
    pub async fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_updated
    }
}
