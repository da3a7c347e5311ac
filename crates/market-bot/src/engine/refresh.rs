//! 전체 심볼 갱신.
//!
//! 모든 심볼을 동시에 조회하고 전부 끝날 때까지 기다린 뒤 성공한 결과만 캐시에 병합합니다.
//! 한 심볼의 실패는 다른 심볼을 막지 않으며 같은 주기 안에서 재시도하지 않습니다.

use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use market_core::SymbolSpec;
use market_feed::QuoteSource;
use tracing::{debug, warn};

use super::cache::SnapshotCache;

/// 갱신 주기 결과.
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    /// 성공한 내부 키
    pub succeeded: Vec<String>,
    /// 실패한 내부 키와 원인
    pub failed: Vec<(String, String)>,
    /// 이번 주기에 `last_updated`가 갱신되었는지
    pub timestamp_updated: bool,
    /// 소요 시간
    pub elapsed: Duration,
}

impl RefreshReport {
    /// 조회 시도 수.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// 요약 로그 출력.
    pub fn log_summary(&self, trigger: &str) {
        tracing::info!(
            trigger = trigger,
            total = self.total(),
            success = self.succeeded.len(),
            errors = self.failed.len(),
            timestamp_updated = self.timestamp_updated,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "시세 갱신 완료"
        );
    }
}

/// 모든 심볼을 조회하여 캐시에 병합합니다.
pub async fn refresh_all(
    source: &dyn QuoteSource,
    specs: &[SymbolSpec],
    cache: &SnapshotCache,
) -> RefreshReport {
    let started = Instant::now();

    let outcomes = join_all(specs.iter().map(|spec| async move {
        let result = source.fetch(&spec.symbol).await;
        (spec, result)
    }))
    .await;

    let mut report = RefreshReport::default();
    let mut successes = Vec::with_capacity(outcomes.len());

    for (spec, result) in outcomes {
        match result {
            Ok(quote) => {
                debug!(key = %spec.key, price = quote.price, "시세 조회 성공");
                report.succeeded.push(spec.key.clone());
                successes.push((spec.key.clone(), quote));
            }
            Err(e) => {
                warn!(key = %spec.key, source = source.name(), error = %e, "시세 조회 실패");
                report.failed.push((spec.key.clone(), e.to_string()));
            }
        }
    }

    report.timestamp_updated = cache.merge(successes, Utc::now()).await;
    report.elapsed = started.elapsed();
    report
}
