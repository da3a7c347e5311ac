//! 예약 갱신 및 다중 테넌트 배포 엔진.
//!
//! [`Engine`]은 심볼 목록, 스냅샷 캐시, 목적지 레지스트리, 배포기를 하나로 묶은
//! 컨텍스트입니다. 예약 경로([`Scheduler`])와 수동 명령 경로가 같은 인스턴스를 공유합니다.
//!
//! 한 번의 tick은 다음 순서로 진행됩니다:
//!
//! 1. 모든 심볼 동시 조회 후 캐시 병합 (전부 끝날 때까지 대기)
//! 2. 등록된 모든 목적지로 배포 (목적지별 실패 격리)
//! 3. 유효하지 않은 목적지는 레지스트리에서 제거

pub mod cache;
pub mod refresh;
pub mod registry;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use market_core::{DestinationId, Quote, Schedule, SymbolSpec, TenantId};
use market_feed::{FetchResult, QuoteSource};
use market_notification::{render_market_summary, DistributionResult, Embed, Publisher};
use tracing::{debug, info, warn};

pub use cache::SnapshotCache;
pub use refresh::{refresh_all, RefreshReport};
pub use registry::DestinationRegistry;
pub use scheduler::Scheduler;

/// 목적지 하나에 대한 배포 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// 게시 완료
    Delivered,
    /// 렌더링할 데이터가 없어 건너뜀
    Skipped,
}

/// 전체 목적지 배포 결과.
#[derive(Debug, Clone, Default)]
pub struct FanOutReport {
    /// 게시 완료 수
    pub delivered: usize,
    /// 건너뛴 수
    pub skipped: usize,
    /// 실패 수
    pub failed: usize,
    /// 레지스트리에서 제거된 테넌트
    pub removed: Vec<TenantId>,
}

impl FanOutReport {
    /// 요약 로그 출력.
    pub fn log_summary(&self) {
        info!(
            delivered = self.delivered,
            skipped = self.skipped,
            failed = self.failed,
            removed = self.removed.len(),
            "배포 완료"
        );
    }
}

/// 목적지별 비동기 잠금.
///
/// 같은 목적지에 대한 정리와 게시가 겹치지 않도록 직렬화합니다.
#[derive(Default)]
struct DestinationLocks {
    inner: Mutex<HashMap<DestinationId, Arc<tokio::sync::Mutex<()>>>>,
}

impl DestinationLocks {
    fn get(&self, destination: DestinationId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(destination).or_default().clone()
    }
}

/// 엔진 설정.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 조회 대상 심볼
    pub symbols: Vec<SymbolSpec>,
    /// 정리할 최근 메시지 최대 개수
    pub cleanup_limit: u8,
    /// 시작 시 갱신 주기
    pub schedule: Schedule,
}

/// 갱신 및 배포 컨텍스트.
pub struct Engine {
    source: Arc<dyn QuoteSource>,
    publisher: Arc<dyn Publisher>,
    symbols: Vec<SymbolSpec>,
    cleanup_limit: u8,
    cache: SnapshotCache,
    registry: DestinationRegistry,
    locks: DestinationLocks,
    /// 요약 하단 문구에 표시할 현재 주기 (분)
    interval_minutes: AtomicU64,
}

impl Engine {
    /// 새 엔진을 생성합니다.
    pub fn new(
        source: Arc<dyn QuoteSource>,
        publisher: Arc<dyn Publisher>,
        config: EngineConfig,
    ) -> Self {
        Self {
            source,
            publisher,
            symbols: config.symbols,
            cleanup_limit: config.cleanup_limit,
            cache: SnapshotCache::new(),
            registry: DestinationRegistry::new(),
            locks: DestinationLocks::default(),
            interval_minutes: AtomicU64::new(config.schedule.minutes()),
        }
    }

    /// 스냅샷 캐시.
    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// 목적지 레지스트리.
    pub fn registry(&self) -> &DestinationRegistry {
        &self.registry
    }

    /// 현재 갱신 주기 (분).
    pub fn interval_minutes(&self) -> u64 {
        self.interval_minutes.load(Ordering::Relaxed)
    }

    pub(crate) fn set_interval_minutes(&self, minutes: u64) {
        self.interval_minutes.store(minutes, Ordering::Relaxed);
    }

    /// 모든 심볼을 한 번 갱신합니다.
    pub async fn refresh(&self) -> RefreshReport {
        refresh_all(self.source.as_ref(), &self.symbols, &self.cache).await
    }

    /// 심볼 하나를 즉시 조회합니다. 캐시는 건드리지 않습니다.
    pub async fn quote(&self, symbol: &str) -> FetchResult<Quote> {
        self.source.fetch(symbol).await
    }

    /// 현재 스냅샷을 요약 임베드로 렌더링합니다.
    pub async fn render(&self) -> Vec<Embed> {
        let snapshot = self.cache.snapshot().await;
        render_market_summary(&snapshot, self.interval_minutes())
    }

    /// 목적지 하나에 이전 메시지 정리 후 요약을 게시합니다.
    ///
    /// 스냅샷이 한 번도 갱신되지 않았으면 아무것도 지우지 않고 건너뜁니다.
    /// 잠금을 잡은 뒤에 렌더링하므로 나중에 게시되는 쪽이 항상 더 최신 스냅샷을 씁니다.
    pub async fn distribute_to(&self, destination: DestinationId) -> DistributionResult<Delivery> {
        let lock = self.locks.get(destination);
        let _guard = lock.lock().await;

        let embeds = self.render().await;
        if embeds.is_empty() {
            debug!(destination = %destination, "갱신된 시세가 없어 배포 건너뜀");
            return Ok(Delivery::Skipped);
        }

        match self.publisher.clear_recent(destination, self.cleanup_limit).await {
            Ok(count) => debug!(destination = %destination, count, "이전 메시지 정리"),
            Err(e) if e.is_invalid_destination() => return Err(e),
            Err(e) => warn!(destination = %destination, error = %e, "이전 메시지 정리 실패"),
        }

        self.publisher.publish(destination, &embeds).await?;
        Ok(Delivery::Delivered)
    }

    /// 등록된 목적지로 배포하고 유효하지 않은 목적지면 등록을 제거합니다.
    async fn deliver(&self, tenant: TenantId, destination: DestinationId) -> DeliveryOutcome {
        match self.distribute_to(destination).await {
            Ok(delivery) => DeliveryOutcome::Done(delivery),
            Err(e) if e.is_invalid_destination() => {
                let removed = self.registry.remove_if(tenant, destination).await;
                warn!(
                    tenant = %tenant,
                    destination = %destination,
                    error = %e,
                    removed,
                    "유효하지 않은 목적지, 등록 제거"
                );
                DeliveryOutcome::Removed
            }
            Err(e) => {
                warn!(tenant = %tenant, destination = %destination, error = %e, "배포 실패");
                DeliveryOutcome::Failed
            }
        }
    }

    /// 등록된 모든 목적지로 동시에 배포합니다.
    ///
    /// 호출 시점의 등록 목록을 사용하며 한 목적지의 실패는 다른 목적지에 영향을 주지 않습니다.
    pub async fn fan_out(&self) -> FanOutReport {
        let targets = self.registry.all().await;

        let outcomes = join_all(targets.iter().map(|&(tenant, destination)| async move {
            (tenant, self.deliver(tenant, destination).await)
        }))
        .await;

        let mut report = FanOutReport::default();
        for (tenant, outcome) in outcomes {
            match outcome {
                DeliveryOutcome::Done(Delivery::Delivered) => report.delivered += 1,
                DeliveryOutcome::Done(Delivery::Skipped) => report.skipped += 1,
                DeliveryOutcome::Failed => report.failed += 1,
                DeliveryOutcome::Removed => {
                    report.failed += 1;
                    report.removed.push(tenant);
                }
            }
        }
        report
    }

    /// 한 번의 예약 실행: 전체 갱신 후 전체 배포.
    pub async fn tick(&self) -> (RefreshReport, FanOutReport) {
        let refresh = self.refresh().await;
        refresh.log_summary("schedule");

        let fan_out = self.fan_out().await;
        fan_out.log_summary();

        (refresh, fan_out)
    }

    /// 테넌트의 목적지를 등록하고 즉시 갱신 후 그 목적지에만 배포합니다.
    pub async fn setup(&self, tenant: TenantId, destination: DestinationId) -> DistributionResult<Delivery> {
        self.registry.upsert(tenant, destination).await;

        let refresh = self.refresh().await;
        refresh.log_summary("setup");

        let result = self.distribute_to(destination).await;
        if let Err(e) = &result {
            if e.is_invalid_destination() {
                self.registry.remove_if(tenant, destination).await;
            }
        }
        result
    }

    /// 즉시 갱신 후 요약을 반환합니다. 레지스트리는 건드리지 않습니다.
    pub async fn manual_update(&self) -> Vec<Embed> {
        let refresh = self.refresh().await;
        refresh.log_summary("manual");
        self.render().await
    }
}

enum DeliveryOutcome {
    Done(Delivery),
    Failed,
    Removed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{FakePublisher, FakeSource, PublisherCall};
    use std::time::Duration;
    use tokio::time::Instant;

    fn engine(source: Arc<FakeSource>, publisher: Arc<FakePublisher>) -> Engine {
        Engine::new(
            source,
            publisher,
            EngineConfig {
                symbols: vec![
                    SymbolSpec::new("GLD", "GLD"),
                    SymbolSpec::new("NAS100", "^NDX"),
                ],
                cleanup_limit: 10,
                schedule: Schedule::default(),
            },
        )
    }

    fn ready_source() -> Arc<FakeSource> {
        let source = Arc::new(FakeSource::new());
        source.set_price("GLD", 105.0);
        source.set_price("^NDX", 18000.0);
        source
    }

    #[tokio::test]
    async fn test_invalid_destination_is_removed_and_others_continue() {
        let publisher = Arc::new(FakePublisher::new());
        let engine = engine(ready_source(), publisher.clone());

        engine.registry().upsert(TenantId(1), DestinationId(10)).await;
        engine.registry().upsert(TenantId(2), DestinationId(20)).await;
        engine.registry().upsert(TenantId(3), DestinationId(30)).await;
        publisher.remove_destination(DestinationId(20));

        let (_, report) = engine.tick().await;

        assert_eq!(report.delivered, 2);
        assert_eq!(report.removed, vec![TenantId(2)]);
        assert_eq!(engine.registry().get(TenantId(2)).await, None);
        assert_eq!(publisher.published_to(DestinationId(10)), 1);
        assert_eq!(publisher.published_to(DestinationId(30)), 1);
    }

    #[tokio::test]
    async fn test_distribution_clears_then_publishes() {
        let publisher = Arc::new(FakePublisher::new());
        let engine = engine(ready_source(), publisher.clone());

        engine.refresh().await;
        let delivery = engine.distribute_to(DestinationId(10)).await.unwrap();

        assert_eq!(delivery, Delivery::Delivered);
        assert_eq!(
            publisher.calls(),
            vec![
                PublisherCall::Clear(DestinationId(10)),
                PublisherCall::Publish(DestinationId(10), 3),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_destination_runs_do_not_interleave() {
        let publisher = Arc::new(FakePublisher::new());
        publisher.set_clear_delay(Duration::from_secs(5));
        let engine = engine(ready_source(), publisher.clone());
        engine.refresh().await;

        let (first, second) = tokio::join!(
            engine.distribute_to(DestinationId(10)),
            engine.distribute_to(DestinationId(10)),
        );
        assert_eq!(first.unwrap(), Delivery::Delivered);
        assert_eq!(second.unwrap(), Delivery::Delivered);

        let pair = [
            PublisherCall::Clear(DestinationId(10)),
            PublisherCall::Publish(DestinationId(10), 3),
        ];
        assert_eq!(publisher.calls(), [pair.clone(), pair].concat());
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_destinations_are_not_blocked() {
        let publisher = Arc::new(FakePublisher::new());
        publisher.set_clear_delay(Duration::from_secs(5));
        let engine = engine(ready_source(), publisher.clone());
        engine.refresh().await;

        let started = Instant::now();
        let (a, b) = tokio::join!(
            engine.distribute_to(DestinationId(10)),
            engine.distribute_to(DestinationId(20)),
        );
        a.unwrap();
        b.unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiting_run_publishes_latest_snapshot() {
        let source = ready_source();
        let publisher = Arc::new(FakePublisher::new());
        publisher.set_clear_delay(Duration::from_secs(10));
        let engine = engine(source.clone(), publisher.clone());
        engine.refresh().await;

        // 첫 실행이 잠금을 쥔 동안 두 번째 실행이 대기하고, 그 사이 시세가 바뀜
        let (first, second, _) = tokio::join!(
            engine.distribute_to(DestinationId(10)),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                engine.distribute_to(DestinationId(10)).await
            },
            async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                source.set_price("^NDX", 19000.0);
                engine.refresh().await
            },
        );
        first.unwrap();
        second.unwrap();

        let embeds = publisher.last_published(DestinationId(10)).unwrap();
        let nasdaq = embeds.iter().find(|e| e.title.contains("NASDAQ")).unwrap();
        assert!(nasdaq.fields[0].value.contains("**Current Value:** 19000.00"));
    }

    #[tokio::test]
    async fn test_no_data_skips_without_clearing() {
        let publisher = Arc::new(FakePublisher::new());
        let engine = engine(Arc::new(FakeSource::new()), publisher.clone());

        engine.registry().upsert(TenantId(1), DestinationId(10)).await;
        let (refresh, report) = engine.tick().await;

        assert_eq!(refresh.failed.len(), 2);
        assert_eq!(report.skipped, 1);
        assert!(publisher.calls().is_empty());
        assert_eq!(engine.registry().len().await, 1);
    }

    #[tokio::test]
    async fn test_setup_registers_and_delivers_once() {
        let publisher = Arc::new(FakePublisher::new());
        let engine = engine(ready_source(), publisher.clone());
        engine.registry().upsert(TenantId(9), DestinationId(90)).await;

        engine.setup(TenantId(1), DestinationId(10)).await.unwrap();
        engine.setup(TenantId(1), DestinationId(11)).await.unwrap();

        assert_eq!(engine.registry().get(TenantId(1)).await, Some(DestinationId(11)));
        assert_eq!(publisher.published_to(DestinationId(10)), 1);
        assert_eq!(publisher.published_to(DestinationId(11)), 1);
        // 다른 테넌트에는 배포하지 않음
        assert_eq!(publisher.published_to(DestinationId(90)), 0);
    }

    #[tokio::test]
    async fn test_setup_with_invalid_destination_unregisters() {
        let publisher = Arc::new(FakePublisher::new());
        publisher.remove_destination(DestinationId(10));
        let engine = engine(ready_source(), publisher);

        let result = engine.setup(TenantId(1), DestinationId(10)).await;

        assert!(result.unwrap_err().is_invalid_destination());
        assert!(engine.registry().is_empty().await);
    }

    #[tokio::test]
    async fn test_manual_update_leaves_registry() {
        let publisher = Arc::new(FakePublisher::new());
        let engine = engine(ready_source(), publisher.clone());

        let embeds = engine.manual_update().await;

        assert_eq!(embeds.len(), 3);
        assert!(engine.registry().is_empty().await);
        assert!(publisher.calls().is_empty());
    }

    #[tokio::test]
    async fn test_quote_bypasses_cache() {
        let engine = engine(ready_source(), Arc::new(FakePublisher::new()));

        let quote = engine.quote("^NDX").await.unwrap();

        assert_eq!(quote.price, 18000.0);
        assert!(engine.cache().last_updated().await.is_none());
        assert!(engine.quote("USDJPY=X").await.is_err());
    }

    #[tokio::test]
    async fn test_footer_follows_interval() {
        let engine = engine(ready_source(), Arc::new(FakePublisher::new()));
        engine.set_interval_minutes(30);

        let embeds = engine.manual_update().await;

        assert!(embeds[0]
            .footer
            .as_deref()
            .unwrap()
            .ends_with("Auto-update every 30 minutes"));
    }
}
