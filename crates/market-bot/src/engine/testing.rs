//! 엔진 테스트용 가짜 시세 소스와 배포기.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use market_core::{DayRange, DestinationId, Quote};
use market_feed::{FetchError, FetchErrorKind, FetchResult, QuoteSource};
use market_notification::{DistributionError, DistributionResult, Embed, Publisher};

/// 심볼별 가격을 돌려주는 소스. 등록되지 않았거나 실패로 표시된 심볼은 에러.
///
/// `delay`가 설정되면 조회마다 그만큼 대기하며 동시 조회 수를 기록합니다.
#[derive(Default)]
pub struct FakeSource {
    prices: Mutex<HashMap<String, f64>>,
    fetches: AtomicUsize,
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    panic_next: AtomicBool,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_price(&self, symbol: &str, price: f64) {
        self.prices.lock().unwrap().insert(symbol.to_string(), price);
    }

    pub fn fail(&self, symbol: &str) {
        self.prices.lock().unwrap().remove(symbol);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// 다음 조회 한 번을 panic으로 끝냅니다.
    pub fn panic_next(&self) {
        self.panic_next.store(true, Ordering::SeqCst);
    }

    /// 동시에 진행된 조회 수의 최댓값.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for FakeSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch(&self, symbol: &str) -> FetchResult<Quote> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.panic_next.swap(false, Ordering::SeqCst) {
            panic!("fake source panic: {}", symbol);
        }

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        let price = self.prices.lock().unwrap().get(symbol).copied();
        match price {
            Some(price) => Ok(Quote::new(
                price,
                100.0,
                DayRange {
                    low: price - 1.0,
                    high: price + 1.0,
                },
                1_000,
                "USD",
            )
            .unwrap()),
            None => Err(FetchError::new(symbol, FetchErrorKind::NoData)),
        }
    }
}

/// 배포기 호출 기록.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublisherCall {
    Clear(DestinationId),
    Publish(DestinationId, usize),
}

/// 호출을 기록하는 배포기. `gone`에 든 목적지는 "찾을 수 없음"으로 실패.
///
/// `clear_delay`가 설정되면 정리 단계에서 그만큼 대기합니다.
#[derive(Default)]
pub struct FakePublisher {
    calls: Mutex<Vec<PublisherCall>>,
    published: Mutex<Vec<(DestinationId, Vec<Embed>)>>,
    gone: Mutex<HashSet<DestinationId>>,
    clear_delay: Mutex<Option<Duration>>,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove_destination(&self, destination: DestinationId) {
        self.gone.lock().unwrap().insert(destination);
    }

    pub fn set_clear_delay(&self, delay: Duration) {
        *self.clear_delay.lock().unwrap() = Some(delay);
    }

    /// 목적지에 마지막으로 게시된 임베드.
    pub fn last_published(&self, destination: DestinationId) -> Option<Vec<Embed>> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(d, _)| *d == destination)
            .map(|(_, embeds)| embeds.clone())
    }

    pub fn calls(&self) -> Vec<PublisherCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn published_to(&self, destination: DestinationId) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, PublisherCall::Publish(d, _) if *d == destination))
            .count()
    }

    fn check(&self, destination: DestinationId) -> DistributionResult<()> {
        if self.gone.lock().unwrap().contains(&destination) {
            Err(DistributionError::DestinationNotFound(destination))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Publisher for FakePublisher {
    fn name(&self) -> &str {
        "fake"
    }

    async fn clear_recent(&self, destination: DestinationId, _limit: u8) -> DistributionResult<usize> {
        self.check(destination)?;
        self.calls.lock().unwrap().push(PublisherCall::Clear(destination));
        let delay = *self.clear_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(0)
    }

    async fn publish(&self, destination: DestinationId, embeds: &[Embed]) -> DistributionResult<()> {
        self.check(destination)?;
        self.calls
            .lock()
            .unwrap()
            .push(PublisherCall::Publish(destination, embeds.len()));
        self.published
            .lock()
            .unwrap()
            .push((destination, embeds.to_vec()));
        Ok(())
    }
}
