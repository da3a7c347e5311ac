//! 최신 시세 스냅샷.
//!
//! 한 번이라도 성공한 심볼만 `prices`에 존재합니다(값이 없는 키는 만들지 않음).
//! `last_updated`는 조회가 한 번이라도 성공했을 때에만 설정됩니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::quote::Quote;

/// 캐시된 시세 집합과 갱신 시각.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 마지막으로 성공한 갱신 시각
    pub last_updated: Option<DateTime<Utc>>,
    /// 내부 키별 마지막 성공 시세
    pub prices: BTreeMap<String, Quote>,
}

impl Snapshot {
    /// 빈 스냅샷을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 이번 주기의 성공 결과를 병합합니다.
    ///
    /// 성공한 키만 덮어쓰고, 실패한 키는 이전 값을 유지합니다.
    /// 성공이 하나도 없으면 `last_updated`를 건드리지 않습니다.
    /// 시각이 갱신되었으면 `true`를 반환합니다.
    pub fn merge<I>(&mut self, successes: I, now: DateTime<Utc>) -> bool
    where
        I: IntoIterator<Item = (String, Quote)>,
    {
        let mut merged = 0usize;
        for (key, quote) in successes {
            self.prices.insert(key, quote);
            merged += 1;
        }

        if merged > 0 {
            self.last_updated = Some(now);
            true
        } else {
            false
        }
    }

    /// 키로 시세를 조회합니다.
    pub fn get(&self, key: &str) -> Option<&Quote> {
        self.prices.get(key)
    }

    /// 한 번이라도 갱신되었는지 확인합니다.
    pub fn is_ready(&self) -> bool {
        self.last_updated.is_some()
    }
}
