//! 테넌트별 목적지 레지스트리.

use std::collections::HashMap;

use market_core::{DestinationId, TenantId};
use tokio::sync::RwLock;
use tracing::info;

/// 테넌트당 하나의 목적지를 보관하는 메모리 레지스트리.
#[derive(Debug, Default)]
pub struct DestinationRegistry {
    entries: RwLock<HashMap<TenantId, DestinationId>>,
}

impl DestinationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 목적지를 등록합니다. 기존 등록은 덮어씁니다.
    ///
    /// 이전 목적지를 반환합니다.
    pub async fn upsert(&self, tenant: TenantId, destination: DestinationId) -> Option<DestinationId> {
        let previous = self.entries.write().await.insert(tenant, destination);
        info!(
            tenant = %tenant,
            destination = %destination,
            previous = ?previous.map(|d| d.0),
            "목적지 등록"
        );
        previous
    }

    /// 테넌트 등록을 제거합니다.
    pub async fn remove(&self, tenant: TenantId) -> Option<DestinationId> {
        self.entries.write().await.remove(&tenant)
    }

    /// 등록된 목적지가 `destination`과 같을 때만 제거합니다.
    ///
    /// 배포 도중 재등록된 새 목적지를 지우지 않기 위해 사용합니다.
    pub async fn remove_if(&self, tenant: TenantId, destination: DestinationId) -> bool {
        let mut entries = self.entries.write().await;
        if entries.get(&tenant) == Some(&destination) {
            entries.remove(&tenant);
            true
        } else {
            false
        }
    }

    /// 테넌트의 현재 목적지.
    pub async fn get(&self, tenant: TenantId) -> Option<DestinationId> {
        self.entries.read().await.get(&tenant).copied()
    }

    /// 호출 시점의 등록 목록 복사본.
    pub async fn all(&self) -> Vec<(TenantId, DestinationId)> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(t, d)| (*t, *d))
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
