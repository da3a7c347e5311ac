//! 배포 타입 및 trait 정의.

use async_trait::async_trait;
use market_core::DestinationId;
use serde::{Deserialize, Serialize};

/// 임베드 필드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    /// 필드 이름
    pub name: String,
    /// 필드 본문
    pub value: String,
    /// 한 줄에 나란히 표시 여부
    pub inline: bool,
}

/// 플랫폼 중립 서식 메시지.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// 제목
    pub title: String,
    /// 설명
    pub description: String,
    /// 색상 (RGB)
    pub color: u32,
    /// 필드 목록
    pub fields: Vec<EmbedField>,
    /// 하단 문구
    pub footer: Option<String>,
}

impl Embed {
    /// 새 임베드를 생성합니다.
    pub fn new(title: impl Into<String>, description: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color,
            ..Default::default()
        }
    }

    /// 필드를 추가합니다.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// 하단 문구를 설정합니다.
    pub fn footer(mut self, text: impl Into<String>) -> Self {
        self.footer = Some(text.into());
        self
    }
}

/// 배포 작업용 Result 타입.
pub type DistributionResult<T> = Result<T, DistributionError>;

/// 목적지별 배포 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DistributionError {
    #[error("목적지를 찾을 수 없음: {0}")]
    DestinationNotFound(DestinationId),

    #[error("목적지 접근 권한 없음: {0}")]
    Forbidden(DestinationId),

    #[error("요청 한도 초과: {0}")]
    RateLimited(DestinationId),

    #[error("네트워크 에러: {0}")]
    Network(String),

    #[error("플랫폼 에러: {0}")]
    Platform(String),
}

impl DistributionError {
    /// 목적지가 더 이상 유효하지 않은지 확인합니다.
    ///
    /// `true`이면 해당 등록은 레지스트리에서 제거됩니다.
    pub fn is_invalid_destination(&self) -> bool {
        matches!(
            self,
            DistributionError::DestinationNotFound(_) | DistributionError::Forbidden(_)
        )
    }
}

/// 목적지 배포기 trait.
///
/// 목적지 하나에 대해 이전 메시지 정리와 새 메시지 게시를 수행합니다.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// 배포기 이름을 반환합니다.
    fn name(&self) -> &str;

    /// 목적지에서 봇이 작성한 최근 메시지를 최대 `limit`개 삭제합니다.
    ///
    /// 삭제한 메시지 수를 반환합니다.
    async fn clear_recent(&self, destination: DestinationId, limit: u8) -> DistributionResult<usize>;

    /// 임베드를 하나씩 개별 메시지로 게시합니다.
    async fn publish(&self, destination: DestinationId, embeds: &[Embed]) -> DistributionResult<()>;
}
