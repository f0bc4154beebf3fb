use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use super::{ResourceProvider, ResourceRef};

/// 순서가 고정된 리소스 프로바이더 목록입니다.
///
/// 비어 있지 않은 결과를 처음 돌려준 프로바이더가 우선합니다.
#[derive(Clone, Default)]
pub struct ResourceChain {
    providers: Vec<Arc<dyn ResourceProvider>>,
}

impl ResourceChain {
    pub fn new(providers: Vec<Arc<dyn ResourceProvider>>) -> Self {
        Self { providers }
    }

    pub fn push(&mut self, provider: Arc<dyn ResourceProvider>) {
        self.providers.push(provider);
    }

    pub fn labels(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.label()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// 입출력 오류는 로그만 남기고 해당 프로바이더를 건너뜁니다.
    pub async fn resolve(&self, reference: &ResourceRef) -> Option<Bytes> {
        for provider in &self.providers {
            match provider.load(reference).await {
                Ok(Some(data)) if !data.is_empty() => {
                    debug!(provider = provider.label(), resource = %reference, "리소스 발견");
                    return Some(data);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        provider = provider.label(),
                        resource = %reference,
                        error = %e,
                        "리소스 로드 실패"
                    );
                }
            }
        }

        debug!(resource = %reference, "리소스 없음");
        None
    }
}
