use std::io;
use std::path::Path;

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

use super::{ResourceChain, ResourceRef};

/// 셸 문서에서 본문이 들어갈 기본 자리 표시자
pub const DEFAULT_SLOT: &str = "<%= content %>";

const SHELL_NAME: &str = "template.html";

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("템플릿 셸을 찾을 수 없음: {name}")]
    ShellMissing { name: String },

    #[error("템플릿 셸에 자리 표시자 '{slot}'가 없음")]
    SlotMissing { slot: String },

    #[error("템플릿 셸 읽기 실패: {path} - {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// 템플릿 문서를 공용 HTML 셸에 끼워 넣습니다.
///
/// 셸은 시작 시 한 번만 읽으며 이후에는 다시 읽지 않습니다.
#[derive(Debug, Clone)]
pub struct TemplateMixer {
    shell: String,
    slot: String,
}

impl TemplateMixer {
    pub fn new(shell: impl Into<String>, slot: impl Into<String>) -> Result<Self, TemplateError> {
        let shell = shell.into();
        let slot = slot.into();
        if slot.is_empty() || !shell.contains(&slot) {
            return Err(TemplateError::SlotMissing { slot });
        }
        Ok(Self { shell, slot })
    }

    /// 셸을 불러옵니다. 경로가 주어지면 그 파일을, 아니면 체인의 `template.html`을 사용합니다.
    pub async fn load(
        chain: &ResourceChain,
        override_path: Option<&Path>,
        slot: &str,
    ) -> Result<Self, TemplateError> {
        let shell = match override_path {
            Some(path) => fs::read_to_string(path).await.map_err(|e| TemplateError::Io {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?,
            None => {
                let data = chain
                    .resolve(&ResourceRef::named(SHELL_NAME))
                    .await
                    .ok_or_else(|| TemplateError::ShellMissing {
                        name: SHELL_NAME.to_string(),
                    })?;
                String::from_utf8_lossy(&data).into_owned()
            }
        };

        info!(
            source = %override_path.map(|p| p.display().to_string()).unwrap_or_else(|| SHELL_NAME.to_string()),
            "템플릿 셸 로드"
        );
        Self::new(shell, slot)
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// 조각을 셸의 자리 표시자에 한 번 삽입합니다. 조각이 비어 있으면 빈 문자열을 반환합니다.
    pub fn embed(&self, fragment: &str) -> String {
        if fragment.is_empty() {
            return String::new();
        }
        self.shell.replacen(&self.slot, fragment, 1)
    }

    pub async fn mix(&self, chain: &ResourceChain, reference: &ResourceRef) -> String {
        match chain.resolve(reference).await {
            Some(data) => self.embed(&String::from_utf8_lossy(&data)),
            None => {
                debug!(resource = %reference, "템플릿 조각 없음");
                String::new()
            }
        }
    }
}
