use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

use super::ResourceRef;

const BUILTIN_INDEX: &[u8] = include_bytes!("../../assets/index.html");
const BUILTIN_TEMPLATE: &[u8] = include_bytes!("../../assets/template.html");

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("리소스 경로가 유효하지 않음: {name}")]
    InvalidPath { name: String },

    #[error("리소스 읽기 실패: {path} - {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// 이름 있는 바이트 저장소입니다.
///
/// 리소스가 없으면 `Ok(None)`을 반환하며, 오류는 입출력 문제에만 사용합니다.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    fn label(&self) -> &str;

    async fn load(&self, reference: &ResourceRef) -> Result<Option<Bytes>, ResourceError>;
}

/// 디렉터리 아래의 파일을 제공하는 프로바이더
pub struct DirectoryProvider {
    label: String,
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(label: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            root: root.into(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// 세그먼트를 루트 아래 경로로 합칩니다. 루트를 벗어나는 세그먼트는 거부합니다.
    fn resolve_path(&self, reference: &ResourceRef) -> Result<PathBuf, ResourceError> {
        let mut path = self.root.clone();
        for segment in reference.segments() {
            if segment.is_empty()
                || segment == "."
                || segment == ".."
                || segment.contains('\\')
                || segment.contains('\0')
            {
                return Err(ResourceError::InvalidPath {
                    name: reference.name().to_string(),
                });
            }
            path.push(segment);
        }
        Ok(path)
    }
}

#[async_trait]
impl ResourceProvider for DirectoryProvider {
    fn label(&self) -> &str {
        &self.label
    }

    async fn load(&self, reference: &ResourceRef) -> Result<Option<Bytes>, ResourceError> {
        let path = self.resolve_path(reference)?;

        match fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(provider = %self.label, path = %path.display(), "파일 없음");
                Ok(None)
            }
            Err(e) => Err(ResourceError::Io {
                path: path.to_string_lossy().to_string(),
                source: e,
            }),
        }
    }
}

/// 메모리에 올려 둔 리소스를 점 표기 이름으로 제공하는 프로바이더
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    label: String,
    entries: HashMap<String, Bytes>,
}

impl MemoryProvider {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: HashMap::new(),
        }
    }

    /// 기본 `index.html`과 `template.html`을 담은 내장 프로바이더
    pub fn builtin() -> Self {
        Self::new("builtin")
            .with_entry("index.html", BUILTIN_INDEX)
            .with_entry("template.html", BUILTIN_TEMPLATE)
    }

    pub fn with_entry(mut self, name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.insert(name, data);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, data: impl Into<Bytes>) {
        self.entries.insert(name.into(), data.into());
    }
}

#[async_trait]
impl ResourceProvider for MemoryProvider {
    fn label(&self) -> &str {
        &self.label
    }

    async fn load(&self, reference: &ResourceRef) -> Result<Option<Bytes>, ResourceError> {
        Ok(self.entries.get(reference.name()).cloned())
    }
}
