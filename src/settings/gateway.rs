use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::resources::DEFAULT_SLOT;

/// `[gateway]` 섹션
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    /// 응답의 `Server` 헤더 값
    #[serde(default = "default_name")]
    pub name: String,

    /// 내장 정적 라우트가 붙을 경로 접두사 (예: "/portal"). 비어 있으면 루트
    #[serde(default)]
    pub url_path_prefix: String,

    /// 이 접두사 아래의 경로는 인증 없이 접근 가능
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,

    /// 템플릿 셸 파일. 없으면 리소스 체인의 `template.html`
    pub template_path: Option<PathBuf>,

    #[serde(default = "default_template_slot")]
    pub template_slot: String,

    /// `GET {prefix}/` 를 `{prefix}/index.html`로 재작성
    #[serde(default = "default_true")]
    pub rewrite_index: bool,

    /// `GET {prefix}/DebugLog` 엔드포인트 활성화
    #[serde(default)]
    pub debug_log: bool,

    #[serde(default = "default_debug_log_capacity")]
    pub debug_log_capacity: usize,

    /// 순서대로 검색할 리소스 디렉터리. 내장 리소스는 항상 마지막에 추가됨
    #[serde(default)]
    pub resources: Vec<ResourceDirSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDirSettings {
    pub label: Option<String>,
    pub path: PathBuf,
}

/// `[[forwarding]]` 항목
#[derive(Debug, Clone, Deserialize)]
pub struct ForwardingSettings {
    #[serde(default = "default_hostname")]
    pub hostname: String,
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
    pub target: String,
    #[serde(default = "default_true")]
    pub strip_prefix: bool,
    /// 같은 라우트가 이미 있으면 교체
    #[serde(default)]
    pub replace: bool,
    pub request_event: Option<String>,
    pub response_event: Option<String>,
}

/// `[[rewrite]]` 항목
#[derive(Debug, Clone, Deserialize)]
pub struct RewriteSettings {
    pub method: Option<String>,
    /// 정확한 경로, `*`로 끝나는 접두사, 또는 `^`로 시작하는 정규식
    pub path: String,
    pub target: String,
    pub cookie: Option<String>,
}

/// `[auth]` 섹션
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_realm")]
    pub realm: String,
    /// 사용자 이름 -> bcrypt 해시
    #[serde(default)]
    pub users: HashMap<String, String>,
    pub htpasswd: Option<PathBuf>,
}

fn default_name() -> String {
    "Heimdall Gateway".to_string()
}

fn default_public_prefix() -> String {
    "/".to_string()
}

fn default_template_slot() -> String {
    DEFAULT_SLOT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_debug_log_capacity() -> usize {
    100
}

fn default_hostname() -> String {
    "*".to_string()
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_realm() -> String {
    "Heimdall Gateway".to_string()
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            name: default_name(),
            url_path_prefix: String::new(),
            public_prefix: default_public_prefix(),
            template_path: None,
            template_slot: default_template_slot(),
            rewrite_index: true,
            debug_log: false,
            debug_log_capacity: default_debug_log_capacity(),
            resources: Vec::new(),
        }
    }
}
