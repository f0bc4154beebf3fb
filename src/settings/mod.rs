use std::{env, fs, path::Path};

use hyper::Method;
use serde::Deserialize;
use tracing::{debug, info};

use crate::rewrite::PathMatcher;
use crate::routing::{HostPattern, PathTemplate};

mod error;
mod gateway;
pub mod logging;
mod server;
mod tls;

pub use error::SettingsError;
pub use gateway::{AuthSettings, ForwardingSettings, GatewaySettings, ResourceDirSettings, RewriteSettings};
pub use logging::{LogFormat, LogOutput, LogSettings};
pub use server::{parse_env_var, ServerSettings};
pub use tls::TlsSettings;

pub type Result<T> = std::result::Result<T, SettingsError>;

/// 설정 파일 경로를 지정하는 환경 변수
pub const CONFIG_FILE_ENV: &str = "GATEWAY_CONFIG_FILE";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    // 서버 설정
    #[serde(default)]
    pub server: ServerSettings,

    // 로깅 설정
    #[serde(default)]
    pub logging: LogSettings,

    // TLS 설정
    #[serde(default)]
    pub tls: TlsSettings,

    #[serde(default)]
    pub gateway: GatewaySettings,

    /// 원격 대상으로 전달할 라우트
    #[serde(default)]
    pub forwarding: Vec<ForwardingSettings>,

    /// 라우팅 전에 적용할 재작성 규칙 (내장 index 규칙 뒤에 적용)
    #[serde(default)]
    pub rewrite: Vec<RewriteSettings>,

    pub auth: Option<AuthSettings>,
}

impl Settings {
    /// `GATEWAY_CONFIG_FILE`이 있으면 TOML 파일에서, 없으면 환경 변수에서 설정을 읽습니다.
    pub async fn load() -> Result<Self> {
        if let Ok(config_path) = env::var(CONFIG_FILE_ENV) {
            Self::from_toml_file(&config_path).await
        } else {
            Self::from_env().await
        }
    }

    pub async fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| SettingsError::FileError {
            path: path.as_ref().to_string_lossy().to_string(),
            error: e,
        })?;

        let settings: Self = toml::from_str(&content)?;
        debug!(
            path = %path.as_ref().display(),
            forwarding = settings.forwarding.len(),
            rewrite = settings.rewrite.len(),
            "설정 파일 로드"
        );

        settings.validate().await?;
        Ok(settings)
    }

    pub async fn from_env() -> Result<Self> {
        let settings = Self {
            server: ServerSettings::from_env()?,
            logging: LogSettings::from_env()?,
            tls: TlsSettings::from_env()?,
            ..Self::default()
        };

        // 설정 생성 시점에 바로 검증
        settings.validate().await?;
        Ok(settings)
    }

    /// 설정 유효성 검증
    pub async fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.tls.validate().await?;

        if self.tls.enabled && self.tls.port == self.server.http_port {
            return Err(SettingsError::InvalidConfig(format!(
                "HTTP와 HTTPS 포트는 달라야 합니다: {}",
                self.server.http_port
            )));
        }

        self.validate_gateway()?;

        for forwarding in &self.forwarding {
            validate_method(&forwarding.method)?;
            HostPattern::parse(&forwarding.hostname).map_err(invalid)?;
            PathTemplate::parse(&forwarding.path).map_err(invalid)?;
            validate_target(&forwarding.target)?;
        }

        for rule in &self.rewrite {
            if let Some(method) = &rule.method {
                validate_method(method)?;
            }
            PathMatcher::from_str(&rule.path).map_err(|e| {
                SettingsError::InvalidConfig(format!("재작성 경로 '{}' 오류: {}", rule.path, e))
            })?;
            if !rule.target.starts_with('/') {
                return Err(SettingsError::InvalidConfig(format!(
                    "재작성 대상은 '/'로 시작해야 합니다: {}",
                    rule.target
                )));
            }
        }

        if let Some(auth) = &self.auth {
            if auth.users.is_empty() && auth.htpasswd.is_none() {
                return Err(SettingsError::InvalidConfig(
                    "[auth]에는 users 또는 htpasswd가 필요합니다".to_string(),
                ));
            }
        }

        info!("설정 검증 완료");
        Ok(())
    }

    fn validate_gateway(&self) -> Result<()> {
        let gateway = &self.gateway;

        let prefix = &gateway.url_path_prefix;
        if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
            return Err(SettingsError::InvalidConfig(format!(
                "url_path_prefix는 비어 있거나 '/'로 시작하고 '/'로 끝나지 않아야 합니다: {}",
                prefix
            )));
        }

        if !gateway.public_prefix.starts_with('/') {
            return Err(SettingsError::InvalidConfig(format!(
                "public_prefix는 '/'로 시작해야 합니다: {}",
                gateway.public_prefix
            )));
        }

        if gateway.template_slot.is_empty() {
            return Err(SettingsError::InvalidConfig("template_slot이 비어 있습니다".to_string()));
        }

        if gateway.debug_log && gateway.debug_log_capacity == 0 {
            return Err(SettingsError::InvalidConfig(
                "debug_log_capacity는 0보다 커야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

fn invalid(e: impl std::fmt::Display) -> SettingsError {
    SettingsError::InvalidConfig(e.to_string())
}

fn validate_method(method: &str) -> Result<()> {
    Method::from_bytes(method.as_bytes())
        .map(|_| ())
        .map_err(|e| SettingsError::InvalidConfig(format!("HTTP 메서드 '{}' 오류: {}", method, e)))
}

fn validate_target(target: &str) -> Result<()> {
    let url = url::Url::parse(target)
        .map_err(|e| SettingsError::InvalidConfig(format!("전달 대상 '{}' 오류: {}", target, e)))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(()),
        _ => Err(SettingsError::InvalidConfig(format!(
            "전달 대상은 http(s) URL이어야 합니다: {}",
            target
        ))),
    }
}
