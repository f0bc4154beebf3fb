use std::{env, path::PathBuf};

use serde::Deserialize;
use tokio::fs;

use super::{server::parse_env_var, SettingsError};

#[derive(Debug, Clone, Deserialize)]
pub struct TlsSettings {
    /// HTTPS 리스너 활성화 여부
    #[serde(default)]
    pub enabled: bool,

    /// HTTPS 포트
    #[serde(default = "default_https_port")]
    pub port: u16,

    /// 인증서 파일 경로
    pub cert_path: Option<PathBuf>,

    /// 개인키 파일 경로
    pub key_path: Option<PathBuf>,

    /// https 전달 대상을 검증할 CA 인증서 (PEM). 없으면 https 대상으로 전달할 수 없음
    pub client_ca_path: Option<PathBuf>,
}

impl TlsSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            enabled: parse_env_var("GATEWAY_TLS_ENABLED", || false)?,
            port: parse_env_var("GATEWAY_TLS_PORT", default_https_port)?,
            cert_path: env::var("GATEWAY_TLS_CERT").map(PathBuf::from).ok(),
            key_path: env::var("GATEWAY_TLS_KEY").map(PathBuf::from).ok(),
            client_ca_path: env::var("GATEWAY_TLS_CLIENT_CA").map(PathBuf::from).ok(),
        })
    }

    /// TLS 설정이 유효한지 검증
    pub async fn validate(&self) -> Result<(), SettingsError> {
        if let Some(ca_path) = &self.client_ca_path {
            check_readable(ca_path).await?;
        }

        if !self.enabled {
            return Ok(());
        }

        // 인증서와 키 파일이 모두 지정되어 있는지 확인
        let cert_path = self.cert_path.as_ref().ok_or_else(|| SettingsError::EnvVarMissing {
            var_name: "GATEWAY_TLS_CERT".to_string(),
        })?;

        let key_path = self.key_path.as_ref().ok_or_else(|| SettingsError::EnvVarMissing {
            var_name: "GATEWAY_TLS_KEY".to_string(),
        })?;

        check_readable(cert_path).await?;
        check_readable(key_path).await?;
        Ok(())
    }
}

async fn check_readable(path: &PathBuf) -> Result<(), SettingsError> {
    fs::read(path).await.map(|_| ()).map_err(|e| SettingsError::FileError {
        path: path.to_string_lossy().to_string(),
        error: e,
    })
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_https_port(),
            cert_path: None,
            key_path: None,
            client_ca_path: None,
        }
    }
}

fn default_https_port() -> u16 {
    8443
}
