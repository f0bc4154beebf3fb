use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio_rustls::rustls::{self, Certificate, PrivateKey, RootCertStore};
use tokio_rustls::{TlsAcceptor, TlsConnector};
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum TlsError {
    #[error("TLS 파일 읽기 실패: {path} - {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("개인키를 찾을 수 없음: {path}")]
    MissingKey { path: PathBuf },

    #[error("유효한 CA 인증서가 없음: {path}")]
    NoTrustRoots { path: PathBuf },

    #[error("TLS 설정 오류: {0}")]
    Rustls(#[from] rustls::Error),
}

/// HTTPS 리스너와 TLS 수락기
pub struct TlsConfig {
    pub acceptor: TlsAcceptor,
    pub listener: TcpListener,
}

impl TlsConfig {
    pub async fn new(cert_path: &Path, key_path: &Path, addr: &str) -> Result<Self, TlsError> {
        let tls_config = Self::load_tls_config(cert_path, key_path)?;
        let acceptor = TlsAcceptor::from(Arc::new(tls_config));

        let listener = TcpListener::bind(addr).await.map_err(|e| {
            error!(error = %e, addr = addr, "HTTPS 포트 바인딩 실패");
            TlsError::Io {
                path: PathBuf::from(addr),
                source: e,
            }
        })?;

        info!(addr = addr, "HTTPS 리스너 시작");
        Ok(Self { acceptor, listener })
    }

    fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<rustls::ServerConfig, TlsError> {
        let certs = read_certs(cert_path)?.into_iter().map(Certificate).collect();

        let mut key_reader = open(key_path)?;
        let mut keys = rustls_pemfile::pkcs8_private_keys(&mut key_reader).map_err(|e| io_error(key_path, e))?;
        if keys.is_empty() {
            // PKCS#1 (RSA) 형식
            let mut key_reader = open(key_path)?;
            keys = rustls_pemfile::rsa_private_keys(&mut key_reader).map_err(|e| io_error(key_path, e))?;
        }
        let key = keys.into_iter().next().ok_or_else(|| TlsError::MissingKey {
            path: key_path.to_path_buf(),
        })?;

        let config = rustls::ServerConfig::builder()
            .with_safe_defaults()
            .with_no_client_auth()
            .with_single_cert(certs, PrivateKey(key))?;

        Ok(config)
    }
}

/// https 전달 대상에 사용할 TLS 커넥터를 만듭니다. 주어진 PEM 파일의 CA만 신뢰합니다.
pub fn client_connector(ca_path: &Path) -> Result<TlsConnector, TlsError> {
    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(&read_certs(ca_path)?);
    if added == 0 {
        return Err(TlsError::NoTrustRoots {
            path: ca_path.to_path_buf(),
        });
    }
    info!(path = %ca_path.display(), added, ignored, "TLS 클라이언트 신뢰 루트 로드");

    let config = rustls::ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

fn read_certs(path: &Path) -> Result<Vec<Vec<u8>>, TlsError> {
    let mut reader = open(path)?;
    rustls_pemfile::certs(&mut reader).map_err(|e| io_error(path, e))
}

fn open(path: &Path) -> Result<BufReader<File>, TlsError> {
    File::open(path).map(BufReader::new).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: io::Error) -> TlsError {
    TlsError::Io {
        path: path.to_path_buf(),
        source,
    }
}
