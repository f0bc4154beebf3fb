use std::net::SocketAddr;
use std::sync::Arc;

use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::handler::RequestHandler;
use super::{Error, Result};
use crate::settings::Settings;
use crate::tls::TlsConfig;

/// HTTP 리스너와 선택적인 HTTPS 리스너
pub struct ServerListener {
    http_listener: TcpListener,
    https_config: Option<TlsConfig>,
}

impl ServerListener {
    pub async fn new(settings: &Settings) -> Result<Self> {
        let http_addr = settings.server.http_addr();
        let http_listener = TcpListener::bind(&http_addr).await.map_err(|e| {
            error!(error = %e, addr = %http_addr, "HTTP 포트 바인딩 실패");
            e
        })?;

        info!(addr = %http_addr, "HTTP 리스너 시작");

        let https_config = if settings.tls.enabled {
            let (cert_path, key_path) = match (&settings.tls.cert_path, &settings.tls.key_path) {
                (Some(cert), Some(key)) => (cert, key),
                _ => {
                    return Err(Error::ConfigError(
                        "TLS가 활성화되었지만 인증서 또는 개인키 경로가 없음".to_string(),
                    ))
                }
            };
            let https_addr = format!("{}:{}", settings.server.bind_address, settings.tls.port);
            Some(TlsConfig::new(cert_path, key_path, &https_addr).await?)
        } else {
            None
        };

        Ok(Self {
            http_listener,
            https_config,
        })
    }

    /// 이미 바인딩된 리스너로 HTTP 전용 서버를 만듭니다.
    pub fn from_listener(http_listener: TcpListener) -> Self {
        Self {
            http_listener,
            https_config: None,
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.http_listener.local_addr()?)
    }

    pub async fn run(self, handler: Arc<RequestHandler>) -> Result<()> {
        loop {
            tokio::select! {
                result = self.http_listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let handler = handler.clone();
                            tokio::spawn(async move {
                                let io = TokioIo::new(stream);
                                if let Err(err) = handler.handle_connection(io, remote_addr).await {
                                    error!(error = %err, "HTTP 연결 처리 실패");
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "HTTP 연결 수락 실패");
                        }
                    }
                }

                result = async {
                    match &self.https_config {
                        Some(config) => config.listener.accept().await.map(|conn| (conn, config.acceptor.clone())),
                        None => std::future::pending().await,
                    }
                } => {
                    match result {
                        Ok(((stream, remote_addr), acceptor)) => {
                            let handler = handler.clone();
                            tokio::spawn(async move {
                                match acceptor.accept(stream).await {
                                    Ok(tls_stream) => {
                                        let io = TokioIo::new(tls_stream);
                                        if let Err(err) = handler.handle_connection(io, remote_addr).await {
                                            error!(error = %err, "HTTPS 연결 처리 실패");
                                        }
                                    }
                                    Err(e) => {
                                        error!(error = %e, "TLS 핸드쉐이크 실패");
                                    }
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "HTTPS 연결 수락 실패");
                        }
                    }
                }
            }
        }
    }
}
