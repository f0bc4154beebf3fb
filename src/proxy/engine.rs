use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper::header::{self, HeaderValue};
use hyper::{Request, Response, Uri};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::rustls::ServerName;
use tokio_rustls::TlsConnector;
use tracing::{debug, info};

use super::{ForwardError, ForwardRule};
use crate::body::{GatewayBody, GatewayRequest, GatewayResponse};

/// 요청을 원격 대상으로 전달하고 응답을 그대로 돌려줍니다.
///
/// 요청마다 새 연결을 사용합니다. 재시도, 캐시, 별도 타임아웃은 없습니다.
#[derive(Clone, Default)]
pub struct ForwardingEngine {
    tls: Option<TlsConnector>,
}

impl ForwardingEngine {
    pub fn new() -> Self {
        Self { tls: None }
    }

    /// https 대상에 사용할 TLS 커넥터를 지정합니다.
    pub fn with_tls(mut self, connector: TlsConnector) -> Self {
        self.tls = Some(connector);
        self
    }

    pub async fn forward(
        &self,
        rule: &ForwardRule,
        req: GatewayRequest,
    ) -> Result<GatewayResponse, ForwardError> {
        let target = rule.outbound_uri(req.uri())?;
        let authority = rule.authority()?;
        let outbound = build_outbound_request(req, &target, &authority)?;

        let port = rule
            .target
            .port_or_known_default()
            .unwrap_or(if rule.is_https() { 443 } else { 80 });
        let host = rule.target.host_str().unwrap_or_default();
        let address = format!("{}:{}", host, port);

        let connector = match (rule.is_https(), &self.tls) {
            (true, None) => {
                return Err(ForwardError::TlsUnavailable {
                    target: target.to_string(),
                })
            }
            (true, Some(connector)) => Some(connector),
            (false, _) => None,
        };

        info!(target = %target, "백엔드로 요청 전달");
        let stream = TcpStream::connect(&address)
            .await
            .map_err(|e| ForwardError::unreachable(&target, e))?;

        let response = if let Some(connector) = connector {
            let server_name = ServerName::try_from(host.trim_start_matches('[').trim_end_matches(']'))
                .map_err(|e| ForwardError::InvalidTarget {
                    target: target.to_string(),
                    reason: e.to_string(),
                })?;
            let stream = connector
                .connect(server_name, stream)
                .await
                .map_err(|e| ForwardError::unreachable(&target, e))?;
            send(stream, outbound, &target).await?
        } else {
            send(stream, outbound, &target).await?
        };

        let (parts, body) = response.into_parts();
        let bytes = body
            .collect()
            .await
            .map_err(|e| ForwardError::upstream(&target, e))?
            .to_bytes();

        debug!(status = %parts.status, bytes_size = bytes.len(), "백엔드 응답 수신");
        Ok(Response::from_parts(parts, Full::new(bytes)))
    }
}

/// 들어온 요청의 메서드와 본문을 유지한 채 백엔드용 요청을 만듭니다.
fn build_outbound_request(
    req: GatewayRequest,
    target: &Uri,
    authority: &str,
) -> Result<Request<GatewayBody>, ForwardError> {
    let invalid = |reason: String| ForwardError::InvalidTarget {
        target: target.to_string(),
        reason,
    };

    let (mut parts, body) = req.into_parts();

    // HTTP/1 클라이언트 연결에는 origin-form URI를 사용
    parts.uri = match target.path_and_query() {
        Some(path_and_query) => path_and_query
            .as_str()
            .parse()
            .map_err(|e: hyper::http::uri::InvalidUri| invalid(e.to_string()))?,
        None => Uri::from_static("/"),
    };

    parts.headers.remove(header::CONNECTION);
    parts.headers.insert(
        header::HOST,
        HeaderValue::from_str(authority).map_err(|e| invalid(e.to_string()))?,
    );

    Ok(Request::from_parts(parts, body))
}

async fn send<S>(
    stream: S,
    req: Request<GatewayBody>,
    target: &Uri,
) -> Result<Response<Incoming>, ForwardError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, connection) = http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| ForwardError::unreachable(target, e))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!(error = %e, "백엔드 연결 종료");
        }
    });

    sender
        .send_request(req)
        .await
        .map_err(|e| ForwardError::upstream(target, e))
}
