use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;

use crate::body::{self, GatewayResponse};
use crate::gateway::Gateway;

/// 연결 하나의 HTTP/1.1 요청들을 게이트웨이로 전달합니다.
pub struct RequestHandler {
    gateway: Arc<Gateway>,
}

impl RequestHandler {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<Gateway> {
        &self.gateway
    }

    pub async fn handle_request(
        &self,
        req: Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> Result<GatewayResponse, Infallible> {
        Ok(self.gateway.handle(body::from_incoming(req), Some(remote_addr)).await)
    }

    pub async fn handle_connection<I>(
        &self,
        io: I,
        remote_addr: SocketAddr,
    ) -> Result<(), hyper::Error>
    where
        I: hyper::rt::Read + hyper::rt::Write + Send + Unpin + 'static,
    {
        http1::Builder::new()
            .serve_connection(io, service_fn(|req| self.handle_request(req, remote_addr)))
            .await
    }
}
