//! 요청 처리 파이프라인을 조립하고 실행하는 게이트웨이입니다.
//!
//! 요청 이벤트 → 재작성 → 인증 게이트 → 라우트 디스패치 → 응답 이벤트 순서로 처리합니다.

mod builder;

pub use builder::GatewayBuilder;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use hyper::body::Body;
use hyper::header::{self, HeaderValue};
use tracing::{debug, error, info_span, warn, Instrument};

use crate::auth::{AuthGate, AuthRequirement, CredentialVerifier};
use crate::body::{GatewayRequest, GatewayResponse};
use crate::error::GatewayError;
use crate::events::{EventBus, GatewayEvent, RequestSnapshot, ResponseSnapshot, StreamSink, HTTP_REQUEST, HTTP_RESPONSE};
use crate::response;
use crate::rewrite::Rewriter;
use crate::routing::RouteTable;

/// 이벤트 발행 시 사용하는 출처 이름
const SOURCE: &str = "gateway";

/// 시작 후에는 변경되지 않는 게이트웨이. `Arc`로 공유해 연결마다 사용합니다.
pub struct Gateway {
    routes: RouteTable,
    rewriter: Rewriter,
    auth: AuthGate,
    verifier: Option<Arc<dyn CredentialVerifier>>,
    events: Arc<EventBus>,
    server_name: HeaderValue,
    debug_stream: Option<Arc<StreamSink>>,
}

impl Gateway {
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// 실행 중에도 싱크를 부착하거나 제거할 수 있습니다.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// `debug_log`가 켜져 있을 때의 실시간 이벤트 스트림
    pub fn debug_stream(&self) -> Option<&Arc<StreamSink>> {
        self.debug_stream.as_ref()
    }

    /// 요청 하나를 처리합니다. 오류도 모두 HTTP 응답으로 변환됩니다.
    pub async fn handle(&self, req: GatewayRequest, remote_addr: Option<SocketAddr>) -> GatewayResponse {
        let snapshot = RequestSnapshot::from_request(&req, remote_addr);
        let span = info_span!(
            "request",
            request_id = %snapshot.request_id,
            method = %snapshot.method,
            path = %snapshot.path
        );

        self.process(req, snapshot).instrument(span).await
    }

    async fn process(&self, mut req: GatewayRequest, snapshot: RequestSnapshot) -> GatewayResponse {
        let start_time = Instant::now();

        // 요청 이벤트는 디스패치 전에 모든 싱크에 전달이 끝나야 함
        self.events
            .publish(&GatewayEvent::request(HTTP_REQUEST, SOURCE, snapshot.clone()))
            .await;

        req.extensions_mut().insert(snapshot.clone());
        let req = self.rewriter.rewrite(req);

        let result = match self.authorize(&req) {
            Ok(()) => self.routes.dispatch(req).await,
            Err(e) => Err(e),
        };

        let mut response = match result {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    GatewayError::ResourceNotFound { .. } | GatewayError::Unauthorized { .. } => {
                        debug!(error = %e, "요청 거부")
                    }
                    GatewayError::Forward(_) => warn!(error = %e, "전달 실패"),
                    _ => error!(error = %e, "요청 처리 실패"),
                }
                response::error_response(&e)
            }
        };

        if !response.headers().contains_key(header::SERVER) {
            response.headers_mut().insert(header::SERVER, self.server_name.clone());
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        let summary = ResponseSnapshot::new(response.status(), response.body().size_hint().exact(), duration_ms);
        self.events
            .publish(&GatewayEvent::response(HTTP_RESPONSE, SOURCE, snapshot, summary))
            .await;

        response
    }

    fn authorize(&self, req: &GatewayRequest) -> Result<(), GatewayError> {
        if self.auth.classify(req) == AuthRequirement::Anonymous {
            return Ok(());
        }

        match &self.verifier {
            Some(verifier) if !verifier.verify(req.headers()) => Err(GatewayError::Unauthorized {
                realm: verifier.realm().to_string(),
            }),
            _ => Ok(()),
        }
    }
}
