use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{header, Response, StatusCode};

use super::StreamSink;
use crate::body::{GatewayRequest, GatewayResponse};
use crate::error::GatewayError;
use crate::routing::{PathParams, RouteHandler};

/// `GET {prefix}/DebugLog` - 스트림 싱크가 보관 중인 최근 이벤트를 JSON으로 반환합니다.
pub struct EventLogHandler {
    stream: Arc<StreamSink>,
}

impl EventLogHandler {
    pub fn new(stream: Arc<StreamSink>) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl RouteHandler for EventLogHandler {
    fn kind(&self) -> &str {
        "debug-log"
    }

    async fn handle(
        &self,
        _req: GatewayRequest,
        _params: PathParams,
    ) -> Result<GatewayResponse, GatewayError> {
        let events = self.stream.recent();
        let json = serde_json::to_vec(&events).map_err(|e| GatewayError::Internal(e.to_string()))?;

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CACHE_CONTROL, "no-cache")
            .body(Full::new(Bytes::from(json)))
            .map_err(|e| GatewayError::Internal(e.to_string()))
    }
}
