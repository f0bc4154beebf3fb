use std::net::SocketAddr;

use hyper::{header, Request, StatusCode};
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// 요청 수신 직후 발행되는 이벤트
pub const HTTP_REQUEST: &str = "HTTPRequest";
/// 응답 생성 직후 발행되는 이벤트
pub const HTTP_RESPONSE: &str = "HTTPResponse";

/// 디스패치 전에 요청에서 복사해 둔 정보입니다.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestSnapshot {
    pub request_id: Uuid,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub host: Option<String>,
    pub remote_addr: Option<SocketAddr>,
}

impl RequestSnapshot {
    pub fn from_request<B>(req: &Request<B>, remote_addr: Option<SocketAddr>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(str::to_string),
            host: req
                .headers()
                .get(header::HOST)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
            remote_addr,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponseSnapshot {
    pub status: u16,
    pub content_length: Option<u64>,
    pub duration_ms: u64,
}

impl ResponseSnapshot {
    pub fn new(status: StatusCode, content_length: Option<u64>, duration_ms: u64) -> Self {
        Self {
            status: status.as_u16(),
            content_length,
            duration_ms,
        }
    }
}

/// 이벤트 버스로 전달되는 이벤트입니다.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayEvent {
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// 이벤트를 발행한 구성 요소 (예: "gateway", "forward")
    pub source: String,
    pub request: RequestSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSnapshot>,
}

impl GatewayEvent {
    pub fn request(name: impl Into<String>, source: impl Into<String>, request: RequestSnapshot) -> Self {
        Self {
            name: name.into(),
            timestamp: OffsetDateTime::now_utc(),
            source: source.into(),
            request,
            response: None,
        }
    }

    pub fn response(
        name: impl Into<String>,
        source: impl Into<String>,
        request: RequestSnapshot,
        response: ResponseSnapshot,
    ) -> Self {
        Self {
            response: Some(response),
            ..Self::request(name, source, request)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_and_json_shape() {
        let req = Request::builder()
            .method("POST")
            .uri("/api1/users?page=2")
            .header(header::HOST, "api.example.com")
            .body(())
            .unwrap();
        let remote: SocketAddr = "10.0.0.7:50123".parse().unwrap();
        let snapshot = RequestSnapshot::from_request(&req, Some(remote));

        assert_eq!(snapshot.method, "POST");
        assert_eq!(snapshot.path, "/api1/users");
        assert_eq!(snapshot.query.as_deref(), Some("page=2"));
        assert_eq!(snapshot.host.as_deref(), Some("api.example.com"));

        let event = GatewayEvent::response(
            HTTP_RESPONSE,
            "gateway",
            snapshot,
            ResponseSnapshot::new(StatusCode::CREATED, Some(12), 3),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["name"], "HTTPResponse");
        assert_eq!(json["response"]["status"], 201);
        assert_eq!(json["request"]["remote_addr"], "10.0.0.7:50123");
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
