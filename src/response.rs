use bytes::Bytes;
use http_body_util::Full;
use hyper::{header, Response, StatusCode};
use tracing::error;

use crate::body::GatewayResponse;
use crate::error::GatewayError;
use crate::routing::RoutingError;

/// 정적 리소스와 404 응답에 붙는 캐시 정책
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=300";

/// 본문 없는 404 응답을 생성합니다.
pub fn not_found() -> GatewayResponse {
    build(
        Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header(header::CACHE_CONTROL, DEFAULT_CACHE_CONTROL),
        Bytes::new(),
    )
}

/// 401 Unauthorized 응답을 생성합니다.
pub fn unauthorized(realm: &str) -> GatewayResponse {
    build(
        Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .header(header::WWW_AUTHENTICATE, format!("Basic realm=\"{}\"", realm)),
        Bytes::from("Unauthorized"),
    )
}

/// 게이트웨이 에러를 HTTP 응답으로 변환합니다.
pub fn error_response(err: &GatewayError) -> GatewayResponse {
    match err {
        GatewayError::ResourceNotFound { .. } => not_found(),
        GatewayError::Unauthorized { realm } => unauthorized(realm),
        GatewayError::Forward(e) => text(StatusCode::BAD_GATEWAY, format!("Backend error: {}", e)),
        GatewayError::Routing(RoutingError::InvalidHost { .. } | RoutingError::InvalidPort { .. }) => {
            text(StatusCode::BAD_REQUEST, format!("Error: {}", err))
        }
        _ => text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string()),
    }
}

fn text(status: StatusCode, message: String) -> GatewayResponse {
    build(
        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8"),
        Bytes::from(message),
    )
}

fn build(builder: hyper::http::response::Builder, body: Bytes) -> GatewayResponse {
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        error!(error = %e, "에러 응답 생성 실패");
        Response::new(Full::new(Bytes::from("Internal Server Error")))
    })
}
