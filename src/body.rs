use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Incoming;
use hyper::{Request, Response};

/// 게이트웨이 내부에서 사용하는 요청 본문 타입입니다.
///
/// 리스너에서 들어온 `Incoming` 본문과 테스트용 메모리 본문을 같은 타입으로 다루기 위해
/// 박싱된 본문을 사용합니다.
pub type GatewayBody = BoxBody<Bytes, hyper::Error>;

pub type GatewayRequest = Request<GatewayBody>;

/// 게이트웨이 응답은 항상 전체 본문을 모은 뒤 반환됩니다.
pub type GatewayResponse = Response<Full<Bytes>>;

/// 리스너에서 받은 요청을 게이트웨이 요청 타입으로 변환합니다.
pub fn from_incoming(req: Request<Incoming>) -> GatewayRequest {
    req.map(|body| body.boxed())
}

/// 메모리 버퍼로 요청 본문을 만듭니다.
pub fn full(data: impl Into<Bytes>) -> GatewayBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty() -> GatewayBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}
