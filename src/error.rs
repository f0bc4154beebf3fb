use crate::events::EventError;
use crate::proxy::ForwardError;
use crate::resources::TemplateError;
use crate::routing::RoutingError;
use crate::settings::SettingsError;
use crate::tls::TlsError;

/// 게이트웨이 전체에서 사용하는 에러입니다.
///
/// 요청 처리 중 발생한 에러는 `response::error_response`에서 HTTP 상태 코드로 변환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("리소스를 찾을 수 없음: {name}")]
    ResourceNotFound { name: String },

    #[error(transparent)]
    Forward(#[from] ForwardError),

    #[error("인증 실패 (realm: {realm})")]
    Unauthorized { realm: String },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Tls(#[from] TlsError),

    #[error("내부 오류: {0}")]
    Internal(String),
}
