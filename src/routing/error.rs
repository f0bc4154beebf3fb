use hyper::Method;

/// 라우팅 관련 에러를 표현하는 열거형입니다.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RoutingError {
    /// 유효하지 않은 호스트 이름
    #[error("유효하지 않은 호스트 {host}: {reason}")]
    InvalidHost {
        host: String,
        reason: String,
    },
    /// 유효하지 않은 포트 번호
    #[error("유효하지 않은 포트 {port}: {reason}")]
    InvalidPort {
        port: String,
        reason: String,
    },
    /// 잘못된 경로 템플릿
    #[error("잘못된 경로 템플릿: {template} ({reason})")]
    InvalidPathTemplate {
        template: String,
        reason: String,
    },
    /// `Fail` 정책으로 동일한 라우트를 다시 등록하려 한 경우
    #[error("이미 등록된 라우트: {hostname} {method} {path}")]
    RouteConflict {
        hostname: String,
        method: Method,
        path: String,
    },
}
