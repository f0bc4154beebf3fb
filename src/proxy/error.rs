use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("잘못된 전달 대상: {target} - {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("https 대상에 사용할 TLS 클라이언트 설정이 없음: {target}")]
    TlsUnavailable { target: String },

    #[error("백엔드 연결 실패: {target} - {reason}")]
    Unreachable { target: String, reason: String },

    #[error("백엔드 응답 수신 실패: {target} - {reason}")]
    Upstream { target: String, reason: String },
}

impl ForwardError {
    pub(crate) fn unreachable(target: impl ToString, reason: impl ToString) -> Self {
        Self::Unreachable {
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn upstream(target: impl ToString, reason: impl ToString) -> Self {
        Self::Upstream {
            target: target.to_string(),
            reason: reason.to_string(),
        }
    }
}
