//! 익명 접근 허용 여부를 결정하는 인증 게이트입니다.
//!
//! 게이트는 판단만 하며, 실제 자격증명 검증은 `CredentialVerifier` 구현체에 위임합니다.

mod basic;

pub use basic::{BasicAuthVerifier, CredentialSource};

use hyper::{HeaderMap, Request};

/// 요청에 필요한 인증 수준입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    Anonymous,
    RequireCredential,
}

/// 자격증명 검증기. 세션 저장소나 API 키 저장소 같은 외부 협력자를 감쌉니다.
pub trait CredentialVerifier: Send + Sync {
    /// `WWW-Authenticate` 응답에 사용할 realm
    fn realm(&self) -> &str;

    /// 요청 헤더의 자격증명을 검증합니다.
    fn verify(&self, headers: &HeaderMap) -> bool;
}

/// 공개 경로 접두사 아래의 요청은 익명으로 허용합니다.
#[derive(Debug, Clone)]
pub struct AuthGate {
    public_prefix: String,
}

impl AuthGate {
    pub fn new(public_prefix: impl Into<String>) -> Self {
        Self {
            public_prefix: public_prefix.into(),
        }
    }

    pub fn public_prefix(&self) -> &str {
        &self.public_prefix
    }

    pub fn classify<B>(&self, req: &Request<B>) -> AuthRequirement {
        if req.uri().path().starts_with(&self.public_prefix) {
            AuthRequirement::Anonymous
        } else {
            AuthRequirement::RequireCredential
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: &str) -> Request<()> {
        Request::builder().uri(path).body(()).unwrap()
    }

    #[test]
    fn test_public_prefix_is_anonymous() {
        let gate = AuthGate::new("/public");
        assert_eq!(gate.classify(&request("/public")), AuthRequirement::Anonymous);
        assert_eq!(gate.classify(&request("/public/app.js")), AuthRequirement::Anonymous);
        assert_eq!(gate.classify(&request("/publications")), AuthRequirement::Anonymous);
        assert_eq!(gate.classify(&request("/api1")), AuthRequirement::RequireCredential);
    }

    #[test]
    fn test_root_prefix_allows_everything() {
        let gate = AuthGate::new("/");
        assert_eq!(gate.classify(&request("/")), AuthRequirement::Anonymous);
        assert_eq!(gate.classify(&request("/admin/index.shtml")), AuthRequirement::Anonymous);
    }
}
