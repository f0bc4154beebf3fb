//! 라우팅 전에 요청 경로를 재작성하는 모듈입니다.
//!
//! 재작성은 요청당 한 번만 적용되며, 일치하는 규칙이 없으면 요청을 그대로 돌려줍니다.

mod matcher;

pub use matcher::{PathMatcher, PathMatcherKind};

use hyper::http::uri::PathAndQuery;
use hyper::{header, Method, Request, Uri};
use tracing::{debug, warn};

/// 재작성 규칙 하나입니다.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    /// 지정되면 해당 메서드에만 적용
    pub method: Option<Method>,
    pub matcher: PathMatcher,
    /// 새 경로. 정규식 매처는 캡처 참조(`$1`)를 사용할 수 있음
    pub target: String,
    /// 지정되면 해당 이름의 쿠키가 있는 요청에만 적용
    pub require_cookie: Option<String>,
}

impl RewriteRule {
    pub fn new(matcher: PathMatcher, target: impl Into<String>) -> Self {
        Self {
            method: None,
            matcher,
            target: target.into(),
            require_cookie: None,
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>) -> Self {
        self.require_cookie = Some(name.into());
        self
    }

    /// `{prefix}/` 요청을 `{prefix}/index.html`로 바꾸는 기본 규칙
    pub fn index(prefix: &str) -> Self {
        let prefix = prefix.trim_end_matches('/');
        RewriteRule::new(
            PathMatcher::exact(format!("{}/", prefix)),
            format!("{}/index.html", prefix),
        )
        .with_method(Method::GET)
    }

    fn apply<B>(&self, req: &Request<B>) -> Option<String> {
        if let Some(method) = &self.method {
            if req.method() != method {
                return None;
            }
        }

        if let Some(cookie) = &self.require_cookie {
            if !has_cookie(req, cookie) {
                return None;
            }
        }

        self.matcher.apply(req.uri().path(), &self.target)
    }
}

/// 순서가 있는 재작성 규칙 목록입니다. 처음 일치한 규칙만 적용됩니다.
#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    rules: Vec<RewriteRule>,
}

impl Rewriter {
    pub fn new(rules: Vec<RewriteRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    pub fn rewrite<B>(&self, req: Request<B>) -> Request<B> {
        let Some(new_path) = self.rules.iter().find_map(|rule| rule.apply(&req)) else {
            return req;
        };

        if new_path == req.uri().path() {
            return req;
        }

        let (mut parts, body) = req.into_parts();
        match replace_path(&parts.uri, &new_path) {
            Some(uri) => {
                debug!(from = %parts.uri, to = %uri, "요청 경로 재작성");
                parts.uri = uri;
            }
            None => warn!(uri = %parts.uri, target = %new_path, "재작성 대상 경로가 유효하지 않아 무시함"),
        }

        Request::from_parts(parts, body)
    }
}

fn replace_path(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    let mut uri_parts = uri.clone().into_parts();
    uri_parts.path_and_query = Some(path_and_query.parse::<PathAndQuery>().ok()?);
    Uri::from_parts(uri_parts).ok()
}

fn has_cookie<B>(req: &Request<B>, name: &str) -> bool {
    req.headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, _)| key.trim() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    #[test]
    fn test_index_rewrite() {
        let rewriter = Rewriter::new(vec![RewriteRule::index("")]);

        let req = rewriter.rewrite(request(Method::GET, "/"));
        assert_eq!(req.uri().path(), "/index.html");

        let req = rewriter.rewrite(request(Method::GET, "/?lang=de"));
        assert_eq!(req.uri().path(), "/index.html");
        assert_eq!(req.uri().query(), Some("lang=de"));

        let req = rewriter.rewrite(request(Method::POST, "/"));
        assert_eq!(req.uri().path(), "/");
    }

    #[test]
    fn test_index_rewrite_with_prefix() {
        let rewriter = Rewriter::new(vec![RewriteRule::index("/portal/")]);
        let req = rewriter.rewrite(request(Method::GET, "/portal/"));
        assert_eq!(req.uri().path(), "/portal/index.html");
    }

    #[test]
    fn test_non_matching_request_is_unchanged() {
        let rewriter = Rewriter::new(vec![RewriteRule::index("")]);
        let req = rewriter.rewrite(request(Method::GET, "/app.js?v=1"));
        assert_eq!(req.uri().to_string(), "/app.js?v=1");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rewriter = Rewriter::new(vec![
            RewriteRule::new(PathMatcher::from_str("/admin").unwrap(), "/admin/index.shtml"),
            RewriteRule::new(PathMatcher::from_str("/admin").unwrap(), "/never"),
        ]);
        let req = rewriter.rewrite(request(Method::GET, "/admin"));
        assert_eq!(req.uri().path(), "/admin/index.shtml");
    }

    #[test]
    fn test_cookie_condition() {
        let rule = RewriteRule::new(PathMatcher::from_str("/").unwrap(), "/dashboard/index.shtml")
            .with_method(Method::GET)
            .with_cookie("session");
        let rewriter = Rewriter::new(vec![rule]);

        let anonymous = rewriter.rewrite(request(Method::GET, "/"));
        assert_eq!(anonymous.uri().path(), "/");

        let with_cookie = Request::builder()
            .uri("/")
            .header(header::COOKIE, "theme=dark; session=abc")
            .body(())
            .unwrap();
        let req = rewriter.rewrite(with_cookie);
        assert_eq!(req.uri().path(), "/dashboard/index.shtml");
    }
}
