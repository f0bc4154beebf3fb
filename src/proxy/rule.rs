use hyper::Uri;
use url::Url;

use super::ForwardError;
use crate::routing::PathTemplate;

/// 라우트 하나를 원격 대상으로 전달하는 규칙입니다.
#[derive(Debug, Clone)]
pub struct ForwardRule {
    pub template: PathTemplate,
    pub target: Url,
    /// 참이면 템플릿의 고정 경로 부분을 제거한 뒤 대상 경로에 붙임
    pub strip_prefix: bool,
    /// 전달 직전에 발행할 이벤트 이름
    pub request_event: Option<String>,
    /// 전달 직후에 발행할 이벤트 이름
    pub response_event: Option<String>,
}

impl ForwardRule {
    pub fn new(template: PathTemplate, target: &str, strip_prefix: bool) -> Result<Self, ForwardError> {
        Ok(Self {
            template,
            target: parse_target(target)?,
            strip_prefix,
            request_event: None,
            response_event: None,
        })
    }

    pub fn with_events(mut self, request_event: Option<String>, response_event: Option<String>) -> Self {
        self.request_event = request_event;
        self.response_event = response_event;
        self
    }

    pub fn is_https(&self) -> bool {
        self.target.scheme() == "https"
    }

    /// 대상 기본 경로 뒤에 붙일 요청 경로
    ///
    /// ```
    /// use heimdall_gateway::proxy::ForwardRule;
    /// use heimdall_gateway::routing::PathTemplate;
    ///
    /// let rule = ForwardRule::new(
    ///     PathTemplate::parse("/api1/{*rest}").unwrap(),
    ///     "http://127.0.0.1:5001/v1/",
    ///     true,
    /// ).unwrap();
    /// assert_eq!(rule.target_path("/api1/users/7"), "/users/7");
    /// ```
    pub fn target_path<'a>(&self, path: &'a str) -> &'a str {
        if !self.strip_prefix {
            return path;
        }

        let prefix = self.template.literal_prefix();
        match path.strip_prefix(prefix.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        }
    }

    /// 들어온 요청 URI를 백엔드로 보낼 절대 URI로 변환합니다. 쿼리 문자열은 유지됩니다.
    pub fn outbound_uri(&self, inbound: &Uri) -> Result<Uri, ForwardError> {
        let base = self.target.path().trim_end_matches('/');
        let suffix = self.target_path(inbound.path());

        let mut path = if suffix.is_empty() {
            if base.is_empty() { "/".to_string() } else { base.to_string() }
        } else {
            format!("{}{}", base, suffix)
        };

        if let Some(query) = inbound.query() {
            path.push('?');
            path.push_str(query);
        }

        let authority = self.authority()?;
        format!("{}://{}{}", self.target.scheme(), authority, path)
            .parse::<Uri>()
            .map_err(|e| ForwardError::InvalidTarget {
                target: self.target.to_string(),
                reason: e.to_string(),
            })
    }

    /// `host[:port]` 형태의 대상 주소
    pub fn authority(&self) -> Result<String, ForwardError> {
        let host = self.target.host_str().ok_or_else(|| ForwardError::InvalidTarget {
            target: self.target.to_string(),
            reason: "호스트가 없음".to_string(),
        })?;

        Ok(match self.target.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }
}

fn parse_target(target: &str) -> Result<Url, ForwardError> {
    let invalid = |reason: String| ForwardError::InvalidTarget {
        target: target.to_string(),
        reason,
    };

    let url = Url::parse(target).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("지원하지 않는 스킴: {}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("호스트가 없음".to_string()));
    }
    Ok(url)
}
