use std::fmt;

use hyper::{header, Request};

use crate::routing::error::RoutingError;

/// 호스트 정보를 담는 불변 데이터 구조입니다.
///
/// # 필드
///
/// * `name` - 소문자로 정규화된 호스트 이름 (예: "example.com")
/// * `port` - 선택적 포트 번호
#[derive(Clone, Debug, PartialEq)]
pub struct HostInfo {
    pub name: String,
    pub port: Option<u16>,
}

impl HostInfo {
    /// 호스트 헤더 값에서 HostInfo를 생성합니다.
    ///
    /// # 예제
    ///
    /// ```
    /// use heimdall_gateway::routing::HostInfo;
    ///
    /// let host_info = HostInfo::from_header_value("Example.com:8080").unwrap();
    /// assert_eq!(host_info.name, "example.com");
    /// assert_eq!(host_info.port, Some(8080));
    /// ```
    pub fn from_header_value(value: &str) -> Result<Self, RoutingError> {
        let invalid = |reason: &str| RoutingError::InvalidHost {
            host: value.to_string(),
            reason: reason.to_string(),
        };

        if value.is_empty() {
            return Err(invalid("Invalid format"));
        }

        match value.split(':').collect::<Vec<_>>().as_slice() {
            [name] => Ok(HostInfo {
                name: name.to_ascii_lowercase(),
                port: None,
            }),
            [name, port] => {
                if name.is_empty() {
                    return Err(invalid("Invalid format"));
                }

                let port = port.parse::<u16>().map_err(|_| RoutingError::InvalidPort {
                    port: port.to_string(),
                    reason: "Invalid format".to_string(),
                })?;

                if port == 0 {
                    return Err(RoutingError::InvalidPort {
                        port: port.to_string(),
                        reason: "Port must be greater than 0".to_string(),
                    });
                }

                Ok(HostInfo {
                    name: name.to_ascii_lowercase(),
                    port: Some(port),
                })
            }
            _ => Err(invalid("Invalid format")),
        }
    }

    /// 요청의 Host 헤더(없으면 URI authority)에서 호스트 정보를 추출합니다.
    ///
    /// 호스트를 알 수 없거나 파싱할 수 없으면 `None`을 반환하며,
    /// 이 경우 `*` 패턴의 라우트만 매칭됩니다.
    pub fn from_request<B>(req: &Request<B>) -> Option<Self> {
        let raw = req
            .headers()
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| req.uri().authority().map(|authority| authority.as_str()))?;

        HostInfo::from_header_value(raw).ok()
    }
}

/// 라우트가 매칭할 호스트 이름 패턴입니다.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HostPattern {
    /// 모든 호스트 (`*`)
    Any,
    /// 정확히 일치하는 호스트
    Exact(String),
    /// `*.example.com` 형태의 서브도메인 패턴 (".example.com" 저장)
    Suffix(String),
}

impl HostPattern {
    pub fn parse(pattern: &str) -> Result<Self, RoutingError> {
        let pattern = pattern.trim().to_ascii_lowercase();

        if pattern.is_empty() || pattern == "*" {
            return Ok(HostPattern::Any);
        }

        if let Some(suffix) = pattern.strip_prefix('*') {
            if !suffix.starts_with('.') || suffix.len() < 2 {
                return Err(RoutingError::InvalidHost {
                    host: pattern.clone(),
                    reason: "와일드카드는 '*.' 형태로만 사용할 수 있음".to_string(),
                });
            }
            return Ok(HostPattern::Suffix(suffix.to_string()));
        }

        if pattern.contains('*') || pattern.contains('/') || pattern.contains(':') {
            return Err(RoutingError::InvalidHost {
                host: pattern,
                reason: "Invalid format".to_string(),
            });
        }

        Ok(HostPattern::Exact(pattern))
    }

    pub fn matches(&self, host: Option<&HostInfo>) -> bool {
        match (self, host) {
            (HostPattern::Any, _) => true,
            (HostPattern::Exact(name), Some(info)) => *name == info.name,
            (HostPattern::Suffix(suffix), Some(info)) => info.name.ends_with(suffix.as_str()),
            (_, None) => false,
        }
    }
}

impl fmt::Display for HostPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostPattern::Any => write!(f, "*"),
            HostPattern::Exact(name) => write!(f, "{}", name),
            HostPattern::Suffix(suffix) => write!(f, "*{}", suffix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_info_parsing() {
        let info = HostInfo::from_header_value("example.com").unwrap();
        assert_eq!(info.name, "example.com");
        assert_eq!(info.port, None);

        let info = HostInfo::from_header_value("127.0.0.1:9090").unwrap();
        assert_eq!(info.name, "127.0.0.1");
        assert_eq!(info.port, Some(9090));

        assert!(matches!(
            HostInfo::from_header_value("example.com:invalid"),
            Err(RoutingError::InvalidPort { .. })
        ));
        assert!(HostInfo::from_header_value(":80").is_err());
        assert!(HostInfo::from_header_value("a:b:c").is_err());
    }

    #[test]
    fn test_host_pattern_matching() {
        let host = HostInfo::from_header_value("api.example.com:8080").unwrap();

        assert!(HostPattern::parse("*").unwrap().matches(Some(&host)));
        assert!(HostPattern::parse("*").unwrap().matches(None));
        assert!(HostPattern::parse("API.example.com").unwrap().matches(Some(&host)));
        assert!(HostPattern::parse("*.example.com").unwrap().matches(Some(&host)));
        assert!(!HostPattern::parse("*.example.org").unwrap().matches(Some(&host)));
        assert!(!HostPattern::parse("example.com").unwrap().matches(Some(&host)));
        assert!(!HostPattern::parse("example.com").unwrap().matches(None));
    }

    #[test]
    fn test_host_pattern_rejects_malformed() {
        assert!(HostPattern::parse("*example.com").is_err());
        assert!(HostPattern::parse("api.*.com").is_err());
        assert!(HostPattern::parse("example.com:80").is_err());
    }
}
