use std::fmt;

use crate::routing::error::RoutingError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Literal(String),
    /// `{name}` - 비어 있지 않은 한 세그먼트
    Param(String),
    /// `{*name}` - 나머지 경로 전체 (마지막에만 허용)
    Wildcard(String),
}

/// 경로 템플릿입니다.
///
/// `/api/{version}/users`, `/static/{*file}` 과 같이 이름 있는 세그먼트와
/// 마지막 위치의 와일드카드를 지원합니다. 와일드카드는 비어 있지 않은 나머지
/// 경로(`/` 포함)를 캡처합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self, RoutingError> {
        let invalid = |reason: &str| RoutingError::InvalidPathTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let rest = template
            .strip_prefix('/')
            .ok_or_else(|| invalid("템플릿은 '/'로 시작해야 함"))?;

        let parts: Vec<&str> = rest.split('/').collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (index, part) in parts.iter().enumerate() {
            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(inner) => match inner.strip_prefix('*') {
                    Some(name) => {
                        if index + 1 != parts.len() {
                            return Err(invalid("와일드카드는 마지막 세그먼트에만 올 수 있음"));
                        }
                        Segment::Wildcard(name.to_string())
                    }
                    None => Segment::Param(inner.to_string()),
                },
                None => {
                    if part.contains('{') || part.contains('}') {
                        return Err(invalid("세그먼트 일부만 파라미터일 수 없음"));
                    }
                    Segment::Literal(part.to_string())
                }
            };

            if let Segment::Param(name) | Segment::Wildcard(name) = &segment {
                if name.is_empty() {
                    return Err(invalid("파라미터 이름이 비어 있음"));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// 첫 번째 파라미터 이전의 고정 경로 부분입니다. 끝의 `/`는 제거됩니다.
    ///
    /// ```
    /// use heimdall_gateway::routing::PathTemplate;
    ///
    /// let template = PathTemplate::parse("/api1/{*rest}").unwrap();
    /// assert_eq!(template.literal_prefix(), "/api1");
    /// ```
    pub fn literal_prefix(&self) -> String {
        let mut prefix = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => {
                    prefix.push('/');
                    prefix.push_str(literal);
                }
                _ => break,
            }
        }
        prefix.trim_end_matches('/').to_string()
    }

    /// 경로가 템플릿과 구조적으로 일치하면 캡처된 값을 반환합니다.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let mut remaining = Some(path.strip_prefix('/')?);
        let mut params = PathParams::default();

        for segment in &self.segments {
            let rest = remaining?;

            if let Segment::Wildcard(name) = segment {
                if rest.is_empty() {
                    return None;
                }
                params.push(name, rest);
                return Some(params);
            }

            let (head, tail) = match rest.split_once('/') {
                Some((head, tail)) => (head, Some(tail)),
                None => (rest, None),
            };

            match segment {
                Segment::Literal(literal) if literal == head => {}
                Segment::Param(name) if !head.is_empty() => params.push(name, head),
                _ => return None,
            }

            remaining = tail;
        }

        // 템플릿을 모두 소비했을 때 경로도 끝나야 함
        match remaining {
            None => Some(params),
            Some(_) => None,
        }
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// 템플릿 매칭으로 캡처된 세그먼트 값들입니다. 템플릿에 나온 순서를 유지합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    values: Vec<(String, String)>,
}

impl PathParams {
    fn push(&mut self, name: &str, value: &str) {
        self.values.push((name.to_string(), value.to_string()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 마지막으로 캡처된 값
    pub fn last(&self) -> Option<&str> {
        self.values.last().map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_templates() {
        let root = PathTemplate::parse("/").unwrap();
        assert!(root.matches("/").is_some());
        assert!(root.matches("/index.html").is_none());

        let exact = PathTemplate::parse("/api1").unwrap();
        assert!(exact.matches("/api1").is_some());
        assert!(exact.matches("/api1/").is_none());
        assert!(exact.matches("/api10").is_none());
        assert!(exact.matches("/api1/users").is_none());
    }

    #[test]
    fn test_named_segments() {
        let template = PathTemplate::parse("/users/{id}/posts/{post}").unwrap();
        let params = template.matches("/users/42/posts/7").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.get("post"), Some("7"));
        assert_eq!(params.last(), Some("7"));

        assert!(template.matches("/users//posts/7").is_none());
        assert!(template.matches("/users/42/posts").is_none());
    }

    #[test]
    fn test_trailing_wildcard() {
        let template = PathTemplate::parse("/{*file}").unwrap();
        assert_eq!(template.matches("/app.js").unwrap().get("file"), Some("app.js"));
        assert_eq!(template.matches("/docs/").unwrap().get("file"), Some("docs/"));
        assert_eq!(
            template.matches("/docs/guide/intro.shtml").unwrap().last(),
            Some("docs/guide/intro.shtml")
        );
        assert!(template.matches("/").is_none());

        let nested = PathTemplate::parse("/api1/{*rest}").unwrap();
        assert_eq!(nested.matches("/api1/a/b").unwrap().get("rest"), Some("a/b"));
        assert!(nested.matches("/api1").is_none());
        assert!(nested.matches("/api1/").is_none());
    }

    #[test]
    fn test_literal_prefix() {
        assert_eq!(PathTemplate::parse("/").unwrap().literal_prefix(), "");
        assert_eq!(PathTemplate::parse("/api1").unwrap().literal_prefix(), "/api1");
        assert_eq!(PathTemplate::parse("/api/v1/{*rest}").unwrap().literal_prefix(), "/api/v1");
        assert_eq!(PathTemplate::parse("/{*file}").unwrap().literal_prefix(), "");
    }

    #[test]
    fn test_invalid_templates() {
        assert!(PathTemplate::parse("api").is_err());
        assert!(PathTemplate::parse("/{*rest}/tail").is_err());
        assert!(PathTemplate::parse("/{}").is_err());
        assert!(PathTemplate::parse("/file{id}.txt").is_err());
    }
}
