use regex_lite as regex;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathMatcherKind {
    Exact,
    Prefix,
    Regex,
}

/// 재작성 규칙이 요청 경로를 비교하는 방식입니다.
///
/// * `^`로 시작하면 정규식
/// * `*`로 끝나면 접두사
/// * 그 외는 정확히 일치
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pub kind: PathMatcherKind,
    pub pattern: String,
    regex: Option<regex::Regex>,
}

impl PathMatcher {
    pub fn from_str(pattern: &str) -> Result<Self, regex::Error> {
        if pattern.starts_with('^') {
            let re = regex::Regex::new(pattern)?;
            return Ok(PathMatcher {
                kind: PathMatcherKind::Regex,
                pattern: pattern.to_string(),
                regex: Some(re),
            });
        }

        Ok(PathMatcher {
            kind: if pattern.ends_with('*') {
                PathMatcherKind::Prefix
            } else {
                PathMatcherKind::Exact
            },
            pattern: pattern.trim_end_matches('*').to_string(),
            regex: None,
        })
    }

    pub fn exact(path: impl Into<String>) -> Self {
        PathMatcher {
            kind: PathMatcherKind::Exact,
            pattern: path.into(),
            regex: None,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self.kind {
            PathMatcherKind::Exact => self.pattern == path,
            PathMatcherKind::Prefix => path.starts_with(&self.pattern),
            PathMatcherKind::Regex => self
                .regex
                .as_ref()
                .map(|r| r.is_match(path))
                .unwrap_or(false),
        }
    }

    /// 경로가 매칭되면 `target`을 적용한 새 경로를 반환합니다.
    ///
    /// 정규식 매처는 `target`의 `$1`, `${name}` 같은 캡처 참조를 치환합니다.
    pub fn apply(&self, path: &str, target: &str) -> Option<String> {
        match (&self.kind, &self.regex) {
            (PathMatcherKind::Regex, Some(re)) => {
                let captures = re.captures(path)?;
                let mut expanded = String::new();
                captures.expand(target, &mut expanded);
                Some(expanded)
            }
            _ if self.matches(path) => Some(target.to_string()),
            _ => None,
        }
    }
}

impl PartialEq for PathMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.pattern == other.pattern
    }
}

impl Eq for PathMatcher {}
