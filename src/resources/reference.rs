use std::fmt;

use super::content_type::content_type_for;

const INDEX_DOCUMENT: &str = "index.html";
const INDEX_TEMPLATE: &str = "index.shtml";
const TEMPLATE_EXTENSION: &str = ".shtml";

/// URL 경로에서 유도된 리소스 참조입니다.
///
/// 경로 구분자 `/`는 `.`으로 바뀐 논리 이름(`docs.guide.intro.shtml`)과
/// 원래의 경로 세그먼트(`["docs", "guide", "intro.shtml"]`)를 함께 가집니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    name: String,
    segments: Vec<String>,
    content_type: &'static str,
    is_template: bool,
}

impl ResourceRef {
    /// 라우트가 캡처한 경로 값으로 참조를 만듭니다.
    ///
    /// * 값이 없거나 비어 있으면 `index.html`
    /// * `/`로 끝나면 해당 디렉터리의 `index.shtml`
    ///
    /// ```
    /// use heimdall_gateway::resources::ResourceRef;
    ///
    /// let reference = ResourceRef::from_url_path(Some("docs/"));
    /// assert_eq!(reference.name(), "docs.index.shtml");
    /// assert!(reference.is_template());
    /// ```
    pub fn from_url_path(path: Option<&str>) -> Self {
        let path = path.unwrap_or("").trim_start_matches('/');

        let mut segments: Vec<String> = path.split('/').map(str::to_string).collect();
        match segments.last_mut() {
            Some(last) if path.is_empty() => *last = INDEX_DOCUMENT.to_string(),
            Some(last) if last.is_empty() => *last = INDEX_TEMPLATE.to_string(),
            _ => {}
        }

        Self::from_segments(segments)
    }

    /// 경로 구분 없이 이름 하나로 된 참조 (예: `template.html`)
    pub fn named(name: &str) -> Self {
        Self::from_segments(vec![name.to_string()])
    }

    fn from_segments(segments: Vec<String>) -> Self {
        let name = segments.join(".");
        Self {
            content_type: content_type_for(&name),
            is_template: name.ends_with(TEMPLATE_EXTENSION),
            segments,
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    /// 템플릿 셸과 합성해야 하는 문서인지 여부
    pub fn is_template(&self) -> bool {
        self.is_template
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
