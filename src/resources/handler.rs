use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{header, Response, StatusCode};
use tracing::debug;

use super::{content_type, ResourceChain, ResourceRef, TemplateMixer};
use crate::body::{GatewayRequest, GatewayResponse};
use crate::error::GatewayError;
use crate::response::DEFAULT_CACHE_CONTROL;
use crate::routing::{PathParams, RouteHandler};

/// 내장 정적 라우트의 핸들러입니다.
///
/// 마지막으로 캡처된 경로 값으로 리소스를 찾고, `.shtml` 문서는 템플릿 셸과 합성합니다.
pub struct StaticHandler {
    resources: ResourceChain,
    mixer: Arc<TemplateMixer>,
}

impl StaticHandler {
    pub fn new(resources: ResourceChain, mixer: Arc<TemplateMixer>) -> Self {
        Self { resources, mixer }
    }

    fn ok(content_type: &str, body: Bytes) -> Result<GatewayResponse, GatewayError> {
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CACHE_CONTROL, DEFAULT_CACHE_CONTROL)
            .body(Full::new(body))
            .map_err(|e| GatewayError::Internal(e.to_string()))
    }
}

#[async_trait]
impl RouteHandler for StaticHandler {
    fn kind(&self) -> &str {
        "static"
    }

    async fn handle(
        &self,
        _req: GatewayRequest,
        params: PathParams,
    ) -> Result<GatewayResponse, GatewayError> {
        let reference = ResourceRef::from_url_path(params.last());
        let not_found = || GatewayError::ResourceNotFound {
            name: reference.name().to_string(),
        };

        if reference.is_template() {
            let page = self.mixer.mix(&self.resources, &reference).await;
            if page.is_empty() {
                return Err(not_found());
            }
            debug!(resource = %reference, "템플릿 합성");
            return Self::ok(content_type::HTML_UTF8, Bytes::from(page));
        }

        match self.resources.resolve(&reference).await {
            Some(data) => Self::ok(reference.content_type(), data),
            None => Err(not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body;
    use crate::resources::{MemoryProvider, DEFAULT_SLOT};
    use http_body_util::BodyExt;
    use hyper::Request;

    async fn handler() -> StaticHandler {
        let chain = ResourceChain::new(vec![Arc::new(
            MemoryProvider::new("site")
                .with_entry("template.html", "<html><%= content %></html>")
                .with_entry("index.html", "<h1>home</h1>")
                .with_entry("docs.index.shtml", "<p>docs</p>")
                .with_entry("css.site.css", "body{}"),
        )]);
        let mixer = TemplateMixer::load(&chain, None, DEFAULT_SLOT).await.unwrap();
        StaticHandler::new(chain, Arc::new(mixer))
    }

    async fn serve(handler: &StaticHandler, captured: Option<&str>) -> Result<GatewayResponse, GatewayError> {
        let template = match captured {
            Some(_) => crate::routing::PathTemplate::parse("/{*file}").unwrap(),
            None => crate::routing::PathTemplate::parse("/index.html").unwrap(),
        };
        let path = format!("/{}", captured.unwrap_or("index.html"));
        let params = template.matches(&path).unwrap();
        let req = Request::builder().uri(path).body(body::empty()).unwrap();
        handler.handle(req, params).await
    }

    #[tokio::test]
    async fn test_plain_resource() {
        let handler = handler().await;
        let res = serve(&handler, Some("css/site.css")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/css; charset=utf-8");
        assert_eq!(res.headers()[header::CACHE_CONTROL], DEFAULT_CACHE_CONTROL);
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes, Bytes::from("body{}"));
    }

    #[tokio::test]
    async fn test_index_without_capture() {
        let handler = handler().await;
        let res = serve(&handler, None).await.unwrap();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes, Bytes::from("<h1>home</h1>"));
    }

    #[tokio::test]
    async fn test_directory_template_is_mixed() {
        let handler = handler().await;
        let res = serve(&handler, Some("docs/")).await.unwrap();
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes, Bytes::from("<html><p>docs</p></html>"));
    }

    #[tokio::test]
    async fn test_missing_resources() {
        let handler = handler().await;
        assert!(matches!(
            serve(&handler, Some("missing.png")).await,
            Err(GatewayError::ResourceNotFound { .. })
        ));
        assert!(matches!(
            serve(&handler, Some("blog/")).await,
            Err(GatewayError::ResourceNotFound { .. })
        ));
    }
}
