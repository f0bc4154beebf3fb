use std::sync::Arc;

use async_trait::async_trait;
use hyper::Method;
use tracing::{debug, info, warn};

use crate::body::{GatewayRequest, GatewayResponse};
use crate::error::GatewayError;
use crate::response;
use crate::routing::{HostInfo, HostPattern, PathParams, PathTemplate, RoutingError};

/// 매칭된 라우트에서 호출되는 핸들러입니다.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    /// 로그에 표시할 핸들러 종류 (예: "static", "forward")
    fn kind(&self) -> &str;

    async fn handle(
        &self,
        req: GatewayRequest,
        params: PathParams,
    ) -> Result<GatewayResponse, GatewayError>;
}

/// 동일한 (호스트, 메서드, 경로) 라우트가 이미 있을 때의 처리 방식입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacementPolicy {
    /// 등록 실패 (`RouteConflict`)
    #[default]
    Fail,
    /// 기존 라우트를 같은 위치에서 교체
    Allow,
}

/// 등록된 라우트 하나입니다.
#[derive(Clone)]
pub struct Route {
    pub hostname: HostPattern,
    pub method: Method,
    pub template: PathTemplate,
    handler: Arc<dyn RouteHandler>,
}

impl Route {
    fn same_key(&self, hostname: &HostPattern, method: &Method, template: &PathTemplate) -> bool {
        self.hostname == *hostname && self.method == *method && self.template == *template
    }

    pub fn handler(&self) -> &Arc<dyn RouteHandler> {
        &self.handler
    }
}

/// 라우팅 테이블을 관리하는 구조체입니다.
///
/// 라우트는 등록 순서대로 매칭되며 처음으로 구조적으로 일치하는 라우트가 선택됩니다.
/// 더 구체적인 템플릿을 우선하지 않습니다.
#[derive(Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// 새로운 라우팅 테이블을 생성합니다.
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// 라우팅 테이블에 새로운 라우트를 추가합니다.
    ///
    /// 동일한 키의 라우트가 이미 있으면 `policy`에 따라 실패하거나 그 위치에서 교체합니다.
    pub fn register(
        &mut self,
        hostname: HostPattern,
        method: Method,
        template: PathTemplate,
        handler: Arc<dyn RouteHandler>,
        policy: ReplacementPolicy,
    ) -> Result<(), RoutingError> {
        let existing = self
            .routes
            .iter()
            .position(|route| route.same_key(&hostname, &method, &template));

        match (existing, policy) {
            (Some(_), ReplacementPolicy::Fail) => {
                warn!(
                    hostname = %hostname,
                    method = %method,
                    path = %template,
                    "라우트 충돌"
                );
                Err(RoutingError::RouteConflict {
                    hostname: hostname.to_string(),
                    method,
                    path: template.to_string(),
                })
            }
            (Some(index), ReplacementPolicy::Allow) => {
                info!(
                    hostname = %hostname,
                    method = %method,
                    path = %template,
                    handler = handler.kind(),
                    "기존 라우트 교체"
                );
                self.routes[index].handler = handler;
                Ok(())
            }
            (None, _) => {
                info!(
                    hostname = %hostname,
                    method = %method,
                    path = %template,
                    handler = handler.kind(),
                    "라우트 등록"
                );
                self.routes.push(Route {
                    hostname,
                    method,
                    template,
                    handler,
                });
                Ok(())
            }
        }
    }

    pub fn contains(&self, hostname: &HostPattern, method: &Method, template: &PathTemplate) -> bool {
        self.routes
            .iter()
            .any(|route| route.same_key(hostname, method, template))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// 요청과 일치하는 첫 번째 라우트와 캡처된 값을 찾습니다.
    pub fn find<B>(&self, req: &hyper::Request<B>) -> Option<(&Route, PathParams)> {
        let host = HostInfo::from_request(req);
        let path = req.uri().path();

        self.routes
            .iter()
            .filter(|route| route.method == *req.method())
            .filter(|route| route.hostname.matches(host.as_ref()))
            .find_map(|route| route.template.matches(path).map(|params| (route, params)))
    }

    /// 요청을 매칭된 핸들러로 전달합니다. 매칭되는 라우트가 없으면 404를 반환합니다.
    pub async fn dispatch(&self, req: GatewayRequest) -> Result<GatewayResponse, GatewayError> {
        let (handler, params) = match self.find(&req) {
            Some((route, params)) => {
                debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    route = %route.template,
                    handler = route.handler.kind(),
                    "라우트 매칭"
                );
                (route.handler.clone(), params)
            }
            None => {
                debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    "매칭되는 라우트 없음"
                );
                return Ok(response::not_found());
            }
        };

        handler.handle(req, params).await
    }
}
