use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use hyper::body::Body;
use tracing::{error, info, instrument};

use super::{ForwardRule, ForwardingEngine};
use crate::body::{GatewayRequest, GatewayResponse};
use crate::error::GatewayError;
use crate::events::{EventBus, GatewayEvent, RequestSnapshot, ResponseSnapshot};
use crate::routing::{PathParams, RouteHandler};

/// 이벤트 발행 시 사용하는 출처 이름
const SOURCE: &str = "forward";

/// 전달 규칙을 라우트 핸들러로 감쌉니다. 규칙에 훅 이벤트가 있으면 전달 전후에 발행합니다.
pub struct ForwardHandler {
    rule: ForwardRule,
    engine: Arc<ForwardingEngine>,
    events: Arc<EventBus>,
}

impl ForwardHandler {
    pub fn new(rule: ForwardRule, engine: Arc<ForwardingEngine>, events: Arc<EventBus>) -> Self {
        Self { rule, engine, events }
    }

    pub fn rule(&self) -> &ForwardRule {
        &self.rule
    }
}

#[async_trait]
impl RouteHandler for ForwardHandler {
    fn kind(&self) -> &str {
        "forward"
    }

    #[instrument(skip_all, fields(target = %self.rule.target))]
    async fn handle(
        &self,
        req: GatewayRequest,
        _params: PathParams,
    ) -> Result<GatewayResponse, GatewayError> {
        let start_time = Instant::now();
        let snapshot = req
            .extensions()
            .get::<RequestSnapshot>()
            .cloned()
            .unwrap_or_else(|| RequestSnapshot::from_request(&req, None));

        if let Some(name) = &self.rule.request_event {
            self.events
                .publish(&GatewayEvent::request(name.as_str(), SOURCE, snapshot.clone()))
                .await;
        }

        let result = self.engine.forward(&self.rule, req).await;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        match &result {
            Ok(res) => {
                info!(status = %res.status(), duration_ms, "전달 완료");
                if let Some(name) = &self.rule.response_event {
                    let response = ResponseSnapshot::new(
                        res.status(),
                        res.body().size_hint().exact(),
                        duration_ms,
                    );
                    self.events
                        .publish(&GatewayEvent::response(name.as_str(), SOURCE, snapshot, response))
                        .await;
                }
            }
            Err(e) => error!(error = %e, duration_ms, "전달 실패"),
        }

        result.map_err(GatewayError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body;
    use crate::events::FnSink;
    use crate::routing::PathTemplate;
    use hyper::Request;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_hook_events_on_failure() {
        let events = Arc::new(EventBus::new());
        events.register_event("BeforeApi", ["Forward"]);
        events.register_event("AfterApi", ["Forward"]);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        events.attach_tagged(
            "Forward",
            Arc::new(FnSink::new("recorder", move |event: &GatewayEvent| {
                recorder.lock().unwrap().push(event.name.clone());
                Ok(())
            })),
        );

        // 닫힌 포트로 전달하면 요청 이벤트만 발행됨
        let addr = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();
        let rule = ForwardRule::new(PathTemplate::parse("/api1").unwrap(), &format!("http://{}/", addr), true)
            .unwrap()
            .with_events(Some("BeforeApi".into()), Some("AfterApi".into()));
        let handler = ForwardHandler::new(rule, Arc::new(ForwardingEngine::new()), events);

        let req = Request::builder().uri("/api1").body(body::empty()).unwrap();
        let err = handler.handle(req, PathParams::default()).await.unwrap_err();

        assert!(matches!(err, GatewayError::Forward(_)));
        assert_eq!(*seen.lock().unwrap(), ["BeforeApi"]);
    }
}
