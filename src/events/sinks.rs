use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{error, info, span, warn, Level};

use super::{EventSink, GatewayEvent, SinkError};

/// 이벤트를 `tracing` 로그로 남기는 싱크입니다.
///
/// 응답 이벤트는 상태 코드에 따라 레벨이 정해집니다 (5xx: ERROR, 4xx: WARN).
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ConsoleSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn deliver(&self, event: &GatewayEvent) -> Result<(), SinkError> {
        log_event(event);
        Ok(())
    }
}

fn log_event(event: &GatewayEvent) {
    let request = &event.request;
    let Some(response) = &event.response else {
        info!(
            request_id = %request.request_id,
            event = %event.name,
            source = %event.source,
            method = %request.method,
            path = %request.path,
            host = ?request.host,
            remote = ?request.remote_addr,
            "Received request"
        );
        return;
    };

    let level = if response.status >= 500 {
        Level::ERROR
    } else if response.status >= 400 {
        Level::WARN
    } else {
        Level::INFO
    };

    let span = span!(
        Level::INFO,
        "request",
        request_id = %request.request_id,
        method = %request.method,
        path = %request.path,
        status = response.status,
        duration_ms = response.duration_ms
    );
    let _enter = span.enter();

    match level {
        Level::ERROR => error!(event = %event.name, source = %event.source, "Request failed"),
        Level::WARN => warn!(event = %event.name, source = %event.source, "Request completed with warning"),
        _ => info!(
            event = %event.name,
            source = %event.source,
            content_length = ?response.content_length,
            "Request completed successfully"
        ),
    }
}

/// 최근 이벤트를 보관하고 구독자에게 실시간으로 전달하는 싱크입니다.
pub struct StreamSink {
    sender: broadcast::Sender<GatewayEvent>,
    cache: Mutex<VecDeque<GatewayEvent>>,
    capacity: usize,
}

impl StreamSink {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            cache: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 보관 중인 이벤트 (오래된 것부터)
    pub fn recent(&self) -> Vec<GatewayEvent> {
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventSink for StreamSink {
    fn name(&self) -> &str {
        "stream"
    }

    async fn deliver(&self, event: &GatewayEvent) -> Result<(), SinkError> {
        {
            let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if cache.len() == self.capacity {
                cache.pop_front();
            }
            cache.push_back(event.clone());
        }

        // 구독자가 없으면 전송 실패는 무시
        let _ = self.sender.send(event.clone());
        Ok(())
    }
}

/// 클로저를 싱크로 사용합니다.
pub struct FnSink<F> {
    name: String,
    f: F,
}

impl<F> FnSink<F>
where
    F: Fn(&GatewayEvent) -> Result<(), SinkError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

#[async_trait]
impl<F> EventSink for FnSink<F>
where
    F: Fn(&GatewayEvent) -> Result<(), SinkError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, event: &GatewayEvent) -> Result<(), SinkError> {
        (self.f)(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ResponseSnapshot, RequestSnapshot, HTTP_RESPONSE};
    use hyper::{Request, StatusCode};

    fn event(path: &str, status: StatusCode) -> GatewayEvent {
        let req = Request::builder().uri(path).body(()).unwrap();
        GatewayEvent::response(
            HTTP_RESPONSE,
            "test",
            RequestSnapshot::from_request(&req, None),
            ResponseSnapshot::new(status, None, 1),
        )
    }

    #[tokio::test]
    async fn test_stream_cache_is_bounded() {
        let sink = StreamSink::new(2);
        for path in ["/1", "/2", "/3"] {
            sink.deliver(&event(path, StatusCode::OK)).await.unwrap();
        }

        let paths: Vec<String> = sink.recent().into_iter().map(|e| e.request.path).collect();
        assert_eq!(paths, ["/2", "/3"]);
    }

    #[tokio::test]
    async fn test_stream_subscribers_receive_events() {
        let sink = StreamSink::new(8);
        let mut receiver = sink.subscribe();

        sink.deliver(&event("/live", StatusCode::NOT_FOUND)).await.unwrap();
        let received = receiver.recv().await.unwrap();
        assert_eq!(received.request.path, "/live");
        assert_eq!(received.response.unwrap().status, 404);
    }

    #[tokio::test]
    async fn test_console_sink_accepts_all_levels() {
        let sink = ConsoleSink::new();
        for status in [StatusCode::OK, StatusCode::NOT_FOUND, StatusCode::BAD_GATEWAY] {
            assert!(sink.deliver(&event("/", status)).await.is_ok());
        }
    }
}
