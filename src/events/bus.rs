use std::collections::{HashMap, HashSet};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use futures_util::future::join_all;
use futures_util::FutureExt;
use thiserror::Error;
use tracing::{debug, warn};

use super::GatewayEvent;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("이벤트 전달 실패: {0}")]
    Delivery(String),

    #[error("싱크가 닫혀 있음")]
    Closed,
}

#[derive(Error, Debug, PartialEq)]
pub enum EventError {
    #[error("등록되지 않은 이벤트: {name}")]
    UnknownEvent { name: String },
}

/// 이벤트를 받아 처리하는 구독자입니다.
#[async_trait]
pub trait EventSink: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, event: &GatewayEvent) -> Result<(), SinkError>;
}

/// 부착된 싱크의 식별자. `detach`에 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SinkId(u64);

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sink-{}", self.0)
    }
}

type Attached = (SinkId, Arc<dyn EventSink>);

#[derive(Default)]
struct Channel {
    tags: HashSet<String>,
    sinks: Vec<Attached>,
}

#[derive(Default)]
struct Registry {
    channels: HashMap<String, Channel>,
    /// 태그로 부착된 싱크. 이후에 등록되는 이벤트에도 적용됨
    tagged: Vec<(String, SinkId, Arc<dyn EventSink>)>,
}

/// 이름으로 구분되는 이벤트를 부착된 싱크들에게 전달합니다.
///
/// 싱크들은 서로 독립적으로, 동시에 호출됩니다. 싱크의 오류나 패닉은 로그만 남기고
/// 발행자에게 전파하지 않습니다.
#[derive(Default)]
pub struct EventBus {
    registry: RwLock<Registry>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이벤트를 선언합니다. 이미 있으면 태그만 추가합니다.
    pub fn register_event<I, S>(&self, name: &str, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        let channel = registry.channels.entry(name.to_string()).or_default();
        channel.tags.extend(tags.into_iter().map(Into::into));
        debug!(event = name, tags = ?channel.tags, "이벤트 등록");
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.read().channels.contains_key(name)
    }

    /// 이름으로 지정한 이벤트에 싱크를 부착합니다.
    pub fn attach(&self, name: &str, sink: Arc<dyn EventSink>) -> Result<SinkId, EventError> {
        let id = self.next_id();
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        let channel = registry
            .channels
            .get_mut(name)
            .ok_or_else(|| EventError::UnknownEvent {
                name: name.to_string(),
            })?;

        debug!(event = name, sink = sink.name(), id = %id, "싱크 부착");
        channel.sinks.push((id, sink));
        Ok(id)
    }

    /// 태그가 붙은 모든 이벤트(이후 등록되는 이벤트 포함)에 싱크를 부착합니다.
    pub fn attach_tagged(&self, tag: &str, sink: Arc<dyn EventSink>) -> SinkId {
        let id = self.next_id();
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        debug!(tag = tag, sink = sink.name(), id = %id, "태그 싱크 부착");
        registry.tagged.push((tag.to_string(), id, sink));
        id
    }

    /// 싱크를 모든 이벤트에서 제거합니다. 제거된 것이 있으면 `true`.
    pub fn detach(&self, id: SinkId) -> bool {
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        let before = registry.tagged.len()
            + registry.channels.values().map(|c| c.sinks.len()).sum::<usize>();

        registry.tagged.retain(|(_, sink_id, _)| *sink_id != id);
        for channel in registry.channels.values_mut() {
            channel.sinks.retain(|(sink_id, _)| *sink_id != id);
        }

        let after = registry.tagged.len()
            + registry.channels.values().map(|c| c.sinks.len()).sum::<usize>();
        before != after
    }

    /// 이벤트를 전달합니다. 모든 싱크의 처리가 끝난 뒤 반환됩니다.
    pub async fn publish(&self, event: &GatewayEvent) {
        let sinks = self.sinks_for(&event.name);
        if sinks.is_empty() {
            return;
        }

        let deliveries = sinks.iter().map(|(id, sink)| async move {
            match AssertUnwindSafe(sink.deliver(event)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(
                    event = %event.name,
                    sink = sink.name(),
                    id = %id,
                    error = %e,
                    "이벤트 싱크 전달 실패"
                ),
                Err(_) => warn!(
                    event = %event.name,
                    sink = sink.name(),
                    id = %id,
                    "이벤트 싱크 패닉"
                ),
            }
        });

        join_all(deliveries).await;
    }

    /// 락을 잡은 채로 싱크를 호출하지 않도록 목록을 복제해 둡니다.
    fn sinks_for(&self, name: &str) -> Vec<Attached> {
        let registry = self.read();
        let Some(channel) = registry.channels.get(name) else {
            debug!(event = name, "등록되지 않은 이벤트 발행 무시");
            return Vec::new();
        };

        let mut sinks = channel.sinks.clone();
        sinks.extend(
            registry
                .tagged
                .iter()
                .filter(|(tag, _, _)| channel.tags.contains(tag))
                .map(|(_, id, sink)| (*id, sink.clone())),
        );
        sinks
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(|e| e.into_inner())
    }

    fn next_id(&self) -> SinkId {
        SinkId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{FnSink, RequestSnapshot, HTTP_REQUEST, HTTP_RESPONSE};
    use hyper::Request;
    use std::sync::Mutex;

    fn event(name: &str, path: &str) -> GatewayEvent {
        let req = Request::builder().uri(path).body(()).unwrap();
        GatewayEvent::request(name, "test", RequestSnapshot::from_request(&req, None))
    }

    fn recorder(seen: &Arc<Mutex<Vec<String>>>, label: &'static str) -> Arc<dyn EventSink> {
        let seen = seen.clone();
        Arc::new(FnSink::new(label, move |event: &GatewayEvent| {
            seen.lock().unwrap().push(format!("{}:{}", label, event.request.path));
            Ok(())
        }))
    }

    struct Failing;

    #[async_trait]
    impl EventSink for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn deliver(&self, _event: &GatewayEvent) -> Result<(), SinkError> {
            Err(SinkError::Delivery("boom".into()))
        }
    }

    struct Panicking;

    #[async_trait]
    impl EventSink for Panicking {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn deliver(&self, _event: &GatewayEvent) -> Result<(), SinkError> {
            panic!("sink panic");
        }
    }

    #[tokio::test]
    async fn test_failing_sinks_are_isolated() {
        let bus = EventBus::new();
        bus.register_event(HTTP_REQUEST, ["HTTP", "Request", "All"]);

        let seen = Arc::new(Mutex::new(Vec::new()));
        bus.attach(HTTP_REQUEST, Arc::new(Failing)).unwrap();
        bus.attach(HTTP_REQUEST, Arc::new(Panicking)).unwrap();
        bus.attach(HTTP_REQUEST, recorder(&seen, "ok")).unwrap();

        bus.publish(&event(HTTP_REQUEST, "/a")).await;
        assert_eq!(*seen.lock().unwrap(), ["ok:/a"]);
    }

    #[tokio::test]
    async fn test_unknown_event_attach() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let err = bus.attach("Nope", recorder(&seen, "x")).unwrap_err();
        assert_eq!(err, EventError::UnknownEvent { name: "Nope".into() });

        // 등록되지 않은 이벤트 발행은 무시됨
        bus.publish(&event("Nope", "/")).await;
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tagged_sinks_and_detach() {
        let bus = EventBus::new();
        bus.register_event(HTTP_REQUEST, ["HTTP", "Request", "All"]);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let all = bus.attach_tagged("All", recorder(&seen, "all"));
        bus.attach_tagged("Response", recorder(&seen, "response"));

        // 태그 부착 이후에 등록된 이벤트에도 적용됨
        bus.register_event(HTTP_RESPONSE, ["HTTP", "Response", "All"]);

        bus.publish(&event(HTTP_REQUEST, "/1")).await;
        bus.publish(&event(HTTP_RESPONSE, "/2")).await;
        {
            let mut seen = seen.lock().unwrap();
            seen.sort();
            assert_eq!(*seen, ["all:/1", "all:/2", "response:/2"]);
            seen.clear();
        }

        assert!(bus.detach(all));
        assert!(!bus.detach(all));
        bus.publish(&event(HTTP_REQUEST, "/3")).await;
        bus.publish(&event(HTTP_RESPONSE, "/4")).await;
        assert_eq!(*seen.lock().unwrap(), ["response:/4"]);
    }

    #[tokio::test]
    async fn test_per_sink_order_is_preserved() {
        let bus = EventBus::new();
        bus.register_event(HTTP_REQUEST, ["All"]);
        bus.register_event(HTTP_RESPONSE, ["All"]);

        let seen = Arc::new(Mutex::new(Vec::new()));
        bus.attach_tagged("All", recorder(&seen, "s"));

        for path in ["/1", "/2", "/3"] {
            bus.publish(&event(HTTP_REQUEST, path)).await;
            bus.publish(&event(HTTP_RESPONSE, path)).await;
        }

        assert_eq!(
            *seen.lock().unwrap(),
            ["s:/1", "s:/1", "s:/2", "s:/2", "s:/3", "s:/3"]
        );
    }
}
