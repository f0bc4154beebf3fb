//! 요청 처리 단계마다 이벤트를 발행하는 이벤트 버스입니다.
//!
//! 요청 이벤트는 디스패치 전에, 응답 이벤트는 응답이 만들어진 뒤에 발행됩니다.

mod bus;
mod event;
mod handler;
mod sinks;

pub use bus::{EventBus, EventError, EventSink, SinkError, SinkId};
pub use event::{GatewayEvent, RequestSnapshot, ResponseSnapshot, HTTP_REQUEST, HTTP_RESPONSE};
pub use handler::EventLogHandler;
pub use sinks::{ConsoleSink, FnSink, StreamSink};
