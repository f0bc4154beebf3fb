//! 라우트를 원격 HTTP 대상으로 전달하는 리버스 프록시 모듈입니다.

mod engine;
mod error;
mod handler;
mod rule;

pub use engine::ForwardingEngine;
pub use error::ForwardError;
pub use handler::ForwardHandler;
pub use rule::ForwardRule;
