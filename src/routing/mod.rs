//! 호스트, 메서드, 경로 템플릿 기반 라우팅을 제공하는 모듈입니다.

mod error;
mod host;
mod table;
mod template;

pub use error::RoutingError;
pub use host::{HostInfo, HostPattern};
pub use table::{ReplacementPolicy, Route, RouteHandler, RouteTable};
pub use template::{PathParams, PathTemplate};
