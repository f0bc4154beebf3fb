//! 계층형 리소스 해석과 HTML 템플릿 합성을 담당하는 모듈입니다.

mod chain;
mod content_type;
mod handler;
mod provider;
mod reference;
mod template;

pub use chain::ResourceChain;
pub use content_type::content_type_for;
pub use handler::StaticHandler;
pub use provider::{DirectoryProvider, MemoryProvider, ResourceError, ResourceProvider};
pub use reference::ResourceRef;
pub use template::{TemplateError, TemplateMixer, DEFAULT_SLOT};
