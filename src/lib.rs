//! Heimdall Gateway는 하나 이상의 백엔드 HTTP 서비스 앞에 놓이는 HTTP 게이트웨이입니다.
//!
//! # 주요 기능
//!
//! - 라우팅 전 경로 재작성과 공개 경로 기반 인증 게이트
//! - 호스트 패턴, 메서드, 경로 템플릿 기반 라우팅 (등록 순서 우선)
//! - 계층형 리소스 프로바이더와 HTML 템플릿 합성
//! - 원격 대상으로의 요청 전달 (리버스 프록시)
//! - 요청/응답 이벤트 버스
//!
//! # 예제
//!
//! ```no_run
//! use heimdall_gateway::gateway::GatewayBuilder;
//! use heimdall_gateway::routing::ReplacementPolicy;
//! use heimdall_gateway::settings::GatewaySettings;
//! use hyper::Method;
//!
//! # async fn run() -> Result<(), heimdall_gateway::error::GatewayError> {
//! let mut builder = GatewayBuilder::new(GatewaySettings::default());
//!
//! // /api1 요청을 백엔드로 전달 (접두사 제거)
//! builder.add_forwarding(
//!     "*",
//!     Method::GET,
//!     "/api1",
//!     "http://127.0.0.1:5001/",
//!     true,
//!     ReplacementPolicy::Fail,
//! )?;
//!
//! let gateway = builder.build().await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod body;
pub mod error;
pub mod events;
pub mod gateway;
pub mod logging;
pub mod proxy;
pub mod resources;
pub mod response;
pub mod rewrite;
pub mod routing;
pub mod server;
pub mod settings;
pub mod tls;
