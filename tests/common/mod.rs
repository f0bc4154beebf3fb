#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use heimdall_gateway::gateway::Gateway;
use heimdall_gateway::server::{RequestHandler, ServerListener};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

/// 고정 본문을 반환하는 목 백엔드를 임의 포트에 띄웁니다.
pub async fn start_backend(body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let service = service_fn(move |req: Request<Incoming>| async move {
                    let response = Response::builder()
                        .header("x-backend-path", req.uri().to_string())
                        .body(Full::new(Bytes::from(body)))
                        .unwrap();
                    Ok::<_, Infallible>(response)
                });
                let _ = http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service)
                    .await;
            });
        }
    });

    addr
}

/// 게이트웨이를 임의 포트의 HTTP 리스너로 실행하고 주소를 반환합니다.
pub async fn serve(gateway: Gateway) -> SocketAddr {
    let listener = ServerListener::from_listener(TcpListener::bind("127.0.0.1:0").await.unwrap());
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(RequestHandler::new(Arc::new(gateway)));

    tokio::spawn(async move {
        let _ = listener.run(handler).await;
    });

    addr
}

/// 환경의 프록시 설정을 무시하는 GET 요청
pub async fn get(url: String) -> reqwest::Response {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
        .get(url)
        .send()
        .await
        .unwrap()
}
