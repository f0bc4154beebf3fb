use std::sync::Arc;

use heimdall_gateway::{
    gateway::GatewayBuilder,
    logging,
    server::{RequestHandler, ServerListener},
    settings::Settings,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::load().await.map_err(|e| {
        eprintln!("설정 로드 실패: {}", e);
        e
    })?;

    // 가드는 프로세스가 끝날 때까지 유지
    let _log_guard = logging::init_logging(&settings.logging).map_err(|e| {
        eprintln!("로깅 초기화 실패: {}", e);
        e
    })?;

    let gateway = GatewayBuilder::from_settings(&settings)?.build().await.map_err(|e| {
        error!(error = %e, "게이트웨이 구성 실패");
        e
    })?;

    let listener = ServerListener::new(&settings).await?;
    let handler = Arc::new(RequestHandler::new(Arc::new(gateway)));

    info!(name = %settings.gateway.name, "게이트웨이 시작");

    tokio::select! {
        result = listener.run(handler) => {
            if let Err(e) = &result {
                error!(error = %e, "서버 실행 실패");
            }
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("종료 신호 수신");
        }
    }

    Ok(())
}
