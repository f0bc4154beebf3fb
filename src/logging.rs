use std::ffi::OsStr;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::settings::{LogFormat, LogOutput, LogSettings};

const DEFAULT_LOG_FILE: &str = "gateway.log";

pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// 로그 설정으로 전역 `tracing` 구독자를 설치합니다.
///
/// 반환된 가드가 살아 있는 동안만 로그가 기록되므로 호출자가 보관해야 합니다.
/// `RUST_LOG`가 지정되어 있으면 설정의 레벨보다 우선합니다.
pub fn init_logging(settings: &LogSettings) -> Result<WorkerGuard, InitError> {
    let filter = EnvFilter::builder()
        .with_default_directive(settings.level.into())
        .from_env_lossy();

    let (writer, guard) = match &settings.output {
        LogOutput::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogOutput::File(path) => {
            let path = Path::new(path);
            let directory = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE));
            tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name))
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    match settings.format {
        LogFormat::Json => builder.json().try_init()?,
        LogFormat::Text => builder.try_init()?,
    }

    Ok(guard)
}
