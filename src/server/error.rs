use thiserror::Error;

use crate::error::GatewayError;
use crate::tls::TlsError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config Error: {0}")]
    ConfigError(String),

    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TLS Error: {0}")]
    TlsError(#[from] TlsError),

    #[error("Gateway Error: {0}")]
    GatewayError(#[from] GatewayError),
}
