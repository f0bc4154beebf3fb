use heimdall_gateway::settings::{LogFormat, LogOutput, Settings, SettingsError};

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 11] = [
        "GATEWAY_CONFIG_FILE",
        "GATEWAY_HTTP_PORT",
        "GATEWAY_BIND_ADDRESS",
        "GATEWAY_LOG_LEVEL",
        "GATEWAY_LOG_FORMAT",
        "GATEWAY_LOG_OUTPUT",
        "GATEWAY_TLS_ENABLED",
        "GATEWAY_TLS_PORT",
        "GATEWAY_TLS_CERT",
        "GATEWAY_TLS_KEY",
        "GATEWAY_TLS_CLIENT_CA",
    ];

    // 테스트 전후 환경변수 초기화를 위한 헬퍼 함수
    fn cleanup_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    // 테스트용 임시 TOML 파일 생성 헬퍼
    fn create_test_toml(content: &str) -> (String, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("gateway.toml");
        std::fs::write(&file_path, content).unwrap();
        (file_path.to_str().unwrap().to_string(), dir)
    }

    #[tokio::test]
    #[serial]
    async fn test_defaults_from_env() {
        cleanup_env();

        let settings = Settings::load().await.unwrap();
        assert_eq!(settings.server.http_port, 8080);
        assert_eq!(settings.server.bind_address, "0.0.0.0");
        assert_eq!(settings.logging.format, LogFormat::Text);
        assert_eq!(settings.logging.output, LogOutput::Stdout);
        assert!(!settings.tls.enabled);
        assert!(settings.forwarding.is_empty());
        assert!(settings.auth.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_env_overrides() {
        cleanup_env();
        std::env::set_var("GATEWAY_HTTP_PORT", "9090");
        std::env::set_var("GATEWAY_BIND_ADDRESS", "127.0.0.1");
        std::env::set_var("GATEWAY_LOG_FORMAT", "json");
        std::env::set_var("GATEWAY_LOG_LEVEL", "debug");
        std::env::set_var("GATEWAY_LOG_OUTPUT", "/tmp/gateway.log");

        let settings = Settings::from_env().await.unwrap();
        assert_eq!(settings.server.http_addr(), "127.0.0.1:9090");
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.logging.level, tracing::Level::DEBUG);
        assert_eq!(settings.logging.output, LogOutput::File("/tmp/gateway.log".to_string()));

        cleanup_env();
    }

    #[tokio::test]
    #[serial]
    async fn test_invalid_env_values() {
        cleanup_env();

        std::env::set_var("GATEWAY_HTTP_PORT", "invalid");
        assert!(matches!(
            Settings::from_env().await,
            Err(SettingsError::EnvVarInvalid { .. })
        ));

        std::env::set_var("GATEWAY_HTTP_PORT", "0");
        assert!(matches!(
            Settings::from_env().await,
            Err(SettingsError::EnvVarInvalid { .. })
        ));
        cleanup_env();

        std::env::set_var("GATEWAY_LOG_LEVEL", "loud");
        assert!(Settings::from_env().await.is_err());
        cleanup_env();

        // TLS 활성화 시 인증서 경로 필수
        std::env::set_var("GATEWAY_TLS_ENABLED", "true");
        assert!(matches!(
            Settings::from_env().await,
            Err(SettingsError::EnvVarMissing { .. })
        ));

        cleanup_env();
    }

    #[tokio::test]
    #[serial]
    async fn test_load_from_config_file() {
        cleanup_env();
        let (path, _dir) = create_test_toml(
            r#"
            [server]
            http_port = 8181

            [gateway]
            name = "Heimdall Test Gateway"
            debug_log = true

            [[forwarding]]
            path = "/api1"
            target = "http://127.0.0.1:5001/"

            [[rewrite]]
            method = "GET"
            path = "^/legacy/(.*)$"
            target = "/$1"
            "#,
        );
        std::env::set_var("GATEWAY_CONFIG_FILE", &path);

        let settings = Settings::load().await.unwrap();
        assert_eq!(settings.server.http_port, 8181);
        assert_eq!(settings.gateway.name, "Heimdall Test Gateway");
        assert!(settings.gateway.debug_log);
        assert_eq!(settings.forwarding[0].target, "http://127.0.0.1:5001/");
        assert_eq!(settings.rewrite[0].target, "/$1");

        cleanup_env();
    }

    #[tokio::test]
    #[serial]
    async fn test_invalid_config_file() {
        cleanup_env();

        let (path, _dir) = create_test_toml("[server\nhttp_port = 80");
        assert!(matches!(
            Settings::from_toml_file(&path).await,
            Err(SettingsError::ParseError { .. })
        ));

        let (path, _dir) = create_test_toml(
            r#"
            [[rewrite]]
            path = "^/(unclosed"
            target = "/x"
            "#,
        );
        assert!(matches!(
            Settings::from_toml_file(&path).await,
            Err(SettingsError::InvalidConfig(_))
        ));

        assert!(matches!(
            Settings::from_toml_file("/nonexistent/gateway.toml").await,
            Err(SettingsError::FileError { .. })
        ));
    }
}
