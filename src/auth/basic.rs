use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hyper::{header, HeaderMap};
use tracing::{debug, warn};

use super::CredentialVerifier;
use crate::settings::SettingsError;

/// Basic 인증 사용자 목록의 출처입니다.
///
/// # 지원하는 해시 알고리즘
/// - bcrypt ($2a$, $2b$, $2y$ 접두사)
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialSource {
    /// 설정 파일에 직접 지정된 `사용자 = 해시` 목록
    Inline(HashMap<String, String>),
    /// .htpasswd 파일
    ///
    /// ```text
    /// user1:$2y$05$c4WoMPo3SXsafkva.HHa6uXQZWr7oboPiC2bT/r7q1BB8I2s0BRqC
    /// ```
    Htpasswd(PathBuf),
}

/// bcrypt 해시를 사용하는 HTTP Basic 인증 검증기
pub struct BasicAuthVerifier {
    realm: String,
    users: HashMap<String, String>,
}

impl BasicAuthVerifier {
    pub fn new(realm: impl Into<String>, source: CredentialSource) -> Result<Self, SettingsError> {
        let users = match source {
            CredentialSource::Inline(users) => users,
            CredentialSource::Htpasswd(path) => load_htpasswd(&path)?,
        };

        debug!(users = users.len(), "Basic 인증 사용자 로드");
        Ok(Self {
            realm: realm.into(),
            users,
        })
    }

    /// Authorization 헤더에서 자격증명을 추출합니다.
    fn extract_credentials(headers: &HeaderMap) -> Option<(String, String)> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let encoded = value.strip_prefix("Basic ")?.trim();
        let decoded = String::from_utf8(BASE64.decode(encoded).ok()?).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some((username.to_string(), password.to_string()))
    }
}

impl CredentialVerifier for BasicAuthVerifier {
    fn realm(&self) -> &str {
        &self.realm
    }

    fn verify(&self, headers: &HeaderMap) -> bool {
        match Self::extract_credentials(headers) {
            Some((username, password)) => self
                .users
                .get(&username)
                .map(|hash| verify_password(&password, hash))
                .unwrap_or(false),
            None => false,
        }
    }
}

fn load_htpasswd(path: &Path) -> Result<HashMap<String, String>, SettingsError> {
    let content = fs::read_to_string(path).map_err(|e| SettingsError::FileError {
        path: path.to_string_lossy().to_string(),
        error: e,
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(username, hash)| (username.to_string(), hash.to_string()))
        .collect())
}

/// 비밀번호 검증 함수
fn verify_password(password: &str, hash: &str) -> bool {
    if hash.starts_with("$2") {
        bcrypt::verify(password, hash).unwrap_or(false)
    } else {
        // bcrypt가 아닌 해시는 지원하지 않음
        warn!("지원하지 않는 비밀번호 해시 형식");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcrypt::DEFAULT_COST;
    use hyper::header::HeaderValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn basic_header(user: &str, password: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let encoded = BASE64.encode(format!("{}:{}", user, password));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Basic {}", encoded)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_inline_users() {
        let mut users = HashMap::new();
        users.insert("admin".to_string(), bcrypt::hash("secret", 4).unwrap());

        let verifier = BasicAuthVerifier::new("Gateway", CredentialSource::Inline(users)).unwrap();
        assert_eq!(verifier.realm(), "Gateway");
        assert!(verifier.verify(&basic_header("admin", "secret")));
        assert!(!verifier.verify(&basic_header("admin", "wrong")));
        assert!(!verifier.verify(&basic_header("nobody", "secret")));
        assert!(!verifier.verify(&HeaderMap::new()));
    }

    #[test]
    fn test_htpasswd_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut temp_file = NamedTempFile::new()?;
        let hash = bcrypt::hash("test-password", DEFAULT_COST)?;
        writeln!(temp_file, "# gateway users")?;
        writeln!(temp_file, "test-user:{}", hash)?;
        // 지원하지 않는 해시 형식
        writeln!(temp_file, "md5-user:$apr1$fHxP13Ee$Gu9.3RxLfGHvw2NpjQPyX1")?;

        let verifier = BasicAuthVerifier::new(
            "Gateway",
            CredentialSource::Htpasswd(temp_file.path().to_path_buf()),
        )?;

        assert!(verifier.verify(&basic_header("test-user", "test-password")));
        assert!(!verifier.verify(&basic_header("test-user", "wrong-password")));
        assert!(!verifier.verify(&basic_header("md5-user", "any-password")));
        Ok(())
    }

    #[test]
    fn test_missing_htpasswd_file() {
        let result = BasicAuthVerifier::new(
            "Gateway",
            CredentialSource::Htpasswd(PathBuf::from("/nonexistent/.htpasswd")),
        );
        assert!(matches!(result, Err(SettingsError::FileError { .. })));
    }
}
