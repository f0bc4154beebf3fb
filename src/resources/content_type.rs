/// 확장자가 없거나 알 수 없는 리소스의 콘텐츠 타입
pub const OCTET_STREAM: &str = "application/octet-stream";

pub const HTML_UTF8: &str = "text/html; charset=utf-8";

/// 리소스 이름의 마지막 확장자로 콘텐츠 타입을 결정합니다. 모든 입력에 대해 값을 반환합니다.
///
/// ```
/// use heimdall_gateway::resources::content_type_for;
///
/// assert_eq!(content_type_for("docs.style.css"), "text/css; charset=utf-8");
/// assert_eq!(content_type_for("archive.tar.gz"), "application/octet-stream");
/// ```
pub fn content_type_for(name: &str) -> &'static str {
    let file_name = name.rsplit('/').next().unwrap_or(name);
    let extension = match file_name.rsplit_once('.') {
        Some((_, extension)) => extension.to_ascii_lowercase(),
        None => return OCTET_STREAM,
    };

    match extension.as_str() {
        "htm" | "html" => HTML_UTF8,
        "css" => "text/css; charset=utf-8",
        "gif" => "image/gif",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "ico" => "image/x-icon",
        "swf" => "application/x-shockwave-flash",
        "js" => "text/javascript; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",
        "xml" => "text/xml; charset=utf-8",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        let cases = [
            ("index.html", HTML_UTF8),
            ("legacy.HTM", HTML_UTF8),
            ("app.js", "text/javascript; charset=utf-8"),
            ("logo.png", "image/png"),
            ("photo.jpeg", "image/jpeg"),
            ("icons.sprite.svg", "image/svg+xml"),
            ("favicon.ico", "image/x-icon"),
            ("robots.txt", "text/plain; charset=utf-8"),
            ("feed.xml", "text/xml; charset=utf-8"),
        ];

        for (name, expected) in cases {
            assert_eq!(content_type_for(name), expected, "{}", name);
        }
    }

    #[test]
    fn test_unknown_defaults_to_octet_stream() {
        assert_eq!(content_type_for("data.bin"), OCTET_STREAM);
        assert_eq!(content_type_for("LICENSE"), OCTET_STREAM);
        assert_eq!(content_type_for(""), OCTET_STREAM);
        assert_eq!(content_type_for("trailing."), OCTET_STREAM);
    }
}
