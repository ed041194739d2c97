//! Detection of the development server's listening address in command output.

use regex::Regex;
use std::sync::LazyLock;

static SERVER_ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Server running on \[([^\]]+)\]").expect("server address pattern is valid")
});

/// Extract the address from a `Server running on [<address>]` line.
pub fn detect_server_address(line: &str) -> Option<String> {
    SERVER_ADDRESS_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_bracketed_address() {
        assert_eq!(
            detect_server_address("Server running on [http://127.0.0.1:8000]"),
            Some("http://127.0.0.1:8000".to_string())
        );
    }

    #[test]
    fn test_detects_address_inside_decorated_line() {
        let line = "   INFO  Server running on [http://localhost:8080].  ";
        assert_eq!(
            detect_server_address(line),
            Some("http://localhost:8080".to_string())
        );
    }

    #[test]
    fn test_ignores_unrelated_lines() {
        assert_eq!(detect_server_address("Press Ctrl+C to stop the server"), None);
        assert_eq!(detect_server_address("Server running on http://127.0.0.1"), None);
        assert_eq!(detect_server_address("Server running on []"), None);
    }
}
