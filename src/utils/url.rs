//! URL utilities for log-safe URL handling

use regex::Regex;
use url::Url;

/// Query parameters whose values never reach the logs
const SENSITIVE_PARAMS: &[&str] = &["username", "password", "user", "pass", "pwd", "passwd", "token"];

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Replace credentials in a URL with `****` for logging.
    ///
    /// Covers `user:pass@host` userinfo and common credential query
    /// parameters, matched case-insensitively. Strings that are not URLs are
    /// still scrubbed of matching query parameters.
    pub fn obfuscate_credentials(url: &str) -> String {
        let mut obfuscated = url.to_string();

        if let Ok(parsed) = Url::parse(url) {
            if !parsed.username().is_empty() || parsed.password().is_some() {
                let mut new_url = parsed.clone();
                let _ = new_url.set_username("****");
                let _ = new_url.set_password(Some("****"));
                obfuscated = new_url.to_string();
            }
        }

        let alternatives = SENSITIVE_PARAMS
            .iter()
            .map(|param| regex::escape(param))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"(?i)([?&](?:{alternatives})=)[^&#]*");
        if let Ok(re) = Regex::new(&pattern) {
            obfuscated = re.replace_all(&obfuscated, "${1}****").to_string();
        }

        obfuscated
    }
}
