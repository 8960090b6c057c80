use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_DOMAIN: &str = "http://localhost:8080/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL every API path is appended to. Always ends with `/`.
    pub api_domain: String,
    pub http_timeout: Duration,
    pub vote_flag_path: Option<PathBuf>,
    pub log_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests never touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_domain = lookup("API_DOMAIN")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| lookup("CUSTOM_API_DOMAIN").filter(|v| !v.trim().is_empty()))
            .map(|v| normalize_api_domain(&v))
            .unwrap_or_else(|| DEFAULT_API_DOMAIN.to_string());
        let timeout_secs = lookup("HTTP_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .max(1);
        let vote_flag_path = non_empty_path(lookup("VOTE_FLAG_PATH"));
        let log_path = non_empty_path(lookup("SHOWTIME_LOG"));

        Self {
            api_domain,
            http_timeout: Duration::from_secs(timeout_secs),
            vote_flag_path,
            log_path,
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_domain, path.trim_start_matches('/'))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

pub fn normalize_api_domain(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}

fn non_empty_path(raw: Option<String>) -> Option<PathBuf> {
    raw.filter(|v| !v.trim().is_empty())
        .map(|v| PathBuf::from(v.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_domain_gets_trailing_slash() {
        assert_eq!(normalize_api_domain("https://votes.example"), "https://votes.example/");
        assert_eq!(normalize_api_domain(" https://votes.example/ "), "https://votes.example/");
    }

    #[test]
    fn falls_back_to_custom_api_domain() {
        let cfg = AppConfig::from_lookup(|key| match key {
            "CUSTOM_API_DOMAIN" => Some("https://showtime.example".to_string()),
            "API_DOMAIN" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(cfg.api_domain, "https://showtime.example/");
        assert_eq!(cfg.endpoint("api/votes"), "https://showtime.example/api/votes");
    }

    #[test]
    fn timeout_has_a_floor() {
        let cfg = AppConfig::from_lookup(|key| (key == "HTTP_TIMEOUT_SECS").then(|| "0".to_string()));
        assert_eq!(cfg.http_timeout, Duration::from_secs(1));
        assert_eq!(AppConfig::default().http_timeout, Duration::from_secs(10));
    }
}
