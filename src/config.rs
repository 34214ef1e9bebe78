use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:5001";
pub const API_BASE_ENV: &str = "CALENDER_API_BASE_URL";

pub const SUBSCRIPTIONS_PATH: &str = "/api/subscriptions";
pub const AUTH_USER_PATH: &str = "/auth/user";
pub const AUTH_LOGIN_PATH: &str = "/auth/google";
pub const AUTH_LOGOUT_PATH: &str = "/auth/logout";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Label used for subscriptions with no currency.
pub const UNKNOWN_CURRENCY: &str = "Unknown";
/// Label used for subscriptions with no category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Resolve the API base URL from `CALENDER_API_BASE_URL`, falling back to
/// [`DEFAULT_API_BASE`]. Trailing slashes are stripped.
pub fn api_base_from_env() -> String {
    match std::env::var(API_BASE_ENV) {
        Ok(url) if !url.trim().is_empty() => normalize_base(&url),
        _ => DEFAULT_API_BASE.to_string(),
    }
}

pub fn normalize_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

pub fn default_session_path() -> PathBuf {
    if let Some(config) = dirs::config_dir() {
        config.join("calender-sdk").join("session")
    } else {
        PathBuf::from(".calender-sdk-session")
    }
}
