use anyhow::{bail, Context, Result};

use crate::models::category::Category;

/// Placeholder value shipped in sample `.env` files; treated as unset.
const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

/// Application configuration loaded from environment variables.
/// Fails at startup if required credentials are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub bizinfo_api_key: String,
    pub bizinfo_base_url: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub llm_max_tokens: u32,
    pub snapshot_path: String,
    pub redis_url: Option<String>,
    pub rate_limit_rps: Option<u32>,
    pub refresh_categories: Vec<Category>,
    pub registry_search_cnt: u32,
    /// Send each category's hashtags with registry queries. Off by default.
    pub registry_hashtags: bool,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            bizinfo_api_key: require_api_key()?,
            bizinfo_base_url: env_or(
                "BIZINFO_BASE_URL",
                "https://www.bizinfo.go.kr/uss/rss/bizinfoApi.do",
            ),
            llm_base_url: env_or("LLM_BASE_URL", "http://localhost:8001/v1")
                .trim_end_matches('/')
                .to_string(),
            llm_model: env_or("LLM_MODEL", "K-intelligence/Midm-2.0-Base-Instruct"),
            llm_api_key: optional_env("LLM_API_KEY"),
            llm_max_tokens: env_or("LLM_MAX_TOKENS", "4096")
                .parse::<u32>()
                .context("LLM_MAX_TOKENS must be a positive integer")?,
            snapshot_path: env_or("SNAPSHOT_PATH", "data/all_categories.json"),
            redis_url: optional_env("REDIS_URL"),
            rate_limit_rps: optional_env("RATE_LIMIT_RPS")
                .map(|s| s.parse::<u32>())
                .transpose()
                .context("RATE_LIMIT_RPS must be a non-negative integer")?
                .filter(|&n| n > 0),
            refresh_categories: parse_categories(&env_or(
                "REFRESH_CATEGORIES",
                "기술,경영,금융,창업",
            ))?,
            registry_search_cnt: env_or("REGISTRY_SEARCH_CNT", "20")
                .parse::<u32>()
                .context("REGISTRY_SEARCH_CNT must be a positive integer")?,
            registry_hashtags: parse_flag(&env_or("REGISTRY_HASHTAGS", "false"))
                .context("REGISTRY_HASHTAGS must be true or false")?,
            port: env_or("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

/// `BIZINFO_API_KEY` with `BIZINFO_KEY` accepted as a legacy alias.
fn require_api_key() -> Result<String> {
    let key = optional_env("BIZINFO_API_KEY")
        .or_else(|| optional_env("BIZINFO_KEY"))
        .filter(|k| k != API_KEY_PLACEHOLDER);
    key.context(
        "Required environment variable 'BIZINFO_API_KEY' is not set \
         (issue a key at https://www.bizinfo.go.kr)",
    )
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("not a boolean: {other:?}"),
    }
}

/// Parses a comma-separated list of Korean category names or registry codes.
pub fn parse_categories(raw: &str) -> Result<Vec<Category>> {
    let mut categories = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match Category::from_name(name).or_else(|| Category::from_code(name)) {
            Some(c) if !categories.contains(&c) => categories.push(c),
            Some(_) => {}
            None => bail!("Unknown category '{name}' in REFRESH_CATEGORIES"),
        }
    }
    Ok(categories)
}

#[cfg(test)]
impl Config {
    /// Fixed configuration for router tests; nothing is read from the environment.
    pub fn for_tests(snapshot_path: &str) -> Self {
        Config {
            bizinfo_api_key: "test-key".to_string(),
            bizinfo_base_url: "http://127.0.0.1:9/uss/rss/bizinfoApi.do".to_string(),
            llm_base_url: "http://127.0.0.1:9/v1".to_string(),
            llm_model: "test-model".to_string(),
            llm_api_key: None,
            llm_max_tokens: 512,
            snapshot_path: snapshot_path.to_string(),
            redis_url: None,
            rate_limit_rps: None,
            refresh_categories: vec![Category::Technology],
            registry_search_cnt: 20,
            registry_hashtags: false,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_categories_keeps_order_and_dedups() {
        let parsed = parse_categories("기술, 경영,기술 ,금융").unwrap();
        assert_eq!(
            parsed,
            vec![Category::Technology, Category::Management, Category::Finance]
        );
    }

    #[test]
    fn test_parse_categories_accepts_codes() {
        let parsed = parse_categories("02,경영,07").unwrap();
        assert_eq!(parsed, vec![Category::Technology, Category::Management]);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE").unwrap());
        assert!(!parse_flag(" off ").unwrap());
        assert!(parse_flag("maybe").is_err());
    }

    #[test]
    fn test_parse_categories_rejects_unknown() {
        assert!(parse_categories("기술,우주").is_err());
    }

    #[test]
    fn test_parse_categories_empty_is_empty() {
        assert!(parse_categories(" , ").unwrap().is_empty());
    }
}
