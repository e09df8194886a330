use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("bookmirror.db")
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Base URL of the mirrored shop (no trailing slash).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Search endpoint path; the query string is appended URL-encoded.
    #[serde(default = "default_search_path")]
    pub search_path: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u32,
    /// Navigation timeout in seconds (full page load).
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u32,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            search_path: default_search_path(),
            request_timeout_secs: default_request_timeout(),
            navigation_timeout_secs: default_navigation_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl SiteConfig {
    /// Build the absolute search URL for a query.
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}{}{}",
            self.base_url.trim_end_matches('/'),
            self.search_path,
            urlencoding::encode(query)
        )
    }
}

fn default_base_url() -> String {
    "https://www.worldofbooks.com".to_string()
}

fn default_search_path() -> String {
    "/search?q=".to_string()
}

fn default_request_timeout() -> u32 {
    20
}

fn default_navigation_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    format!("bookmirror/{}", env!("CARGO_PKG_VERSION"))
}

/// Crawler configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlerConfig {
    /// Listing page size of the source site; drives next-page math.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// How long to wait for a cookie banner to disappear after clicking.
    #[serde(default = "default_consent_wait")]
    pub consent_wait_ms: u64,
    /// Request ceiling for a search + detail scrape session.
    #[serde(default = "default_detail_budget")]
    pub detail_request_budget: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            consent_wait_ms: default_consent_wait(),
            detail_request_budget: default_detail_budget(),
        }
    }
}

fn default_page_size() -> u32 {
    40
}

fn default_consent_wait() -> u64 {
    8_000
}

fn default_detail_budget() -> u32 {
    4
}

/// Sanitized config for API responses
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub site: SanitizedSiteConfig,
    pub crawler: CrawlerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSiteConfig {
    pub base_url: String,
    pub request_timeout_secs: u32,
    pub navigation_timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            site: SanitizedSiteConfig {
                base_url: config.site.base_url.clone(),
                request_timeout_secs: config.site.request_timeout_secs,
                navigation_timeout_secs: config.site.navigation_timeout_secs,
            },
            crawler: config.crawler.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.crawler.page_size, 40);
        assert_eq!(config.site.base_url, "https://www.worldofbooks.com");
    }

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, PathBuf::from("bookmirror.db"));
        assert_eq!(config.crawler.consent_wait_ms, 8_000);
    }

    #[test]
    fn test_search_url_encodes_query() {
        let site = SiteConfig::default();
        let url = site.search_url("war & peace");
        assert_eq!(
            url,
            "https://www.worldofbooks.com/search?q=war%20%26%20peace"
        );
    }

    #[test]
    fn test_sanitized_config_drops_user_agent() {
        let config = Config::default();
        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("user_agent"));
        assert!(json.contains("base_url"));
    }
}
