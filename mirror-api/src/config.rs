//! API Configuration Module
//!
//! Server binding and CORS settings. Configuration is loaded from environment
//! variables with sensible defaults for development.

use std::net::SocketAddr;

use mirror_core::ConfigError;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 9000;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for binding and CORS.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Interface to bind (default `0.0.0.0`).
    pub bind_host: String,

    /// Port to bind (default 9000).
    pub port: u16,

    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    /// Example: "https://themirror.space,https://app.themirror.space"
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Deployment environment name (`development`, `staging`, `production`).
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: 86400,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `MIRROR_API_BIND`: Interface to bind (default: 0.0.0.0)
    /// - `PORT` / `MIRROR_API_PORT`: Port to bind (default: 9000)
    /// - `MIRROR_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `MIRROR_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `MIRROR_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `MIRROR_ENVIRONMENT`: Deployment environment (default: development)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_host = std::env::var("MIRROR_API_BIND").unwrap_or(defaults.bind_host);

        let port = match std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("MIRROR_API_PORT").ok())
        {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                field: "PORT".to_string(),
                value: raw.clone(),
                reason: "expected a port number".to_string(),
            })?,
            None => defaults.port,
        };

        let cors_origins = std::env::var("MIRROR_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("MIRROR_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("MIRROR_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let environment =
            std::env::var("MIRROR_ENVIRONMENT").unwrap_or(defaults.environment);

        Ok(Self {
            bind_host,
            port,
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            environment,
        })
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Resolve the socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                field: "MIRROR_API_BIND".to_string(),
                value: addr.clone(),
                reason: e.to_string(),
            })
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            // Dev mode: allow all
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // Wildcard subdomains: *.themirror.space
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain
                        .strip_suffix(pattern)
                        .is_some_and(|prefix| prefix.ends_with('.'));
                }
            }
            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.cors_origins.is_empty());
        assert!(!config.cors_allow_credentials);
        assert_eq!(config.cors_max_age_secs, 86400);
        assert_eq!(config.port, 9000);
        assert!(!config.is_production());
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            bind_host: "127.0.0.1".to_string(),
            port: 9100,
            ..Default::default()
        };
        assert_eq!(
            config.socket_addr().expect("addr").to_string(),
            "127.0.0.1:9100"
        );

        let config = ApiConfig {
            bind_host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_origin_allowed_dev_mode() {
        let config = ApiConfig::default();
        assert!(config.is_origin_allowed("https://anything.com"));
        assert!(config.is_origin_allowed("http://localhost:3000"));
    }

    #[test]
    fn test_origin_allowed_production() {
        let config = ApiConfig {
            cors_origins: vec![
                "https://themirror.space".to_string(),
                "https://app.themirror.space".to_string(),
            ],
            ..Default::default()
        };

        assert!(config.is_origin_allowed("https://themirror.space"));
        assert!(config.is_origin_allowed("https://app.themirror.space"));
        assert!(!config.is_origin_allowed("https://evil.com"));
        assert!(!config.is_origin_allowed("https://notthemirror.space"));
    }

    #[test]
    fn test_wildcard_subdomain() {
        let config = ApiConfig {
            cors_origins: vec!["*.themirror.space".to_string()],
            ..Default::default()
        };

        assert!(config.is_origin_allowed("https://app.themirror.space"));
        assert!(config.is_origin_allowed("https://api.themirror.space"));
        assert!(!config.is_origin_allowed("https://evilthemirror.space"));
        assert!(!config.is_origin_allowed("https://evil.com"));
    }
}
