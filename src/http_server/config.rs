//! Listener settings for the post API

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::http::HeaderValue;
use serde::{Deserialize, Serialize};

const DEFAULT_PORT: u16 = 3000;

/// Where to listen and which browser origins may call the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpServerConfig {
    /// IP address to bind
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. Empty allows every origin.
    pub cors_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::LOCALHOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
        }
    }
}

impl HttpServerConfig {
    /// Address the listener binds
    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| format!("http.host '{}' is not an IP address: {}", self.host, e))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Configured origins as header values; rejects the first one that is not
    /// a valid header value
    pub fn origin_headers(&self) -> Result<Vec<HeaderValue>, String> {
        self.cors_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| format!("http.cors_origins entry '{}' is not a valid origin", origin))
            })
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.bind_addr()?;
        self.origin_headers()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_bind_loopback_with_open_cors() {
        let config = HttpServerConfig::default();
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:3000");
        assert!(config.cors_origins.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: HttpServerConfig = serde_json::from_str(r#"{"port": 9000}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
    }

    #[test]
    fn test_hostname_is_rejected() {
        let config = HttpServerConfig {
            host: "localhost".to_string(),
            ..HttpServerConfig::default()
        };
        assert!(config.bind_addr().is_err());
    }

    #[test]
    fn test_bad_origin_is_rejected() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://ok.example".to_string(), "bad\norigin".to_string()],
            ..HttpServerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("bad"));
    }
}
