use crate::constants::*;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Padding (degrees) added around the input bounds before fetching context
    pub padding_deg: f64,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub map_title: String,
    pub overpass: OverpassConfig,
}

#[derive(Debug, Clone)]
pub struct OverpassConfig {
    /// Single endpoint override; `None` uses the built-in mirror list
    pub endpoint: Option<String>,

    /// Timeout applied both in the query header and to the HTTP request
    pub timeout_secs: u64,

    /// Retries after the first attempt on timeouts, 429 and 504
    pub max_retries: usize,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: OVERPASS_QUERY_TIMEOUT_SECONDS,
            max_retries: OVERPASS_RETRY_MAX_ATTEMPTS,
        }
    }
}

impl OverpassConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let timeout_secs: u64 = env::var("OVERPASS_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults.timeout_secs.to_string())
            .parse()
            .map_err(|_| "Invalid OVERPASS_TIMEOUT_SECS")?;

        if timeout_secs == 0 {
            return Err("OVERPASS_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            endpoint: env::var("OVERPASS_URL").ok().filter(|url| !url.trim().is_empty()),
            timeout_secs,
            max_retries: env::var("OVERPASS_MAX_RETRIES")
                .unwrap_or_else(|_| defaults.max_retries.to_string())
                .parse()
                .map_err(|_| "Invalid OVERPASS_MAX_RETRIES")?,
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let padding_deg: f64 = env::var("MAP_PADDING_DEG")
            .unwrap_or_else(|_| DEFAULT_PADDING_DEG.to_string())
            .parse()
            .map_err(|_| "Invalid MAP_PADDING_DEG")?;

        if !padding_deg.is_finite() || padding_deg <= 0.0 || padding_deg >= 1.0 {
            return Err("MAP_PADDING_DEG must be between 0 and 1 degree".to_string());
        }

        let request_timeout_secs: u64 = env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_SECONDS.to_string())
            .parse()
            .map_err(|_| "Invalid REQUEST_TIMEOUT_SECS")?;

        if request_timeout_secs == 0 {
            return Err("REQUEST_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            padding_deg,
            request_timeout_secs,
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
                .parse()
                .map_err(|_| "Invalid MAX_UPLOAD_BYTES")?,
            map_title: env::var("MAP_TITLE").unwrap_or_else(|_| DEFAULT_MAP_TITLE.to_string()),
            overpass: OverpassConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
