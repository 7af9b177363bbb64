use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub errors: ErrorHandlingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ErrorHandlingConfig {
    /// Header carrying the caller's correlation ID
    pub request_id_header: String,
    /// Log failures that had to be normalized to INTERNAL_ERROR
    pub log_unexpected_errors: bool,
}

impl Default for ErrorHandlingConfig {
    fn default() -> Self {
        Self {
            request_id_header: "x-request-id".to_string(),
            log_unexpected_errors: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("API_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .context("API_PORT must be a valid port number")?,
            },
            errors: ErrorHandlingConfig {
                request_id_header: env::var("REQUEST_ID_HEADER")
                    .map(|h| h.to_ascii_lowercase())
                    .unwrap_or_else(|_| "x-request-id".to_string()),
                log_unexpected_errors: env::var("LOG_UNEXPECTED_ERRORS")
                    .unwrap_or_else(|_| "true".to_string())
                    .parse()
                    .context("LOG_UNEXPECTED_ERRORS must be true or false")?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
