//! Agent configuration
//!
//! Read from the process environment (`.env` is loaded by the binaries via
//! `dotenv`). Every value has a default so the agent runs unconfigured.

use crate::error::ResearchError;
use crate::filings::DEFAULT_BASE_URL;
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "SEC Research Agent research-agent@example.com";
const DEFAULT_SPEAKER_URI: &str = "tag:sec-research-agent,2025:0001";

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub sec_base_url: String,
    /// Sent as `User-Agent`; the SEC asks for an app name and contact email
    pub sec_user_agent: String,
    pub min_request_interval: Duration,
    pub request_timeout: Duration,
    pub port: u16,
    pub speaker_uri: String,
    pub service_url: String,
    pub directory_path: Option<PathBuf>,
    pub scope_keywords: Option<Vec<String>>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let port = 8080;
        Self {
            sec_base_url: DEFAULT_BASE_URL.to_string(),
            sec_user_agent: DEFAULT_USER_AGENT.to_string(),
            min_request_interval: crate::filings::rate_limit::DEFAULT_MIN_INTERVAL,
            request_timeout: Duration::from_secs(10),
            port,
            speaker_uri: DEFAULT_SPEAKER_URI.to_string(),
            service_url: format!("http://localhost:{}/openfloor", port),
            directory_path: None,
            scope_keywords: None,
        }
    }
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port: u16 = match get("PORT").or_else(|| get("API_PORT")) {
            Some(v) => parse_number("PORT", &v)?,
            None => defaults.port,
        };

        let min_request_interval = match get("SEC_MIN_REQUEST_INTERVAL_MS") {
            Some(v) => Duration::from_millis(parse_number("SEC_MIN_REQUEST_INTERVAL_MS", &v)?),
            None => defaults.min_request_interval,
        };

        let request_timeout = match get("SEC_REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_number("SEC_REQUEST_TIMEOUT_SECS", &v)?),
            None => defaults.request_timeout,
        };

        let scope_keywords = get("SCOPE_KEYWORDS").map(|v| {
            v.split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect()
        });

        Ok(Self {
            sec_base_url: get("SEC_API_BASE_URL").unwrap_or(defaults.sec_base_url),
            sec_user_agent: get("SEC_USER_AGENT").unwrap_or(defaults.sec_user_agent),
            min_request_interval,
            request_timeout,
            port,
            speaker_uri: get("AGENT_SPEAKER_URI").unwrap_or(defaults.speaker_uri),
            service_url: get("AGENT_SERVICE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}/openfloor", port)),
            directory_path: get("COMPANY_DIRECTORY_PATH").map(PathBuf::from),
            scope_keywords,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ResearchError::Config(format!("{} must be a number, got '{}'", key, value)))
}
