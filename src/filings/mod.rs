//! SEC EDGAR submissions client
//!
//! One rate-limited GET per company against
//! `{base}/submissions/CIK##########.json`. Upstream failures are returned as
//! [`FilingsOutcome`] values; nothing is retried.

use crate::config::AgentConfig;
use crate::directory::pad_cik;
use crate::models::{CompanySubmissionSummary, FilingRecord, FilingsOutcome};
use crate::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub mod rate_limit;
pub use rate_limit::RateLimiter;

pub const DEFAULT_BASE_URL: &str = "https://data.sec.gov";

/// Source of company submission metadata
#[async_trait::async_trait]
pub trait FilingsSource: Send + Sync {
    async fn fetch_submissions(&self, cik: &str) -> Result<FilingsOutcome>;
}

/// Shared, connection-pooled EDGAR client. Clone it (or wrap it in an `Arc`)
/// to share one rate limiter between all callers.
#[derive(Clone)]
pub struct FilingsClient {
    client: Client,
    base_url: String,
    limiter: Arc<RateLimiter>,
}

impl FilingsClient {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        min_interval: Duration,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).map_err(|e| {
                crate::error::ResearchError::Config(format!("invalid SEC user agent: {}", e))
            })?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limiter: Arc::new(RateLimiter::new(min_interval)),
        })
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        Self::new(
            &config.sec_base_url,
            &config.sec_user_agent,
            config.min_request_interval,
            config.request_timeout,
        )
    }

    pub fn submissions_url(&self, cik: &str) -> Result<String> {
        Ok(format!("{}/submissions/CIK{}.json", self.base_url, pad_cik(cik)?))
    }
}

#[async_trait::async_trait]
impl FilingsSource for FilingsClient {
    async fn fetch_submissions(&self, cik: &str) -> Result<FilingsOutcome> {
        let url = self.submissions_url(cik)?;

        self.limiter.wait().await;

        info!(url = %url, "Fetching EDGAR submissions");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, "EDGAR request failed: {}", e);
                return Ok(FilingsOutcome::TransientError(e.to_string()));
            }
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            info!(cik = %cik, "EDGAR has no submissions for company");
            return Ok(FilingsOutcome::NotFound);
        }
        if !status.is_success() {
            warn!(url = %url, status = %status, "EDGAR returned error status");
            return Ok(FilingsOutcome::TransientError(format!(
                "EDGAR returned {}",
                status
            )));
        }

        match response.json::<SubmissionsResponse>().await {
            Ok(body) => Ok(FilingsOutcome::Fetched(body.into_summary())),
            Err(e) => {
                warn!(url = %url, "Failed to parse EDGAR submissions: {}", e);
                Ok(FilingsOutcome::TransientError(format!(
                    "invalid submissions body: {}",
                    e
                )))
            }
        }
    }
}

//
// ================= Wire format =================
//

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionsResponse {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    sic: Option<String>,
    #[serde(default)]
    sic_description: Option<String>,
    #[serde(default)]
    fiscal_year_end: Option<String>,
    #[serde(default)]
    filings: Option<FilingsSection>,
}

#[derive(Debug, Default, Deserialize)]
struct FilingsSection {
    #[serde(default)]
    recent: Option<RecentFilings>,
}

/// Index-aligned columns: row `i` is `form[i]`, `filing_date[i]`,
/// `accession_number[i]`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentFilings {
    #[serde(default)]
    form: Vec<String>,
    #[serde(default)]
    filing_date: Vec<String>,
    #[serde(default)]
    accession_number: Vec<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl SubmissionsResponse {
    fn into_summary(self) -> CompanySubmissionSummary {
        let recent = self.filings.and_then(|f| f.recent).unwrap_or_default();

        let recent_filings = recent
            .form
            .into_iter()
            .zip(recent.filing_date)
            .zip(recent.accession_number)
            .map(|((form_type, filing_date), accession_number)| FilingRecord {
                form_type,
                filing_date,
                accession_number,
            })
            .collect();

        CompanySubmissionSummary {
            description: non_empty(self.description),
            industry_code: non_empty(self.sic),
            industry_description: non_empty(self.sic_description),
            fiscal_year_end: non_empty(self.fiscal_year_end),
            recent_filings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode as AxumStatus, routing::get, Json, Router};
    use serde_json::json;
    use tokio::time::Instant;

    async fn submissions(Path(file): Path<String>) -> (AxumStatus, Json<serde_json::Value>) {
        match file.as_str() {
            "CIK0000320193.json" => (
                AxumStatus::OK,
                Json(json!({
                    "cik": "320193",
                    "name": "Apple Inc.",
                    "description": "",
                    "sic": "3571",
                    "sicDescription": "Electronic Computers",
                    "fiscalYearEnd": "0928",
                    "filings": {
                        "recent": {
                            "form": ["10-Q", "8-K", "4"],
                            "filingDate": ["2024-08-02", "2024-08-01", "2024-07-30"],
                            "accessionNumber": ["0000320193-24-000081", "0000320193-24-000080"],
                            "primaryDocument": ["a.htm", "b.htm", "c.htm"]
                        }
                    }
                })),
            ),
            "CIK0000000500.json" => (AxumStatus::INTERNAL_SERVER_ERROR, Json(json!({}))),
            "CIK0000000777.json" => (AxumStatus::OK, Json(json!({ "name": "Bare Co" }))),
            _ => (AxumStatus::NOT_FOUND, Json(json!({ "error": "not found" }))),
        }
    }

    async fn spawn_edgar() -> String {
        let app = Router::new().route("/submissions/:file", get(submissions));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: &str, min_interval: Duration) -> FilingsClient {
        FilingsClient::new(
            base_url,
            "Research Agent Tests tests@example.com",
            min_interval,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_submissions_url_pads_cik() {
        let client = client("https://data.sec.gov/", Duration::ZERO);
        assert_eq!(
            client.submissions_url("320193").unwrap(),
            "https://data.sec.gov/submissions/CIK0000320193.json"
        );
        assert!(client.submissions_url("AAPL").is_err());
    }

    #[tokio::test]
    async fn test_fetch_parses_index_aligned_filings() {
        let base = spawn_edgar().await;
        let client = client(&base, Duration::ZERO);

        let outcome = tokio_test::assert_ok!(client.fetch_submissions("320193").await);
        let FilingsOutcome::Fetched(summary) = outcome else {
            panic!("expected fetched summary");
        };

        assert_eq!(summary.description, None);
        assert_eq!(summary.industry_code.as_deref(), Some("3571"));
        assert_eq!(summary.industry_description.as_deref(), Some("Electronic Computers"));
        assert_eq!(summary.fiscal_year_end.as_deref(), Some("0928"));

        // Shortest column bounds the rows
        assert_eq!(summary.recent_filings.len(), 2);
        assert_eq!(summary.recent_filings[0].form_type, "10-Q");
        assert_eq!(summary.recent_filings[0].filing_date, "2024-08-02");
        assert_eq!(summary.recent_filings[1].accession_number, "0000320193-24-000080");
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_empty() {
        let base = spawn_edgar().await;
        let client = client(&base, Duration::ZERO);

        let outcome = client.fetch_submissions("777").await.unwrap();
        assert_eq!(outcome, FilingsOutcome::Fetched(CompanySubmissionSummary::default()));
    }

    #[tokio::test]
    async fn test_404_is_not_found() {
        let base = spawn_edgar().await;
        let client = client(&base, Duration::ZERO);

        let outcome = client.fetch_submissions("1").await.unwrap();
        assert_eq!(outcome, FilingsOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let base = spawn_edgar().await;
        let client = client(&base, Duration::ZERO);

        let outcome = client.fetch_submissions("500").await.unwrap();
        assert!(matches!(outcome, FilingsOutcome::TransientError(_)));
    }

    #[tokio::test]
    async fn test_network_failure_is_transient() {
        // Bind then drop to get a port with nothing listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client(&format!("http://{}", addr), Duration::ZERO);
        let outcome = client.fetch_submissions("320193").await.unwrap();
        assert!(matches!(outcome, FilingsOutcome::TransientError(_)));
    }

    #[tokio::test]
    async fn test_invalid_identifier_is_an_error() {
        let client = client("http://127.0.0.1:9", Duration::ZERO);
        let result = client.fetch_submissions("not-a-cik").await;
        assert!(matches!(
            result,
            Err(crate::error::ResearchError::InvalidIdentifier(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_share_one_rate_limit() {
        let base = spawn_edgar().await;
        let first = client(&base, Duration::from_millis(400));
        let second = first.clone();

        let start = Instant::now();
        first.fetch_submissions("320193").await.unwrap();
        second.fetch_submissions("1").await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(390));
    }
}
