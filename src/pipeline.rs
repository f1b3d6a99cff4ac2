//! Query pipeline - one linear pass per query
//!
//! CLASSIFY → RESOLVE → FETCH → FORMAT
//!
//! Out-of-scope queries get guidance, unresolved companies and failed fetches
//! get the fallback report, internal faults get an apology. `answer` never
//! returns an error.

use crate::classifier::QueryClassifier;
use crate::config::AgentConfig;
use crate::directory::CompanyDirectory;
use crate::filings::{FilingsClient, FilingsSource};
use crate::models::{FilingsOutcome, Resolution, ResearchQuery};
use crate::report;
use crate::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

pub struct QueryPipeline {
    classifier: QueryClassifier,
    directory: CompanyDirectory,
    filings: Arc<dyn FilingsSource>,
}

impl QueryPipeline {
    pub fn new(
        classifier: QueryClassifier,
        directory: CompanyDirectory,
        filings: Arc<dyn FilingsSource>,
    ) -> Self {
        Self {
            classifier,
            directory,
            filings,
        }
    }

    /// Wire the pipeline from configuration: EDGAR client, optional external
    /// directory file, optional keyword override.
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let classifier = match &config.scope_keywords {
            Some(keywords) => QueryClassifier::with_keywords(keywords),
            None => QueryClassifier::new(),
        };

        let directory = match &config.directory_path {
            Some(path) => CompanyDirectory::from_json_file(path)?,
            None => CompanyDirectory::builtin(),
        };

        let filings = Arc::new(FilingsClient::from_config(config)?);

        Ok(Self::new(classifier, directory, filings))
    }

    /// Classify, resolve and fetch without rendering.
    pub async fn resolve(&self, query: &ResearchQuery) -> Result<Resolution> {
        if !self.classifier.is_in_scope(&query.raw_text) {
            return Ok(Resolution::OutOfScope);
        }

        let Some(company) = self.directory.lookup(&query.raw_text) else {
            return Ok(Resolution::Unresolved);
        };

        info!(company = %company, "Resolved company");

        let filings = self.filings.fetch_submissions(&company.cik).await?;

        Ok(Resolution::Resolved {
            company: company.clone(),
            filings,
        })
    }

    /// Produce the user-facing text for a query.
    pub async fn answer(&self, query: &ResearchQuery) -> String {
        let start_time = Instant::now();
        info!(query = %query.raw_text, "Pipeline: handling research query");

        let resolution = match self.resolve(query).await {
            Ok(resolution) => resolution,
            Err(e) => {
                error!(query = %query.raw_text, "Research query failed: {}", e);
                return report::apology_message();
            }
        };

        let text = match resolution {
            Resolution::OutOfScope => {
                info!("Query out of scope");
                report::scope_message()
            }
            Resolution::Unresolved => {
                info!("No company matched query");
                report::fallback_report(&query.raw_text)
            }
            Resolution::Resolved {
                company,
                filings: FilingsOutcome::Fetched(summary),
            } => report::full_report(&query.raw_text, &company, &summary),
            Resolution::Resolved {
                company,
                filings: FilingsOutcome::NotFound,
            } => {
                info!(cik = %company.cik, "No submissions upstream, using fallback report");
                report::fallback_report(&query.raw_text)
            }
            Resolution::Resolved {
                company,
                filings: FilingsOutcome::TransientError(reason),
            } => {
                warn!(cik = %company.cik, reason = %reason, "Submissions fetch failed, using fallback report");
                report::fallback_report(&query.raw_text)
            }
        };

        info!(
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Pipeline: query complete"
        );
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResearchError;
    use crate::models::{CompanySubmissionSummary, FilingRecord};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Behavior {
        Fetched(CompanySubmissionSummary),
        NotFound,
        Transient,
        Fault,
    }

    /// Records every CIK it is asked for
    struct FakeFilings {
        behavior: Behavior,
        calls: AtomicUsize,
        ciks: Mutex<Vec<String>>,
    }

    impl FakeFilings {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
                ciks: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl FilingsSource for FakeFilings {
        async fn fetch_submissions(&self, cik: &str) -> Result<FilingsOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.ciks.lock().unwrap().push(cik.to_string());
            match &self.behavior {
                Behavior::Fetched(summary) => Ok(FilingsOutcome::Fetched(summary.clone())),
                Behavior::NotFound => Ok(FilingsOutcome::NotFound),
                Behavior::Transient => Ok(FilingsOutcome::TransientError("timed out".into())),
                Behavior::Fault => Err(ResearchError::InvalidIdentifier(cik.to_string())),
            }
        }
    }

    fn pipeline(filings: Arc<FakeFilings>) -> QueryPipeline {
        QueryPipeline::new(QueryClassifier::new(), CompanyDirectory::builtin(), filings)
    }

    fn apple_summary() -> CompanySubmissionSummary {
        let forms = ["10-K", "4", "10-Q", "8-K", "8-K", "DEF 14A", "10-Q", "10-Q"];
        CompanySubmissionSummary {
            description: Some("Consumer electronics.".to_string()),
            industry_code: Some("3571".to_string()),
            industry_description: None,
            fiscal_year_end: Some("0928".to_string()),
            recent_filings: forms
                .iter()
                .enumerate()
                .map(|(i, form)| FilingRecord {
                    form_type: form.to_string(),
                    filing_date: format!("2024-0{}-01", i + 1),
                    accession_number: format!("0000320193-24-{:06}", i),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_out_of_scope_never_touches_filings() {
        let fake = FakeFilings::new(Behavior::NotFound);
        let pipeline = pipeline(fake.clone());

        let answer = pipeline.answer(&ResearchQuery::new("tell me about apple pie")).await;
        assert_eq!(answer, report::scope_message());
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_full_report_for_resolved_company() {
        let fake = FakeFilings::new(Behavior::Fetched(apple_summary()));
        let pipeline = pipeline(fake.clone());

        let answer = pipeline
            .answer(&ResearchQuery::new("Show me Apple SEC filings"))
            .await;

        assert!(answer.contains("Apple Inc."));
        assert!(answer.contains("AAPL"));
        assert!(answer.contains("0000320193"));
        assert!(answer.contains("**Query:** Show me Apple SEC filings"));

        let filing_lines: Vec<_> = answer.lines().filter(|l| l.contains("Accession:")).collect();
        assert_eq!(filing_lines.len(), 5);
        for line in filing_lines {
            assert!(["- 10-K ", "- 10-Q ", "- 8-K ", "- DEF 14A "]
                .iter()
                .any(|prefix| line.starts_with(prefix)));
        }

        assert_eq!(*fake.ciks.lock().unwrap(), vec!["0000320193".to_string()]);
    }

    #[tokio::test]
    async fn test_unresolved_company_gets_fallback() {
        let fake = FakeFilings::new(Behavior::NotFound);
        let pipeline = pipeline(fake.clone());

        let query = "NotARealCompany123 company filings";
        let answer = pipeline.answer(&ResearchQuery::new(query)).await;

        assert_eq!(answer, report::fallback_report(query));
        assert!(answer.contains(query));
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_not_found_and_transient_share_fallback() {
        let query = ResearchQuery::new("Tesla revenue");

        let not_found = pipeline(FakeFilings::new(Behavior::NotFound)).answer(&query).await;
        let transient = pipeline(FakeFilings::new(Behavior::Transient)).answer(&query).await;

        assert_eq!(not_found, report::fallback_report("Tesla revenue"));
        assert_eq!(transient, not_found);
    }

    #[tokio::test]
    async fn test_internal_fault_becomes_apology() {
        let pipeline = pipeline(FakeFilings::new(Behavior::Fault));

        let answer = pipeline.answer(&ResearchQuery::new("nvidia earnings")).await;
        assert_eq!(answer, report::apology_message());
    }

    #[tokio::test]
    async fn test_resolve_exposes_typed_outcome() {
        let pipeline = pipeline(FakeFilings::new(Behavior::NotFound));

        let resolution = pipeline
            .resolve(&ResearchQuery::new("Microsoft 10-K"))
            .await
            .unwrap();

        match resolution {
            Resolution::Resolved { company, filings } => {
                assert_eq!(company.ticker, "MSFT");
                assert_eq!(filings, FilingsOutcome::NotFound);
            }
            other => panic!("unexpected resolution: {:?}", other),
        }

        let resolution = pipeline.resolve(&ResearchQuery::new("hello")).await.unwrap();
        assert_eq!(resolution, Resolution::OutOfScope);
    }
}
