//! Core data models for the research agent

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Company =================
//

/// A known public company. Built once from the directory table and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyIdentity {
    /// 10-digit zero-padded SEC Central Index Key
    pub cik: String,
    pub ticker: String,
    pub official_name: String,
}

impl fmt::Display for CompanyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, CIK {})", self.official_name, self.ticker, self.cik)
    }
}

//
// ================= Filings =================
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRecord {
    pub form_type: String,
    /// ISO date, e.g. `2024-11-01`
    pub filing_date: String,
    pub accession_number: String,
}

/// Subset of the EDGAR submissions document used for reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanySubmissionSummary {
    pub description: Option<String>,
    /// SIC code
    pub industry_code: Option<String>,
    pub industry_description: Option<String>,
    /// `MMDD` as published by EDGAR
    pub fiscal_year_end: Option<String>,
    /// Most recent first, in source order
    pub recent_filings: Vec<FilingRecord>,
}

impl CompanySubmissionSummary {
    /// Number of filings of `form_type` across the whole recent sequence.
    pub fn count_form(&self, form_type: &str) -> usize {
        self.recent_filings
            .iter()
            .filter(|f| f.form_type == form_type)
            .count()
    }
}

/// Result of one submissions fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilingsOutcome {
    Fetched(CompanySubmissionSummary),
    /// Upstream answered 404
    NotFound,
    /// Network failure, non-404 error status or unreadable body
    TransientError(String),
}

//
// ================= Query =================
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchQuery {
    pub raw_text: String,
}

impl ResearchQuery {
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
        }
    }

    /// Trimmed, lower-cased form used for matching only.
    pub fn normalized(&self) -> String {
        self.raw_text.trim().to_lowercase()
    }
}

/// Where a query ended up after classification, lookup and fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    OutOfScope,
    Unresolved,
    Resolved {
        company: CompanyIdentity,
        filings: FilingsOutcome,
    },
}
