//! Company directory
//!
//! Ordered table mapping informal company names to SEC identities.
//! Matching is a bidirectional substring test and the first entry in table
//! order wins, so the order of `entries` is part of the lookup contract.

use crate::error::ResearchError;
use crate::models::CompanyIdentity;
use crate::Result;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Built-in table: (key, CIK, ticker, official name)
const BUILTIN_COMPANIES: &[(&str, &str, &str, &str)] = &[
    ("apple", "0000320193", "AAPL", "Apple Inc."),
    ("microsoft", "0000789019", "MSFT", "Microsoft Corporation"),
    ("google", "0001652044", "GOOGL", "Alphabet Inc."),
    ("alphabet", "0001652044", "GOOGL", "Alphabet Inc."),
    ("amazon", "0001018724", "AMZN", "Amazon.com, Inc."),
    ("tesla", "0001318605", "TSLA", "Tesla, Inc."),
    ("meta", "0001326801", "META", "Meta Platforms, Inc."),
    ("facebook", "0001326801", "META", "Meta Platforms, Inc."),
    ("nvidia", "0001045810", "NVDA", "NVIDIA Corporation"),
    ("netflix", "0001065280", "NFLX", "Netflix, Inc."),
    ("berkshire", "0001067983", "BRK-B", "Berkshire Hathaway Inc."),
    ("jpmorgan", "0000019617", "JPM", "JPMorgan Chase & Co."),
    ("walmart", "0000104169", "WMT", "Walmart Inc."),
    ("johnson & johnson", "0000200406", "JNJ", "Johnson & Johnson"),
    ("visa", "0001403161", "V", "Visa Inc."),
    ("intel", "0000050863", "INTC", "Intel Corporation"),
    ("ibm", "0000051143", "IBM", "International Business Machines Corporation"),
    ("coca-cola", "0000021344", "KO", "The Coca-Cola Company"),
    ("disney", "0001744489", "DIS", "The Walt Disney Company"),
    ("oracle", "0001341439", "ORCL", "Oracle Corporation"),
];

#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Lower-cased match key
    pub key: String,
    pub company: CompanyIdentity,
}

/// One row of an external directory file.
#[derive(Debug, Deserialize)]
struct DirectoryRecord {
    key: String,
    cik: String,
    ticker: String,
    name: String,
}

#[derive(Debug, Clone)]
pub struct CompanyDirectory {
    entries: Vec<DirectoryEntry>,
}

impl CompanyDirectory {
    /// Directory backed by the compiled-in table
    pub fn builtin() -> Self {
        let entries = BUILTIN_COMPANIES
            .iter()
            .map(|(key, cik, ticker, name)| DirectoryEntry {
                key: key.to_string(),
                company: CompanyIdentity {
                    cik: cik.to_string(),
                    ticker: ticker.to_string(),
                    official_name: name.to_string(),
                },
            })
            .collect();

        Self { entries }
    }

    /// Build a directory from explicit entries, keeping their order.
    pub fn from_entries(entries: Vec<DirectoryEntry>) -> Result<Self> {
        let mut normalized = Vec::with_capacity(entries.len());

        for mut entry in entries {
            entry.key = entry.key.trim().to_lowercase();
            if entry.key.is_empty() {
                return Err(ResearchError::Directory(format!(
                    "empty match key for {}",
                    entry.company.official_name
                )));
            }
            entry.company.cik = pad_cik(&entry.company.cik)?;
            normalized.push(entry);
        }

        Ok(Self { entries: normalized })
    }

    /// Parse a JSON array of `{ "key", "cik", "ticker", "name" }` objects.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<DirectoryRecord> = serde_json::from_str(json)?;

        let entries = records
            .into_iter()
            .map(|r| DirectoryEntry {
                key: r.key,
                company: CompanyIdentity {
                    cik: r.cik,
                    ticker: r.ticker,
                    official_name: r.name,
                },
            })
            .collect();

        Self::from_entries(entries)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let directory = Self::from_json_str(&json)?;

        info!(
            path = %path.display(),
            entries = directory.len(),
            "Loaded company directory"
        );

        Ok(directory)
    }

    /// Resolve an informal company name.
    ///
    /// Succeeds when the normalized input contains an entry key or the key
    /// contains the input. Blank input never matches.
    pub fn lookup(&self, name: &str) -> Option<&CompanyIdentity> {
        let normalized = name.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        let found = self
            .entries
            .iter()
            .find(|e| normalized.contains(e.key.as_str()) || e.key.contains(normalized.as_str()))
            .map(|e| &e.company);

        debug!(input = %normalized, matched = ?found.map(|c| &c.ticker), "Directory lookup");
        found
    }

    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CompanyDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Left-pad a numeric CIK to the 10 digits EDGAR uses.
pub fn pad_cik(cik: &str) -> Result<String> {
    let digits = cik.trim();
    if digits.is_empty() || digits.len() > 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ResearchError::InvalidIdentifier(cik.to_string()));
    }
    Ok(format!("{:0>10}", digits))
}
