//! Query Classifier
//!
//! Coarse scope gate: a query is treated as financial research when it
//! contains at least one scope keyword. No intent detection beyond that.

/// Built-in scope keywords
const SCOPE_KEYWORDS: &[&str] = &[
    // Entities
    "company", "stock", "ticker", "shares", "investor", "investment",
    // Reports & filings
    "sec filing", "filing", "10-k", "10-q", "annual report", "quarterly",
    // Financials
    "revenue", "earnings", "financial", "profit", "market cap", "balance sheet",
];

/// Query classifier
#[derive(Debug, Clone)]
pub struct QueryClassifier {
    keywords: Vec<String>,
}

impl QueryClassifier {
    pub fn new() -> Self {
        Self {
            keywords: SCOPE_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Replace the keyword list. Keywords are lower-cased; blank ones dropped.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Self { keywords }
    }

    /// Whether `text` is a financial / company research query
    pub fn is_in_scope(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords.iter().any(|kw| text.contains(kw.as_str()))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl Default for QueryClassifier {
    fn default() -> Self {
        Self::new()
    }
}
