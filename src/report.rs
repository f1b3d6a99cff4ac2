//! Report rendering
//!
//! Pure text templates. Nothing in here performs I/O or can fail.

use crate::models::{CompanyIdentity, CompanySubmissionSummary, FilingRecord};

const DESCRIPTION_LIMIT: usize = 300;
/// How many of the most recent filings are inspected for key forms
const KEY_FILING_WINDOW: usize = 20;
const MAX_KEY_FILINGS: usize = 5;

/// Key form types in display priority, with their labels
const KEY_FORMS: &[(&str, &str)] = &[
    ("10-K", "Annual Report"),
    ("10-Q", "Quarterly Report"),
    ("8-K", "Current Report"),
    ("DEF 14A", "Proxy Statement"),
];

/// Human label for a key form type
pub fn form_label(form_type: &str) -> Option<&'static str> {
    KEY_FORMS
        .iter()
        .find(|(form, _)| *form == form_type)
        .map(|(_, label)| *label)
}

/// Key filings among the first 20 entries, source order kept, at most 5.
pub fn key_filings(filings: &[FilingRecord]) -> Vec<&FilingRecord> {
    filings
        .iter()
        .take(KEY_FILING_WINDOW)
        .filter(|f| form_label(&f.form_type).is_some())
        .take(MAX_KEY_FILINGS)
        .collect()
}

fn truncate_description(description: &str) -> String {
    if description.chars().count() > DESCRIPTION_LIMIT {
        let cut: String = description.chars().take(DESCRIPTION_LIMIT).collect();
        format!("{}...", cut)
    } else {
        description.to_string()
    }
}

/// `0928` → `09/28`; anything else is shown as published.
fn format_fiscal_year_end(raw: &str) -> String {
    if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        format!("{}/{}", &raw[..2], &raw[2..])
    } else {
        raw.to_string()
    }
}

/// Full report for a resolved company with fetched submissions
pub fn full_report(
    query: &str,
    company: &CompanyIdentity,
    summary: &CompanySubmissionSummary,
) -> String {
    let mut out = String::new();

    out.push_str("📊 **SEC Financial Research Report**\n\n");
    out.push_str(&format!("**Query:** {}\n\n", query));

    // ── Company ──
    out.push_str("**Company Information**\n");
    out.push_str(&format!("- Name: {}\n", company.official_name));
    out.push_str(&format!("- Ticker: {}\n", company.ticker));
    out.push_str(&format!("- CIK: {}\n\n", company.cik));

    out.push_str("**Business Description**\n");
    match summary.description.as_deref() {
        Some(description) => out.push_str(&truncate_description(description)),
        None => out.push_str("No business description available."),
    }
    out.push_str("\n\n");

    out.push_str("**Industry**\n");
    match (
        summary.industry_code.as_deref(),
        summary.industry_description.as_deref(),
    ) {
        (Some(code), Some(description)) => {
            out.push_str(&format!("SIC {} ({})", code, description))
        }
        (Some(code), None) => out.push_str(&format!("SIC {}", code)),
        (None, Some(description)) => out.push_str(description),
        (None, None) => out.push_str("Not available"),
    }
    out.push_str("\n\n");

    out.push_str("**Fiscal Year End**\n");
    match summary.fiscal_year_end.as_deref() {
        Some(fye) => out.push_str(&format_fiscal_year_end(fye)),
        None => out.push_str("Not available"),
    }
    out.push_str("\n\n");

    // ── Filings ──
    out.push_str("**Recent Filings**\n");
    let key = key_filings(&summary.recent_filings);
    if key.is_empty() {
        out.push_str("No recent 10-K, 10-Q, 8-K or proxy filings found.\n");
    } else {
        for filing in key {
            out.push_str(&format!(
                "- {} ({}) filed {} | Accession: {}\n",
                filing.form_type,
                form_label(&filing.form_type).unwrap_or("Filing"),
                filing.filing_date,
                filing.accession_number,
            ));
        }
    }
    out.push('\n');

    out.push_str("**Financial Data Analysis**\n");
    out.push_str(
        "Detailed financial statements are available in the company's periodic reports on SEC EDGAR.\n",
    );
    out.push_str(&format!(
        "- Annual reports (10-K) on file: {}\n",
        summary.count_form("10-K")
    ));
    out.push_str(&format!(
        "- Quarterly reports (10-Q) on file: {}\n\n",
        summary.count_form("10-Q")
    ));

    out.push_str("**Investment Research Notes**\n");
    out.push_str("- Review the latest 10-K for business risks and audited financial statements.\n");
    out.push_str("- Compare recent 10-Q filings to track quarter-over-quarter trends.\n");
    out.push_str("- Check 8-K filings for material events such as earnings releases or leadership changes.\n");
    out.push_str("- This report summarizes public filing metadata and is not investment advice.\n");

    out
}

/// Report used when the company cannot be resolved or its filings fetched
pub fn fallback_report(query: &str) -> String {
    let mut out = String::new();

    out.push_str("📊 **SEC Financial Research Report**\n\n");
    out.push_str(&format!("**Query:** {}\n\n", query));
    out.push_str(&format!(
        "I could not find SEC filing data for \"{}\".\n\n",
        query
    ));

    out.push_str("**Possible reasons**\n");
    out.push_str("- The company may be privately held and not required to file with the SEC.\n");
    out.push_str("- The company may be listed on a foreign exchange and file with another regulator.\n");
    out.push_str("- The company may be a subsidiary reporting under its parent company.\n");
    out.push_str("- The company name may differ from its official registered name.\n\n");

    out.push_str("**Suggested searches**\n");
    out.push_str("- Try the company's official name (e.g. \"Alphabet\" instead of \"Google Search\").\n");
    out.push_str("- Try the stock ticker symbol (e.g. \"AAPL\").\n");
    out.push_str("- Search for the parent company.\n");
    out.push_str("- Use the SEC EDGAR company search at https://www.sec.gov/edgar/searchedgar/companysearch\n");

    out
}

/// Guidance returned for queries outside financial research
pub fn scope_message() -> String {
    "I'm a financial research assistant focused on public companies and their SEC filings. \
     Try asking about a company's filings, revenue, earnings or ticker, for example: \
     \"Show me Apple's recent SEC filings\" or \"What is Microsoft's latest 10-K?\""
        .to_string()
}

/// Generic reply for unexpected internal faults
pub fn apology_message() -> String {
    "I apologize, but I encountered an error while processing your research request. \
     Please try again later."
        .to_string()
}
