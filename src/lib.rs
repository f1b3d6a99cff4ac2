//! SEC Research Agent
//!
//! A conversational agent that:
//! - Gates queries to financial / company research
//! - Resolves informal company names to SEC identifiers
//! - Fetches recent filing metadata from SEC EDGAR (rate limited)
//! - Renders a plain-text research report inside a conversation envelope
//!
//! PIPELINE:
//! CLASSIFY → RESOLVE → FETCH → FORMAT

pub mod api;
pub mod classifier;
pub mod config;
pub mod directory;
pub mod envelope;
pub mod error;
pub mod filings;
pub mod models;
pub mod pipeline;
pub mod report;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::QueryClassifier;
pub use directory::CompanyDirectory;
pub use filings::{FilingsClient, FilingsSource};
pub use pipeline::QueryPipeline;
