//! Jobs domain - posting analysis and requirement extraction.

mod analyzer;
mod posting;

pub use analyzer::JobAnalyzer;
pub use posting::{
    AnalysisConfidence, ContentHash, JobPosting, RawContent, StructuredRequirements,
};
