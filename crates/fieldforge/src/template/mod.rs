//! Template Analyzer (spec §4.1).

pub mod analyzer;

pub use analyzer::TemplateAnalyzer;
