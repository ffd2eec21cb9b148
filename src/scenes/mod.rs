pub mod financial_analysis;

pub use financial_analysis::FinancialAnalysis;
