pub mod aggregation;
pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod quantity;
pub mod report;

pub use aggregation::{
    aggregate, AggregationEngine, AllowList, GlobalProductAggregate, IngestStats, ProductAggregate,
    ProductTally, SalesReport, ShopAggregate,
};
pub use analyzer::SalesAnalyzer;
pub use classifier::{classify, RowClass, RowClassifier, SummaryMatch};
pub use config::AnalyzerConfig;
pub use error::{Result, SalesError};
