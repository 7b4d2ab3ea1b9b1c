//! Sales analyzer - runs one export through classification and aggregation

use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::aggregation::{AggregationEngine, SalesReport};
use crate::classifier::RowClassifier;
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::ingestion::SalesCsvReader;

/// Runs one sales export through classification and aggregation.
pub struct SalesAnalyzer {
    config: AnalyzerConfig,
}

impl SalesAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a CSV export on disk.
    pub fn analyze_path(&self, path: impl AsRef<Path>) -> Result<SalesReport> {
        let path = path.as_ref();
        info!("Analyzing {}", path.display());
        self.analyze_rows(SalesCsvReader::from_path(path)?)
    }

    /// Analyze CSV content from any reader, e.g. an uploaded buffer.
    pub fn analyze_reader<R: Read>(&self, input: R) -> Result<SalesReport> {
        self.analyze_rows(SalesCsvReader::new(input))
    }

    fn analyze_rows<R: Read>(&self, rows: SalesCsvReader<R>) -> Result<SalesReport> {
        info!(
            "Processing branches: {} (summary match: {:?})",
            self.config.branches.names().join(", "),
            self.config.summary_match
        );

        // A fresh engine per run; nothing carries over between inputs.
        let mut engine = AggregationEngine::new(
            self.config.branches.clone(),
            RowClassifier::new(self.config.summary_match),
        );
        for row in rows {
            engine.push(&row?);
        }

        let report = engine.finish();
        info!(
            "Aggregated {} of {} rows into {} shops and {} products",
            report.stats.accepted,
            report.stats.rows_seen,
            report.by_shop.len(),
            report.by_product.len()
        );
        Ok(report)
    }
}
