//! Aggregation Engine
//!
//! Accumulates quantity sold per (shop, product code) and per product code
//! across every allow-listed shop in a single pass over the input rows.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, trace};

use crate::classifier::{
    RowClass, RowClassifier, CODE_FIELD, NAME_FIELD, QUANTITY_FIELD, SHOP_FIELD,
};
use crate::quantity::parse_quantity;

/// Set of branch names a run is restricted to, matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    names: Vec<String>,
    keys: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if list.keys.insert(name.to_lowercase()) {
                list.names.push(name.to_string());
            }
        }
        list
    }

    /// Parse a comma separated list such as `"AWAISIA, BAHRIA TOWN"`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(','))
    }

    /// Whether a trimmed shop name belongs to the list.
    pub fn allows(&self, shop: &str) -> bool {
        self.keys.contains(&shop.to_lowercase())
    }

    /// Branch names as supplied, in supply order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Name and running quantity for one product code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductTally {
    pub name: String,
    pub quantity: i64,
}

/// Product code → tally, ordered by product code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProductAggregate {
    products: BTreeMap<String, ProductTally>,
}

/// Product totals across every allow-listed shop.
pub type GlobalProductAggregate = ProductAggregate;

impl ProductAggregate {
    /// Add `quantity` to `code`, creating the entry on first sight. The first
    /// non-empty product name seen for a code sticks.
    fn upsert(&mut self, code: &str, name: &str, quantity: i64) {
        let tally = self.products.entry(code.to_string()).or_default();
        if tally.name.is_empty() {
            tally.name = name.to_string();
        }
        tally.quantity = tally.quantity.saturating_add(quantity);
    }

    pub fn get(&self, code: &str) -> Option<&ProductTally> {
        self.products.get(code)
    }

    /// Entries in ascending product code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProductTally)> {
        self.products.iter().map(|(code, tally)| (code.as_str(), tally))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.products.keys().map(String::as_str)
    }

    pub fn total(&self) -> i64 {
        self.products
            .values()
            .fold(0i64, |acc, t| acc.saturating_add(t.quantity))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Canonical shop name → per-shop product aggregate, ordered by shop name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ShopAggregate {
    shops: BTreeMap<String, ProductAggregate>,
}

impl ShopAggregate {
    fn upsert(&mut self, shop: &str, code: &str, name: &str, quantity: i64) {
        self.shops
            .entry(shop.to_string())
            .or_default()
            .upsert(code, name, quantity);
    }

    pub fn get(&self, shop: &str) -> Option<&ProductAggregate> {
        self.shops.get(shop)
    }

    /// Shops in ascending canonical name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProductAggregate)> {
        self.shops.iter().map(|(shop, products)| (shop.as_str(), products))
    }

    pub fn shop_names(&self) -> impl Iterator<Item = &str> {
        self.shops.keys().map(String::as_str)
    }

    /// Sum of every product quantity sold by `shop`; zero for unknown shops.
    pub fn shop_total(&self, shop: &str) -> i64 {
        self.shops.get(shop).map(ProductAggregate::total).unwrap_or(0)
    }

    pub fn grand_total(&self) -> i64 {
        self.shops
            .values()
            .fold(0i64, |acc, p| acc.saturating_add(p.total()))
    }

    pub fn len(&self) -> usize {
        self.shops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shops.is_empty()
    }
}

/// Row counters collected during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub rows_seen: u64,
    pub accepted: u64,
    pub summary_skipped: u64,
    pub malformed_skipped: u64,
    pub not_allowed: u64,
}

/// What happened to a row handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Aggregated,
    Skipped(RowClass),
    NotAllowed,
}

/// Frozen result of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesReport {
    pub by_shop: ShopAggregate,
    pub by_product: GlobalProductAggregate,
    pub stats: IngestStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchTotal {
    pub shop: String,
    pub total_quantity: i64,
}

/// Headline figures for a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_shops: usize,
    pub total_products: usize,
    pub grand_total: i64,
    pub branches: Vec<BranchTotal>,
}

impl SalesReport {
    pub fn shop_total(&self, shop: &str) -> i64 {
        self.by_shop.shop_total(shop)
    }

    pub fn grand_total(&self) -> i64 {
        self.by_product.total()
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            total_shops: self.by_shop.len(),
            total_products: self.by_product.len(),
            grand_total: self.grand_total(),
            branches: self
                .by_shop
                .iter()
                .map(|(shop, products)| BranchTotal {
                    shop: shop.to_string(),
                    total_quantity: products.total(),
                })
                .collect(),
        }
    }
}

/// Single-run aggregation state. Build one per input.
pub struct AggregationEngine {
    classifier: RowClassifier,
    allow_list: AllowList,
    /// Lowercased shop name → first spelling seen in this run.
    canonical: HashMap<String, String>,
    by_shop: ShopAggregate,
    by_product: GlobalProductAggregate,
    stats: IngestStats,
}

impl AggregationEngine {
    pub fn new(allow_list: AllowList, classifier: RowClassifier) -> Self {
        Self {
            classifier,
            allow_list,
            canonical: HashMap::new(),
            by_shop: ShopAggregate::default(),
            by_product: GlobalProductAggregate::default(),
            stats: IngestStats::default(),
        }
    }

    /// Feed one row. Rows are re-classified here, so an unfiltered stream is
    /// safe to pass in.
    pub fn push<S: AsRef<str>>(&mut self, record: &[S]) -> RowOutcome {
        self.stats.rows_seen += 1;

        let class = self.classifier.classify(record);
        match class {
            RowClass::Accept => {}
            RowClass::SkipSummary => {
                self.stats.summary_skipped += 1;
                trace!(row = self.stats.rows_seen, "skipping summary row");
                return RowOutcome::Skipped(class);
            }
            RowClass::SkipMalformed => {
                self.stats.malformed_skipped += 1;
                trace!(row = self.stats.rows_seen, "skipping malformed row");
                return RowOutcome::Skipped(class);
            }
        }

        let shop = record[SHOP_FIELD].as_ref().trim();
        if !self.allow_list.allows(shop) {
            self.stats.not_allowed += 1;
            trace!(row = self.stats.rows_seen, shop, "shop not in allow-list");
            return RowOutcome::NotAllowed;
        }

        let canonical = self
            .canonical
            .entry(shop.to_lowercase())
            .or_insert_with(|| shop.to_string());

        let quantity = parse_quantity(record[QUANTITY_FIELD].as_ref());
        let code = record[CODE_FIELD].as_ref().trim();
        let name = record[NAME_FIELD].as_ref().trim();

        self.by_shop.upsert(canonical, code, name, quantity);
        self.by_product.upsert(code, name, quantity);
        self.stats.accepted += 1;

        RowOutcome::Aggregated
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Freeze the aggregates.
    pub fn finish(self) -> SalesReport {
        debug!(
            rows = self.stats.rows_seen,
            accepted = self.stats.accepted,
            summary = self.stats.summary_skipped,
            malformed = self.stats.malformed_skipped,
            not_allowed = self.stats.not_allowed,
            shops = self.by_shop.len(),
            products = self.by_product.len(),
            "aggregation finished"
        );
        SalesReport {
            by_shop: self.by_shop,
            by_product: self.by_product,
            stats: self.stats,
        }
    }
}

/// Aggregate a stream of rows with the default classifier.
pub fn aggregate<I, R, S>(records: I, allow_list: &AllowList) -> (ShopAggregate, GlobalProductAggregate)
where
    I: IntoIterator<Item = R>,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut engine = AggregationEngine::new(allow_list.clone(), RowClassifier::default());
    for record in records {
        engine.push(record.as_ref());
    }
    let report = engine.finish();
    (report.by_shop, report.by_product)
}
