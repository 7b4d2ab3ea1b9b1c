//! Report rendering
//!
//! Turns a finished [`SalesReport`] into the CSV download, the console
//! summary, or JSON.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::aggregation::SalesReport;
use crate::error::{Result, SalesError};

const RULE_WIDTH: usize = 80;

pub const BRANCH_SECTION_TITLE: &str = "SALES BY BRANCH";
pub const PRODUCT_SECTION_TITLE: &str = "TOTAL SALES BY PRODUCT (ACROSS ALL BRANCHES)";

/// Order of the two sections in the CSV output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CsvLayout {
    /// Branch section first, product totals last.
    #[default]
    BranchesFirst,
    /// Product totals first, branch section last.
    ProductsFirst,
}

impl FromStr for CsvLayout {
    type Err = SalesError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "branches-first" | "branches" => Ok(CsvLayout::BranchesFirst),
            "products-first" | "products" => Ok(CsvLayout::ProductsFirst),
            other => Err(SalesError::Config(format!(
                "unknown CSV layout '{}' (expected 'branches-first' or 'products-first')",
                other
            ))),
        }
    }
}

/// Write the report as CSV.
pub fn write_csv<W: Write>(report: &SalesReport, mut out: W, layout: CsvLayout) -> Result<()> {
    match layout {
        CsvLayout::BranchesFirst => {
            write_branch_section(&mut out, report)?;
            out.write_all(b"\n")?;
            write_product_section(&mut out, report)?;
        }
        CsvLayout::ProductsFirst => {
            write_product_section(&mut out, report)?;
            out.write_all(b"\n")?;
            write_branch_section(&mut out, report)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Render the report as CSV text.
pub fn csv_string(report: &SalesReport, layout: CsvLayout) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(report, &mut buf, layout)?;
    String::from_utf8(buf).map_err(|e| SalesError::Config(format!("non UTF-8 CSV output: {}", e)))
}

// csv writes `""` for a record with no fields, so each block gets its own
// short-lived writer and blank separator lines go straight to `out`.
fn csv_writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out)
}

fn write_branch_section<W: Write>(out: &mut W, report: &SalesReport) -> Result<()> {
    {
        let mut wtr = csv_writer(&mut *out);
        wtr.write_record([BRANCH_SECTION_TITLE])?;
        wtr.write_record(["Shop", "Product Code", "Product Name", "Total Quantity"])?;
        wtr.flush()?;
    }

    for (shop, products) in report.by_shop.iter() {
        {
            let mut wtr = csv_writer(&mut *out);
            for (code, tally) in products.iter() {
                let quantity = tally.quantity.to_string();
                wtr.write_record([shop, code, tally.name.as_str(), quantity.as_str()])?;
            }
            let shop_total = products.total().to_string();
            wtr.write_record([shop, "", "SHOP TOTAL", shop_total.as_str()])?;
            wtr.flush()?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

fn write_product_section<W: Write>(out: &mut W, report: &SalesReport) -> Result<()> {
    let mut wtr = csv_writer(&mut *out);
    wtr.write_record([PRODUCT_SECTION_TITLE])?;
    wtr.write_record(["Product Code", "Product Name", "Total Quantity"])?;

    for (code, tally) in report.by_product.iter() {
        let quantity = tally.quantity.to_string();
        wtr.write_record([code, tally.name.as_str(), quantity.as_str()])?;
    }
    let grand_total = report.grand_total().to_string();
    wtr.write_record(["", "GRAND TOTAL", grand_total.as_str()])?;
    wtr.flush()?;
    Ok(())
}

/// Render the human-readable console report.
pub fn render_console(report: &SalesReport) -> String {
    let mut out = String::new();
    // Formatting into a String cannot fail.
    let _ = write_console(report, &mut out);
    out
}

fn write_console(report: &SalesReport, out: &mut String) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);
    let thin = "-".repeat(RULE_WIDTH);

    writeln!(out, "{}", rule)?;
    writeln!(out, "SALES ANALYSIS BY SHOP AND PRODUCT CODE")?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;

    for (shop, products) in report.by_shop.iter() {
        writeln!(out, "\n{}", rule)?;
        writeln!(out, "SHOP: {}", shop)?;
        writeln!(out, "{}", rule)?;
        writeln!(out, "{:<20} {:<50} {:>15}", "Product Code", "Product Name", "Total Quantity")?;
        writeln!(out, "{}", thin)?;
        for (code, tally) in products.iter() {
            writeln!(out, "{:<20} {:<50} {:>15}", code, tally.name, tally.quantity)?;
        }
        writeln!(out, "{}", thin)?;
        writeln!(out, "{:<71} {:>15}", "SHOP TOTAL", products.total())?;
        writeln!(out)?;
    }

    writeln!(out, "\n{}", rule)?;
    writeln!(out, "GRAND SUMMARY")?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "Total Shops: {}", report.by_shop.len())?;
    writeln!(
        out,
        "Grand Total Quantity Sold: {}",
        group_thousands(report.by_shop.grand_total())
    )?;
    writeln!(out, "{}", rule)
}

/// Render the report as pretty JSON.
pub fn render_json(report: &SalesReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// `<dir>/<stem>_by_product.csv` next to the input file.
pub fn output_path_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sales".to_string());
    let dir = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    dir.join(format!("{}_by_product.csv", stem))
}

/// Format an integer with `,` thousands separators.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
