/// Parse a quantity cell.
///
/// Blank cells count as zero. Thousands separators are stripped before
/// parsing, along with any whitespace that removal leaves at either end.
/// Anything that still fails to parse as a base-10 integer also counts as
/// zero.
pub fn parse_quantity(raw: &str) -> i64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<i64>().unwrap_or(0)
}
