pub const CSV_HEADERS: [&str; 11] = [
    "Timestamp",
    "Site",
    "Staff Role",
    "Staff PIN",
    "Scholar ID",
    "Skill Area",
    "Specific Target",
    "Evidence Type",
    "Performance Rating",
    "Notes",
    "Image URL",
];

/// Wraps a cell in double quotes, doubling any embedded quote.
pub fn quote_cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

pub fn header_line() -> String {
    CSV_HEADERS.join(",")
}

pub fn row_line(cells: &[&str]) -> String {
    cells
        .iter()
        .map(|cell| quote_cell(cell))
        .collect::<Vec<_>>()
        .join(",")
}
