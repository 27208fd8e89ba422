use crate::ui::rows::TableRow;

/// Keep data rows where any cell contains `query`, ignoring case.
/// Placeholder rows always pass so loading and error states stay visible.
pub fn filter_rows(rows: Vec<TableRow>, query: &str) -> Vec<TableRow> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| match row {
            TableRow::Placeholder(..) => true,
            TableRow::Data(cells) => cells.iter().any(|c| c.text().to_lowercase().contains(&q)),
        })
        .collect()
}
