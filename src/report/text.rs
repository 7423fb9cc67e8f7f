//! Plain-text table rendering

use super::ReportTable;

/// Render a table with left-aligned, space-padded columns
pub fn render_table(table: &ReportTable) -> String {
    let widths: Vec<usize> = (0..table.columns.len())
        .map(|i| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .chain(std::iter::once(&table.columns[i]))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_row = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![table.name.clone(), format_row(&table.columns)];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(table.rows.iter().map(|row| format_row(row)));
    lines.join("\n")
}
