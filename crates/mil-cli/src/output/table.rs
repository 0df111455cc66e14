/// Render a simple aligned table for string rows.
#[must_use]
pub fn render_entity_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(String::len)
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    let header_line = headers
        .iter()
        .zip(widths.iter())
        .map(|(header, width)| format!("{header:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string();

    let divider = "-".repeat(widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * 2);

    let row_lines = rows.iter().map(|row| {
        widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let value = row.get(index).cloned().unwrap_or_else(|| "-".to_string());
                format!("{value:<width$}")
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    });

    let mut lines = Vec::with_capacity(2 + rows.len());
    lines.push(header_line);
    lines.push(divider);
    lines.extend(row_lines);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::render_entity_table;

    #[test]
    fn alignment_handles_mixed_widths() {
        let headers = ["id", "status", "title"];
        let rows = vec![
            vec!["1".to_string(), "active".to_string(), "short".to_string()],
            vec![
                "200".to_string(),
                "done".to_string(),
                "a much longer title".to_string(),
            ],
        ];

        let table = render_entity_table(&headers, &rows);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("id"));
        assert!(lines[0].contains("status"));
        assert!(lines[0].contains("title"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert!(lines[3].contains("a much longer title"));
    }

    #[test]
    fn missing_cells_render_dash() {
        let headers = ["a", "b"];
        let rows = vec![vec!["x".to_string()]];
        let table = render_entity_table(&headers, &rows);
        assert!(table.lines().last().unwrap().contains('-'));
    }
}
