/// Render a left-aligned two-column table. With a header, a dashed rule
/// separates it from the rows.
pub(crate) fn render_two_columns(header: Option<(&str, &str)>, rows: &[(String, String)]) -> String {
    let header_widths = header.map(|(a, b)| (a.len(), b.len())).unwrap_or((0, 0));
    let left = rows.iter().map(|(a, _)| a.len()).max().unwrap_or(0).max(header_widths.0);
    let right = rows.iter().map(|(_, b)| b.len()).max().unwrap_or(0).max(header_widths.1);

    let mut out = String::new();
    if let Some((a, b)) = header {
        out.push_str(&format!("{:<left$}  {}\n", a, b, left = left));
        out.push_str(&format!("{}  {}\n", "-".repeat(left), "-".repeat(right)));
    }
    for (a, b) in rows {
        out.push_str(&format!("{:<left$}  {}\n", a, b, left = left));
    }
    out
}
