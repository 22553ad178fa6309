use crate::aggregate::Cgpa;
use crate::row::Row;

const COURSE_WIDTH: usize = 48;

/// Render the table as plain text
///
/// Rows that do not count toward the CGPA are marked with `*`.
///
/// # Arguments
/// * `rows` - Rows in display order
/// * `cgpa` - Value shown on the last line
///
/// # Returns
/// * `String` - Header, one line per row, then `CGPA: <value>`
pub fn render_table(rows: &[Row], cgpa: Cgpa) -> String {
    let mut out = format!(
        "{:>4}  {:<w$}  {:>8}  {:>6}\n",
        "Key",
        "Course",
        "Credits",
        "Grade",
        w = COURSE_WIDTH
    );
    for row in rows {
        out.push_str(&render_row(row));
    }
    if rows.is_empty() {
        out.push_str("(no rows)\n");
    }
    out.push_str(&format!("CGPA: {}", cgpa));
    out
}

fn render_row(row: &Row) -> String {
    let grade = row.grade.map_or("-", |g| g.label());
    let marker = if row.is_counted() { ' ' } else { '*' };
    format!(
        "{:>4}  {:<w$}  {:>8}  {:>6} {}\n",
        row.key.0,
        truncate(&row.course, COURSE_WIDTH),
        row.credits.raw(),
        grade,
        marker,
        w = COURSE_WIDTH
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width - 3).collect();
    cut.push_str("...");
    cut
}
