//! HTML dashboard comparing a table before and after cleaning.
//!
//! Generates a standalone page with embedded CSS for viewing in any browser.

use crate::types::{CleaningOutcome, ColumnStatistics, DatasetStatistics};
use chrono::Local;

/// Render the before/after dashboard for a cleaning run.
pub fn dashboard_html(outcome: &CleaningOutcome, title: &str) -> String {
    let before = &outcome.statistics_before;
    let after = &outcome.statistics_after;
    let diff = outcome.diff();
    let mut html = String::new();

    // Header
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str("<style>\n");
    html.push_str(CSS_STYLES);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&format!("<h1>{}</h1>\n", escape_html(title)));
    html.push_str(&format!(
        "<p class=\"meta\">Generated: {} | Cleaned in {} ms</p>\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        outcome.duration_ms
    ));

    // Before / after cards
    html.push_str("<h2>Before vs After Cleaning</h2>\n<div class=\"cards\">\n");
    push_snapshot_card(&mut html, "Before Cleaning", "before", before);
    push_snapshot_card(&mut html, "After Cleaning", "after", after);
    html.push_str("</div>\n");

    // Actions
    html.push_str("<h2>Cleaning Actions</h2>\n");
    if outcome.action_log.is_empty() {
        html.push_str("<p class=\"no-actions\">No cleaning was necessary.</p>\n");
    } else {
        html.push_str("<ol class=\"actions\">\n");
        for action in &outcome.action_log {
            html.push_str(&format!(
                "<li><span class=\"badge {}\">{}</span> {}</li>\n",
                css_class(action.action.display_name()),
                action.action.display_name(),
                escape_html(&action.describe())
            ));
        }
        html.push_str("</ol>\n");
    }

    if !outcome.warnings.is_empty() {
        html.push_str("<div class=\"warnings\">\n<h3>Warnings</h3>\n<ul>\n");
        for warning in &outcome.warnings {
            html.push_str(&format!("<li>{}</li>\n", escape_html(warning)));
        }
        html.push_str("</ul>\n</div>\n");
    }

    let renamed: Vec<_> = outcome
        .column_mapping
        .iter()
        .filter(|r| r.is_changed())
        .collect();
    if !renamed.is_empty() {
        html.push_str("<h3>Renamed Columns</h3>\n<table>\n");
        html.push_str("<thead><tr><th>Original</th><th>Normalized</th></tr></thead>\n<tbody>\n");
        for rename in renamed {
            html.push_str(&format!(
                "<tr><td>{}</td><td><code>{}</code></td></tr>\n",
                escape_html(&rename.original),
                escape_html(&rename.normalized)
            ));
        }
        html.push_str("</tbody>\n</table>\n");
    }

    // Improvement summary
    html.push_str("<h2>Improvement Summary</h2>\n<div class=\"cards\">\n");
    html.push_str("<div class=\"card\">\n<h3>Data Changes</h3>\n");
    html.push_str(&format!("<p>Rows removed: <strong>{}</strong></p>\n", diff.rows_removed));
    html.push_str(&format!(
        "<p>Columns removed: <strong>{}</strong></p>\n",
        diff.columns_removed
    ));
    html.push_str(&format!(
        "<p>Duplicates removed: <strong>{}</strong></p>\n",
        diff.duplicates_removed
    ));
    html.push_str("</div>\n");
    html.push_str("<div class=\"card\">\n<h3>Quality Metrics</h3>\n");
    html.push_str(&format!(
        "<p>Missing cells filled: <strong>{}</strong></p>\n",
        diff.missing_cells_filled
    ));
    html.push_str(&format!(
        "<p>Outliers capped: <strong>{}</strong></p>\n",
        diff.outliers_capped
    ));
    html.push_str(&format!(
        "<p>Completeness: <strong>{:.1}% &rarr; {:.1}%</strong></p>\n",
        before.completeness() * 100.0,
        after.completeness() * 100.0
    ));
    html.push_str("</div>\n</div>\n");

    // Detailed analysis
    html.push_str("<h2>Detailed Analysis</h2>\n");
    html.push_str("<h3>Raw Data</h3>\n");
    push_column_table(&mut html, before);
    html.push_str("<h3>Cleaned Data</h3>\n");
    push_column_table(&mut html, after);

    html.push_str("<h3>Comparison</h3>\n");
    push_comparison_table(&mut html, before, after);

    // Footer
    html.push_str("<footer><p>Generated by tidyframe</p></footer>\n");
    html.push_str("</body>\n</html>\n");

    html
}

fn push_snapshot_card(html: &mut String, heading: &str, class: &str, stats: &DatasetStatistics) {
    html.push_str(&format!("<div class=\"card {}\">\n", class));
    html.push_str(&format!("<h3>{}</h3>\n", heading));
    html.push_str(&format!("<p>Rows: <strong>{}</strong></p>\n", stats.row_count));
    html.push_str(&format!(
        "<p>Columns: <strong>{}</strong></p>\n",
        stats.column_count
    ));
    html.push_str(&format!(
        "<p>Missing values: <strong>{}</strong></p>\n",
        stats.missing_cell_count
    ));
    html.push_str(&format!(
        "<p>Duplicate rows: <strong>{}</strong></p>\n",
        stats.duplicate_row_count
    ));
    html.push_str(&format!(
        "<p>Outliers: <strong>{}</strong></p>\n",
        stats.total_outliers()
    ));
    html.push_str(&format!(
        "<p>Memory usage: <strong>{}</strong></p>\n",
        format_bytes(stats.memory_bytes)
    ));
    html.push_str("</div>\n");
}

fn push_column_table(html: &mut String, stats: &DatasetStatistics) {
    if stats.columns.is_empty() {
        html.push_str("<p class=\"meta\">No columns.</p>\n");
        return;
    }

    html.push_str("<table>\n<thead><tr><th>Column</th><th>Type</th><th>Missing</th>");
    html.push_str("<th>Unique</th><th>Outliers</th><th>Summary</th></tr></thead>\n<tbody>\n");
    for column in &stats.columns {
        let outliers = stats
            .outliers
            .iter()
            .find(|o| o.column == column.name)
            .map(|o| format!("{} ({:.1}%)", o.count, o.percentage))
            .unwrap_or_else(|| "-".to_string());
        html.push_str(&format!(
            "<tr><td><code>{}</code></td><td>{} <span class=\"meta\">({})</span></td><td>{} ({:.1}%)</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&column.name),
            column.column_type,
            escape_html(&column.dtype),
            column.missing_count,
            column.missing_percentage,
            column.unique_count,
            outliers,
            column_summary(column)
        ));
    }
    html.push_str("</tbody>\n</table>\n");
}

fn column_summary(column: &ColumnStatistics) -> String {
    if let Some(numeric) = &column.numeric {
        return format!(
            "mean {:.2}, median {:.2}, std {:.2}, range [{:.2}, {:.2}], zeros {}",
            numeric.mean, numeric.median, numeric.std, numeric.min, numeric.max, numeric.zeros
        );
    }
    if let Some(categorical) = &column.categorical {
        let top: Vec<String> = categorical
            .top_values
            .iter()
            .map(|v| format!("{} ({})", escape_html(&v.value), v.count))
            .collect();
        return format!("top: {}", top.join(", "));
    }
    String::new()
}

fn push_comparison_table(html: &mut String, before: &DatasetStatistics, after: &DatasetStatistics) {
    let rows = [
        ("Rows", before.row_count, after.row_count),
        ("Columns", before.column_count, after.column_count),
        (
            "Missing Values",
            before.missing_cell_count,
            after.missing_cell_count,
        ),
        (
            "Duplicate Rows",
            before.duplicate_row_count,
            after.duplicate_row_count,
        ),
        (
            "Numeric Columns",
            before.numeric_column_count,
            after.numeric_column_count,
        ),
        (
            "Categorical Columns",
            before.categorical_column_count,
            after.categorical_column_count,
        ),
        ("Outliers", before.total_outliers(), after.total_outliers()),
        ("Memory (bytes)", before.memory_bytes, after.memory_bytes),
    ];

    html.push_str("<table>\n<thead><tr><th>Metric</th><th>Before</th><th>After</th><th>Change</th></tr></thead>\n<tbody>\n");
    for (label, b, a) in rows {
        let change = a as i64 - b as i64;
        let class = match change.signum() {
            -1 => "down",
            1 => "up",
            _ => "same",
        };
        html.push_str(&format!(
            "<tr><td>{label}</td><td>{b}</td><td>{a}</td><td class=\"{class}\">{change:+}</td></tr>\n"
        ));
    }
    html.push_str("</tbody>\n</table>\n");
}

/// Byte count in binary units, e.g. `1.5 KiB`.
fn format_bytes(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// CSS class derived from a display label.
fn css_class(label: &str) -> String {
    label.to_lowercase().replace(' ', "-")
}

/// Escape HTML special characters.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const CSS_STYLES: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 1100px; margin: 0 auto; padding: 20px; color: #2d3748; background: #fafafa; }
h1 { border-bottom: 2px solid #667eea; padding-bottom: 10px; }
h2 { color: #4a5568; margin-top: 32px; }
table { border-collapse: collapse; width: 100%; margin: 10px 0; background: white; }
th, td { border: 1px solid #e2e8f0; padding: 8px 12px; text-align: left; vertical-align: top; }
th { background: #edf2f7; }
code { background: #f5f5f5; padding: 2px 6px; border-radius: 3px; }
.cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(280px, 1fr)); gap: 16px; }
.card { background: #f8fafc; padding: 16px 20px; border-radius: 8px; border-left: 4px solid #667eea; }
.card.before { border-left-color: #e53e3e; }
.card.after { border-left-color: #38a169; }
.card h3 { margin-top: 0; }
.badge { padding: 2px 8px; border-radius: 4px; color: white; font-size: 0.85em; background: #667eea; }
.badge.column-dropped { background: #e53e3e; }
.badge.values-imputed { background: #3182ce; }
.badge.outliers-capped { background: #dd6b20; }
.badge.duplicates-removed { background: #805ad5; }
.actions li { margin: 6px 0; }
.warnings { background: #fffaf0; border-left: 4px solid #dd6b20; padding: 8px 16px; margin: 12px 0; }
.no-actions { color: #38a169; }
.meta { color: #718096; font-size: 0.9em; }
td.down { color: #38a169; }
td.up { color: #e53e3e; }
td.same { color: #718096; }
footer { margin-top: 40px; padding-top: 10px; border-top: 1px solid #ddd; color: #999; font-size: 0.85em; text-align: center; }
"#;
