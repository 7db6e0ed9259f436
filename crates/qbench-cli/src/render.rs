//! Console rendering of comparison runs.

use crate::config::PredefinedQuery;
use qbench_backend::{BackendId, QueryResult};
use qbench_compare::{
    ComparisonResult, ComparisonState, ExecutionOutcome, Notification, NotificationSink, Severity,
};
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

/// Prints notifications to stderr as they arrive.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", format_notification(&notification));
    }
}

pub fn format_notification(notification: &Notification) -> String {
    let marker = match notification.severity {
        Severity::Info => "•",
        Severity::Success => "✓",
        Severity::Warning => "!",
        Severity::Error => "✗",
    };
    format!("  {} {}", marker, notification.message)
}

fn rule(title: &str) -> String {
    format!(
        "{}\n{}\n{}",
        "=".repeat(RULE_WIDTH),
        title,
        "=".repeat(RULE_WIDTH)
    )
}

/// One-line summary of a backend outcome.
pub fn format_outcome(backend: BackendId, outcome: &ExecutionOutcome) -> String {
    match outcome {
        ExecutionOutcome::Pending => format!("{:<12} running...", backend.name()),
        ExecutionOutcome::Succeeded(result) => format!(
            "{:<12} {:.2} ms, {} rows",
            backend.name(),
            result.execution_time_ms,
            result.row_count
        ),
        ExecutionOutcome::Failed { reason } => {
            format!("{:<12} failed: {}", backend.name(), reason)
        }
    }
}

/// Rows of a result, one JSON value per line, limited to `limit`.
pub fn format_preview(result: &QueryResult, limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  columns: {}", result.columns.join(", "));
    for row in result.data.iter().take(limit) {
        let _ = writeln!(out, "  {}", row);
    }
    if result.data.len() > limit {
        let _ = writeln!(out, "  ... {} more rows", result.data.len() - limit);
    }
    out
}

pub fn render_query_result(backend: BackendId, result: &QueryResult, limit: usize) -> String {
    let mut out = rule(&format!("{} result", backend.name()));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", format_outcome(backend, &ExecutionOutcome::Succeeded(result.clone())));
    out.push_str(&format_preview(result, limit));
    out
}

/// Side-by-side summary of a successful comparison.
pub fn render_comparison(result: &ComparisonResult, limit: usize) -> String {
    let mut out = rule("Comparison");
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<14}{:>16}{:>16}", "", "Warehouse", "Normalized");
    let _ = writeln!(
        out,
        "{:<14}{:>16.2}{:>16.2}",
        "Time (ms)", result.warehouse.execution_time_ms, result.normalized.execution_time_ms
    );
    let _ = writeln!(
        out,
        "{:<14}{:>16}{:>16}",
        "Rows", result.warehouse.row_count, result.normalized.row_count
    );
    let _ = writeln!(
        out,
        "{:<14}{:>16}{:>16}",
        "Columns",
        result.warehouse.columns.len(),
        result.normalized.columns.len()
    );
    let _ = writeln!(out);

    let metrics = &result.comparison;
    let _ = writeln!(out, "Speedup:      {:.2}×", metrics.speedup);
    let _ = writeln!(out, "Improvement:  {:.1}%", metrics.improvement_pct);
    let _ = writeln!(out, "Time saved:   {:.2} ms", metrics.time_saved_ms);

    if limit > 0 {
        for backend in BackendId::ALL {
            let _ = writeln!(out, "\n{} preview:", backend.name());
            out.push_str(&format_preview(result.result(backend), limit));
        }
    }

    out
}

/// Summary of a failed comparison. Backends that did succeed still get their
/// preview shown.
pub fn render_failure(state: &ComparisonState, limit: usize) -> String {
    let mut out = rule("Comparison failed");
    let _ = writeln!(out);
    for backend in BackendId::ALL {
        let outcome = state.outcome(backend);
        let _ = writeln!(out, "{}", format_outcome(backend, outcome));
        if let (Some(result), true) = (outcome.result(), limit > 0) {
            out.push_str(&format_preview(result, limit));
        }
    }
    out
}

pub fn render_catalog(queries: &[PredefinedQuery]) -> String {
    if queries.is_empty() {
        return "No predefined queries in qbench.yml".to_string();
    }

    let mut out = String::new();
    for query in queries {
        let _ = writeln!(out, "{} - {}", query.id, query.name);
        if !query.description.is_empty() {
            let _ = writeln!(out, "    {}", query.description);
        }
        let _ = writeln!(out, "    {}", query.sql.trim());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbench_compare::ComparisonMetrics;
    use serde_json::json;

    fn count_result(time_ms: f64) -> QueryResult {
        QueryResult::new(vec!["count".to_string()], vec![json!([1000000])], time_ms)
    }

    #[test]
    fn test_render_comparison() {
        let result = ComparisonResult {
            warehouse: count_result(50.0),
            normalized: count_result(450.0),
            comparison: ComparisonMetrics::derive(50.0, 450.0).rounded(),
        };

        let out = render_comparison(&result, 5);
        assert!(out.contains("Speedup:      9.00×"));
        assert!(out.contains("Improvement:  88.9%"));
        assert!(out.contains("Time saved:   400.00 ms"));
        assert!(out.contains("Warehouse preview:"));
        assert!(out.contains("[1000000]"));
    }

    #[test]
    fn test_render_failure_shows_succeeded_side() {
        let mut state = ComparisonState::new("SELECT 1");
        state.record(BackendId::Warehouse, ExecutionOutcome::failed("syntax error"));
        state.record(BackendId::Normalized, ExecutionOutcome::Succeeded(count_result(12.5)));
        state.finalize();

        let out = render_failure(&state, 5);
        assert!(out.contains("Warehouse    failed: syntax error"));
        assert!(out.contains("Normalized   12.50 ms, 1 rows"));
        assert!(out.contains("[1000000]"));
    }

    #[test]
    fn test_preview_truncates() {
        let result = QueryResult::new(
            vec!["n".to_string()],
            (0..5).map(|i| json!([i])).collect(),
            1.0,
        );

        let out = format_preview(&result, 2);
        assert!(out.contains("  [0]"));
        assert!(out.contains("  [1]"));
        assert!(!out.contains("  [2]"));
        assert!(out.contains("... 3 more rows"));
    }

    #[test]
    fn test_format_notification() {
        let n = Notification::terminal(Severity::Error, "Warehouse query failed: boom");
        assert_eq!(format_notification(&n), "  ✗ Warehouse query failed: boom");
    }

    #[test]
    fn test_render_empty_catalog() {
        assert_eq!(render_catalog(&[]), "No predefined queries in qbench.yml");
    }
}
