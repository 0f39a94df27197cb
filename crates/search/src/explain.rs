//! Text rendering of query debug output.
//!
//! Every function here is pure: the same [`DebugReport`] always renders to the same lines.

use solr_sync_protocol::{DebugReport, ExplainNode, PhaseTimings};

const INDENT: &str = "  ";

/// Render `node` and, recursively, its children one level deeper.
///
/// Each node is a self-contained block of value, match flag and description lines.
#[must_use]
pub fn render(node: &ExplainNode, depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    render_into(node, depth, &mut lines);
    lines
}

fn render_into(node: &ExplainNode, depth: usize, lines: &mut Vec<String>) {
    let pad = INDENT.repeat(depth);
    lines.push(format!("{pad}Value: {}", node.value));
    lines.push(format!("{pad}Match: {}", node.matched));
    lines.push(format!("{pad}Description: {}", node.description));
    for child in &node.children {
        render_into(child, depth + 1, lines);
    }
}

/// One heading per document key, followed by that key's tree.
#[must_use]
pub fn render_explain_map(title: &str, entries: &[(String, ExplainNode)]) -> Vec<String> {
    let mut lines = vec![format!("{title}:")];
    if entries.is_empty() {
        lines.push(format!("{INDENT}(none)"));
        return lines;
    }
    for (key, node) in entries {
        lines.push(format!("{INDENT}Document: {key}"));
        render_into(node, 2, &mut lines);
    }
    lines
}

/// Flat timing listing: one line per component, phases and components in backend order.
#[must_use]
pub fn render_timing(total_time_ms: f64, phases: &[PhaseTimings]) -> Vec<String> {
    let mut lines = vec![format!("Timing: {total_time_ms} ms")];
    for phase in phases {
        for (component, elapsed) in &phase.components {
            lines.push(format!("{INDENT}{} / {component}: {elapsed} ms", phase.name));
        }
    }
    lines
}

/// Full report: query header, `explain`, `explainOther`, then timing.
#[must_use]
pub fn render_report(report: &DebugReport) -> Vec<String> {
    let mut lines = vec![
        format!("Query String: {}", report.query_string),
        format!("Parsed Query: {}", report.parsed_query),
        format!("Query Parser: {}", report.query_parser),
        format!("Other Query: {}", report.other_query),
    ];
    lines.extend(render_explain_map("Explain", &report.explain));
    lines.extend(render_explain_map("Explain Other", &report.explain_other));
    lines.extend(render_timing(report.total_time_ms, &report.phases));
    lines
}
