//! Passthrough sanitizer for the cleaned `/metrics` endpoint
//!
//! Rewrites an exposition body so that metric names contain no colons: the
//! name token of `# HELP`/`# TYPE` lines and the leading name of sample
//! lines are rewritten, label values and everything else pass through
//! untouched. No model conversion happens here.

use super::exposition::split_metric_name;
use super::types::sanitize_metric_name;

/// Sanitize a full exposition body line by line. Idempotent and total: input
/// that already contains no colons in metric names comes back unchanged.
pub fn sanitize_exposition(text: &str) -> String {
    let lines: Vec<String> = text.split('\n').map(sanitize_line).collect();
    lines.join("\n")
}

fn sanitize_line(line: &str) -> String {
    if line.starts_with("# HELP") || line.starts_with("# TYPE") {
        let mut parts: Vec<String> = line.splitn(4, ' ').map(str::to_string).collect();
        if parts.len() >= 3 {
            parts[2] = sanitize_metric_name(&parts[2]);
        }
        return parts.join(" ");
    }

    if !line.is_empty() && !line.starts_with('#') {
        if let Some((name, rest)) = split_metric_name(line) {
            return format!("{}{}", sanitize_metric_name(name), rest);
        }
    }

    line.to_string()
}
