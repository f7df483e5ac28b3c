//! Line-oriented parser for the Prometheus exposition text format
//!
//! One forward pass over the input builds a [`MetricRegistry`]. The parser is
//! deliberately best-effort: lines that do not match the expected grammar are
//! skipped, never surfaced as errors. TYPE and HELP lines conventionally
//! precede their samples; the parser tolerates violations by defaulting new
//! families to gauge and backfilling type metadata onto whatever state
//! already exists.
//!
//! Known limitation: label values are recovered with a `key="value"` scan
//! that performs no escape handling, so values containing an escaped `"` are
//! not correctly parsed. Fixing this would change observable output, so the
//! behavior is kept.

use std::time::{SystemTime, UNIX_EPOCH};

use super::types::{
    histogram_base_name, sanitize_metric_name, DataPoint, Label, MetricFamily, MetricRegistry,
    MetricType, COUNTER_START_WINDOW_NANOS,
};

/// Parse a full exposition response body into a metric registry.
///
/// Capture timestamps are read once per data point, so points built later in
/// the pass may carry a slightly later timestamp than earlier ones.
pub fn parse_exposition(text: &str) -> MetricRegistry {
    let mut registry = MetricRegistry::new();

    for raw_line in text.split('\n') {
        let line = raw_line.trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            parse_comment_line(line, &mut registry);
            continue;
        }

        parse_sample_line(line, &mut registry);
    }

    registry
}

/// Handle `# HELP` and `# TYPE` metadata lines; any other comment is ignored.
fn parse_comment_line(line: &str, registry: &mut MetricRegistry) {
    let parts: Vec<&str> = line.splitn(4, ' ').collect();
    if parts.len() < 4 || parts[0] != "#" {
        return;
    }

    match parts[1] {
        "HELP" => {
            let name = sanitize_metric_name(parts[2]);
            // HELP creates an empty family; it never overwrites a
            // description that already exists.
            if !registry.contains(&name) {
                registry.insert(MetricFamily::new(name, parts[3].to_string()));
            }
        }
        "TYPE" => {
            let name = sanitize_metric_name(parts[2]);
            let metric_type = MetricType::from_token(parts[3]);
            // TYPE only applies to families already declared via HELP or an
            // earlier sample; a TYPE line for an unseen name is dropped.
            if let Some(family) = registry.get_mut(&name) {
                family.metric_type = metric_type;
            }
            if metric_type == MetricType::Histogram {
                if let Some(description) = registry.get(&name).map(|f| f.description.clone()) {
                    registry.record_histogram_description(&name, &description);
                }
            }
        }
        _ => {}
    }
}

/// Parse one sample line of the form
/// `NAME ['{' LABELS '}'] WS VALUE [WS TIMESTAMP]` and append a data point to
/// the owning family, creating it if necessary. Non-matching lines are
/// silently skipped. The optional in-line timestamp is discarded.
fn parse_sample_line(line: &str, registry: &mut MetricRegistry) {
    let Some((raw_name, after_name)) = split_metric_name(line) else {
        return;
    };

    // The grammar requires whitespace between the name (or the closing label
    // brace) and the value
    let (labels, rest) = match after_name.trim_start().strip_prefix('{') {
        Some(after_brace) => {
            let Some(close) = after_brace.find('}') else {
                // Unterminated label braces: skip the whole line
                return;
            };
            let rest = &after_brace[close + 1..];
            if !rest.starts_with(|c: char| c.is_ascii_whitespace()) {
                return;
            }
            (parse_labels(&after_brace[..close]), rest)
        }
        None => {
            if !after_name.starts_with(|c: char| c.is_ascii_whitespace()) {
                return;
            }
            (Vec::new(), after_name)
        }
    };

    let mut tokens = rest.split_ascii_whitespace();
    let Some(value_token) = tokens.next() else {
        return;
    };
    if !is_float_literal(value_token) {
        return;
    }
    let Ok(value) = value_token.parse::<f64>() else {
        return;
    };

    let name = sanitize_metric_name(raw_name);

    if !registry.contains(&name) {
        // Histogram component families inherit the base family's HELP text
        // recorded at TYPE-line time, if any
        let description = histogram_base_name(&name)
            .and_then(|base| registry.histogram_description(base))
            .unwrap_or("")
            .to_string();
        registry.insert(MetricFamily::new(name.clone(), description));
    }

    let time_unix_nano = capture_time_nanos();
    let Some(family) = registry.get_mut(&name) else {
        return;
    };

    let start_time_unix_nano = if family.metric_type == MetricType::Counter {
        Some(time_unix_nano - COUNTER_START_WINDOW_NANOS)
    } else {
        None
    };

    family.data_points.push(DataPoint {
        attributes: labels,
        value,
        time_unix_nano,
        start_time_unix_nano,
    });
}

/// Split off the leading metric name (`[a-zA-Z_][a-zA-Z0-9_:]*`); returns
/// `None` if the line does not start with a valid name.
pub(crate) fn split_metric_name(line: &str) -> Option<(&str, &str)> {
    let mut chars = line.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return None,
    }

    let mut end = line.len();
    for (i, c) in chars {
        if !(c.is_ascii_alphanumeric() || c == '_' || c == ':') {
            end = i;
            break;
        }
    }

    Some((&line[..end], &line[end..]))
}

/// Scan a label body for `key="value"` pairs. Pairs are collected wherever
/// they occur, in parse order, with no de-duplication and no quote escaping.
fn parse_labels(body: &str) -> Vec<Label> {
    let mut labels = Vec::new();
    let bytes = body.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match match_label_at(body, i) {
            Some((label, next)) => {
                labels.push(label);
                i = next;
            }
            None => i += 1,
        }
    }

    labels
}

/// Try to match one `key="value"` pair starting at byte offset `at`.
/// Returns the label and the offset just past the closing quote.
fn match_label_at(body: &str, at: usize) -> Option<(Label, usize)> {
    let bytes = body.as_bytes();

    let first = *bytes.get(at)?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }

    let mut i = at + 1;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    let key_end = i;

    if bytes.get(i) != Some(&b'=') || bytes.get(i + 1) != Some(&b'"') {
        return None;
    }
    i += 2;

    let value_start = i;
    let close = body[value_start..].find('"')? + value_start;

    Some((
        Label {
            key: body[at..key_end].to_string(),
            value: body[value_start..close].to_string(),
        },
        close + 1,
    ))
}

/// Validate a signed decimal or exponential float literal:
/// `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`.
/// Notably `NaN` and `Inf` are NOT part of the sample grammar, so lines
/// carrying them are skipped.
fn is_float_literal(token: &str) -> bool {
    let token = token.strip_prefix(['+', '-']).unwrap_or(token);

    let (mantissa, exponent) = match token.split_once(['e', 'E']) {
        Some((m, e)) => (m, Some(e)),
        None => (token, None),
    };

    let mantissa_ok = match mantissa.split_once('.') {
        Some((int, frac)) => {
            let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
            (digits(int) && (frac.is_empty() || digits(frac))) || (int.is_empty() && digits(frac))
        }
        None => !mantissa.is_empty() && mantissa.bytes().all(|b| b.is_ascii_digit()),
    };

    let exponent_ok = match exponent {
        Some(e) => {
            let e = e.strip_prefix(['+', '-']).unwrap_or(e);
            !e.is_empty() && e.bytes().all(|b| b.is_ascii_digit())
        }
        None => true,
    };

    mantissa_ok && exponent_ok
}

/// Wall-clock capture time in nanoseconds since the Unix epoch
fn capture_time_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
