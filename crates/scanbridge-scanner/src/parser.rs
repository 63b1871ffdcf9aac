//! Converts the backend's loosely-typed findings payload into typed results.
//!
//! The backend aggregates output from heterogeneous scanner versions, so no
//! top-level field is guaranteed and individual entries can be malformed.
//! The rule throughout: recover per entry, record an issue, never abort the
//! batch.

use chrono::{DateTime, Utc};
use scanbridge_core::{
    CopyrightFinding, Issue, LicenseFinding, Severity, SpdxExpression, TextLocation,
};
use serde_json::Value;

/// Issue source label for diagnostics recorded by this parser.
pub const PARSER_SOURCE: &str = "result-parser";

/// Copyright statements the scanner could not attribute; dropped silently.
const NO_ASSERTION: &str = "NOASSERTION";

/// Typed output of one payload parse.
#[derive(Debug, Clone, Default)]
pub struct ParsedResults {
    /// License findings whose expression validated
    pub licenses: Vec<LicenseFinding>,
    /// Copyright findings, minus no-assertion statements
    pub copyrights: Vec<CopyrightFinding>,
    /// Parse diagnostics plus issues the backend itself reported
    pub issues: Vec<Issue>,
}

/// Parse a raw findings payload.
///
/// Never fails: entries that cannot be understood are skipped and recorded
/// as issues, absent sections yield empty sets.
#[must_use]
pub fn parse_results(raw: &Value) -> ParsedResults {
    let mut parsed = ParsedResults::default();

    for entry in array_field(raw, "licenses") {
        parse_license_entry(entry, &mut parsed);
    }

    for entry in array_field(raw, "copyrights") {
        parse_copyright_entry(entry, &mut parsed);
    }

    for entry in array_field(raw, "issues") {
        parsed.issues.push(parse_embedded_issue(entry));
    }

    tracing::debug!(
        "Parsed payload: {} licenses, {} copyrights, {} issues",
        parsed.licenses.len(),
        parsed.copyrights.len(),
        parsed.issues.len()
    );

    parsed
}

fn array_field<'a>(raw: &'a Value, field: &str) -> impl Iterator<Item = &'a Value> {
    raw.get(field)
        .and_then(Value::as_array)
        .map(|v| v.as_slice())
        .unwrap_or_default()
        .iter()
}

#[allow(clippy::cast_possible_truncation)]
fn parse_license_entry(entry: &Value, parsed: &mut ParsedResults) {
    let Some(expression) = entry.get("license").and_then(Value::as_str) else {
        parsed.issues.push(Issue::new(
            PARSER_SOURCE,
            "skipping a license entry without a license expression",
            Severity::Warn,
        ));
        return;
    };

    match SpdxExpression::parse(expression) {
        Ok(parsed_expression) => parsed.licenses.push(LicenseFinding {
            expression: parsed_expression,
            location: parse_location(entry),
            score: entry
                .get("score")
                .and_then(Value::as_f64)
                .map(|score| score as f32),
        }),
        Err(e) => {
            tracing::warn!("Dropping license finding '{}': {}", expression, e);
            parsed.issues.push(Issue::new(
                PARSER_SOURCE,
                format!("failed to parse license expression '{expression}': {e}"),
                Severity::Error,
            ));
        }
    }
}

fn parse_copyright_entry(entry: &Value, parsed: &mut ParsedResults) {
    let Some(statement) = entry.get("statement").and_then(Value::as_str) else {
        parsed.issues.push(Issue::new(
            PARSER_SOURCE,
            "skipping a copyright entry without a statement",
            Severity::Warn,
        ));
        return;
    };

    if statement == NO_ASSERTION {
        return;
    }

    parsed.copyrights.push(CopyrightFinding {
        statement: statement.to_string(),
        location: parse_location(entry),
    });
}

/// Read an entry's location, falling back to a whole-file location when line
/// data is missing and to an unknown path when even that is absent.
fn parse_location(entry: &Value) -> TextLocation {
    let location = entry.get("location");
    let path = location
        .and_then(|l| l.get("path"))
        .and_then(Value::as_str)
        .unwrap_or("<unknown>");

    let line = |snake: &str, camel: &str| {
        location
            .and_then(|l| l.get(snake).or_else(|| l.get(camel)))
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
    };

    match (line("start_line", "startLine"), line("end_line", "endLine")) {
        (Some(start), Some(end)) => TextLocation::new(path, start, end),
        _ => TextLocation::whole_file(path),
    }
}

/// Merge an issue the backend reported, keeping its own timestamp and
/// severity where they can be understood.
fn parse_embedded_issue(entry: &Value) -> Issue {
    let timestamp = entry
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map_or_else(Utc::now, |dt| dt.with_timezone(&Utc));

    let severity = entry
        .get("severity")
        .and_then(|s| serde_json::from_value::<Severity>(s.clone()).ok())
        .unwrap_or(Severity::Error);

    Issue {
        timestamp,
        source: entry
            .get("source")
            .and_then(Value::as_str)
            .unwrap_or("backend")
            .to_string(),
        message: entry
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("the backend reported an issue without a message")
            .to_string(),
        severity,
    }
}
