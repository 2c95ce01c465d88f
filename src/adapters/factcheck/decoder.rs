//! Resilient decoder for fact-check API responses.
//!
//! The upstream response contract has not been stable across deployments:
//! observed shapes are a strict JSON object, newline-delimited JSON or
//! SSE-style `data:` chunks, and plain prose. Field names vary too, so
//! lookups go through ordered alias chains. The decoder prefers recovering
//! *some* answer over failing; only a non-200 status or an empty body is a
//! true failure.

use crate::domain::{FactCheckResult, FailureKind};
use serde_json::Value;

/// Candidate answer keys for a whole-body JSON object, in priority order.
const OBJECT_ALIASES: [&str; 4] = ["answer", "response", "message", "text"];

/// Candidate text keys for one streamed chunk, in priority order.
const CHUNK_ALIASES: [&str; 4] = ["answer", "text", "content", "delta"];

/// SSE framing recognized in line-oriented bodies.
const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

/// Decode one `(status, body)` pair into a normalized result.
pub fn decode(status: u16, body: &str) -> FactCheckResult {
    if status != 200 {
        return FactCheckResult::fail(
            FailureKind::UpstreamStatus,
            format!("Erreur API Vera {status}: {}", truncate(body, 200)),
        );
    }

    if body.trim().is_empty() {
        return FactCheckResult::fail(FailureKind::EmptyBody, "empty upstream body");
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(obj)) => {
            let answer = first_alias(&obj, &OBJECT_ALIASES)
                // Expected keys absent: a non-empty object is never "no
                // answer" — surface its literal string form instead.
                .unwrap_or_else(|| Value::Object(obj.clone()).to_string());
            let sources = obj
                .get("sources")
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            FactCheckResult::ok(answer, sources)
        }
        // Malformed or streamed body: fall back to line-oriented decoding.
        _ => decode_lines(body),
    }
}

/// Line-oriented fallback: accumulate text fragments from each non-blank
/// line, concatenated with no separator.
fn decode_lines(body: &str) -> FactCheckResult {
    let mut acc = String::new();

    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let chunk = line.strip_prefix(DATA_PREFIX).unwrap_or(line);
        if chunk == DONE_SENTINEL {
            continue;
        }

        match serde_json::from_str::<Value>(chunk) {
            Ok(Value::Object(obj)) => {
                if let Some(text) = first_alias(&obj, &CHUNK_ALIASES) {
                    acc.push_str(&text);
                }
            }
            Ok(Value::String(s)) => acc.push_str(&s),
            Ok(_) => {}
            // Not JSON and not the start of a JSON object: treat as
            // already-human-readable prose.
            Err(_) if !chunk.starts_with('{') => acc.push_str(chunk),
            Err(_) => {}
        }
    }

    if acc.is_empty() {
        // Last resort: surface the untouched body rather than drop content.
        FactCheckResult::ok(body, Vec::new())
    } else {
        FactCheckResult::ok(acc, Vec::new())
    }
}

/// First non-empty string value among the candidate keys.
fn first_alias(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        obj.get(*k)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn truncate(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}
