//! Locate a JSON object inside a linter's combined stdout/stderr.
//!
//! Linters print progress text, warnings and sometimes template snippets
//! around their JSON report. Every `{` is tried in order as the start of an
//! object; the matching `}` is found by brace counting that skips over
//! string literals and their escapes.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::error::{LintError, Result};
use crate::tools::Tool;

/// Closing brace offset for every `{` in `text`, `None` when unbalanced.
fn brace_matches(text: &str) -> BTreeMap<usize, Option<usize>> {
    let bytes = text.as_bytes();
    let mut matches = BTreeMap::new();
    for (start, byte) in bytes.iter().enumerate() {
        if *byte == b'{' && !matches.contains_key(&start) {
            scan_from(bytes, start, &mut matches);
        }
    }
    matches
}

/// Count braces from `start` until it closes, recording a match for every
/// `{` passed outside a string literal.
///
/// A brace already recorded is skipped over, since a scan reaching it
/// outside a string sees exactly what the earlier scan saw.
fn scan_from(bytes: &[u8], start: usize, matches: &mut BTreeMap<usize, Option<usize>>) {
    let mut open = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut i = start;

    while i < bytes.len() {
        let byte = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => match matches.get(&i).copied() {
                Some(Some(end)) => {
                    i = end + 1;
                    continue;
                }
                Some(None) => break,
                None => open.push(i),
            },
            b'}' => {
                if let Some(opened) = open.pop() {
                    matches.insert(opened, Some(i));
                    if open.is_empty() {
                        return;
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }

    for opened in open {
        matches.insert(opened, None);
    }
}

/// Every balanced `{...}` span in `text`, in order of its opening brace.
pub fn json_candidates(text: &str) -> impl Iterator<Item = &str> {
    brace_matches(text)
        .into_iter()
        .filter_map(move |(start, end)| end.map(|end| &text[start..=end]))
}

fn parse_error(tool: Tool, message: String) -> LintError {
    LintError::OutputParse {
        tool: tool.to_string(),
        message,
    }
}

/// The first candidate span that is well-formed JSON.
pub fn extract_json(tool: Tool, output: &str) -> Result<&str> {
    json_candidates(output)
        .find(|candidate| serde_json::from_str::<serde_json::Value>(candidate).is_ok())
        .ok_or_else(|| parse_error(tool, "no valid JSON found in output".to_string()))
}

/// Decode the first candidate span that fits `T`.
pub fn decode_json<T: DeserializeOwned>(tool: Tool, output: &str) -> Result<T> {
    let mut last_error = None;
    for candidate in json_candidates(output) {
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = Some(e),
        }
    }
    Err(parse_error(
        tool,
        match last_error {
            Some(e) => format!("no valid JSON found in output: {}", e),
            None => "no JSON found in output".to_string(),
        },
    ))
}

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn skips_text_around_json() {
        let output = "Resolving templates...\n{\"results\": []}\nDone.\n";
        assert_eq!(
            extract_json(Tool::Kots, output).unwrap(),
            "{\"results\": []}"
        );
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let output = r#"{"message": "use {{ .Values.x }} here \"}\"", "n": 1} trailing }"#;
        let json = extract_json(Tool::Kots, output).unwrap();
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["n"], 1);
    }

    #[test]
    fn invalid_leading_candidate_is_skipped() {
        let output = "warning: {{ template }} not rendered\n{\"ok\": true}";
        assert_eq!(extract_json(Tool::Kots, output).unwrap(), "{\"ok\": true}");
    }

    #[test]
    fn nested_spans_are_candidates_in_order() {
        let candidates: Vec<_> = json_candidates("{ {\"a\": 1} {\"b\": 2}").collect();
        assert_eq!(candidates, vec!["{\"a\": 1}", "{\"b\": 2}"]);
    }

    #[test]
    fn quoted_brace_before_object_is_tolerated() {
        let output = "unexpected \"{\" {\"ok\": true}";
        assert_eq!(extract_json(Tool::Kots, output).unwrap(), "{\"ok\": true}");
    }

    #[test]
    fn many_unbalanced_braces_scan_quickly() {
        let output = format!("{}{{\"ok\": true}}", "{".repeat(100_000));
        let started = std::time::Instant::now();
        assert_eq!(extract_json(Tool::Kots, &output).unwrap(), "{\"ok\": true}");
        assert!(started.elapsed() < std::time::Duration::from_secs(5));
    }

    #[test]
    fn no_json_is_an_error() {
        let err = extract_json(Tool::Kots, "fatal: binary not found").unwrap_err();
        assert!(matches!(err, LintError::OutputParse { .. }));

        let err = extract_json(Tool::Kots, "{ unterminated").unwrap_err();
        assert!(err.to_string().contains("no valid JSON"));
    }

    #[test]
    fn decode_picks_first_candidate_matching_the_schema() {
        #[derive(Deserialize)]
        struct Report {
            results: Vec<u32>,
        }

        let output = "{\"progress\": 50}\n{\"results\": [1, 2]}";
        let report: Report = decode_json(Tool::Preflight, output).unwrap();
        assert_eq!(report.results, vec![1, 2]);
    }

    #[test]
    fn decode_reports_last_error() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Report {
            results: Vec<u32>,
        }

        let err = decode_json::<Report>(Tool::Preflight, "{\"other\": 1}").unwrap_err();
        assert!(err.to_string().contains("missing field `results`"));

        let err = decode_json::<Report>(Tool::Preflight, "plain text").unwrap_err();
        assert!(err.to_string().contains("no JSON found in output"));
    }
}
