//! Lenient JSON extraction from free-form model output.
//!
//! Models wrap JSON in code fences, emit Python's `None`, and leave trailing
//! commas. [`extract_json`] cleans those up and never fails: an empty object
//! signals "could not parse".

use serde_json::{Map, Value};

/// Parse JSON out of a model response.
///
/// Returns an empty object when the content cannot be parsed even after
/// trailing commas are removed.
pub fn extract_json(content: &str) -> Value {
    let body = strip_code_fence(content);
    let cleaned = replace_bare_none(body);
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Ok(value) = serde_json::from_str(&collapsed) {
        return value;
    }

    match serde_json::from_str(&remove_trailing_commas(&collapsed)) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "could not parse model output as JSON");
            Value::Object(Map::new())
        }
    }
}

/// Whether `value` is the empty-object failure signal of [`extract_json`].
pub fn is_unparsed(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}

fn strip_code_fence(content: &str) -> &str {
    let content = content.trim();

    let start = if let Some(idx) = content.find("```json") {
        idx + "```json".len()
    } else if content.starts_with("```") {
        content.find('\n').map(|n| n + 1).unwrap_or(3)
    } else {
        return content;
    };

    let rest = &content[start..];
    match rest.rfind("```") {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

/// Replace Python's bare `None` token with `null`, leaving string contents and
/// longer identifiers such as `NoneType` untouched.
fn replace_bare_none(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            i += 1;
            continue;
        }

        let is_token = chars[i..].starts_with(&['N', 'o', 'n', 'e'])
            && !(i > 0 && is_ident_char(chars[i - 1]))
            && !chars.get(i + 4).copied().is_some_and(is_ident_char);
        if is_token {
            out.push_str("null");
            i += 4;
        } else {
            out.push(c);
            i += 1;
        }
    }

    out
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Drop commas that directly precede `]` or `}`, ignoring string contents.
fn remove_trailing_commas(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
                if !matches!(next, Some(']') | Some('}')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}
