use serde::de::DeserializeOwned;

/// Returns the first balanced top-level `{...}` span in `raw`, tolerating
/// models that wrap their JSON in prose or code fences. String literals and
/// escapes are respected so braces inside values do not end the span.
pub fn first_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Extracts and deserializes the first JSON object in free-form model
/// output. `None` signals a parse failure the caller maps to defaults.
pub fn parse_first_object<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let span = first_json_object(raw)?;
    serde_json::from_str(span).ok()
}
