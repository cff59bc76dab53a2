use super::ToolInvocation;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Extracts tool invocations from a model reply.
///
/// The payload is located by trying, in order: a fenced block tagged
/// `json`, an untagged fenced block, a bracketed array of objects, and a
/// bare object. Only the first payload found is decoded. Returns `None`
/// when the reply contains no usable payload, which means it is a final
/// answer.
pub fn extract_invocations(text: &str) -> Option<Vec<ToolInvocation>> {
    let payload = fenced_block(text, JSON_FENCE)
        .or_else(|| fenced_block(text, FENCE))
        .or_else(|| balanced(text, "[{", b'[', b']'))
        .or_else(|| balanced(text, "{", b'{', b'}'))?;
    parse_payload(payload)
}

fn fenced_block<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    let len = text[start..].find(FENCE)?;
    non_empty(&text[start..start + len])
}

/// Finds `prefix` and returns the text up to the bracket that closes it.
///
/// Brackets inside JSON string literals are ignored.
fn balanced<'a>(
    text: &'a str,
    prefix: &str,
    open: u8,
    close: u8,
) -> Option<&'a str> {
    let start = text.find(prefix)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in text.as_bytes()[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }

        if byte == b'"' {
            in_string = true;
        } else if byte == open {
            depth += 1;
        } else if byte == close {
            depth -= 1;
            if depth == 0 {
                return non_empty(&text[start..=start + offset]);
            }
        }
    }
    None
}

#[inline]
fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

fn parse_payload(payload: &str) -> Option<Vec<ToolInvocation>> {
    let invocations = match serde_json::from_str::<Vec<ToolInvocation>>(payload)
    {
        Ok(invocations) => invocations,
        Err(array_err) => match serde_json::from_str::<ToolInvocation>(payload)
        {
            Ok(invocation) => vec![invocation],
            Err(object_err) => {
                warn!(
                    payload,
                    "discarding tool payload: not an array ({array_err}), \
                     not an object ({object_err})"
                );
                return None;
            }
        },
    };

    if invocations.is_empty() {
        warn!(payload, "discarding tool payload: no invocations");
        return None;
    }
    if invocations
        .iter()
        .any(|inv| inv.kind.is_empty() || inv.name.is_empty())
    {
        warn!(payload, "discarding tool payload: invocation without type or name");
        return None;
    }
    Some(invocations)
}
