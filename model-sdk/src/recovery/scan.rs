//! Bracket-balance scanning for JSON structures embedded in free text

/// Byte spans `(start, end_exclusive)` of every complete top-level `{...}` or
/// `[...]` structure in `text`, in order of appearance.
///
/// One pass with a stack of open brackets. Quoted strings inside a structure
/// are skipped, so braces in string values do not count. A closer that does
/// not match the innermost opener abandons everything still open. A structure
/// counts as top-level when no complete structure encloses it, so one nested
/// in a never-closed opener is still found.
pub fn top_level_spans(text: &str) -> Vec<(usize, usize)> {
    let mut open: Vec<(usize, u8)> = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in text.as_bytes().iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' if !open.is_empty() => in_string = true,
            b'{' => open.push((i, b'}')),
            b'[' => open.push((i, b']')),
            b'}' | b']' => match open.last() {
                Some(&(start, close)) if close == b => {
                    open.pop();
                    // Spans already found inside this one are no longer top-level
                    while spans.last().map_or(false, |&(inner, _)| inner > start) {
                        spans.pop();
                    }
                    spans.push((start, i + 1));
                }
                Some(_) => open.clear(),
                None => {}
            },
            _ => {}
        }
    }

    spans
}

/// The widest `open ... close` span: first opener to last closer.
pub fn greedy_span(text: &str, open: char, close: char) -> Option<(usize, usize)> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then_some((start, end + close.len_utf8()))
}
