use std::borrow::Cow;

/// Single-pass balanced-span finder.
///
/// Walks the text left to right tracking three things: whether the cursor is
/// inside a string literal, whether the next character is escaped, and the
/// bracket nesting depth. Brackets inside string literals never count. The
/// first time depth returns to zero, the span from the first opener through
/// the closer is the result.
///
/// With `allow_partial`, a scan that ends still nested returns everything
/// from the first opener with a single synthesized closer appended (matching
/// the opener). One level only; deeper truncation is left to the repair
/// rules and a re-scan.
pub(crate) fn find_balanced_span(text: &str, allow_partial: bool) -> Option<Cow<'_, str>> {
    let bytes = text.as_bytes();
    let mut in_string = false;
    let mut escaped = false;
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    for (i, &b) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' | b'[' if !in_string => {
                if start.is_none() {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' | b']' if !in_string => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        let s = start?;
                        return Some(Cow::Borrowed(&text[s..=i]));
                    }
                }
            }
            _ => {}
        }
    }

    let s = start?;
    if depth > 0 && allow_partial {
        let mut span = String::with_capacity(text.len() - s + 1);
        span.push_str(&text[s..]);
        span.push(closer_for(bytes[s]));
        return Some(Cow::Owned(span));
    }
    None
}

#[inline]
fn closer_for(opener: u8) -> char {
    if opener == b'[' {
        ']'
    } else {
        '}'
    }
}

#[cfg(test)]
mod tests {
    use super::find_balanced_span;

    #[test]
    fn finds_first_top_level_object() {
        let text = "noise {\"a\": 1} trailing {\"b\": 2}";
        assert_eq!(
            find_balanced_span(text, false).as_deref(),
            Some("{\"a\": 1}")
        );
    }

    #[test]
    fn finds_array_spans() {
        assert_eq!(
            find_balanced_span("x [1, [2, 3]] y", false).as_deref(),
            Some("[1, [2, 3]]")
        );
    }

    #[test]
    fn brackets_inside_strings_do_not_count() {
        let text = r#"{"a": "closing } inside", "b": "[not a list]"}"#;
        assert_eq!(find_balanced_span(text, false).as_deref(), Some(text));
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let text = r#"{"a": "say \"}\" loudly"}"#;
        assert_eq!(find_balanced_span(text, false).as_deref(), Some(text));
    }

    #[test]
    fn no_opener_means_no_span() {
        assert!(find_balanced_span("just prose, no JSON here", false).is_none());
        assert!(find_balanced_span(r#""{ inside a string only }""#, false).is_none());
    }

    #[test]
    fn unbalanced_without_partial_is_none() {
        assert!(find_balanced_span("{\"a\": [1, 2", false).is_none());
    }

    #[test]
    fn partial_appends_single_matching_closer() {
        assert_eq!(
            find_balanced_span("{\"a\": 1", true).as_deref(),
            Some("{\"a\": 1}")
        );
        assert_eq!(
            find_balanced_span("text [1, 2", true).as_deref(),
            Some("[1, 2]")
        );
    }

    #[test]
    fn partial_does_not_close_multiple_levels() {
        // One synthesized closer only; the result may still be unbalanced.
        assert_eq!(
            find_balanced_span("{\"a\": {\"b\": 1", true).as_deref(),
            Some("{\"a\": {\"b\": 1}")
        );
    }

    #[test]
    fn stray_closers_before_opener_are_ignored() {
        assert_eq!(
            find_balanced_span("} ] {\"a\": 1}", false).as_deref(),
            Some("{\"a\": 1}")
        );
    }
}
