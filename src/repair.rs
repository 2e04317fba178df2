/// Repair engine — ordered textual rewrites from JSON-like to strict JSON.
///
/// Each rule takes the previous rule's output and is applied unconditionally
/// when the engine runs; order is load-bearing (bare keys must be quoted
/// before single-quote conversion would see them, trailing commas are
/// stripped before ellipsis noise is, and so on). Every rule is string-in /
/// string-out and idempotent on its own output.
///
/// No rule re-parses; the strict parser gets its turn between repair legs in
/// the pipeline.
use std::sync::LazyLock;

use regex_lite::{Captures, Regex};
use rustc_hash::FxHashMap;

// Compiled once per process; a pattern that fails to compile disables its
// rule (the rule passes text through) rather than aborting the repair.
static TRAILING_COMMA_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:,\s*)+([}\]])").ok());
static TRAILING_COMMA_EOT_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:,\s*)+$").ok());
static BARE_KEY_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([{,]\s*)([A-Za-z0-9_.\-]+)\s*:").ok());
static VALUE_LITERAL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(:\s*)(true|false|none|undefined)\b").ok());
static BARE_LITERAL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b(True|False|None)\b").ok());
static ELLIPSIS_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(",?\\s*(?:\\.{3}|\u{2026})").ok());

/// Memoizes raw → repaired for one top-level call.
///
/// Constructed inside `recover` and handed `&mut` down the pipeline, so the
/// same string seen twice (fast path, then fallback) repairs once. Nothing
/// survives the call; there is no cross-call cache.
#[derive(Debug, Default)]
pub(crate) struct RepairCache {
    entries: FxHashMap<String, String>,
    allow_partial: bool,
}

impl RepairCache {
    pub(crate) fn new(allow_partial: bool) -> Self {
        RepairCache {
            entries: FxHashMap::default(),
            allow_partial,
        }
    }

    /// Repaired form of `raw`, computed at most once per cache lifetime.
    pub(crate) fn repaired(&mut self, raw: &str) -> String {
        if let Some(hit) = self.entries.get(raw) {
            return hit.clone();
        }
        let fixed = repair(raw, self.allow_partial);
        self.entries.insert(raw.to_owned(), fixed.clone());
        fixed
    }
}

/// Run the full rule sequence over `raw`.
pub(crate) fn repair(raw: &str, allow_partial: bool) -> String {
    let mut text = strip_bom(raw).to_owned();
    text = strip_comments(&text);
    text = unescape_stray_quotes(&text);
    if allow_partial {
        text = close_odd_quote(text);
    }
    text = strip_trailing_commas(&text);
    text = quote_bare_keys(&text);
    text = convert_single_quotes(&text);
    text = map_literal_tokens(&text);
    text = collapse_double_escapes(&text);
    text = strip_ellipsis(&text);
    text
}

#[inline]
fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Strip `//…`, `/*…*/`, and `#…` comments, leaving string literals alone.
///
/// Single- and double-quoted strings both shield their contents; single
/// quotes have not been converted yet at this point in the sequence. An
/// unterminated block comment swallows the rest of the text.
fn strip_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0usize;
    let mut in_string: Option<u8> = None;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(quote) = in_string {
            if b == b'\\' && i + 1 < bytes.len() {
                out.push_str(&text[i..i + 2]);
                i += 2;
                continue;
            }
            if b == quote {
                in_string = None;
            }
            push_raw_byte(&mut out, text, i);
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' => {
                in_string = Some(b);
                push_raw_byte(&mut out, text, i);
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = skip_until(bytes, i + 2, b'\n');
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i + 2);
            }
            b'#' => {
                i = skip_until(bytes, i + 1, b'\n');
            }
            _ => {
                push_raw_byte(&mut out, text, i);
                i += 1;
            }
        }
    }
    out
}

#[inline]
fn skip_until(bytes: &[u8], mut i: usize, stop: u8) -> usize {
    while i < bytes.len() && bytes[i] != stop {
        i += 1;
    }
    i
}

#[inline]
fn skip_block_comment(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
            return i + 2;
        }
        i += 1;
    }
    i
}

/// Copy one byte of `text` into `out`, preserving multi-byte chars.
///
/// The scanners index bytes but only ever dispatch on ASCII, so a non-ASCII
/// lead byte means the whole char is copied through untouched.
#[inline]
fn push_raw_byte(out: &mut String, text: &str, i: usize) {
    let b = text.as_bytes()[i];
    if b.is_ascii() {
        out.push(b as char);
    } else if text.is_char_boundary(i) {
        if let Some(c) = text[i..].chars().next() {
            out.push(c);
        }
    }
}

/// Drop the stray backslash from `\'` and `\"` left over by double-encoding.
///
/// String-literal-aware: a `\"` inside a string opened by a bare `"` is a
/// legitimate escape and stays put (later rules emit exactly those, and this
/// rule must not undo them on a re-run). A `\"` outside any bare-quoted
/// string is double-encoding residue and loses its backslash. `\'` is never
/// a valid escape and always relaxes to `'`. `\\` pairs and all other
/// escapes are copied through intact.
fn unescape_stray_quotes(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0usize;
    let mut in_double = false;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => match bytes.get(i + 1) {
                Some(&b'\'') => {
                    out.push('\'');
                    i += 2;
                }
                Some(&b'"') if !in_double => {
                    out.push('"');
                    i += 2;
                }
                Some(&next) if next.is_ascii() => {
                    out.push_str(&text[i..i + 2]);
                    i += 2;
                }
                _ => {
                    out.push('\\');
                    i += 1;
                }
            },
            b'"' => {
                in_double = !in_double;
                out.push('"');
                i += 1;
            }
            _ => {
                push_raw_byte(&mut out, text, i);
                i += 1;
            }
        }
    }
    out
}

/// Close a truncated string literal by appending one `"` when the count of
/// unescaped quotes is odd. Partial-tolerant mode only.
fn close_odd_quote(mut text: String) -> String {
    let bytes = text.as_bytes();
    let mut count = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => {
                count += 1;
                i += 1;
            }
            _ => i += 1,
        }
    }
    if count % 2 == 1 {
        text.push('"');
    }
    text
}

fn strip_trailing_commas(text: &str) -> String {
    let pass = match &*TRAILING_COMMA_RE {
        Some(re) => re.replace_all(text, "$1"),
        None => text.into(),
    };
    match &*TRAILING_COMMA_EOT_RE {
        Some(re) => re.replace_all(&pass, "").into_owned(),
        None => pass.into_owned(),
    }
}

fn quote_bare_keys(text: &str) -> String {
    match &*BARE_KEY_RE {
        Some(re) => re.replace_all(text, "${1}\"${2}\":").into_owned(),
        None => text.to_owned(),
    }
}

/// Convert single-quoted string literals to double-quoted.
///
/// A `'` opens a string only when the previous significant character is a
/// structural one (`{`, `[`, `,`, `:`) or start of text; that keeps
/// apostrophes in surrounding prose from swallowing half the input. Inside
/// the converted string, `\'` relaxes to `'` and bare `"` tightens to `\"`.
fn convert_single_quotes(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0usize;
    let mut in_double = false;
    let mut prev_significant: Option<u8> = None;

    while i < bytes.len() {
        let b = bytes[i];
        if in_double {
            if b == b'\\' && i + 1 < bytes.len() && bytes[i + 1].is_ascii() {
                out.push_str(&text[i..i + 2]);
                i += 2;
                continue;
            }
            if b == b'"' {
                in_double = false;
                prev_significant = Some(b'"');
            }
            push_raw_byte(&mut out, text, i);
            i += 1;
            continue;
        }
        match b {
            b'"' => {
                in_double = true;
                out.push('"');
                i += 1;
            }
            b'\'' if opens_string(prev_significant) => {
                out.push('"');
                i += 1;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' if bytes.get(i + 1) == Some(&b'\'') => {
                            out.push('\'');
                            i += 2;
                        }
                        b'\\' if i + 1 < bytes.len() && bytes[i + 1].is_ascii() => {
                            out.push_str(&text[i..i + 2]);
                            i += 2;
                        }
                        b'"' => {
                            out.push_str("\\\"");
                            i += 1;
                        }
                        b'\'' => {
                            i += 1;
                            break;
                        }
                        _ => {
                            push_raw_byte(&mut out, text, i);
                            i += 1;
                        }
                    }
                }
                out.push('"');
                prev_significant = Some(b'"');
            }
            _ => {
                if !b.is_ascii_whitespace() {
                    prev_significant = Some(b);
                }
                push_raw_byte(&mut out, text, i);
                i += 1;
            }
        }
    }
    out
}

#[inline]
fn opens_string(prev: Option<u8>) -> bool {
    matches!(prev, None | Some(b'{') | Some(b'[') | Some(b',') | Some(b':'))
}

/// Map Python/JS literal spellings onto JSON ones.
///
/// First pass: case-insensitive `true`/`false`/`none`/`undefined` in value
/// position (after a colon). Second pass: any remaining exact-case bare
/// `True`/`False`/`None` anywhere.
fn map_literal_tokens(text: &str) -> String {
    let pass = match &*VALUE_LITERAL_RE {
        Some(re) => re.replace_all(text, |caps: &Captures<'_>| {
            let mapped = match caps[2].to_ascii_lowercase().as_str() {
                "true" => "true",
                "false" => "false",
                _ => "null",
            };
            format!("{}{}", &caps[1], mapped)
        }),
        None => text.into(),
    };
    match &*BARE_LITERAL_RE {
        Some(re) => re
            .replace_all(&pass, |caps: &Captures<'_>| {
                match &caps[1] {
                    "True" => "true",
                    "False" => "false",
                    _ => "null",
                }
                .to_owned()
            })
            .into_owned(),
        None => pass.into_owned(),
    }
}

/// Collapse the double-escaping residue `\\"` into a corrected `\"`.
///
/// Runs after stray-quote un-escaping, which deliberately leaves `\\` pairs
/// alone; whatever `\\"` remains at this point came from a doubly-encoded
/// escaped quote.
fn collapse_double_escapes(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'\\') {
            if bytes.get(i + 2) == Some(&b'"') {
                out.push_str("\\\"");
                i += 3;
            } else {
                out.push_str("\\\\");
                i += 2;
            }
            continue;
        }
        push_raw_byte(&mut out, text, i);
        i += 1;
    }
    out
}

/// Strip `...` / `…` truncation noise, eating one comma directly before it
/// (the trailing-comma rule has already run by this point).
fn strip_ellipsis(text: &str) -> String {
    match &*ELLIPSIS_RE {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_owned(),
    }
}

#[cfg(test)]
#[path = "repair_tests.rs"]
mod tests;
