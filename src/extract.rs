/// Candidate extraction — locate JSON-shaped substrings in free text.
///
/// Four pattern classes, scanned in confidence order; extraction stops as
/// soon as the global `max_blocks` cap is hit. Duplicated content across
/// classes (a json-tagged fence is also a generic fence) is kept once, at
/// its highest-confidence class.
use std::sync::LazyLock;

use regex_lite::Regex;
use smallvec::SmallVec;

use crate::options::RecoverOptions;

/// Fenced block explicitly tagged as JSON.
pub(crate) const PRIORITY_JSON_FENCE: u8 = 1;
/// Generic fenced block whose content is JSON-shaped.
pub(crate) const PRIORITY_ANY_FENCE: u8 = 2;
/// Inline single-backtick span, JSON-shaped.
pub(crate) const PRIORITY_INLINE_CODE: u8 = 3;
/// Raw bracket-matched substring anywhere in the text.
pub(crate) const PRIORITY_RAW_MATCH: u8 = 4;

/// Raw matches shorter than this are noise (`{}`, `[1]`, smileys).
const MIN_RAW_MATCH_LEN: usize = 6;

static JSON_FENCE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?is)```json\s*(.*?)```").ok());
static ANY_FENCE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z0-9_+\-]*\s*(.*?)```").ok());
static INLINE_CODE_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").ok());
// One level of nesting tolerance; deeper structures are the aggressive
// boundary scan's job.
static RAW_OBJECT_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\{(?:[^{}]|\{[^{}]*\})*\}").ok());
static RAW_ARRAY_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\[(?:[^\[\]]|\[[^\[\]]*\])*\]").ok());

/// A substring suspected of containing a JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub content: String,
    pub priority: u8,
}

pub(crate) type CandidateList = SmallVec<[Candidate; 4]>;

/// Enumerate up to `max_blocks` candidates in discovery order.
///
/// Discovery order is ascending priority by construction (classes are
/// scanned most-confident first), which is exactly the `prefer_first`
/// ordering; the orchestrator re-sorts by length for the other policy.
pub(crate) fn extract_candidates(text: &str, options: &RecoverOptions) -> CandidateList {
    let mut found = CandidateList::new();
    let cap = options.max_blocks;
    if cap == 0 {
        return found;
    }

    collect_class(&mut found, text, &JSON_FENCE_RE, PRIORITY_JSON_FENCE, cap, false);
    collect_class(&mut found, text, &ANY_FENCE_RE, PRIORITY_ANY_FENCE, cap, true);
    collect_class(&mut found, text, &INLINE_CODE_RE, PRIORITY_INLINE_CODE, cap, true);
    collect_raw_class(&mut found, text, &RAW_OBJECT_RE, cap);
    collect_raw_class(&mut found, text, &RAW_ARRAY_RE, cap);
    found
}

fn collect_class(
    found: &mut CandidateList,
    text: &str,
    pattern: &Option<Regex>,
    priority: u8,
    cap: usize,
    require_json_shape: bool,
) {
    let Some(re) = pattern else { return };
    for caps in re.captures_iter(text) {
        if found.len() >= cap {
            return;
        }
        let Some(content) = caps.get(1).map(|m| m.as_str().trim()) else {
            continue;
        };
        if content.is_empty() {
            continue;
        }
        if require_json_shape && !starts_json_shaped(content) {
            continue;
        }
        push_unique(found, content, priority);
    }
}

fn collect_raw_class(found: &mut CandidateList, text: &str, pattern: &Option<Regex>, cap: usize) {
    let Some(re) = pattern else { return };
    for m in re.find_iter(text) {
        if found.len() >= cap {
            return;
        }
        let content = m.as_str().trim();
        if content.len() < MIN_RAW_MATCH_LEN {
            continue;
        }
        push_unique(found, content, PRIORITY_RAW_MATCH);
    }
}

#[inline]
fn starts_json_shaped(content: &str) -> bool {
    content.starts_with('{') || content.starts_with('[')
}

#[inline]
fn push_unique(found: &mut CandidateList, content: &str, priority: u8) {
    if found.iter().any(|c| c.content == content) {
        return;
    }
    found.push(Candidate {
        content: content.to_owned(),
        priority,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> CandidateList {
        extract_candidates(text, &RecoverOptions::default())
    }

    #[test]
    fn json_fence_has_top_priority() {
        let text = "prose\n```json\n{\"a\": 1}\n```\nmore";
        let found = extract(text);
        assert_eq!(found[0].content, "{\"a\": 1}");
        assert_eq!(found[0].priority, PRIORITY_JSON_FENCE);
    }

    #[test]
    fn json_fence_tag_is_case_insensitive() {
        let found = extract("```JSON\n[1, 2]\n```");
        assert_eq!(found[0].priority, PRIORITY_JSON_FENCE);
        assert_eq!(found[0].content, "[1, 2]");
    }

    #[test]
    fn generic_fence_requires_json_shape() {
        let found = extract("```python\nprint('hi')\n```\n```\n{\"ok\": true}\n```");
        // The python fence is skipped; the bare fence survives, and the raw
        // class rediscovers the same braces span, which dedupe drops.
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "{\"ok\": true}");
        assert_eq!(found[0].priority, PRIORITY_ANY_FENCE);
    }

    #[test]
    fn inline_code_span() {
        let found = extract("the value `{\"a\": 1}` is returned");
        assert_eq!(found[0].priority, PRIORITY_INLINE_CODE);
        assert_eq!(found[0].content, "{\"a\": 1}");
    }

    #[test]
    fn raw_matches_anywhere_in_text() {
        let found = extract("data: {\"x\": 1} and {\"x\": 2}");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|c| c.priority == PRIORITY_RAW_MATCH));
        assert_eq!(found[0].content, "{\"x\": 1}");
        assert_eq!(found[1].content, "{\"x\": 2}");
    }

    #[test]
    fn raw_match_tolerates_one_nesting_level() {
        let found = extract("x {\"a\": {\"b\": 2}} y");
        assert_eq!(found[0].content, "{\"a\": {\"b\": 2}}");
    }

    #[test]
    fn trivial_raw_matches_are_rejected() {
        assert!(extract("empty {} and tiny [1]").is_empty());
    }

    #[test]
    fn duplicate_content_is_kept_once_at_best_class() {
        let found = extract("```json\n{\"a\": 1}\n```");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].priority, PRIORITY_JSON_FENCE);
    }

    #[test]
    fn max_blocks_caps_extraction_globally() {
        let text = "{\"n\": 1} {\"n\": 2} {\"n\": 3} {\"n\": 4}";
        let options = RecoverOptions {
            max_blocks: 2,
            ..RecoverOptions::default()
        };
        let found = extract_candidates(text, &options);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn zero_max_blocks_yields_nothing() {
        let options = RecoverOptions {
            max_blocks: 0,
            ..RecoverOptions::default()
        };
        assert!(extract_candidates("{\"a\": 1}", &options).is_empty());
    }

    #[test]
    fn discovery_order_is_ascending_priority() {
        let text = "inline `{\"i\": 1}` and raw {\"r\": 2} plus\n```json\n{\"f\": 3}\n```";
        let found = extract(text);
        let priorities: Vec<u8> = found.iter().map(|c| c.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable();
        assert_eq!(priorities, sorted);
        assert_eq!(found[0].content, "{\"f\": 3}");
    }
}
