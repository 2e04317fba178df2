/// Orchestrator — sequences the recovery strategies for one input.
///
/// Strategy ladder, first success wins:
///   1. normalize (null/blank input bails out immediately)
///   2. fast path: a ` ```json ` fence whose body strict-parses as-is
///   3. parse pipeline over the whole input
///   4. extracted candidates, most promising first
///   5. aggressive boundary scan with synthesized close
/// Everything that parses goes through envelope unwrapping before being
/// returned; total failure is a value, never a panic.
use memchr::memmem;
use serde_json::Value;

use crate::error::RecoverError;
use crate::extract::extract_candidates;
use crate::normalize::{normalize_str, normalize_value};
use crate::options::RecoverOptions;
use crate::pipeline::{parse_candidate, PipelineMode};
use crate::repair::RepairCache;
use crate::scan::find_balanced_span;
use crate::unwrap::unwrap_envelope;

const FENCE: &[u8] = b"```";
const JSON_FENCE_TAG: &[u8] = b"json";

/// Recover the best-effort JSON value from `input`.
///
/// Never panics on malformed input. The only errors a caller sees are
/// [`RecoverError::NoInput`] (nothing usable was handed in) and
/// [`RecoverError::NoJsonFound`] (every strategy exhausted).
///
/// # Errors
///
/// See above; per-candidate failures are absorbed internally.
pub fn recover(input: &str, options: &RecoverOptions) -> Result<Value, RecoverError> {
    let Some(text) = normalize_str(input) else {
        return Err(RecoverError::NoInput);
    };
    let mut cache = RepairCache::new(options.allow_partial);
    recover_normalized(text, options, &mut cache)
}

/// [`recover`] for inputs of unknown shape.
///
/// `Null` is "no input"; strings pass through; scalars are stringified;
/// objects and arrays re-serialize and re-enter the pipeline, which lets an
/// already-parsed envelope (`{"response": "{…}"}`) unwrap like any other.
///
/// # Errors
///
/// Same contract as [`recover`].
pub fn recover_value(input: &Value, options: &RecoverOptions) -> Result<Value, RecoverError> {
    let Some(text) = normalize_value(input) else {
        return Err(RecoverError::NoInput);
    };
    let mut cache = RepairCache::new(options.allow_partial);
    recover_normalized(text.trim(), options, &mut cache)
}

fn recover_normalized(
    text: &str,
    options: &RecoverOptions,
    cache: &mut RepairCache,
) -> Result<Value, RecoverError> {
    if let Some(value) = fast_path(text, options, cache) {
        tracing::debug!("recovered via json fence fast path");
        return Ok(value);
    }

    // Taking the first balanced span of the whole input is only faithful to
    // the caller when they asked for the first match (or when the input is
    // itself the structure); otherwise leave prose-wrapped inputs to the
    // candidate pass, which knows how to order competing matches.
    let whole_mode = if options.prefer_first || starts_json_shaped(text) {
        PipelineMode::Full
    } else {
        PipelineMode::Strict
    };
    if let Ok(value) = parse_candidate(text, options, cache, whole_mode) {
        tracing::debug!("recovered from whole input");
        return Ok(unwrap_envelope(value, options, cache));
    }

    let mut candidates = extract_candidates(text, options);
    if !options.prefer_first {
        // Longest first; among equal lengths, the later discovery wins.
        candidates.reverse();
        candidates.sort_by_key(|c| std::cmp::Reverse(c.content.len()));
    }
    for candidate in &candidates {
        match parse_candidate(&candidate.content, options, cache, PipelineMode::Full) {
            Ok(value) => {
                tracing::debug!(
                    priority = candidate.priority,
                    len = candidate.content.len(),
                    "recovered from extracted candidate"
                );
                return Ok(unwrap_envelope(value, options, cache));
            }
            Err(e) => {
                tracing::trace!(priority = candidate.priority, %e, "candidate rejected");
            }
        }
    }

    if options.attempt_fix {
        if let Some(span) = find_balanced_span(text, true) {
            if let Ok(value) = parse_candidate(&span, options, cache, PipelineMode::Full) {
                tracing::debug!("recovered via aggressive boundary scan");
                return Ok(unwrap_envelope(value, options, cache));
            }
        }
    }

    tracing::debug!("all recovery strategies exhausted");
    Err(RecoverError::NoJsonFound)
}

/// The overwhelmingly common case: one ` ```json ` fence whose body is
/// already strict JSON. Anything less clean falls through to the ladder.
///
/// The tag match is case-insensitive to stay in step with the extractor's
/// fence regex.
fn fast_path(text: &str, options: &RecoverOptions, cache: &mut RepairCache) -> Option<Value> {
    let bytes = text.as_bytes();
    let body_start = memmem::find_iter(bytes, FENCE).find_map(|pos| {
        let tag_end = pos + FENCE.len() + JSON_FENCE_TAG.len();
        let tag = bytes.get(pos + FENCE.len()..tag_end)?;
        tag.eq_ignore_ascii_case(JSON_FENCE_TAG).then_some(tag_end)
    })?;
    let close = memmem::find(&bytes[body_start..], FENCE)?;
    let body = text[body_start..body_start + close].trim();
    let value = serde_json::from_str::<Value>(body).ok()?;
    Some(unwrap_envelope(value, options, cache))
}

#[inline]
fn starts_json_shaped(text: &str) -> bool {
    text.starts_with('{') || text.starts_with('[')
}
