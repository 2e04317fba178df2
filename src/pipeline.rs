/// Parse pipeline — one candidate string in, one verdict out.
///
/// Four legs, short-circuiting on first success:
///   a. strict parse as-is
///   b. strict parse of the first balanced span
///   c. strict parse of the repaired string
///   d. strict parse of the first balanced span of the repaired string
/// Legs b–d only run with `attempt_fix`; a blank candidate skips all four.
use serde_json::Value;

use crate::error::RecoverError;
use crate::options::RecoverOptions;
use crate::repair::RepairCache;
use crate::scan::find_balanced_span;

/// Which fallback legs a pipeline run may use.
///
/// `Strict` is used by the orchestrator's whole-input attempt when taking
/// the first balanced span would contradict the caller's ordering policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PipelineMode {
    Strict,
    Full,
}

pub(crate) fn parse_candidate(
    text: &str,
    options: &RecoverOptions,
    cache: &mut RepairCache,
    mode: PipelineMode,
) -> Result<Value, RecoverError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RecoverError::EmptyCandidate);
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    if !options.attempt_fix || mode == PipelineMode::Strict {
        return Err(RecoverError::Exhausted);
    }

    if let Some(span) = find_balanced_span(trimmed, options.allow_partial) {
        if let Ok(value) = serde_json::from_str::<Value>(&span) {
            tracing::trace!(len = span.len(), "parsed balanced span");
            return Ok(value);
        }
    }

    let repaired = cache.repaired(trimmed);
    if let Ok(value) = serde_json::from_str::<Value>(repaired.trim()) {
        tracing::trace!("parsed after repair");
        return Ok(value);
    }

    if let Some(span) = find_balanced_span(&repaired, options.allow_partial) {
        if let Ok(value) = serde_json::from_str::<Value>(&span) {
            tracing::trace!(len = span.len(), "parsed balanced span of repaired text");
            return Ok(value);
        }
    }

    Err(RecoverError::Exhausted)
}
