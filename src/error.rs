/// Canonical error type used across all modules.
///
/// The engine never panics on malformed input: every failure mode is a
/// variant here, and [`crate::recover`] returns one instead of raising.
/// `NoInput` and `NoJsonFound` are the two caller-visible outcomes;
/// `EmptyCandidate` and `Exhausted` are per-candidate verdicts the
/// orchestrator swallows while it still has strategies left to try.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecoverError {
    /// Input was null, unconvertible, or blank after trimming.
    #[error("no usable input")]
    NoInput,
    /// A candidate string was empty or all-whitespace.
    #[error("Empty JSON string")]
    EmptyCandidate,
    /// One candidate failed every pipeline leg.
    #[error("Failed to parse JSON after all attempts")]
    Exhausted,
    /// Every recovery strategy was tried and none produced a value.
    #[error("No valid JSON found in the response")]
    NoJsonFound,
}

impl RecoverError {
    /// Whether this error can escape a top-level [`crate::recover`] call.
    /// Candidate-scoped failures are always absorbed by the orchestrator.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecoverError::NoInput | RecoverError::NoJsonFound)
    }
}
