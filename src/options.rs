use serde::Deserialize;

/// Knobs for one top-level [`crate::recover`] call.
///
/// Host applications often hand these in as an untyped JSON object (or
/// nothing at all); [`RecoverOptions::from_value`] maps that bag onto the
/// typed struct, falling back to the default for any missing or wrong-shaped
/// field. Options are immutable for the duration of a call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RecoverOptions {
    /// Enable the repair and boundary-scan fallback legs.
    pub attempt_fix: bool,
    /// Cap on candidates pulled out of free text.
    pub max_blocks: usize,
    /// Take the earliest/most-confident candidate; when false, prefer the
    /// longest (treat longer matches as more likely complete).
    pub prefer_first: bool,
    /// Tolerate truncated structures and synthesize a close for them.
    pub allow_partial: bool,
}

impl Default for RecoverOptions {
    fn default() -> Self {
        RecoverOptions {
            attempt_fix: default_attempt_fix(),
            max_blocks: default_max_blocks(),
            prefer_first: default_prefer_first(),
            allow_partial: false,
        }
    }
}

fn default_attempt_fix() -> bool {
    true
}
fn default_max_blocks() -> usize {
    5
}
fn default_prefer_first() -> bool {
    true
}

impl RecoverOptions {
    /// Build options from a duck-typed JSON bag.
    ///
    /// An invalid or non-object value yields all-defaults, never an error;
    /// recognized fields with the wrong type are ignored field-by-field.
    #[must_use]
    pub fn from_value(value: &serde_json::Value) -> Self {
        let Some(bag) = value.as_object() else {
            return RecoverOptions::default();
        };
        let defaults = RecoverOptions::default();
        RecoverOptions {
            attempt_fix: bag
                .get("attemptFix")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(defaults.attempt_fix),
            max_blocks: bag
                .get("maxBlocks")
                .and_then(serde_json::Value::as_u64)
                .map_or(defaults.max_blocks, |n| n as usize),
            prefer_first: bag
                .get("preferFirst")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(defaults.prefer_first),
            allow_partial: bag
                .get("allowPartial")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(defaults.allow_partial),
        }
    }
}
