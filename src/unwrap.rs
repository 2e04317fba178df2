/// Envelope unwrapping — agent responses often nest the real payload under
/// a `response` field, sometimes serialized a second time.
use serde_json::Value;

use crate::options::RecoverOptions;
use crate::pipeline::{parse_candidate, PipelineMode};
use crate::repair::RepairCache;

/// Conventional envelope field name.
const ENVELOPE_FIELD: &str = "response";

/// Hard bound on descents; keeps adversarial or self-referential envelopes
/// from looping.
const MAX_UNWRAP_ATTEMPTS: usize = 2;

/// Descend through `response` envelopes, at most [`MAX_UNWRAP_ATTEMPTS`]
/// times, and return the innermost value reached.
///
/// A non-empty string field re-enters the parse pipeline (it may itself be
/// dirty); a map field replaces the current value directly. Anything else
/// — absent field, empty string, scalar, array — stops the loop and the
/// current value is returned unchanged.
pub(crate) fn unwrap_envelope(
    mut value: Value,
    options: &RecoverOptions,
    cache: &mut RepairCache,
) -> Value {
    for depth in 0..MAX_UNWRAP_ATTEMPTS {
        let Some(inner) = value.as_object().and_then(|map| map.get(ENVELOPE_FIELD)) else {
            break;
        };
        match inner {
            Value::String(raw) if !raw.is_empty() => {
                match parse_candidate(raw, options, cache, PipelineMode::Full) {
                    Ok(parsed) => {
                        tracing::debug!(depth, "unwrapped serialized envelope");
                        value = parsed;
                    }
                    Err(_) => break,
                }
            }
            Value::Object(_) => {
                tracing::debug!(depth, "unwrapped nested envelope");
                let inner = inner.clone();
                value = inner;
            }
            _ => break,
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unwrap(value: Value) -> Value {
        let options = RecoverOptions::default();
        let mut cache = RepairCache::new(false);
        unwrap_envelope(value, &options, &mut cache)
    }

    #[test]
    fn plain_values_pass_through() {
        assert_eq!(unwrap(json!({"a": 1})), json!({"a": 1}));
        assert_eq!(unwrap(json!([1, 2])), json!([1, 2]));
        assert_eq!(unwrap(json!("text")), json!("text"));
    }

    #[test]
    fn serialized_envelope_is_reparsed() {
        let value = json!({"response": "{\"result\": \"ok\"}"});
        assert_eq!(unwrap(value), json!({"result": "ok"}));
    }

    #[test]
    fn nested_object_envelope_is_taken_directly() {
        let value = json!({"response": {"result": "ok"}});
        assert_eq!(unwrap(value), json!({"result": "ok"}));
    }

    #[test]
    fn two_levels_unwrap_within_the_bound() {
        let value = json!({"response": {"response": {"done": true}}});
        assert_eq!(unwrap(value), json!({"done": true}));
    }

    #[test]
    fn descent_stops_at_the_attempt_bound() {
        let value = json!({
            "response": {"response": {"response": {"deep": 1}}}
        });
        // Two descents, then the bound stops the loop with one envelope left.
        assert_eq!(unwrap(value), json!({"response": {"deep": 1}}));
    }

    #[test]
    fn empty_or_unparseable_field_stops_the_loop() {
        let kept = json!({"response": ""});
        assert_eq!(unwrap(kept.clone()), kept);

        let unparseable = json!({"response": "definitely not json"});
        assert_eq!(unwrap(unparseable.clone()), unparseable);
    }

    #[test]
    fn scalar_and_array_fields_stop_the_loop() {
        let number = json!({"response": 7});
        assert_eq!(unwrap(number.clone()), number);
        let list = json!({"response": [1, 2]});
        assert_eq!(unwrap(list.clone()), list);
    }

    #[test]
    fn dirty_serialized_envelope_still_unwraps() {
        let value = json!({"response": "{'ok': True}"});
        assert_eq!(unwrap(value), json!({"ok": true}));
    }
}
