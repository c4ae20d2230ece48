use crate::record::{FieldValue, Fields};
use std::collections::BTreeMap;

/// Request-scoped data surrounding an event.
///
/// In a `tracing` subscriber this is the event's span scope (see
/// [`SpanScope`](crate::layer::SpanScope)); anything else that can answer
/// key lookups and knows the active trace works too.
pub trait RequestContext {
    /// Value stored under `key`, if any.
    fn value(&self, key: &str) -> Option<serde_json::Value>;

    /// Identifier of the active trace, if a span is active.
    fn trace_id(&self) -> Option<String>;
}

/// Copy the configured context values into `fields`.
///
/// `keys` maps the label to use in the output to the context key to look
/// up. Injected values replace existing fields with the same label.
pub(crate) fn inject(context: &dyn RequestContext, keys: &BTreeMap<String, String>, fields: &mut Fields) {
    for (label, key) in keys {
        if let Some(value) = context.value(key) {
            fields.insert(label.clone(), FieldValue::Json(value));
        }
    }
}

impl RequestContext for BTreeMap<String, serde_json::Value> {
    fn value(&self, key: &str) -> Option<serde_json::Value> {
        self.get(key).cloned()
    }

    fn trace_id(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn injects_configured_keys_only() {
        let mut ctx = BTreeMap::new();
        ctx.insert("session".to_string(), json!("1239828228"));
        ctx.insert("ignored".to_string(), json!(true));

        let mut keys = BTreeMap::new();
        keys.insert("session_id".to_string(), "session".to_string());
        keys.insert("tenant".to_string(), "tenant".to_string());

        let mut fields = Fields::new();
        inject(&ctx, &keys, &mut fields);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields.get("session_id"), Some(&FieldValue::from("1239828228")));
    }

    #[test]
    fn injected_value_overwrites_field() {
        let mut ctx = BTreeMap::new();
        ctx.insert("user".to_string(), json!("from-context"));
        let mut keys = BTreeMap::new();
        keys.insert("user".to_string(), "user".to_string());

        let mut fields = Fields::new();
        fields.insert("user".to_string(), "from-event".into());
        inject(&ctx, &keys, &mut fields);

        assert_eq!(fields.get("user"), Some(&FieldValue::from("from-context")));
    }
}
