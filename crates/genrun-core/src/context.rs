//! Mutable variable environment with dotted-path lookup and interpolation.
//!
//! The context is a flat string-keyed map of JSON values, created once per
//! run and mutated by SET/GLOBAL/LOOP handlers. Lookup accepts dotted paths
//! (`user.profile.age`) that traverse nested objects; any traversal failure
//! resolves to `None` rather than an error. `{name}` placeholders in text
//! are replaced by [`Context::interpolate`]; unresolved placeholders are
//! left verbatim so downstream handlers can detect them.

use std::collections::HashMap;

use serde_json::Value;

/// Renders a value the way interpolation does: strings bare, everything
/// else as canonical JSON text.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    variables: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context pre-populated from a JSON object (e.g. a config
    /// file passed on the command line).
    pub fn with_initial(initial: serde_json::Map<String, Value>) -> Self {
        let mut ctx = Self::new();
        for (key, value) in initial {
            ctx.set(key, value);
        }
        ctx
    }

    /// Unconditional upsert; last write wins.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.variables.insert(key.into(), value);
    }

    /// Dotted-path lookup. Returns `None` on any resolution failure
    /// (missing key, or descending into a non-object).
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut value = self.variables.get(first)?;
        for part in parts {
            value = value.as_object()?.get(part)?;
        }
        Some(value)
    }

    /// Replaces every `{identifier}` placeholder with the string form of
    /// the resolved value. Identifiers are word characters plus dots.
    /// Unresolved placeholders stay verbatim.
    pub fn interpolate(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                // No closing brace anywhere; keep the tail as-is.
                out.push_str(&rest[start..]);
                return out;
            };
            let key = &after[..end];
            let is_ident = !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '.');
            match if is_ident { self.get(key) } else { None } {
                Some(value) => out.push_str(&value_to_string(value)),
                None => {
                    out.push('{');
                    out.push_str(key);
                    out.push('}');
                }
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }

    /// Snapshot of all top-level variables.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.variables.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get() {
        let mut ctx = Context::new();
        ctx.set("name", json!("world"));
        assert_eq!(ctx.get("name"), Some(&json!("world")));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn test_last_write_wins() {
        let mut ctx = Context::new();
        ctx.set("x", json!("a"));
        ctx.set("x", json!("b"));
        assert_eq!(ctx.get("x"), Some(&json!("b")));
    }

    #[test]
    fn test_dotted_path() {
        let mut ctx = Context::new();
        ctx.set("user", json!({"profile": {"age": 30}}));
        assert_eq!(ctx.get("user.profile.age"), Some(&json!(30)));
        assert_eq!(ctx.get("user.missing.x"), None);
        assert_eq!(ctx.get("user.profile.age.deeper"), None);
    }

    #[test]
    fn test_interpolate_basic() {
        let mut ctx = Context::new();
        ctx.set("name", json!("world"));
        assert_eq!(ctx.interpolate("Hello {name}!"), "Hello world!");
    }

    #[test]
    fn test_interpolate_missing_stays_verbatim() {
        let ctx = Context::new();
        assert_eq!(ctx.interpolate("Hello {name}"), "Hello {name}");
    }

    #[test]
    fn test_interpolate_dotted() {
        let mut ctx = Context::new();
        ctx.set("user", json!({"profile": {"age": 30}}));
        assert_eq!(ctx.interpolate("age={user.profile.age}"), "age=30");
    }

    #[test]
    fn test_interpolate_compound_renders_json() {
        let mut ctx = Context::new();
        ctx.set("items", json!(["a", "b"]));
        assert_eq!(ctx.interpolate("{items}"), r#"["a","b"]"#);
    }

    #[test]
    fn test_interpolate_idempotent() {
        let mut ctx = Context::new();
        ctx.set("a", json!("1"));
        let once = ctx.interpolate("{a} and {b}");
        assert_eq!(ctx.interpolate(&once), once);
    }

    #[test]
    fn test_interpolate_unclosed_brace() {
        let ctx = Context::new();
        assert_eq!(ctx.interpolate("open {brace"), "open {brace");
    }

    #[test]
    fn test_interpolate_non_identifier() {
        let ctx = Context::new();
        assert_eq!(ctx.interpolate("{not valid}"), "{not valid}");
        assert_eq!(ctx.interpolate("{}"), "{}");
    }

    #[test]
    fn test_snapshot_copies_top_level() {
        let mut ctx = Context::new();
        ctx.set("a", json!(1));
        ctx.set("b", json!({"c": 2}));
        let snap = ctx.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.get("b"), Some(&json!({"c": 2})));
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("hi")), "hi");
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
