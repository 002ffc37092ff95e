//! Record-call normalization.
//!
//! Generators emit `z.record(Value)`; current zod expects
//! `z.record(Key, Value)`. This rule inserts the key type as the first
//! argument of every `.record(` call that does not already carry it.

use crate::edit::Edit;
use regex::Regex;
use std::sync::OnceLock;

/// Key type inserted into single-argument record calls.
pub const DEFAULT_KEY_TYPE: &str = "z.string()";

const RECORD_CALL_PATTERN: &str = r"(?P<ns>[A-Za-z_$][A-Za-z0-9_$]*)?\.record\(";

fn record_call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RECORD_CALL_PATTERN).expect("record call pattern is valid"))
}

/// How the call site spells its receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallForm {
    /// `ns.record(` with an identifier receiver, e.g. `z.record(`
    Qualified { namespace: String },
    /// `.record(` after any other receiver, e.g. `z.object({}).record(`
    Method,
}

/// A `.record(` call site found in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordCall {
    /// Byte offset of the `.record(` token
    pub offset: usize,
    /// Byte offset just after the opening parenthesis
    pub args_start: usize,
    /// 1-based line of the call
    pub line: usize,
    pub form: CallForm,
}

/// True when the text following a record call's `(` already starts with
/// `key_type` and a comma, i.e. the call is in two-argument form.
///
/// Whitespace is allowed before the key type and before the comma.
pub fn call_site_already_has_string_key(after_paren: &str, key_type: &str) -> bool {
    after_paren
        .trim_start()
        .strip_prefix(key_type)
        .is_some_and(|tail| tail.trim_start().starts_with(','))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKeyRule {
    key_type: String,
}

impl Default for RecordKeyRule {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_TYPE)
    }
}

impl RecordKeyRule {
    /// The key type is stored trimmed: the already-keyed check skips
    /// leading whitespace, so an untrimmed key would never be recognized.
    pub fn new(key_type: impl Into<String>) -> Self {
        let key_type: String = key_type.into();
        Self {
            key_type: key_type.trim().to_string(),
        }
    }

    pub fn key_type(&self) -> &str {
        &self.key_type
    }

    /// Every `.record(` call site in `source`, in source order.
    pub fn find_calls(&self, source: &str) -> Vec<RecordCall> {
        let mut calls = Vec::new();
        let mut line = 1;
        let mut scanned = 0;

        for caps in record_call_regex().captures_iter(source) {
            let whole = caps.get(0).expect("group 0 always participates");
            let (offset, form) = match caps.name("ns") {
                Some(ns) => (
                    ns.end(),
                    CallForm::Qualified {
                        namespace: ns.as_str().to_string(),
                    },
                ),
                None => (whole.start(), CallForm::Method),
            };

            line += source[scanned..offset].matches('\n').count();
            scanned = offset;

            calls.push(RecordCall {
                offset,
                args_start: whole.end(),
                line,
                form,
            });
        }

        calls
    }

    /// Call sites missing the key argument, each paired with its insertion.
    pub fn plan(&self, source: &str) -> Vec<(RecordCall, Edit)> {
        self.find_calls(source)
            .into_iter()
            .filter(|call| {
                !call_site_already_has_string_key(&source[call.args_start..], &self.key_type)
            })
            .map(|call| {
                let edit = Edit::insert(call.args_start, format!("{}, ", self.key_type));
                (call, edit)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply_edits;

    fn normalize(source: &str) -> String {
        let rule = RecordKeyRule::default();
        let edits = rule.plan(source).into_iter().map(|(_, e)| e).collect();
        apply_edits(source, edits).unwrap()
    }

    #[test]
    fn test_predicate_plain() {
        assert!(call_site_already_has_string_key("z.string(), T)", "z.string()"));
        assert!(!call_site_already_has_string_key("T)", "z.string()"));
    }

    #[test]
    fn test_predicate_whitespace() {
        assert!(call_site_already_has_string_key(
            "\n    z.string() ,\n    T)",
            "z.string()"
        ));
    }

    #[test]
    fn test_predicate_key_type_alone_is_single_argument() {
        // z.record(z.string()) is a record of strings, not a key declaration
        assert!(!call_site_already_has_string_key("z.string())", "z.string()"));
        assert!(!call_site_already_has_string_key(
            "z.string().min(1))",
            "z.string()"
        ));
    }

    #[test]
    fn test_qualified_call() {
        assert_eq!(
            normalize("const A = z.record(someType);"),
            "const A = z.record(z.string(), someType);"
        );
    }

    #[test]
    fn test_method_call() {
        assert_eq!(
            normalize("x.partial().record(someType)"),
            "x.partial().record(z.string(), someType)"
        );
        assert_eq!(normalize(".record(someType)"), ".record(z.string(), someType)");
    }

    #[test]
    fn test_already_patched_untouched() {
        let src = "z.record(z.string(), someType)";
        assert_eq!(normalize(src), src);
    }

    #[test]
    fn test_value_of_string_gets_key() {
        assert_eq!(
            normalize("z.record(z.string())"),
            "z.record(z.string(), z.string())"
        );
    }

    #[test]
    fn test_nested_calls() {
        assert_eq!(
            normalize("z.record(z.record(z.number()))"),
            "z.record(z.string(), z.record(z.string(), z.number()))"
        );
    }

    #[test]
    fn test_similar_names_ignored() {
        let src = "z.records(a); z.recordOf(b); record(c); z.record (d)";
        assert_eq!(normalize(src), src);
    }

    #[test]
    fn test_find_calls_forms_and_lines() {
        let src = "a\nz.record(x)\n\n  .record(y)\nfoo.bar.record(z)";
        let calls = RecordKeyRule::default().find_calls(src);
        assert_eq!(calls.len(), 3);

        assert_eq!(
            calls[0].form,
            CallForm::Qualified {
                namespace: "z".to_string()
            }
        );
        assert_eq!(calls[0].line, 2);
        assert_eq!(&src[calls[0].offset..calls[0].args_start], ".record(");

        assert_eq!(calls[1].form, CallForm::Method);
        assert_eq!(calls[1].line, 4);

        assert_eq!(
            calls[2].form,
            CallForm::Qualified {
                namespace: "bar".to_string()
            }
        );
        assert_eq!(calls[2].line, 5);
    }

    #[test]
    fn test_custom_key_type() {
        let rule = RecordKeyRule::new("z.string().uuid()");
        let src = "z.record(v)";
        let edits: Vec<_> = rule.plan(src).into_iter().map(|(_, e)| e).collect();
        let out = apply_edits(src, edits).unwrap();
        assert_eq!(out, "z.record(z.string().uuid(), v)");
        assert!(rule.plan(&out).is_empty());
    }

    #[test]
    fn test_key_type_is_trimmed() {
        let rule = RecordKeyRule::new("  z.string()\n");
        assert_eq!(rule.key_type(), "z.string()");

        let src = "z.record(v)";
        let edits: Vec<_> = rule.plan(src).into_iter().map(|(_, e)| e).collect();
        let out = apply_edits(src, edits).unwrap();
        assert_eq!(out, "z.record(z.string(), v)");
        assert!(rule.plan(&out).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let src = "z.record(a)\n.record(b)\nz.record(z.string(), c)";
        let once = normalize(src);
        assert_eq!(normalize(&once), once);
    }
}
