//! Parameter resolution: raw tool-call arguments -> typed, defaulted options.

use crate::tool::{Message, ToolKind, ToolProfile};
use crate::{Error, Result};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// A value that is either explicitly present or absent.
///
/// Upstream treats "unset" differently from an explicit `false`/`0`, so an
/// absent field is omitted from the request body entirely (never `null`).
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Absent,
    Present(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> Field<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Absent => None,
            Self::Present(v) => Some(v),
        }
    }

    /// Keep `self` if present, else fall back to `other`.
    pub fn or(self, other: Field<T>) -> Field<T> {
        match self {
            Self::Present(_) => self,
            Self::Absent => other,
        }
    }

    /// Drop the value when `pred` says it should not be sent.
    pub fn filter(self, pred: impl FnOnce(&T) -> bool) -> Field<T> {
        match self {
            Self::Present(v) if pred(&v) => Self::Present(v),
            _ => Self::Absent,
        }
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Self::Present(v),
            None => Self::Absent,
        }
    }
}

impl From<&str> for Field<String> {
    fn from(v: &str) -> Self {
        Self::Present(v.to_string())
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Present(v) => v.serialize(s),
            // Only reached if a container forgets `skip_serializing_if`.
            Self::Absent => s.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionKey {
    SearchContextSize,
    ReasoningEffort,
    SearchMode,
    MaxTokens,
    Temperature,
    SearchDomainFilter,
    ReturnRelatedQuestions,
    ReturnImages,
}

impl OptionKey {
    pub const ALL: [OptionKey; 8] = [
        OptionKey::SearchContextSize,
        OptionKey::ReasoningEffort,
        OptionKey::SearchMode,
        OptionKey::MaxTokens,
        OptionKey::Temperature,
        OptionKey::SearchDomainFilter,
        OptionKey::ReturnRelatedQuestions,
        OptionKey::ReturnImages,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SearchContextSize => "search_context_size",
            Self::ReasoningEffort => "reasoning_effort",
            Self::SearchMode => "search_mode",
            Self::MaxTokens => "max_tokens",
            Self::Temperature => "temperature",
            Self::SearchDomainFilter => "search_domain_filter",
            Self::ReturnRelatedQuestions => "return_related_questions",
            Self::ReturnImages => "return_images",
        }
    }
}

impl std::fmt::Display for OptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream options for one call. Field names match the upstream JSON keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToolOptions {
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub search_context_size: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub reasoning_effort: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub search_mode: Field<String>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub max_tokens: Field<u64>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub temperature: Field<f64>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub search_domain_filter: Field<Vec<String>>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub return_related_questions: Field<bool>,
    #[serde(skip_serializing_if = "Field::is_absent")]
    pub return_images: Field<bool>,
}

impl ToolOptions {
    pub fn is_present(&self, key: OptionKey) -> bool {
        match key {
            OptionKey::SearchContextSize => self.search_context_size.is_present(),
            OptionKey::ReasoningEffort => self.reasoning_effort.is_present(),
            OptionKey::SearchMode => self.search_mode.is_present(),
            OptionKey::MaxTokens => self.max_tokens.is_present(),
            OptionKey::Temperature => self.temperature.is_present(),
            OptionKey::SearchDomainFilter => self.search_domain_filter.is_present(),
            OptionKey::ReturnRelatedQuestions => self.return_related_questions.is_present(),
            OptionKey::ReturnImages => self.return_images.is_present(),
        }
    }
}

/// Output of [`resolve`]: everything the request builder needs.
#[derive(Debug, Clone)]
pub struct ResolvedCall {
    pub profile: ToolProfile,
    pub messages: Vec<Message>,
    pub options: ToolOptions,
}

/// Validate `messages`, then fill every accepted option from `args` or the
/// tool's default.
///
/// Present values are taken as given: no clamping against the advertised
/// bounds and no string/number coercion. `null` counts as absent. Keys the
/// tool does not accept are ignored.
pub fn resolve(kind: ToolKind, args: &Map<String, Value>) -> Result<ResolvedCall> {
    let profile = kind.profile();
    let messages = resolve_messages(kind, args)?;

    let d = profile.defaults.clone();
    let mut opts = ToolOptions::default();
    for &key in profile.options {
        match key {
            OptionKey::SearchContextSize => {
                opts.search_context_size =
                    string_arg(kind, args, key)?.or(d.search_context_size.clone());
            }
            OptionKey::ReasoningEffort => {
                opts.reasoning_effort = string_arg(kind, args, key)?.or(d.reasoning_effort.clone());
            }
            OptionKey::SearchMode => {
                opts.search_mode = string_arg(kind, args, key)?.or(d.search_mode.clone());
            }
            OptionKey::MaxTokens => {
                opts.max_tokens = u64_arg(kind, args, key)?.or(d.max_tokens.clone());
            }
            OptionKey::Temperature => {
                opts.temperature = f64_arg(kind, args, key)?.or(d.temperature.clone());
            }
            OptionKey::SearchDomainFilter => {
                opts.search_domain_filter =
                    strings_arg(kind, args, key)?.or(d.search_domain_filter.clone());
            }
            OptionKey::ReturnRelatedQuestions => {
                opts.return_related_questions =
                    bool_arg(kind, args, key)?.or(d.return_related_questions.clone());
            }
            OptionKey::ReturnImages => {
                opts.return_images = bool_arg(kind, args, key)?.or(d.return_images.clone());
            }
        }
    }

    Ok(ResolvedCall {
        profile,
        messages,
        options: opts,
    })
}

fn invalid(kind: ToolKind, msg: impl std::fmt::Display) -> Error {
    Error::InvalidArguments(format!("Invalid arguments for {kind}: {msg}"))
}

fn resolve_messages(kind: ToolKind, args: &Map<String, Value>) -> Result<Vec<Message>> {
    let Some(items) = args.get("messages").and_then(|v| v.as_array()) else {
        return Err(invalid(kind, "'messages' must be an array"));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            serde_json::from_value::<Message>(v.clone()).map_err(|_| {
                invalid(
                    kind,
                    format!("'messages[{i}]' must be an object with string 'role' and 'content'"),
                )
            })
        })
        .collect()
}

fn raw<'a>(args: &'a Map<String, Value>, key: OptionKey) -> Option<&'a Value> {
    args.get(key.as_str()).filter(|v| !v.is_null())
}

fn string_arg(kind: ToolKind, args: &Map<String, Value>, key: OptionKey) -> Result<Field<String>> {
    match raw(args, key) {
        None => Ok(Field::Absent),
        Some(Value::String(s)) => Ok(Field::Present(s.clone())),
        Some(_) => Err(invalid(kind, format!("'{key}' must be a string"))),
    }
}

fn u64_arg(kind: ToolKind, args: &Map<String, Value>, key: OptionKey) -> Result<Field<u64>> {
    let Some(v) = raw(args, key) else {
        return Ok(Field::Absent);
    };
    if let Some(n) = v.as_u64() {
        return Ok(Field::Present(n));
    }
    // `2000.0` is the same number as `2000`; anything fractional or negative is not.
    match v.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            Ok(Field::Present(f as u64))
        }
        _ => Err(invalid(kind, format!("'{key}' must be a non-negative integer"))),
    }
}

fn f64_arg(kind: ToolKind, args: &Map<String, Value>, key: OptionKey) -> Result<Field<f64>> {
    match raw(args, key) {
        None => Ok(Field::Absent),
        Some(v) => v
            .as_f64()
            .map(Field::Present)
            .ok_or_else(|| invalid(kind, format!("'{key}' must be a number"))),
    }
}

fn bool_arg(kind: ToolKind, args: &Map<String, Value>, key: OptionKey) -> Result<Field<bool>> {
    match raw(args, key) {
        None => Ok(Field::Absent),
        Some(Value::Bool(b)) => Ok(Field::Present(*b)),
        Some(_) => Err(invalid(kind, format!("'{key}' must be a boolean"))),
    }
}

fn strings_arg(
    kind: ToolKind,
    args: &Map<String, Value>,
    key: OptionKey,
) -> Result<Field<Vec<String>>> {
    let Some(v) = raw(args, key) else {
        return Ok(Field::Absent);
    };
    let err = || invalid(kind, format!("'{key}' must be an array of strings"));
    let items = v.as_array().ok_or_else(err)?;
    items
        .iter()
        .map(|x| x.as_str().map(str::to_string).ok_or_else(err))
        .collect::<Result<Vec<_>>>()
        .map(Field::Present)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().expect("object")
    }

    fn hi() -> Value {
        json!([{ "role": "user", "content": "hi" }])
    }

    #[test]
    fn omitted_options_take_each_tools_defaults() {
        for kind in ToolKind::ALL {
            let r = resolve(kind, &obj(json!({ "messages": hi() }))).expect("resolve");
            assert_eq!(r.options, kind.defaults(), "{kind}");
            assert_eq!(r.messages, vec![Message::user("hi")]);
            assert_eq!(r.profile.model, kind.model());
        }
    }

    #[test]
    fn research_defaults_match_table() {
        let r = resolve(ToolKind::Research, &obj(json!({ "messages": [] }))).unwrap();
        let o = r.options;
        assert_eq!(o.reasoning_effort.get().map(String::as_str), Some("high"));
        assert_eq!(o.search_context_size.get().map(String::as_str), Some("high"));
        assert_eq!(o.search_mode.get().map(String::as_str), Some("web"));
        assert_eq!(o.max_tokens, Field::Present(3000));
        assert_eq!(o.return_related_questions, Field::Present(true));
        assert_eq!(o.return_images, Field::Present(false));
        assert!(o.temperature.is_absent());
        assert!(o.search_domain_filter.is_absent());
    }

    #[test]
    fn present_values_are_used_verbatim_without_clamping() {
        let r = resolve(
            ToolKind::Reason,
            &obj(json!({
                "messages": hi(),
                "temperature": 9.5,
                "max_tokens": 1,
                "reasoning_effort": "extreme"
            })),
        )
        .unwrap();
        assert_eq!(r.options.temperature, Field::Present(9.5));
        assert_eq!(r.options.max_tokens, Field::Present(1));
        assert_eq!(r.options.reasoning_effort, Field::from("extreme"));
    }

    #[test]
    fn explicit_false_overrides_a_true_default() {
        let r = resolve(
            ToolKind::Research,
            &obj(json!({ "messages": hi(), "return_related_questions": false })),
        )
        .unwrap();
        assert_eq!(r.options.return_related_questions, Field::Present(false));
    }

    #[test]
    fn null_counts_as_absent() {
        let r = resolve(
            ToolKind::Ask,
            &obj(json!({ "messages": hi(), "temperature": null, "max_tokens": null })),
        )
        .unwrap();
        assert_eq!(r.options.temperature, Field::Present(0.2));
        assert!(r.options.max_tokens.is_absent());
    }

    #[test]
    fn unaccepted_options_are_ignored() {
        let r = resolve(
            ToolKind::Reason,
            &obj(json!({ "messages": hi(), "return_images": true, "search_mode": "academic" })),
        )
        .unwrap();
        assert!(r.options.return_images.is_absent());
        assert!(r.options.search_mode.is_absent());
    }

    #[test]
    fn messages_must_be_an_array() {
        for args in [json!({}), json!({ "messages": "hi" }), json!({ "messages": null })] {
            let e = resolve(ToolKind::Ask, &obj(args)).unwrap_err();
            assert_eq!(
                e.to_string(),
                "Invalid arguments for perplexity_ask: 'messages' must be an array"
            );
        }
    }

    #[test]
    fn malformed_message_names_its_index() {
        let e = resolve(
            ToolKind::Research,
            &obj(json!({ "messages": [{ "role": "user", "content": "a" }, { "role": "user" }] })),
        )
        .unwrap_err();
        assert!(e.to_string().contains("'messages[1]'"), "{e}");
        assert!(matches!(e, Error::InvalidArguments(_)));
    }

    #[test]
    fn wrong_option_types_are_rejected_not_coerced() {
        let cases = [
            json!({ "temperature": "0.5" }),
            json!({ "max_tokens": -3 }),
            json!({ "max_tokens": 10.5 }),
            json!({ "search_domain_filter": "github.com" }),
            json!({ "search_domain_filter": [1, 2] }),
            json!({ "return_related_questions": "false" }),
            json!({ "search_context_size": 3 }),
        ];
        for mut c in cases {
            c["messages"] = hi();
            let e = resolve(ToolKind::Ask, &obj(c.clone())).unwrap_err();
            assert!(matches!(e, Error::InvalidArguments(_)), "{c}: {e}");
        }
    }

    #[test]
    fn integral_float_max_tokens_is_accepted() {
        let r = resolve(
            ToolKind::Ask,
            &obj(json!({ "messages": hi(), "max_tokens": 1500.0 })),
        )
        .unwrap();
        assert_eq!(r.options.max_tokens, Field::Present(1500));
    }

    #[test]
    fn absent_fields_do_not_serialize() {
        let v = serde_json::to_value(ToolOptions {
            return_images: Field::Present(false),
            ..ToolOptions::default()
        })
        .unwrap();
        assert_eq!(v, json!({ "return_images": false }));
    }
}
