use crate::options::ToolOptions;
use crate::tool::Message;
use serde::Serialize;

/// JSON body for the upstream chat-completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(flatten)]
    pub options: ToolOptions,
}

/// Pass-through serialization of a resolved call.
///
/// `model` and `messages` are always sent (an empty `messages` list is left
/// for upstream to reject). Absent options are omitted; explicit `false` is
/// kept. An empty `search_domain_filter` is dropped.
pub fn build(model: &str, messages: Vec<Message>, mut options: ToolOptions) -> UpstreamRequest {
    options.search_domain_filter = options.search_domain_filter.filter(|v| !v.is_empty());
    UpstreamRequest {
        model: model.to_string(),
        messages,
        options,
    }
}

impl UpstreamRequest {
    pub fn has_domain_filter(&self) -> bool {
        self.options.search_domain_filter.is_present()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::resolve;
    use crate::tool::ToolKind;
    use proptest::prelude::*;
    use serde_json::json;

    fn body(kind: ToolKind, args: serde_json::Value) -> serde_json::Value {
        let r = resolve(kind, args.as_object().unwrap()).unwrap();
        let req = build(r.profile.model, r.messages, r.options);
        serde_json::to_value(req).unwrap()
    }

    #[test]
    fn ask_with_only_messages_matches_default_body() {
        let v = body(
            ToolKind::Ask,
            json!({ "messages": [{ "role": "user", "content": "hi" }] }),
        );
        assert_eq!(
            v,
            json!({
                "model": "sonar-pro",
                "messages": [{ "role": "user", "content": "hi" }],
                "search_context_size": "medium",
                "temperature": 0.2,
                "return_related_questions": false
            })
        );
    }

    #[test]
    fn research_and_reason_default_bodies() {
        let msgs = json!([{ "role": "user", "content": "q" }]);
        assert_eq!(
            body(ToolKind::Research, json!({ "messages": msgs.clone() })),
            json!({
                "model": "sonar-deep-research",
                "messages": msgs.clone(),
                "reasoning_effort": "high",
                "search_context_size": "high",
                "search_mode": "web",
                "max_tokens": 3000,
                "return_related_questions": true,
                "return_images": false
            })
        );
        assert_eq!(
            body(ToolKind::Reason, json!({ "messages": msgs.clone() })),
            json!({
                "model": "sonar-reasoning-pro",
                "messages": msgs.clone(),
                "reasoning_effort": "high",
                "max_tokens": 2000,
                "temperature": 0.2,
                "search_context_size": "medium"
            })
        );
    }

    #[test]
    fn empty_messages_still_flow_through() {
        let v = body(ToolKind::Ask, json!({ "messages": [] }));
        assert_eq!(v["messages"], json!([]));
    }

    #[test]
    fn message_order_is_preserved() {
        let msgs = json!([
            { "role": "system", "content": "s" },
            { "role": "user", "content": "u1" },
            { "role": "assistant", "content": "a1" },
            { "role": "user", "content": "u2" }
        ]);
        let v = body(ToolKind::Reason, json!({ "messages": msgs.clone() }));
        assert_eq!(v["messages"], msgs);
    }

    #[test]
    fn non_empty_domain_filter_is_sent_verbatim() {
        let v = body(
            ToolKind::Ask,
            json!({
                "messages": [],
                "search_domain_filter": ["github.com", "docs.rs"]
            }),
        );
        assert_eq!(v["search_domain_filter"], json!(["github.com", "docs.rs"]));
    }

    proptest! {
        #[test]
        fn empty_domain_filter_is_never_serialized(
            kind in prop::sample::select(ToolKind::ALL.to_vec()),
        ) {
            let v = body(kind, json!({ "messages": [], "search_domain_filter": [] }));
            prop_assert!(v.get("search_domain_filter").is_none());
        }

        #[test]
        fn explicit_booleans_survive_building(rrq in any::<bool>(), imgs in any::<bool>()) {
            let v = body(
                ToolKind::Research,
                json!({
                    "messages": [],
                    "return_related_questions": rrq,
                    "return_images": imgs
                }),
            );
            prop_assert_eq!(v["return_related_questions"].as_bool(), Some(rrq));
            prop_assert_eq!(v["return_images"].as_bool(), Some(imgs));
        }

        #[test]
        fn explicit_false_is_sent_for_ask(rrq in any::<bool>()) {
            let v = body(
                ToolKind::Ask,
                json!({ "messages": [], "return_related_questions": rrq }),
            );
            prop_assert_eq!(v["return_related_questions"].as_bool(), Some(rrq));
        }
    }
}
