//! Tool descriptors served on `tools/list`.
//!
//! Bounds and enums here are advertised to clients only; the resolver
//! forwards whatever the caller sends.

use serde::Serialize;
use serde_json::{json, Map, Value};
use sonarpipe_core::{Message, OptionKey, ToolKind};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Map<String, Value>,
}

pub fn catalog() -> Vec<ToolDescriptor> {
    ToolKind::ALL.into_iter().map(descriptor).collect()
}

pub fn descriptor(kind: ToolKind) -> ToolDescriptor {
    let mut props = Map::new();
    props.insert("messages".to_string(), messages_schema());
    for &key in kind.options() {
        props.insert(key.as_str().to_string(), option_schema(kind, key));
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(props));
    schema.insert("required".to_string(), json!(["messages"]));

    ToolDescriptor {
        name: kind.name(),
        description: description(kind),
        input_schema: schema,
    }
}

fn description(kind: ToolKind) -> &'static str {
    match kind {
        ToolKind::Ask => concat!(
            "Engages in a conversation using the Sonar API with control over search and reasoning. ",
            "Accepts messages plus optional parameters for response quality, search depth and output format. ",
            "Good for quick development questions and general coding help."
        ),
        ToolKind::Research => concat!(
            "Performs deep research with the sonar-deep-research model. ",
            "Runs iterative searches, reads multiple sources and returns a detailed, cited analysis. ",
            "Suited to architectural decisions, technology comparisons and thorough investigation."
        ),
        ToolKind::Reason => concat!(
            "Performs advanced reasoning with the sonar-reasoning-pro model. ",
            "Strong at logical analysis, step-by-step decomposition and technical decision-making. ",
            "Suited to debugging complex issues, algorithm design and architectural reasoning."
        ),
    }
}

/// `messages` array; the item schema is derived from [`Message`].
fn messages_schema() -> Value {
    let mut item = serde_json::to_value(schemars::schema_for!(Message)).unwrap_or_else(|_| {
        json!({
            "type": "object",
            "properties": {
                "role": { "type": "string" },
                "content": { "type": "string" }
            },
            "required": ["role", "content"]
        })
    });
    if let Some(o) = item.as_object_mut() {
        o.remove("$schema");
        o.remove("title");
    }
    json!({
        "type": "array",
        "items": item,
        "description": "Array of conversation messages"
    })
}

const LEVELS: [&str; 3] = ["low", "medium", "high"];

fn option_schema(kind: ToolKind, key: OptionKey) -> Value {
    use OptionKey::*;
    use ToolKind::*;
    match (kind, key) {
        (Ask, SearchContextSize) => json!({
            "type": "string",
            "enum": LEVELS,
            "description": "Search comprehensiveness. 'low' for basic queries (cheapest), 'medium' for balanced results, 'high' for deep coverage. Default: 'medium'"
        }),
        (Research, SearchContextSize) => json!({
            "type": "string",
            "enum": LEVELS,
            "description": "Search comprehensiveness. 'high' is recommended for deep research. Default: 'high'"
        }),
        (Reason, SearchContextSize) => json!({
            "type": "string",
            "enum": LEVELS,
            "description": "Search context backing the reasoning. 'medium' for standard reasoning, 'high' when outside context is crucial. Default: 'medium'"
        }),
        (Research, ReasoningEffort) => json!({
            "type": "string",
            "enum": LEVELS,
            "description": "Research depth and reasoning complexity. 'low' for basic research, 'high' for complex decisions and comprehensive analysis. Default: 'high'"
        }),
        (_, ReasoningEffort) => json!({
            "type": "string",
            "enum": LEVELS,
            "description": "Reasoning complexity. 'high' for complex debugging and architecture, 'medium' for standard problem-solving. Default: 'high'"
        }),
        (_, SearchMode) => json!({
            "type": "string",
            "enum": ["web", "academic"],
            "description": "'web' for general sources, 'academic' for peer-reviewed papers and authoritative documentation. Default: 'web'"
        }),
        (Ask, MaxTokens) => json!({
            "type": "number",
            "minimum": 1,
            "maximum": 4000,
            "description": "Maximum tokens in the response. Typical values: 500-1500 for development questions."
        }),
        (Research, MaxTokens) => json!({
            "type": "number",
            "minimum": 1000,
            "maximum": 8000,
            "description": "Maximum response length. Research reports usually need 2000-4000 tokens. Default: 3000"
        }),
        (Reason, MaxTokens) => json!({
            "type": "number",
            "minimum": 500,
            "maximum": 4000,
            "description": "Maximum response length. Step-by-step analysis usually needs 1000-2500 tokens. Default: 2000"
        }),
        (Reason, Temperature) => json!({
            "type": "number",
            "minimum": 0.0,
            "maximum": 1.0,
            "description": "Reasoning creativity. 0.1-0.3 for systematic reasoning, 0.5-0.7 for creative approaches. Default: 0.2"
        }),
        (_, Temperature) => json!({
            "type": "number",
            "minimum": 0.0,
            "maximum": 2.0,
            "description": "Response creativity. 0.1-0.3 for precise technical answers, 0.7-1.0 for creative solutions. Default: 0.2"
        }),
        (Research, SearchDomainFilter) => json!({
            "type": "array",
            "items": { "type": "string" },
            "description": "Focus research on specific domains, e.g. ['github.com', 'docs.python.org', 'developer.mozilla.org']."
        }),
        (_, SearchDomainFilter) => json!({
            "type": "array",
            "items": { "type": "string" },
            "description": "Limit search to specific domains, e.g. ['github.com', 'stackoverflow.com']. Leave empty for all domains."
        }),
        (Research, ReturnRelatedQuestions) => json!({
            "type": "boolean",
            "description": "Include suggested follow-up research topics. Default: true"
        }),
        (_, ReturnRelatedQuestions) => json!({
            "type": "boolean",
            "description": "Include follow-up question suggestions. Default: false"
        }),
        (_, ReturnImages) => json!({
            "type": "boolean",
            "description": "Include relevant diagrams and images in the results. Default: false"
        }),
    }
}
