//! Upstream response validation and text composition.

use crate::PayloadError;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Image {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

/// The parts of a chat-completions response we render.
///
/// Only `content` is mandatory. The enrichment lists are empty when upstream
/// omitted them or sent something that is not an array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpstreamResponse {
    pub content: String,
    pub citations: Vec<String>,
    pub related_questions: Vec<String>,
    pub images: Vec<Image>,
}

impl UpstreamResponse {
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn from_slice(body: &[u8]) -> Result<Self, PayloadError> {
        let v: Value =
            serde_json::from_slice(body).map_err(|e| PayloadError::InvalidJson(e.to_string()))?;
        Self::from_value(&v)
    }

    /// Validate the mandatory shape, then pick up optional fields leniently.
    pub fn from_value(v: &Value) -> Result<Self, PayloadError> {
        let first = v
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|c| c.first())
            .ok_or(PayloadError::MissingChoices)?;
        let content = first
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .ok_or(PayloadError::InvalidContent)?;

        Ok(Self {
            content: content.to_string(),
            citations: text_list(v.get("citations")),
            related_questions: text_list(v.get("related_questions")),
            images: v
                .get("images")
                .and_then(Value::as_array)
                .map(|xs| xs.iter().map(image).collect())
                .unwrap_or_default(),
        })
    }
}

fn text_list(v: Option<&Value>) -> Vec<String> {
    let Some(xs) = v.and_then(Value::as_array) else {
        return Vec::new();
    };
    xs.iter()
        .map(|x| match x {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

fn image(v: &Value) -> Image {
    // Empty strings count as missing, like an unset field.
    let field = |k: &str| {
        v.get(k)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    Image {
        title: field("title"),
        url: field("url"),
        description: field("description"),
    }
}

/// Render the answer followed by citations, related questions and images,
/// in that order. Empty lists produce no section at all.
pub fn compose(resp: &UpstreamResponse) -> String {
    let mut out = resp.content.clone();

    if !resp.citations.is_empty() {
        out.push_str("\n\nCitations:\n");
        for (i, c) in resp.citations.iter().enumerate() {
            out.push_str(&format!("[{}] {}\n", i + 1, c));
        }
    }

    if !resp.related_questions.is_empty() {
        out.push_str("\n\nRelated Questions:\n");
        for (i, q) in resp.related_questions.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, q));
        }
    }

    if !resp.images.is_empty() {
        out.push_str("\n\nRelevant Images:\n");
        for (i, img) in resp.images.iter().enumerate() {
            let title = img.title.as_deref().unwrap_or("Image");
            let url = img.url.as_deref().unwrap_or("URL not available");
            out.push_str(&format!("[{}] {}: {}\n", i + 1, title, url));
            if let Some(d) = img.description.as_deref() {
                out.push_str(&format!("    Description: {d}\n"));
            }
        }
    }

    out
}
