use crate::options::{Field, OptionKey, ToolOptions};
use serde::{Deserialize, Serialize};

/// One conversation turn. Order in a `messages` list is conversation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct Message {
    /// Role of the message (e.g., system, user, assistant)
    pub role: String,
    /// The content of the message
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Ask,
    Research,
    Reason,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Ask, ToolKind::Research, ToolKind::Reason];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ask => "perplexity_ask",
            Self::Research => "perplexity_research",
            Self::Reason => "perplexity_reason",
        }
    }

    pub fn model(self) -> &'static str {
        match self {
            Self::Ask => "sonar-pro",
            Self::Research => "sonar-deep-research",
            Self::Reason => "sonar-reasoning-pro",
        }
    }

    /// Options this tool forwards upstream, in catalog order.
    pub fn options(self) -> &'static [OptionKey] {
        use OptionKey::*;
        match self {
            Self::Ask => &[
                SearchContextSize,
                MaxTokens,
                Temperature,
                SearchDomainFilter,
                ReturnRelatedQuestions,
            ],
            Self::Research => &[
                ReasoningEffort,
                SearchContextSize,
                SearchMode,
                MaxTokens,
                SearchDomainFilter,
                ReturnRelatedQuestions,
                ReturnImages,
            ],
            Self::Reason => &[ReasoningEffort, MaxTokens, Temperature, SearchContextSize],
        }
    }

    /// Values substituted when the caller omits an option.
    ///
    /// Options with no default stay absent (`ask.max_tokens`, every
    /// `search_domain_filter`).
    pub fn defaults(self) -> ToolOptions {
        match self {
            Self::Ask => ToolOptions {
                search_context_size: Field::from("medium"),
                temperature: Field::Present(0.2),
                return_related_questions: Field::Present(false),
                ..ToolOptions::default()
            },
            Self::Research => ToolOptions {
                reasoning_effort: Field::from("high"),
                search_context_size: Field::from("high"),
                search_mode: Field::from("web"),
                max_tokens: Field::Present(3000),
                return_related_questions: Field::Present(true),
                return_images: Field::Present(false),
                ..ToolOptions::default()
            },
            Self::Reason => ToolOptions {
                reasoning_effort: Field::from("high"),
                max_tokens: Field::Present(2000),
                temperature: Field::Present(0.2),
                search_context_size: Field::from("medium"),
                ..ToolOptions::default()
            },
        }
    }

    pub fn profile(self) -> ToolProfile {
        ToolProfile {
            kind: self,
            name: self.name(),
            model: self.model(),
            options: self.options(),
            defaults: self.defaults(),
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the shared pipeline needs to know about one tool.
#[derive(Debug, Clone)]
pub struct ToolProfile {
    pub kind: ToolKind,
    pub name: &'static str,
    pub model: &'static str,
    pub options: &'static [OptionKey],
    pub defaults: ToolOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_and_unknown_is_none() {
        for k in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(k.name()), Some(k));
        }
        assert_eq!(ToolKind::from_name("bogus"), None);
        assert_eq!(ToolKind::from_name("ask"), None);
    }

    #[test]
    fn defaults_only_cover_accepted_options() {
        for k in ToolKind::ALL {
            let d = k.defaults();
            for key in OptionKey::ALL {
                if d.is_present(key) {
                    assert!(
                        k.options().contains(&key),
                        "{k} defaults {key} but does not accept it"
                    );
                }
            }
        }
    }

    #[test]
    fn search_domain_filter_never_has_a_default() {
        for k in ToolKind::ALL {
            assert!(k.defaults().search_domain_filter.is_absent());
        }
        assert!(ToolKind::Ask.defaults().max_tokens.is_absent());
    }
}
