//! Keyword dictionaries for the text signal classifiers
//!
//! Each category owns one explicit, enumerable keyword list. Lists are
//! lower-case and matched by substring containment against case-folded text.

use crate::types::{CognitiveAxis, InteractionType, Theme};

/// Interaction-type keywords
pub struct InteractionKeywords;

impl InteractionKeywords {
    /// Keywords of one interaction type (`General` has none: it is the fallback)
    pub fn for_type(kind: InteractionType) -> &'static [&'static str] {
        match kind {
            InteractionType::Code => &[
                "code",
                "function",
                "debug",
                "compile",
                "script",
                "refactor",
                "algorithm",
                "stack trace",
                "unit test",
                "programming",
                "snippet",
            ],
            InteractionType::StructuredOutput => &[
                "json",
                "csv",
                "yaml",
                "xml",
                "markdown table",
                "spreadsheet",
                "structured output",
                "schema",
            ],
            InteractionType::Translation => &[
                "translate",
                "translation",
                "in french",
                "in english",
                "in spanish",
                "into german",
            ],
            InteractionType::Summarization => &[
                "summarize",
                "summarise",
                "summary",
                "tl;dr",
                "key points",
                "recap",
            ],
            InteractionType::Analysis => &[
                "analyze",
                "analyse",
                "analysis",
                "evaluate",
                "compare",
                "assess",
                "diagnose",
            ],
            InteractionType::Learning => &[
                "explain",
                "teach",
                "learn",
                "tutorial",
                "course",
                "upskill",
                "certification",
                "career",
            ],
            InteractionType::Generation => &[
                "write",
                "generate",
                "create",
                "draft",
                "compose",
                "story",
                "poem",
            ],
            InteractionType::General => &[],
        }
    }
}

/// Cognitive-axis keywords
pub struct AxisKeywords;

impl AxisKeywords {
    pub fn for_axis(axis: CognitiveAxis) -> &'static [&'static str] {
        match axis {
            CognitiveAxis::Analysis => &[
                "analyze",
                "analyse",
                "analysis",
                "compare",
                "evaluate",
                "assess",
                "statistic",
                "metric",
            ],
            CognitiveAxis::Creativity => &[
                "creative",
                "imagine",
                "design",
                "invent",
                "story",
                "poem",
                "brainstorm",
            ],
            CognitiveAxis::Synthesis => &[
                "summarize",
                "summarise",
                "summary",
                "synthesize",
                "synthesis",
                "combine",
                "overview",
            ],
            CognitiveAxis::ProblemSolving => &[
                "solve",
                "solution",
                "fix",
                "debug",
                "troubleshoot",
                "resolve",
                "workaround",
            ],
            CognitiveAxis::Learning => &[
                "learn",
                "explain",
                "understand",
                "teach",
                "tutorial",
                "lesson",
                "study",
            ],
            CognitiveAxis::Communication => &[
                "email",
                "letter",
                "message",
                "reply",
                "presentation",
                "communicate",
                "translate",
            ],
        }
    }
}

/// Theme keywords
pub struct ThemeKeywords;

impl ThemeKeywords {
    pub fn for_theme(theme: Theme) -> &'static [&'static str] {
        match theme {
            Theme::Marketing => &[
                "marketing",
                "brand",
                "campaign",
                "advertis",
                "social media",
                "target audience",
                "newsletter",
            ],
            Theme::Affiliation => &[
                "affiliate",
                "affiliation",
                "referral",
                "commission",
                "partner program",
                "sponsor",
            ],
            Theme::FiscalEconomic => &[
                "taxes",
                "taxation",
                "tax return",
                "tax rate",
                "fiscal",
                "budget",
                "economy",
                "economic",
                "finance",
                "financial",
                "invoice",
                "revenue",
                "accounting",
            ],
            Theme::Occupation => &[
                "job",
                "career",
                "resume",
                "interview",
                "hiring",
                "salary",
                "employment",
                "recruit",
                "freelance",
                "occupation",
            ],
            Theme::Code => &[
                "code",
                "programming",
                "software",
                "function",
                "compile",
                "repository",
                "github",
                "developer",
            ],
            Theme::Media => &[
                "image",
                "video",
                "audio",
                "podcast",
                "photo",
                "illustration",
                "music",
                "youtube",
            ],
        }
    }
}

/// Sentiment keywords
pub struct SentimentKeywords;

impl SentimentKeywords {
    pub fn positive() -> &'static [&'static str] {
        &[
            "good",
            "great",
            "excellent",
            "thanks",
            "thank you",
            "perfect",
            "helpful",
            "love",
            "awesome",
            "useful",
            "happy",
        ]
    }

    pub fn negative() -> &'static [&'static str] {
        &[
            "bad",
            "wrong",
            "error",
            "fail",
            "poor",
            "useless",
            "terrible",
            "hate",
            "confusing",
            "broken",
        ]
    }
}
