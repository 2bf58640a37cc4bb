//! Core data types for the UTMi valuation engine
//!
//! This module defines the interaction record and the labels the text signal
//! extractor attaches to it. Records are created when an exchange with the
//! assistant completes, gain their signals and [`Valuation`] exactly once via
//! [`crate::valuation::ValuationEngine::process`], and are only changed
//! afterwards through an explicit [`Correction`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Unique identifier for interaction records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractionId(pub Uuid);

impl InteractionId {
    /// Create a new random interaction ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an interaction ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for InteractionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InteractionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of work an interaction performed
///
/// Variants are declared in classification priority order: when a text
/// matches several kinds, the first one wins. `General` is the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Code,
    StructuredOutput,
    Translation,
    Summarization,
    Analysis,
    Learning,
    Generation,
    General,
}

impl InteractionType {
    /// All types in priority order
    pub const ALL: [InteractionType; 8] = [
        InteractionType::Code,
        InteractionType::StructuredOutput,
        InteractionType::Translation,
        InteractionType::Summarization,
        InteractionType::Analysis,
        InteractionType::Learning,
        InteractionType::Generation,
        InteractionType::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            InteractionType::Code => "code",
            InteractionType::StructuredOutput => "structured_output",
            InteractionType::Translation => "translation",
            InteractionType::Summarization => "summarization",
            InteractionType::Analysis => "analysis",
            InteractionType::Learning => "learning",
            InteractionType::Generation => "generation",
            InteractionType::General => "general",
        }
    }
}

impl std::fmt::Display for InteractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Cognitive dimension exercised by an interaction (non-exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CognitiveAxis {
    Analysis,
    Creativity,
    Synthesis,
    ProblemSolving,
    Learning,
    Communication,
}

impl CognitiveAxis {
    pub const ALL: [CognitiveAxis; 6] = [
        CognitiveAxis::Analysis,
        CognitiveAxis::Creativity,
        CognitiveAxis::Synthesis,
        CognitiveAxis::ProblemSolving,
        CognitiveAxis::Learning,
        CognitiveAxis::Communication,
    ];

    /// Axis reported when no axis keyword matches
    pub const DEFAULT: CognitiveAxis = CognitiveAxis::Communication;

    pub fn label(&self) -> &'static str {
        match self {
            CognitiveAxis::Analysis => "analysis",
            CognitiveAxis::Creativity => "creativity",
            CognitiveAxis::Synthesis => "synthesis",
            CognitiveAxis::ProblemSolving => "problem_solving",
            CognitiveAxis::Learning => "learning",
            CognitiveAxis::Communication => "communication",
        }
    }
}

impl std::fmt::Display for CognitiveAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Thematic focus of an interaction (non-exclusive, may be empty)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Marketing,
    Affiliation,
    FiscalEconomic,
    Occupation,
    Code,
    Media,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::Marketing,
        Theme::Affiliation,
        Theme::FiscalEconomic,
        Theme::Occupation,
        Theme::Code,
        Theme::Media,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Marketing => "marketing",
            Theme::Affiliation => "affiliation",
            Theme::FiscalEconomic => "fiscal_economic",
            Theme::Occupation => "occupation",
            Theme::Code => "code",
            Theme::Media => "media",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Multi-label output of the text signal extractor for one text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThematicProfile {
    /// Detected themes; empty when nothing matched
    #[serde(default)]
    pub themes: BTreeSet<Theme>,

    /// Detected cognitive axes; never empty once extracted
    #[serde(default)]
    pub cognitive_axes: BTreeSet<CognitiveAxis>,

    pub sentiment: Sentiment,

    /// Additive keyword-valuation score (non-negative)
    #[serde(default)]
    pub keyword_score: f64,
}

impl ThematicProfile {
    /// First detected axis in declaration order, or the default axis
    pub fn primary_axis(&self) -> CognitiveAxis {
        self.cognitive_axes
            .iter()
            .next()
            .copied()
            .unwrap_or(CognitiveAxis::DEFAULT)
    }

    pub fn has_theme(&self, theme: Theme) -> bool {
        self.themes.contains(&theme)
    }

    pub fn has_axis(&self, axis: CognitiveAxis) -> bool {
        self.cognitive_axes.contains(&axis)
    }
}

impl Default for ThematicProfile {
    fn default() -> Self {
        Self {
            themes: BTreeSet::new(),
            cognitive_axes: BTreeSet::from([CognitiveAxis::DEFAULT]),
            sentiment: Sentiment::Neutral,
            keyword_score: 0.0,
        }
    }
}

/// Caller-supplied overrides for a single valuation
///
/// Every field is optional and `Default` supplies nothing. Multiplier
/// overrides replace the derived multiplier; boolean fields force a bonus on
/// (`Some(true)`) or suppress a derived bonus (`Some(false)`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationOptions {
    pub complexity: Option<f64>,
    pub impact: Option<f64>,
    pub relevance: Option<f64>,
    pub coherence: Option<f64>,
    pub problem_solving: Option<f64>,

    pub unique_concept: Option<bool>,
    pub fiscal_economic: Option<bool>,
    pub occupation: Option<bool>,
    pub structured_output: Option<bool>,
    pub code_or_media: Option<bool>,
    pub learning: Option<bool>,
}

/// Computed value of one interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Monetizable units (UTMi), non-negative, two decimals
    pub amount: f64,

    /// Estimated provider cost in the base currency, six decimals
    pub estimated_cost: f64,

    /// Fixed fraction of `amount`, two decimals
    pub impact_points: f64,
}

impl Valuation {
    pub fn zero() -> Self {
        Self {
            amount: 0.0,
            estimated_cost: 0.0,
            impact_points: 0.0,
        }
    }
}

/// One logged exchange with the assistant
///
/// Missing numeric fields deserialize as zero and missing text as an empty
/// string. The derived fields (`interaction_type`, `profile`, `valuation`)
/// are written only by the valuation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: InteractionId,
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub prompt: String,

    #[serde(default)]
    pub response: String,

    #[serde(default)]
    pub duration_secs: f64,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub prompt_word_count: u64,

    /// Recorded prompt tokens; estimated from the word count when absent
    #[serde(default)]
    pub prompt_token_count: Option<u64>,

    #[serde(default)]
    pub response_token_count: u64,

    #[serde(default)]
    pub options: ValuationOptions,

    #[serde(default)]
    interaction_type: Option<InteractionType>,

    #[serde(default)]
    profile: Option<ThematicProfile>,

    #[serde(default)]
    valuation: Option<Valuation>,
}

impl InteractionRecord {
    /// Create an unprocessed record from an exchange, deriving counts from the text
    ///
    /// Prompt words are whitespace-separated tokens; response tokens are
    /// estimated as one token per four characters, rounded up.
    pub fn new(
        prompt: impl Into<String>,
        response: impl Into<String>,
        duration_secs: f64,
        model: impl Into<String>,
    ) -> Self {
        let prompt = prompt.into();
        let response = response.into();

        Self {
            id: InteractionId::new(),
            timestamp: Utc::now(),
            prompt_word_count: count_words(&prompt),
            prompt_token_count: None,
            response_token_count: estimate_tokens(&response),
            prompt,
            response,
            duration_secs,
            model: model.into(),
            options: ValuationOptions::default(),
            interaction_type: None,
            profile: None,
            valuation: None,
        }
    }

    /// Replace the timestamp (builder style)
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Replace the valuation options (builder style)
    pub fn with_options(mut self, options: ValuationOptions) -> Self {
        self.options = options;
        self
    }

    /// Prompt and response joined for signal extraction
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.prompt, self.response)
    }

    pub fn interaction_type(&self) -> Option<InteractionType> {
        self.interaction_type
    }

    pub fn profile(&self) -> Option<&ThematicProfile> {
        self.profile.as_ref()
    }

    pub fn valuation(&self) -> Option<&Valuation> {
        self.valuation.as_ref()
    }

    pub fn is_processed(&self) -> bool {
        self.valuation.is_some()
    }

    /// Apply a correction and re-process the record with `engine`
    pub fn corrected(
        &self,
        correction: &Correction,
        engine: &crate::valuation::ValuationEngine,
    ) -> InteractionRecord {
        engine.correct(self, correction)
    }

    pub(crate) fn attach(
        &mut self,
        interaction_type: InteractionType,
        profile: ThematicProfile,
        valuation: Valuation,
    ) {
        self.interaction_type = Some(interaction_type);
        self.profile = Some(profile);
        self.valuation = Some(valuation);
    }
}

/// Absolute replacement values for an already-processed record
///
/// Applying the same correction twice yields the same record: every field
/// replaces rather than adjusts. When the prompt (or response) text is
/// replaced without an explicit count, the count is re-derived from the new
/// text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Correction {
    pub prompt: Option<String>,
    pub response: Option<String>,
    pub duration_secs: Option<f64>,
    pub model: Option<String>,
    pub prompt_word_count: Option<u64>,
    pub prompt_token_count: Option<u64>,
    pub response_token_count: Option<u64>,
    pub options: Option<ValuationOptions>,
}

impl Correction {
    /// Apply the replacement values to a copy of `record` (signals untouched)
    pub fn apply_to(&self, record: &InteractionRecord) -> InteractionRecord {
        let mut corrected = record.clone();

        if let Some(prompt) = &self.prompt {
            corrected.prompt = prompt.clone();
            corrected.prompt_word_count = count_words(prompt);
        }
        if let Some(response) = &self.response {
            corrected.response = response.clone();
            corrected.response_token_count = estimate_tokens(response);
        }
        if let Some(duration) = self.duration_secs {
            corrected.duration_secs = duration;
        }
        if let Some(model) = &self.model {
            corrected.model = model.clone();
        }
        if let Some(count) = self.prompt_word_count {
            corrected.prompt_word_count = count;
        }
        if let Some(count) = self.prompt_token_count {
            corrected.prompt_token_count = Some(count);
        }
        if let Some(count) = self.response_token_count {
            corrected.response_token_count = count;
        }
        if let Some(options) = &self.options {
            corrected.options = options.clone();
        }

        corrected
    }
}

/// Whitespace-separated word count
pub fn count_words(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Rough token estimate: one token per four characters, rounded up
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64).div_ceil(4)
}
