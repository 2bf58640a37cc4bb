//! Text signal extraction
//!
//! Five independent, pure classifiers over free text:
//!
//! - [`classify_interaction_type`]: first matching type in priority order, else `General`
//! - [`detect_cognitive_axes`]: non-exclusive axes, default axis when none match
//! - [`detect_thematic_focus`]: non-exclusive themes, possibly empty
//! - [`classify_sentiment`]: positive minus negative keyword hits
//! - [`valuate_keywords`]: sum of weights of the valuable terms present
//!
//! All of them are total: any string, including the empty one, yields a
//! label or score. Matching is case-insensitive substring containment
//! against the keyword lists in [`dictionaries`].

pub mod dictionaries;

use crate::types::{CognitiveAxis, InteractionType, Sentiment, Theme, ThematicProfile};
use dictionaries::{AxisKeywords, InteractionKeywords, SentimentKeywords, ThemeKeywords};
use std::collections::{BTreeMap, BTreeSet};

/// Case-fold text once before matching
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}

fn contains_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| normalized.contains(kw))
}

/// Classify the kind of work a text asks for
pub fn classify_interaction_type(text: &str) -> InteractionType {
    let normalized = normalize(text);

    InteractionType::ALL
        .into_iter()
        .find(|kind| contains_any(&normalized, InteractionKeywords::for_type(*kind)))
        .unwrap_or(InteractionType::General)
}

/// Detect every cognitive axis a text touches
pub fn detect_cognitive_axes(text: &str) -> BTreeSet<CognitiveAxis> {
    let normalized = normalize(text);

    let axes: BTreeSet<CognitiveAxis> = CognitiveAxis::ALL
        .into_iter()
        .filter(|axis| contains_any(&normalized, AxisKeywords::for_axis(*axis)))
        .collect();

    if axes.is_empty() {
        BTreeSet::from([CognitiveAxis::DEFAULT])
    } else {
        axes
    }
}

/// Detect every theme a text touches (empty when none)
pub fn detect_thematic_focus(text: &str) -> BTreeSet<Theme> {
    let normalized = normalize(text);

    Theme::ALL
        .into_iter()
        .filter(|theme| contains_any(&normalized, ThemeKeywords::for_theme(*theme)))
        .collect()
}

/// Raw sentiment score: positive hits minus negative hits
pub fn sentiment_score(text: &str) -> i64 {
    let normalized = normalize(text);

    let hits = |keywords: &[&str]| -> i64 {
        keywords
            .iter()
            .map(|kw| normalized.matches(kw).count() as i64)
            .sum()
    };

    hits(SentimentKeywords::positive()) - hits(SentimentKeywords::negative())
}

pub fn classify_sentiment(text: &str) -> Sentiment {
    match sentiment_score(text) {
        s if s > 0 => Sentiment::Positive,
        s if s < 0 => Sentiment::Negative,
        _ => Sentiment::Neutral,
    }
}

/// Sum the weights of every valuable term present in the text
///
/// Each term counts once regardless of how often it occurs. Non-finite or
/// negative weights contribute nothing, so the score is always non-negative.
pub fn valuate_keywords(text: &str, valuable_terms: &BTreeMap<String, f64>) -> f64 {
    let normalized = normalize(text);

    valuable_terms
        .iter()
        .filter(|(term, _)| {
            let term = term.trim().to_lowercase();
            !term.is_empty() && normalized.contains(&term)
        })
        .map(|(_, weight)| *weight)
        .filter(|weight| weight.is_finite() && *weight > 0.0)
        .sum()
}

/// Run every profile classifier over one text
pub fn extract_profile(text: &str, valuable_terms: &BTreeMap<String, f64>) -> ThematicProfile {
    ThematicProfile {
        themes: detect_thematic_focus(text),
        cognitive_axes: detect_cognitive_axes(text),
        sentiment: classify_sentiment(text),
        keyword_score: valuate_keywords(text, valuable_terms),
    }
}
