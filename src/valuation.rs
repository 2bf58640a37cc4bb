//! Interaction valuation engine
//!
//! Turns one interaction record into a [`Valuation`]. The computation runs in
//! a fixed order:
//!
//! 1. base = prompt words × rate + response tokens × rate + seconds × rate
//! 2. × complexity × impact × relevance × coherence × problem-solving
//! 3. + flat bonuses, each at most once
//! 4. × model quality multiplier (unknown models are neutral)
//! 5. × the largest matching thematic multiplier (neutral when no theme)
//! 6. + keyword-valuation score
//! 7. clamp at zero (an overflow to `+∞` saturates at `f64::MAX`)
//! 8. round once: two decimals for the amount, six for the cost
//!
//! The estimated provider cost is reported next to the amount and never
//! reduces it. The engine is pure and holds only a shared, validated
//! [`CoefficientTable`], so it can be cloned freely across threads.

use crate::coefficients::CoefficientTable;
use crate::error::Result;
use crate::signals;
use crate::types::{
    CognitiveAxis, Correction, InteractionRecord, InteractionType, Theme, ThematicProfile,
    Valuation, ValuationOptions,
};
use crate::utils::numeric::{clamp_non_negative, non_negative_or_zero, round_amount, round_cost};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Intermediate figures of one valuation, before clamping and rounding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationBreakdown {
    pub interaction_type: InteractionType,
    pub base: f64,
    pub multiplier: f64,
    pub bonuses: f64,
    pub quality_multiplier: f64,
    pub theme_multiplier: f64,
    pub keyword_score: f64,

    /// Unclamped, unrounded result of steps 1-6
    pub raw_amount: f64,
    pub raw_cost: f64,
}

/// Valuation engine bound to one coefficient table
#[derive(Debug, Clone)]
pub struct ValuationEngine {
    table: Arc<CoefficientTable>,
}

impl ValuationEngine {
    /// Create an engine, validating the table first
    pub fn new(table: CoefficientTable) -> Result<Self> {
        Self::shared(Arc::new(table))
    }

    /// Create an engine over an already shared table
    pub fn shared(table: Arc<CoefficientTable>) -> Result<Self> {
        table.validate()?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &CoefficientTable {
        &self.table
    }

    /// Borrowed view the computation runs on
    fn valuator(&self) -> Valuator<'_> {
        Valuator { table: &self.table }
    }

    /// Interaction type and thematic profile of a record's text
    pub fn signals(&self, record: &InteractionRecord) -> (InteractionType, ThematicProfile) {
        self.valuator().signals(record)
    }

    /// Value one interaction
    pub fn valuate(&self, record: &InteractionRecord) -> Valuation {
        self.valuator().valuate(record)
    }

    /// Intermediate figures for one interaction (useful for explaining a value)
    pub fn breakdown(&self, record: &InteractionRecord) -> ValuationBreakdown {
        let valuator = self.valuator();
        let (interaction_type, profile) = valuator.signals(record);
        valuator.breakdown_with(record, interaction_type, &profile)
    }

    /// Return a copy of the record with its signals and valuation attached
    pub fn process(&self, record: &InteractionRecord) -> InteractionRecord {
        let valuator = self.valuator();
        let (interaction_type, profile) = valuator.signals(record);
        let breakdown = valuator.breakdown_with(record, interaction_type, &profile);
        let valuation = valuator.finish(&breakdown);

        debug!(
            "Valuated interaction {} ({}, model {}): {} UTMi, cost {}",
            record.id, interaction_type, record.model, valuation.amount, valuation.estimated_cost
        );

        let mut processed = record.clone();
        processed.attach(interaction_type, profile, valuation);
        processed
    }

    /// Apply a correction and re-process the record
    ///
    /// Idempotent: correcting the result again with the same correction
    /// yields an identical record.
    pub fn correct(&self, record: &InteractionRecord, correction: &Correction) -> InteractionRecord {
        self.process(&correction.apply_to(record))
    }

    /// Largest multiplier among the detected themes; 1.0 without themes
    pub fn theme_multiplier(&self, themes: &BTreeSet<Theme>) -> f64 {
        self.valuator().theme_multiplier(themes)
    }
}

/// The valuation steps over a borrowed table
#[derive(Clone, Copy)]
struct Valuator<'a> {
    table: &'a CoefficientTable,
}

impl Valuator<'_> {
    fn signals(&self, record: &InteractionRecord) -> (InteractionType, ThematicProfile) {
        let text = record.combined_text();
        (
            signals::classify_interaction_type(&text),
            signals::extract_profile(&text, &self.table.valuable_terms),
        )
    }

    fn valuate(&self, record: &InteractionRecord) -> Valuation {
        let (interaction_type, profile) = self.signals(record);
        let breakdown = self.breakdown_with(record, interaction_type, &profile);
        self.finish(&breakdown)
    }

    fn breakdown_with(
        &self,
        record: &InteractionRecord,
        interaction_type: InteractionType,
        profile: &ThematicProfile,
    ) -> ValuationBreakdown {
        let table = self.table;
        let rates = &table.base_rates;

        let base = record.prompt_word_count as f64 * rates.prompt_word
            + record.response_token_count as f64 * rates.response_token
            + non_negative_or_zero(record.duration_secs) * rates.duration_second;

        let multiplier = self.multiplier(&record.options, interaction_type, profile);
        let bonuses = self.bonuses(&record.options, interaction_type, profile);
        let quality_multiplier = table.quality_multiplier(&record.model);
        if table.model(&record.model).is_none() && !record.model.trim().is_empty() {
            debug!("Unknown model '{}', using neutral quality multiplier", record.model);
        }
        let theme_multiplier = self.theme_multiplier(&profile.themes);
        let keyword_score = profile.keyword_score;

        let raw_amount =
            (base * multiplier + bonuses) * quality_multiplier * theme_multiplier + keyword_score;

        ValuationBreakdown {
            interaction_type,
            base,
            multiplier,
            bonuses,
            quality_multiplier,
            theme_multiplier,
            keyword_score,
            raw_amount,
            raw_cost: self.cost(record),
        }
    }

    fn finish(&self, breakdown: &ValuationBreakdown) -> Valuation {
        let amount = round_amount(clamp_non_negative(breakdown.raw_amount));
        let impact_points = round_amount(amount * self.table.valuation.impact_points_ratio);

        Valuation {
            amount,
            estimated_cost: round_cost(non_negative_or_zero(breakdown.raw_cost)),
            impact_points,
        }
    }

    /// Product of the five step-2 factors
    fn multiplier(
        &self,
        options: &ValuationOptions,
        interaction_type: InteractionType,
        profile: &ThematicProfile,
    ) -> f64 {
        let m = &self.table.multipliers;

        let complexity = resolve_factor(
            "complexity",
            options.complexity,
            matches!(interaction_type, InteractionType::Code | InteractionType::Analysis),
            m.complexity,
        );
        let impact = resolve_factor(
            "impact",
            options.impact,
            profile.has_axis(CognitiveAxis::Analysis),
            m.impact,
        );
        let relevance = resolve_factor("relevance", options.relevance, false, 1.0);
        let coherence = resolve_factor(
            "coherence",
            options.coherence,
            profile.has_axis(CognitiveAxis::Synthesis),
            m.coherence,
        );
        let problem_solving = resolve_factor(
            "problem_solving",
            options.problem_solving,
            profile.has_axis(CognitiveAxis::ProblemSolving),
            m.problem_solving,
        );

        (complexity * impact * relevance * coherence * problem_solving).min(f64::MAX)
    }

    /// Sum of the flat bonuses that apply, each counted once
    fn bonuses(
        &self,
        options: &ValuationOptions,
        interaction_type: InteractionType,
        profile: &ThematicProfile,
    ) -> f64 {
        let b = &self.table.bonuses;

        let candidates = [
            (options.unique_concept, false, b.unique_concept),
            (
                options.fiscal_economic,
                profile.has_theme(Theme::FiscalEconomic),
                b.fiscal_economic,
            ),
            (
                options.occupation,
                profile.has_theme(Theme::Occupation),
                b.occupation,
            ),
            (
                options.structured_output,
                interaction_type == InteractionType::StructuredOutput,
                b.structured_output,
            ),
            (
                options.code_or_media,
                profile.has_theme(Theme::Code) || profile.has_theme(Theme::Media),
                b.code_or_media,
            ),
            (
                options.learning,
                interaction_type == InteractionType::Learning
                    || profile.has_axis(CognitiveAxis::Learning),
                b.learning,
            ),
        ];

        candidates
            .iter()
            .filter(|(forced, derived, _)| forced.unwrap_or(*derived))
            .map(|(_, _, bonus)| *bonus)
            .sum()
    }

    fn theme_multiplier(&self, themes: &BTreeSet<Theme>) -> f64 {
        let t = &self.table.theme_multipliers;

        themes
            .iter()
            .map(|theme| match theme {
                Theme::Marketing => t.marketing,
                Theme::Affiliation => t.affiliation,
                Theme::FiscalEconomic => t.fiscal_economic,
                Theme::Occupation => t.occupation,
                Theme::Code => t.code,
                Theme::Media => t.media,
            })
            .fold(None, |best: Option<f64>, m| Some(best.map_or(m, |b| b.max(m))))
            .unwrap_or(1.0)
    }

    /// Estimated provider cost in the base currency (unrounded)
    fn cost(&self, record: &InteractionRecord) -> f64 {
        let pricing = self.table.pricing(&record.model);
        let prompt_tokens = record.prompt_token_count.map(|t| t as f64).unwrap_or_else(|| {
            (record.prompt_word_count as f64 * self.table.valuation.tokens_per_word).round()
        });

        prompt_tokens / 1000.0 * pricing.input_cost_per_1k_tokens
            + record.response_token_count as f64 / 1000.0 * pricing.output_cost_per_1k_tokens
    }
}

/// Caller override → derived multiplier → neutral
fn resolve_factor(name: &str, requested: Option<f64>, derived: bool, derived_value: f64) -> f64 {
    let fallback = if derived { derived_value } else { 1.0 };

    match requested {
        Some(value) if value.is_finite() && value >= 0.0 => value,
        Some(value) => {
            warn!("Ignoring invalid {} override {}", name, value);
            fallback
        }
        None => fallback,
    }
}

/// Value one interaction against a borrowed coefficient table
///
/// The table is not validated here. Callers pass one that has already been
/// through [`CoefficientTable::validate`] (every loader does this); use a
/// [`ValuationEngine`] to have it checked once up front.
pub fn valuate(record: &InteractionRecord, table: &CoefficientTable) -> Valuation {
    Valuator { table }.valuate(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ValuationEngine {
        ValuationEngine::new(CoefficientTable::default()).unwrap()
    }

    fn bare_record(words: u64, tokens: u64) -> InteractionRecord {
        let mut record = InteractionRecord::new("", "", 0.0, "unknown-model");
        record.prompt_word_count = words;
        record.response_token_count = tokens;
        record
    }

    #[test]
    fn test_base_formula_only() {
        // 10 × 0.1 + 20 × 0.05 = 2.0; no signals, unknown model
        let valuation = engine().valuate(&bare_record(10, 20));
        assert_eq!(valuation.amount, 2.0);
        assert_eq!(valuation.impact_points, 0.2);
    }

    #[test]
    fn test_duration_contributes_to_base() {
        let mut record = bare_record(0, 0);
        record.duration_secs = 150.0;
        assert_eq!(engine().valuate(&record).amount, 1.5);

        record.duration_secs = -30.0;
        assert_eq!(engine().valuate(&record).amount, 0.0);
    }

    #[test]
    fn test_empty_record_is_zero() {
        let valuation = engine().valuate(&bare_record(0, 0));
        assert_eq!(valuation, Valuation::zero());
    }

    #[test]
    fn test_known_model_quality_multiplier() {
        let mut record = bare_record(10, 20);
        record.model = "gpt-4o".to_string();
        // 2.0 × 1.3
        assert_eq!(engine().valuate(&record).amount, 2.6);
    }

    #[test]
    fn test_caller_overrides_multiply_base() {
        let record = bare_record(10, 20).with_options(ValuationOptions {
            relevance: Some(1.5),
            complexity: Some(2.0),
            ..Default::default()
        });
        assert_eq!(engine().valuate(&record).amount, 6.0);
    }

    #[test]
    fn test_invalid_override_falls_back() {
        let record = bare_record(10, 20).with_options(ValuationOptions {
            relevance: Some(-3.0),
            impact: Some(f64::NAN),
            ..Default::default()
        });
        assert_eq!(engine().valuate(&record).amount, 2.0);
    }

    #[test]
    fn test_derived_complexity_for_code() {
        let mut record = bare_record(10, 20);
        record.prompt = "refactor".to_string();
        let breakdown = engine().breakdown(&record);
        assert_eq!(breakdown.interaction_type, InteractionType::Code);
        assert_eq!(breakdown.multiplier, 1.2);
    }

    #[test]
    fn test_bonus_applied_once() {
        let mut record = bare_record(0, 0);
        record.prompt = "budget budget fiscal economy taxes".to_string();
        let breakdown = engine().breakdown(&record);
        assert_eq!(breakdown.bonuses, 8.0);
        // (0 + 8) × 1 × 1.3 (fiscal theme)
        assert_eq!(engine().valuate(&record).amount, 10.4);
    }

    #[test]
    fn test_bonus_can_be_forced_and_suppressed() {
        let forced = bare_record(0, 0).with_options(ValuationOptions {
            unique_concept: Some(true),
            ..Default::default()
        });
        assert_eq!(engine().valuate(&forced).amount, 5.0);

        let mut suppressed = bare_record(0, 0).with_options(ValuationOptions {
            fiscal_economic: Some(false),
            ..Default::default()
        });
        suppressed.prompt = "budget".to_string();
        let breakdown = engine().breakdown(&suppressed);
        assert_eq!(breakdown.bonuses, 0.0);
    }

    #[test]
    fn test_only_largest_theme_multiplier_applies() {
        let engine = engine();
        let themes = BTreeSet::from([Theme::Marketing, Theme::FiscalEconomic, Theme::Media]);
        assert_eq!(engine.theme_multiplier(&themes), 1.3);
        assert_eq!(engine.theme_multiplier(&BTreeSet::new()), 1.0);
    }

    #[test]
    fn test_keyword_score_is_additive() {
        let mut record = bare_record(10, 20);
        record.response = "blockchain".to_string();
        // base 2.0 + keyword 2.0, no multiplier touches the keyword score
        assert_eq!(engine().valuate(&record).amount, 4.0);
    }

    #[test]
    fn test_cost_uses_model_pricing_and_never_reduces_amount() {
        let mut record = bare_record(10, 2000);
        record.model = "gpt-4o".to_string();
        record.prompt_token_count = Some(1000);

        let valuation = engine().valuate(&record);
        // 1000/1000 × 0.0025 + 2000/1000 × 0.01
        assert_eq!(valuation.estimated_cost, 0.0225);
        // (10 × 0.1 + 2000 × 0.05) × 1.3
        assert_eq!(valuation.amount, 131.3);
    }

    #[test]
    fn test_cost_estimates_prompt_tokens_from_words() {
        let record = bare_record(100, 0);
        // round(100 × 1.33) = 133 tokens at the fallback input price 0.001
        assert_eq!(engine().valuate(&record).estimated_cost, 0.000133);
    }

    #[test]
    fn test_process_attaches_signals() {
        let record = InteractionRecord::new(
            "Explain how taxes work",
            "Taxes fund public services. Thanks for asking!",
            3.0,
            "gpt-4o",
        );
        let processed = engine().process(&record);

        assert!(processed.is_processed());
        assert_eq!(processed.interaction_type(), Some(InteractionType::Learning));
        assert!(processed.profile().unwrap().has_theme(Theme::FiscalEconomic));
        assert_eq!(processed.valuation(), Some(&engine().valuate(&record)));
        // The input is untouched
        assert!(!record.is_processed());
    }

    #[test]
    fn test_correct_is_idempotent() {
        let engine = engine();
        let record = engine.process(&InteractionRecord::new("hello", "world", 1.0, "gpt-4o"));
        let correction = Correction {
            model: Some("claude-3-5-sonnet".to_string()),
            response_token_count: Some(400),
            ..Default::default()
        };

        let once = engine.correct(&record, &correction);
        let twice = engine.correct(&once, &correction);

        assert_eq!(once, twice);
        assert_ne!(once.valuation(), record.valuation());
        assert_eq!(once.id, record.id);
    }

    #[test]
    fn test_free_function_matches_engine() {
        let table = CoefficientTable::default();
        let record = InteractionRecord::new("Write a poem about the sea", "Waves...", 2.0, "x");
        assert_eq!(valuate(&record, &table), engine().valuate(&record));
    }

    #[test]
    fn test_free_function_borrows_the_table() {
        let mut table = CoefficientTable::default();
        table.base_rates.prompt_word = 1.0;
        let record = bare_record(10, 0);

        assert_eq!(valuate(&record, &table).amount, 10.0);
        // Edits to the caller's table are seen on the next call
        table.base_rates.prompt_word = 2.0;
        assert_eq!(valuate(&record, &table).amount, 20.0);
    }

    #[test]
    fn test_overflowing_factors_saturate_instead_of_collapsing() {
        let with_factors = |factor: f64| {
            bare_record(10, 20).with_options(ValuationOptions {
                complexity: Some(factor),
                relevance: Some(factor),
                ..Default::default()
            })
        };

        let large = engine().valuate(&with_factors(1e100)).amount;
        let overflowing = engine().valuate(&with_factors(1e200)).amount;
        assert!(large > 0.0);
        assert!(overflowing.is_finite());
        assert!(overflowing >= large);
        assert_eq!(overflowing, f64::MAX);
    }

    #[test]
    fn test_overflowing_factors_keep_keyword_score_on_empty_base() {
        let mut record = bare_record(0, 0).with_options(ValuationOptions {
            complexity: Some(1e200),
            relevance: Some(1e200),
            ..Default::default()
        });
        record.response = "blockchain".to_string();
        assert_eq!(engine().valuate(&record).amount, 2.0);
    }

    #[test]
    fn test_invalid_table_rejected_at_construction() {
        let mut table = CoefficientTable::default();
        table.base_rates.prompt_word = -0.1;
        assert!(ValuationEngine::new(table).is_err());
    }
}
