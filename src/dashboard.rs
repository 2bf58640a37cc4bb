//! Dashboard aggregation
//!
//! Folds a collection of interaction records, an optional CV and a treasury
//! snapshot into one [`DashboardSnapshot`]. Aggregation is a pure function
//! of its inputs: the [`Aggregator`] keeps no state between calls, and every
//! grouping map is ordered so identical inputs serialize identically.
//!
//! Amounts are summed as `i128` hundredths (costs as millionths) and only
//! converted back at the end, so `by_type`, `by_model` and
//! `by_cognitive_axis` each partition `total_valuation` exactly. Each
//! record's whole amount goes to its primary cognitive axis. `by_theme` is
//! not a partition: a record counts under every theme it touches and under
//! none when it has no theme.

use crate::coefficients::CoefficientTable;
use crate::cv::{self, CvAssessment, CvProfile};
use crate::error::Result;
use crate::ledger::{self, TreasurySnapshot};
use crate::types::{
    CognitiveAxis, InteractionRecord, InteractionType, Sentiment, Theme, ThematicProfile,
    Valuation,
};
use crate::utils::numeric::{
    from_hundredths, from_micros, non_negative_or_zero, round_amount, to_hundredths, to_micros,
};
use crate::valuation::ValuationEngine;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Model key used when a record names no model
pub const UNKNOWN_MODEL: &str = "unknown";

/// One line of a top-N ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub label: String,
    pub count: usize,
    pub value: f64,
}

/// Aggregated view of an interaction log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub interaction_count: usize,
    pub total_valuation: f64,
    pub total_estimated_cost: f64,
    pub total_impact_points: f64,
    pub average_valuation: f64,

    /// Total valuation per unit of estimated cost; 0 without cost
    pub value_to_cost_ratio: f64,

    pub total_duration_secs: f64,
    pub total_prompt_words: u64,
    pub total_response_tokens: u64,

    pub by_type: BTreeMap<InteractionType, f64>,
    pub by_model: BTreeMap<String, f64>,
    pub by_cognitive_axis: BTreeMap<CognitiveAxis, f64>,
    pub by_theme: BTreeMap<Theme, f64>,
    pub value_to_cost_by_model: BTreeMap<String, f64>,

    /// Record count per sentiment; every label is always present
    pub sentiment_distribution: BTreeMap<Sentiment, usize>,

    /// Themes ranked by summed value
    pub top_topics: Vec<RankedEntry>,

    /// Interaction types ranked by count
    pub top_activities: Vec<RankedEntry>,

    /// Total valuation converted with the table's exchange rates
    pub value_by_currency: BTreeMap<String, f64>,

    pub first_interaction_at: Option<DateTime<Utc>>,
    pub last_interaction_at: Option<DateTime<Utc>>,

    pub cv: Option<CvAssessment>,
    pub treasury_balance: f64,

    /// Capped income projected from the CV score and total valuation; 0 without a CV
    pub projected_monthly_income: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Bucket {
    hundredths: i128,
    cost_micros: i128,
    count: usize,
}

impl Bucket {
    fn add(&mut self, hundredths: i128, cost_micros: i128) {
        self.hundredths = self.hundredths.saturating_add(hundredths);
        self.cost_micros = self.cost_micros.saturating_add(cost_micros);
        self.count = self.count.saturating_add(1);
    }

    fn value(&self) -> f64 {
        from_hundredths(self.hundredths)
    }
}

/// Stateless dashboard projection bound to one coefficient table
///
/// The reference date is the day ongoing CV experiences run to. It is part
/// of the aggregator's inputs, so a snapshot never depends on the clock.
#[derive(Debug, Clone)]
pub struct Aggregator {
    engine: ValuationEngine,
    reference_date: NaiveDate,
}

impl Aggregator {
    pub fn new(table: CoefficientTable, reference_date: NaiveDate) -> Result<Self> {
        Ok(Self::from_engine(ValuationEngine::new(table)?, reference_date))
    }

    pub fn from_engine(engine: ValuationEngine, reference_date: NaiveDate) -> Self {
        Self {
            engine,
            reference_date,
        }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn engine(&self) -> &ValuationEngine {
        &self.engine
    }

    /// Signals and valuation of a record, computing them when absent
    fn resolve(&self, record: &InteractionRecord) -> (InteractionType, ThematicProfile, Valuation) {
        match (record.interaction_type(), record.profile(), record.valuation()) {
            (Some(kind), Some(profile), Some(valuation)) => {
                (kind, profile.clone(), valuation.clone())
            }
            _ => {
                debug!("Processing unvaluated interaction {} for dashboard", record.id);
                let (kind, profile) = self.engine.signals(record);
                (kind, profile, self.engine.valuate(record))
            }
        }
    }

    /// Build a snapshot from records, an optional CV and the treasury state
    pub fn aggregate(
        &self,
        records: &[InteractionRecord],
        cv_profile: Option<&CvProfile>,
        treasury: &TreasurySnapshot,
    ) -> DashboardSnapshot {
        let table = self.engine.table();

        let mut total = Bucket::default();
        let mut impact_hundredths: i128 = 0;
        let mut duration_hundredths: i128 = 0;
        let mut total_prompt_words: u64 = 0;
        let mut total_response_tokens: u64 = 0;
        let mut first_interaction_at: Option<DateTime<Utc>> = None;
        let mut last_interaction_at: Option<DateTime<Utc>> = None;

        let mut by_type: BTreeMap<InteractionType, Bucket> = BTreeMap::new();
        let mut by_model: BTreeMap<String, Bucket> = BTreeMap::new();
        let mut by_axis: BTreeMap<CognitiveAxis, Bucket> = BTreeMap::new();
        let mut by_theme: BTreeMap<Theme, Bucket> = BTreeMap::new();
        let mut sentiment_distribution: BTreeMap<Sentiment, usize> =
            Sentiment::ALL.into_iter().map(|s| (s, 0)).collect();

        for record in records {
            let (kind, profile, valuation) = self.resolve(record);

            let hundredths = to_hundredths(non_negative_or_zero(valuation.amount));
            let cost_micros = i128::from(to_micros(non_negative_or_zero(valuation.estimated_cost)));

            total.add(hundredths, cost_micros);
            impact_hundredths = impact_hundredths
                .saturating_add(to_hundredths(non_negative_or_zero(valuation.impact_points)));
            duration_hundredths = duration_hundredths
                .saturating_add(to_hundredths(non_negative_or_zero(record.duration_secs)));
            total_prompt_words = total_prompt_words.saturating_add(record.prompt_word_count);
            total_response_tokens = total_response_tokens.saturating_add(record.response_token_count);

            first_interaction_at = Some(match first_interaction_at {
                Some(t) => t.min(record.timestamp),
                None => record.timestamp,
            });
            last_interaction_at = Some(match last_interaction_at {
                Some(t) => t.max(record.timestamp),
                None => record.timestamp,
            });

            by_type.entry(kind).or_default().add(hundredths, cost_micros);
            by_model
                .entry(model_key(&record.model))
                .or_default()
                .add(hundredths, cost_micros);
            by_axis
                .entry(profile.primary_axis())
                .or_default()
                .add(hundredths, cost_micros);
            for theme in &profile.themes {
                by_theme.entry(*theme).or_default().add(hundredths, cost_micros);
            }
            *sentiment_distribution.entry(profile.sentiment).or_insert(0) += 1;
        }

        let interaction_count = total.count;
        let total_valuation = total.value();
        let total_estimated_cost = from_micros(total.cost_micros);

        let cv = cv_profile.map(|profile| cv::assess_as_of(profile, table, self.reference_date));
        let projected_monthly_income = cv
            .as_ref()
            .map(|assessment| {
                ledger::monthly_income(
                    assessment.score,
                    total_valuation,
                    assessment.level,
                    &table.income,
                )
            })
            .unwrap_or(0.0);

        let top_n = table.reporting.top_n;
        let top_topics = rank(&by_theme, top_n, |b| Reverse(b.hundredths));
        let top_activities = rank(&by_type, top_n, |b| Reverse(b.count));

        let snapshot = DashboardSnapshot {
            interaction_count,
            total_valuation,
            total_estimated_cost,
            total_impact_points: from_hundredths(impact_hundredths),
            average_valuation: ratio(total_valuation, interaction_count as f64),
            value_to_cost_ratio: ratio(total_valuation, total_estimated_cost),
            total_duration_secs: from_hundredths(duration_hundredths),
            total_prompt_words,
            total_response_tokens,
            by_type: by_type.iter().map(|(k, b)| (*k, b.value())).collect(),
            by_model: by_model.iter().map(|(k, b)| (k.clone(), b.value())).collect(),
            by_cognitive_axis: by_axis.iter().map(|(k, b)| (*k, b.value())).collect(),
            by_theme: by_theme.iter().map(|(k, b)| (*k, b.value())).collect(),
            value_to_cost_by_model: by_model
                .iter()
                .map(|(k, b)| (k.clone(), ratio(b.value(), from_micros(b.cost_micros))))
                .collect(),
            sentiment_distribution,
            top_topics,
            top_activities,
            value_by_currency: table
                .exchange_rates
                .iter()
                .map(|(currency, rate)| (currency.clone(), round_amount(total_valuation * rate)))
                .collect(),
            first_interaction_at,
            last_interaction_at,
            cv,
            treasury_balance: treasury.balance,
            projected_monthly_income,
        };

        info!(
            "Aggregated {} interactions: {} UTMi, cost {}",
            snapshot.interaction_count, snapshot.total_valuation, snapshot.total_estimated_cost
        );

        snapshot
    }
}

/// Normalized model identifier used as a grouping key
fn model_key(model: &str) -> String {
    let key = model.trim().to_lowercase();
    if key.is_empty() {
        UNKNOWN_MODEL.to_string()
    } else {
        key
    }
}

/// Rounded quotient; 0 when the denominator is not positive
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 && numerator.is_finite() {
        round_amount(numerator / denominator)
    } else {
        0.0
    }
}

/// Top-N entries ordered by `key`, ties broken by label
fn rank<K, O>(buckets: &BTreeMap<K, Bucket>, top_n: usize, key: impl Fn(&Bucket) -> O) -> Vec<RankedEntry>
where
    K: std::fmt::Display,
    O: Ord,
{
    let mut entries: Vec<(O, String, &Bucket)> = buckets
        .iter()
        .map(|(label, bucket)| (key(bucket), label.to_string(), bucket))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    entries
        .into_iter()
        .take(top_n)
        .map(|(_, label, bucket)| RankedEntry {
            label,
            count: bucket.count,
            value: bucket.value(),
        })
        .collect()
}
