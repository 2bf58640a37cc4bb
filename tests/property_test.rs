//! Property tests for valuation, income, treasury and aggregation

mod common;

use common::{default_engine, reference_date};
use proptest::prelude::*;
use utmi_core::ledger::apply_cap;
use utmi_core::utils::numeric::to_hundredths;
use utmi_core::{
    monthly_income, Aggregator, CoefficientTable, CvLevel, InteractionRecord, LedgerEntry,
    TreasuryAccount,
};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-zA-Z ]{0,40}",
        prop::sample::select(vec![
            "refactor this function",
            "summarize the budget",
            "explain machine learning",
            "write a poem, thanks!",
            "translate my resume",
            "this answer is wrong and broken",
        ])
        .prop_map(str::to_string),
    ]
}

fn arb_model() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["gpt-4o", "claude-3-5-sonnet", "mixtral-8x7b", "unknown", ""])
        .prop_map(str::to_string)
}

fn arb_record() -> impl Strategy<Value = InteractionRecord> {
    (
        arb_text(),
        arb_text(),
        0.0f64..600.0,
        arb_model(),
        0u64..5_000,
        0u64..20_000,
    )
        .prop_map(|(prompt, response, duration, model, words, tokens)| {
            let mut record = InteractionRecord::new(prompt, response, duration, model);
            record.prompt_word_count = words;
            record.response_token_count = tokens;
            record
        })
}

fn arb_level() -> impl Strategy<Value = CvLevel> {
    prop_oneof![
        Just(CvLevel::Junior),
        Just(CvLevel::Middle),
        Just(CvLevel::Senior),
    ]
}

fn arb_entry() -> impl Strategy<Value = LedgerEntry> {
    prop_oneof![
        (0.0f64..1_000.0).prop_map(LedgerEntry::Contribution),
        (0.0f64..1_000.0).prop_map(LedgerEntry::Deduction),
    ]
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn valuation_is_never_negative(record in arb_record()) {
        let valuation = default_engine().valuate(&record);
        prop_assert!(valuation.amount >= 0.0);
        prop_assert!(valuation.estimated_cost >= 0.0);
        prop_assert!(valuation.impact_points >= 0.0);
    }

    #[test]
    fn more_words_or_tokens_never_lower_the_amount(
        record in arb_record(),
        extra_words in 0u64..1_000,
        extra_tokens in 0u64..1_000,
    ) {
        let engine = default_engine();
        let before = engine.valuate(&record).amount;

        let mut more = record.clone();
        more.prompt_word_count += extra_words;
        more.response_token_count += extra_tokens;

        prop_assert!(engine.valuate(&more).amount >= before);
    }

    #[test]
    fn income_never_exceeds_cap(
        cv_score in prop::num::f64::ANY,
        units in prop::num::f64::ANY,
        level in arb_level(),
    ) {
        let income = CoefficientTable::default().income;
        let value = monthly_income(cv_score, units, level, &income);
        prop_assert!(value >= 0.0);
        prop_assert!(value <= income.monthly_cap);
        prop_assert_eq!(apply_cap(value, income.monthly_cap), value);
    }

    #[test]
    fn treasury_replay_is_order_independent(
        entries in prop::collection::vec(arb_entry(), 0..30),
        initial in -1_000.0f64..1_000.0,
    ) {
        let forward = TreasuryAccount::replay(initial, &entries);
        let mut reversed_entries = entries.clone();
        reversed_entries.reverse();
        let reversed = TreasuryAccount::replay(initial, &reversed_entries);

        prop_assert_eq!(forward.balance(), reversed.balance());
        prop_assert_eq!(forward.snapshot(), reversed.snapshot());
    }

    #[test]
    fn partitions_reconcile_and_aggregation_is_idempotent(
        records in prop::collection::vec(arb_record(), 0..25),
    ) {
        let aggregator = Aggregator::from_engine(default_engine(), reference_date());
        let treasury = TreasuryAccount::new().snapshot();

        let first = aggregator.aggregate(&records, None, &treasury);
        let second = aggregator.aggregate(&records, None, &treasury);
        prop_assert_eq!(&first, &second);

        let total = to_hundredths(first.total_valuation);
        let sum = |values: Vec<f64>| values.into_iter().map(to_hundredths).sum::<i128>();
        prop_assert_eq!(sum(first.by_type.values().copied().collect()), total);
        prop_assert_eq!(sum(first.by_model.values().copied().collect()), total);
        prop_assert_eq!(sum(first.by_cognitive_axis.values().copied().collect()), total);
        prop_assert_eq!(first.interaction_count, records.len());
    }
}
