//! Value a single exchange

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use utmi_core::{
    CoefficientTable, InteractionRecord, ValuationBreakdown, ValuationEngine, ValuationOptions,
};

use super::helpers::print_json;

#[derive(Args, Debug)]
pub struct ValuateArgs {
    /// Prompt sent to the assistant
    #[arg(short, long)]
    pub prompt: String,

    /// Response returned by the assistant
    #[arg(short, long, default_value = "")]
    pub response: String,

    /// Generation time in seconds
    #[arg(short, long, default_value = "0")]
    pub duration: f64,

    /// Model identifier
    #[arg(short, long, default_value = "")]
    pub model: String,

    /// Caller relevance multiplier
    #[arg(long)]
    pub relevance: Option<f64>,

    /// Grant the unique-concept bonus
    #[arg(long)]
    pub unique_concept: bool,

    /// Include the intermediate figures in the output
    #[arg(long)]
    pub explain: bool,
}

#[derive(Serialize)]
struct Explained {
    record: InteractionRecord,
    breakdown: ValuationBreakdown,
}

/// Handle valuate command
pub async fn handle(args: ValuateArgs, table: CoefficientTable) -> Result<()> {
    let engine = ValuationEngine::new(table).context("Invalid coefficient table")?;

    let options = ValuationOptions {
        relevance: args.relevance,
        unique_concept: args.unique_concept.then_some(true),
        ..Default::default()
    };
    let record = InteractionRecord::new(args.prompt, args.response, args.duration, args.model)
        .with_options(options);

    let processed = engine.process(&record);
    if args.explain {
        print_json(&Explained {
            breakdown: engine.breakdown(&record),
            record: processed,
        })
    } else {
        print_json(&processed)
    }
}
