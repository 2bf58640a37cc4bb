//! Aggregate an interaction log into a dashboard snapshot

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use utmi_core::{
    Aggregator, CoefficientTable, CvProfile, InMemoryStore, InteractionRecord, InteractionStore,
    TreasuryAccount,
};

use super::helpers::{print_json, read_json};

/// Handle dashboard command
pub async fn handle(
    records_path: PathBuf,
    cv_path: Option<PathBuf>,
    treasury_balance: Option<f64>,
    as_of: Option<NaiveDate>,
    table: CoefficientTable,
) -> Result<()> {
    let records: Vec<InteractionRecord> = read_json(&records_path).await?;
    let store = InMemoryStore::with_records(records);

    let profile: Option<CvProfile> = match cv_path {
        Some(path) => Some(read_json(&path).await?),
        None => None,
    };
    let treasury = TreasuryAccount::with_balance(treasury_balance.unwrap_or(0.0));

    let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
    let aggregator = Aggregator::new(table, as_of).context("Invalid coefficient table")?;
    let snapshot = aggregator.aggregate(
        &store.query_all().await?,
        profile.as_ref(),
        &treasury.snapshot(),
    );

    print_json(&snapshot)
}
