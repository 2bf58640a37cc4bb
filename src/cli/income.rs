//! Project monthly income

use anyhow::Result;
use serde::Serialize;
use utmi_core::{cv, monthly_income, CoefficientTable, CvLevel};

use super::helpers::print_json;

#[derive(Serialize)]
struct IncomeProjection {
    cv_score: f64,
    units: f64,
    level: CvLevel,
    monthly_income: f64,
    monthly_cap: f64,
}

/// Handle income command; the tier is derived from the score when not given
pub async fn handle(
    cv_score: f64,
    units: f64,
    level: Option<CvLevel>,
    table: CoefficientTable,
) -> Result<()> {
    let level = level.unwrap_or_else(|| cv::level(cv_score, &table.cv.thresholds));

    print_json(&IncomeProjection {
        cv_score,
        units,
        level,
        monthly_income: monthly_income(cv_score, units, level, &table.income),
        monthly_cap: table.income.monthly_cap,
    })
}
