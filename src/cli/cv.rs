//! Score a CV document

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;
use utmi_core::{cv, CoefficientTable, CvProfile};

use super::helpers::{print_json, read_json};

/// Handle cv command
pub async fn handle(path: PathBuf, table: CoefficientTable) -> Result<()> {
    let profile: CvProfile = read_json(&path).await?;
    let assessment = cv::assess(&profile, &table);

    info!(
        "CV scored {} ({}), initial capital {}",
        assessment.score, assessment.level, assessment.initial_capital
    );
    print_json(&assessment)
}
