//! Shared helpers for CLI commands

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

/// Read and parse a JSON document
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Reading {}", path.display());
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use utmi_core::CvProfile;

    #[tokio::test]
    async fn test_read_json_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"skills": ["rust"]}}"#).unwrap();

        let profile: CvProfile = read_json(file.path()).await.unwrap();
        assert_eq!(profile.skills.len(), 1);
    }

    #[tokio::test]
    async fn test_read_json_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = read_json::<CvProfile>(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
