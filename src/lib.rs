//! UTMi - Interaction Valuation and Aggregation Engine
//!
//! Scores exchanges with a generative assistant in monetizable units
//! ("UTMi") and rolls them up for reporting:
//! - Rule-based text signals (interaction type, cognitive axes, themes, sentiment)
//! - Deterministic per-interaction valuation from one versioned coefficient table
//! - CV capital scoring with Junior/Middle/Senior tiers
//! - Capped monthly income projection and a lock-free treasury ledger
//! - Pure dashboard aggregation over an interaction log
//!
//! # Architecture
//!
//! - **Coefficients**: the validated table every computation reads
//! - **Signals**: keyword classifiers over free text
//! - **Valuation**: record → signals → [`Valuation`]
//! - **CV / Ledger**: capital score, income projection, treasury balance
//! - **Store / Dashboard**: append-only log and its read-only projection
//!
//! # Example
//!
//! ```
//! use utmi_core::{CoefficientTable, InteractionRecord, ValuationEngine};
//!
//! let engine = ValuationEngine::new(CoefficientTable::default()).unwrap();
//! let record = InteractionRecord::new("Explain ownership in Rust", "Each value has...", 3.0, "gpt-4o");
//! let processed = engine.process(&record);
//!
//! assert!(processed.valuation().unwrap().amount >= 0.0);
//! ```

pub mod coefficients;
pub mod cv;
pub mod dashboard;
pub mod error;
pub mod ledger;
pub mod signals;
pub mod store;
pub mod types;
pub mod utils;
pub mod valuation;

// Re-export commonly used types
pub use coefficients::CoefficientTable;
pub use cv::{CvAssessment, CvLevel, CvProfile};
pub use dashboard::{Aggregator, DashboardSnapshot, RankedEntry};
pub use error::{Result, UtmiError};
pub use ledger::{monthly_income, LedgerEntry, TreasuryAccount, TreasurySnapshot};
pub use store::{InMemoryStore, InteractionStore};
pub use types::{
    CognitiveAxis, Correction, InteractionId, InteractionRecord, InteractionType, Sentiment,
    Theme, ThematicProfile, Valuation, ValuationOptions,
};
pub use valuation::{valuate, ValuationBreakdown, ValuationEngine};
