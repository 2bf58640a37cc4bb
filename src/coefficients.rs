//! Coefficient table
//!
//! Every weight, multiplier, bonus, threshold, price, exchange rate and cap
//! used by the valuation pipeline lives in one [`CoefficientTable`]. The table
//! is validated once when it is loaded and is read-only afterwards; callers
//! share it by reference (or `Arc`) and may swap it wholesale, e.g. to compare
//! two configurations side by side.
//!
//! # Loading
//!
//! [`CoefficientTable::load`] layers, in order:
//! 1. the built-in defaults,
//! 2. an optional TOML file,
//! 3. environment overrides prefixed `UTMI`, nested with `__`
//!    (`UTMI__BASE_RATES__PROMPT_WORD=0.2`).
//!
//! ```toml
//! version = "2024.2-custom"
//!
//! [base_rates]
//! prompt_word = 0.12
//! response_token = 0.05
//! duration_second = 0.01
//!
//! [models."gpt-4o"]
//! quality_multiplier = 1.3
//! input_cost_per_1k_tokens = 0.0025
//! output_cost_per_1k_tokens = 0.01
//! ```

use crate::error::{Result, UtmiError};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Environment prefix for coefficient overrides
pub const ENV_PREFIX: &str = "UTMI";

/// Complete, versioned coefficient configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTable {
    /// Free-form version label, reported alongside computed figures
    pub version: String,

    pub base_rates: BaseRates,
    pub multipliers: Multipliers,
    pub bonuses: Bonuses,
    pub theme_multipliers: ThemeMultipliers,

    /// Valuable term → additive weight (case-insensitive substring match)
    pub valuable_terms: BTreeMap<String, f64>,

    /// Lower-cased model identifier → quality and pricing
    pub models: BTreeMap<String, ModelProfile>,

    /// Pricing applied to models missing from `models`
    pub fallback_pricing: TokenPricing,

    pub valuation: ValuationTuning,
    pub cv: CvCoefficients,
    pub income: IncomeCoefficients,
    pub treasury: TreasuryCoefficients,

    /// Currency code → value of one UTMi in that currency
    pub exchange_rates: BTreeMap<String, f64>,

    pub reporting: ReportingConfig,
}

/// Per-unit base rates (step 1 of the valuation formula)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseRates {
    pub prompt_word: f64,
    pub response_token: f64,
    pub duration_second: f64,
}

/// Multipliers applied when the matching signal is derived from the text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Multipliers {
    pub complexity: f64,
    pub impact: f64,
    pub coherence: f64,
    pub problem_solving: f64,
}

/// Flat bonuses, each added at most once per interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bonuses {
    pub unique_concept: f64,
    pub fiscal_economic: f64,
    pub occupation: f64,
    pub structured_output: f64,
    pub code_or_media: f64,
    pub learning: f64,
}

/// Thematic multipliers; only the largest matching one applies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeMultipliers {
    pub marketing: f64,
    pub affiliation: f64,
    pub fiscal_economic: f64,
    pub occupation: f64,
    pub code: f64,
    pub media: f64,
}

/// Quality multiplier and token pricing of a known model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelProfile {
    pub quality_multiplier: f64,
    pub input_cost_per_1k_tokens: f64,
    pub output_cost_per_1k_tokens: f64,
}

/// Token pricing in the base currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPricing {
    pub input_cost_per_1k_tokens: f64,
    pub output_cost_per_1k_tokens: f64,
}

/// Output shaping for a single valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationTuning {
    /// Fraction of the amount reported as impact points, in `[0, 1]`
    pub impact_points_ratio: f64,

    /// Prompt token estimate per word when no token count was recorded
    pub tokens_per_word: f64,
}

/// CV capital scoring rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvCoefficients {
    pub experience_year: f64,
    pub per_skill: f64,
    pub high_demand_skill_bonus: f64,
    pub per_certification: f64,
    pub per_language_level: f64,
    pub per_project: f64,

    /// Capital score → initial capital
    pub capital_conversion: f64,

    /// Skills that earn the high-demand bonus even when not flagged
    pub high_demand_skills: Vec<String>,

    pub education: EducationBonuses,
    pub thresholds: TierThresholds,
}

/// One bonus per education entry, keyed by degree level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationBonuses {
    pub doctorate: f64,
    pub master: f64,
    pub bachelor: f64,
    pub associate: f64,
    pub other: f64,
}

/// Lower bounds (inclusive) of the upper tiers; must be strictly increasing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub middle: f64,
    pub senior: f64,
}

/// Monthly income projection rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeCoefficients {
    pub per_cv_point: f64,
    pub per_unit: f64,
    pub monthly_cap: f64,
    pub level_bonus: LevelBonuses,
}

/// Mutually exclusive flat bonus per tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelBonuses {
    pub junior: f64,
    pub middle: f64,
    pub senior: f64,
}

/// Treasury flows, both fractions in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasuryCoefficients {
    pub contribution_rate: f64,
    pub tax_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Length of the dashboard top-N rankings
    pub top_n: usize,
}

impl Default for CoefficientTable {
    fn default() -> Self {
        let valuable_terms = [
            ("artificial intelligence", 3.0),
            ("machine learning", 3.0),
            ("cybersecurity", 2.5),
            ("blockchain", 2.0),
            ("automation", 1.5),
            ("optimization", 1.5),
            ("investment", 1.5),
            ("innovation", 1.0),
            ("strategy", 1.0),
            ("sustainability", 1.0),
        ]
        .into_iter()
        .map(|(term, weight)| (term.to_string(), weight))
        .collect();

        let models = [
            ("gpt-4o", 1.30, 0.0025, 0.0100),
            ("gpt-4o-mini", 1.10, 0.00015, 0.0006),
            ("claude-3-5-sonnet", 1.35, 0.0030, 0.0150),
            ("claude-3-5-haiku", 1.10, 0.0008, 0.0040),
            ("gemini-1.5-pro", 1.25, 0.00125, 0.0050),
            ("llama-3.1-70b", 1.05, 0.0009, 0.0009),
            ("mixtral-8x7b", 1.00, 0.0006, 0.0006),
        ]
        .into_iter()
        .map(|(id, quality, input, output)| {
            (
                id.to_string(),
                ModelProfile {
                    quality_multiplier: quality,
                    input_cost_per_1k_tokens: input,
                    output_cost_per_1k_tokens: output,
                },
            )
        })
        .collect();

        let exchange_rates = [("eur", 0.05), ("usd", 0.054), ("gbp", 0.043)]
            .into_iter()
            .map(|(code, rate)| (code.to_string(), rate))
            .collect();

        Self {
            version: "2024.2".to_string(),
            base_rates: BaseRates {
                prompt_word: 0.1,
                response_token: 0.05,
                duration_second: 0.01,
            },
            multipliers: Multipliers {
                complexity: 1.2,
                impact: 1.15,
                coherence: 1.1,
                problem_solving: 1.25,
            },
            bonuses: Bonuses {
                unique_concept: 5.0,
                fiscal_economic: 8.0,
                occupation: 6.0,
                structured_output: 4.0,
                code_or_media: 7.0,
                learning: 5.0,
            },
            theme_multipliers: ThemeMultipliers {
                marketing: 1.1,
                affiliation: 1.05,
                fiscal_economic: 1.3,
                occupation: 1.2,
                code: 1.25,
                media: 1.15,
            },
            valuable_terms,
            models,
            fallback_pricing: TokenPricing {
                input_cost_per_1k_tokens: 0.001,
                output_cost_per_1k_tokens: 0.002,
            },
            valuation: ValuationTuning {
                impact_points_ratio: 0.1,
                tokens_per_word: 1.33,
            },
            cv: CvCoefficients {
                experience_year: 20.0,
                per_skill: 2.0,
                high_demand_skill_bonus: 5.0,
                per_certification: 8.0,
                per_language_level: 1.5,
                per_project: 6.0,
                education: EducationBonuses {
                    doctorate: 60.0,
                    master: 45.0,
                    bachelor: 30.0,
                    associate: 20.0,
                    other: 10.0,
                },
                high_demand_skills: [
                    "rust",
                    "python",
                    "machine learning",
                    "data science",
                    "kubernetes",
                    "cloud",
                    "cybersecurity",
                    "devops",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                thresholds: TierThresholds {
                    middle: 100.0,
                    senior: 250.0,
                },
                capital_conversion: 10.0,
            },
            income: IncomeCoefficients {
                per_cv_point: 5.0,
                per_unit: 0.5,
                level_bonus: LevelBonuses {
                    junior: 100.0,
                    middle: 300.0,
                    senior: 600.0,
                },
                monthly_cap: 5000.0,
            },
            treasury: TreasuryCoefficients {
                contribution_rate: 0.1,
                tax_rate: 0.05,
            },
            exchange_rates,
            reporting: ReportingConfig { top_n: 5 },
        }
    }
}

impl CoefficientTable {
    /// Load the table from defaults, an optional TOML file, and `UTMI__*` env overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = toml::to_string(&Self::default())?;

        let mut builder =
            Config::builder().add_source(File::from_str(&defaults, FileFormat::Toml));

        if let Some(path) = path {
            debug!("Layering coefficients from {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let table: CoefficientTable = builder.build()?.try_deserialize()?;
        table.validate()?;

        info!("Loaded coefficient table version {}", table.version);
        Ok(table)
    }

    /// Load a complete table from a TOML file (no defaults, no env layering)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse a complete table from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let table: CoefficientTable = toml::from_str(toml_str)?;
        table.validate()?;
        Ok(table)
    }

    /// Render the table as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Look up a model by identifier (trimmed, case-insensitive)
    pub fn model(&self, model_id: &str) -> Option<&ModelProfile> {
        self.models.get(&model_id.trim().to_lowercase())
    }

    /// Quality multiplier of a model; unknown identifiers are neutral (1.0)
    pub fn quality_multiplier(&self, model_id: &str) -> f64 {
        self.model(model_id)
            .map(|m| m.quality_multiplier)
            .unwrap_or(1.0)
    }

    /// Token pricing of a model, falling back to `fallback_pricing`
    pub fn pricing(&self, model_id: &str) -> TokenPricing {
        match self.model(model_id) {
            Some(m) => TokenPricing {
                input_cost_per_1k_tokens: m.input_cost_per_1k_tokens,
                output_cost_per_1k_tokens: m.output_cost_per_1k_tokens,
            },
            None => self.fallback_pricing.clone(),
        }
    }

    /// Validate every coefficient
    ///
    /// Rejects negative or non-finite weights, thresholds that are not
    /// strictly increasing, a non-positive income cap and rates outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let b = &self.base_rates;
        non_negative("base_rates.prompt_word", b.prompt_word)?;
        non_negative("base_rates.response_token", b.response_token)?;
        non_negative("base_rates.duration_second", b.duration_second)?;

        let m = &self.multipliers;
        non_negative("multipliers.complexity", m.complexity)?;
        non_negative("multipliers.impact", m.impact)?;
        non_negative("multipliers.coherence", m.coherence)?;
        non_negative("multipliers.problem_solving", m.problem_solving)?;

        let bo = &self.bonuses;
        non_negative("bonuses.unique_concept", bo.unique_concept)?;
        non_negative("bonuses.fiscal_economic", bo.fiscal_economic)?;
        non_negative("bonuses.occupation", bo.occupation)?;
        non_negative("bonuses.structured_output", bo.structured_output)?;
        non_negative("bonuses.code_or_media", bo.code_or_media)?;
        non_negative("bonuses.learning", bo.learning)?;

        let t = &self.theme_multipliers;
        non_negative("theme_multipliers.marketing", t.marketing)?;
        non_negative("theme_multipliers.affiliation", t.affiliation)?;
        non_negative("theme_multipliers.fiscal_economic", t.fiscal_economic)?;
        non_negative("theme_multipliers.occupation", t.occupation)?;
        non_negative("theme_multipliers.code", t.code)?;
        non_negative("theme_multipliers.media", t.media)?;

        for (term, weight) in &self.valuable_terms {
            if term.trim().is_empty() {
                return Err(UtmiError::InvalidCoefficients(
                    "valuable_terms contains an empty term".to_string(),
                ));
            }
            non_negative(&format!("valuable_terms.{}", term), *weight)?;
        }

        for (id, model) in &self.models {
            non_negative(
                &format!("models.{}.quality_multiplier", id),
                model.quality_multiplier,
            )?;
            non_negative(
                &format!("models.{}.input_cost_per_1k_tokens", id),
                model.input_cost_per_1k_tokens,
            )?;
            non_negative(
                &format!("models.{}.output_cost_per_1k_tokens", id),
                model.output_cost_per_1k_tokens,
            )?;
        }
        non_negative(
            "fallback_pricing.input_cost_per_1k_tokens",
            self.fallback_pricing.input_cost_per_1k_tokens,
        )?;
        non_negative(
            "fallback_pricing.output_cost_per_1k_tokens",
            self.fallback_pricing.output_cost_per_1k_tokens,
        )?;

        unit_interval(
            "valuation.impact_points_ratio",
            self.valuation.impact_points_ratio,
        )?;
        non_negative("valuation.tokens_per_word", self.valuation.tokens_per_word)?;

        self.validate_cv()?;

        let i = &self.income;
        non_negative("income.per_cv_point", i.per_cv_point)?;
        non_negative("income.per_unit", i.per_unit)?;
        non_negative("income.level_bonus.junior", i.level_bonus.junior)?;
        non_negative("income.level_bonus.middle", i.level_bonus.middle)?;
        non_negative("income.level_bonus.senior", i.level_bonus.senior)?;
        non_negative("income.monthly_cap", i.monthly_cap)?;
        if i.monthly_cap == 0.0 {
            return Err(UtmiError::InvalidCoefficients(
                "income.monthly_cap must be greater than zero".to_string(),
            ));
        }

        unit_interval("treasury.contribution_rate", self.treasury.contribution_rate)?;
        unit_interval("treasury.tax_rate", self.treasury.tax_rate)?;

        for (code, rate) in &self.exchange_rates {
            non_negative(&format!("exchange_rates.{}", code), *rate)?;
        }

        if self.reporting.top_n == 0 {
            return Err(UtmiError::InvalidCoefficients(
                "reporting.top_n must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_cv(&self) -> Result<()> {
        let cv = &self.cv;
        non_negative("cv.experience_year", cv.experience_year)?;
        non_negative("cv.per_skill", cv.per_skill)?;
        non_negative("cv.high_demand_skill_bonus", cv.high_demand_skill_bonus)?;
        non_negative("cv.per_certification", cv.per_certification)?;
        non_negative("cv.per_language_level", cv.per_language_level)?;
        non_negative("cv.per_project", cv.per_project)?;
        non_negative("cv.education.doctorate", cv.education.doctorate)?;
        non_negative("cv.education.master", cv.education.master)?;
        non_negative("cv.education.bachelor", cv.education.bachelor)?;
        non_negative("cv.education.associate", cv.education.associate)?;
        non_negative("cv.education.other", cv.education.other)?;
        non_negative("cv.capital_conversion", cv.capital_conversion)?;

        non_negative("cv.thresholds.middle", cv.thresholds.middle)?;
        non_negative("cv.thresholds.senior", cv.thresholds.senior)?;
        if cv.thresholds.middle >= cv.thresholds.senior {
            return Err(UtmiError::InvalidCoefficients(format!(
                "cv.thresholds must be strictly increasing (middle {} >= senior {})",
                cv.thresholds.middle, cv.thresholds.senior
            )));
        }

        Ok(())
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(UtmiError::InvalidCoefficients(format!(
            "{} must be a finite, non-negative number (got {})",
            name, value
        )));
    }
    Ok(())
}

fn unit_interval(name: &str, value: f64) -> Result<()> {
    non_negative(name, value)?;
    if value > 1.0 {
        return Err(UtmiError::InvalidCoefficients(format!(
            "{} must lie in [0, 1] (got {})",
            name, value
        )));
    }
    Ok(())
}
