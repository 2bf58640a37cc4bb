//! CV capital model
//!
//! Scores a structured CV independently of any interaction history:
//!
//! ```text
//! score = Σ experience years × experience_year
//!       + Σ education bonus(degree level)
//!       + skills × per_skill + high-demand skills × high_demand_skill_bonus
//!       + certifications × per_certification
//!       + Σ language level × per_language_level
//!       + projects × per_project
//! ```
//!
//! Every collection is optional; a missing one contributes zero. The tier is
//! a threshold lookup on the score where a boundary value belongs to the
//! higher tier.

use crate::coefficients::{CoefficientTable, CvCoefficients, TierThresholds};
use crate::utils::numeric::{non_negative_or_zero, round_amount};
use chrono::{NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// Capital tier, ordered from lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvLevel {
    Junior,
    Middle,
    Senior,
}

impl CvLevel {
    pub fn label(&self) -> &'static str {
        match self {
            CvLevel::Junior => "junior",
            CvLevel::Middle => "middle",
            CvLevel::Senior => "senior",
        }
    }
}

impl std::fmt::Display for CvLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for CvLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "junior" => Ok(CvLevel::Junior),
            "middle" | "mid" | "intermediate" => Ok(CvLevel::Middle),
            "senior" => Ok(CvLevel::Senior),
            other => Err(format!("unknown level '{}'", other)),
        }
    }
}

/// Degree level of an education entry; unrecognised labels map to `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DegreeLevel {
    Doctorate,
    Master,
    Bachelor,
    Associate,
    Other,
}

impl DegreeLevel {
    /// Recognise a degree from a free-form label
    ///
    /// Words are matched by prefix ("Master of Science", "Bachelor's degree",
    /// "Doctor of Philosophy") and abbreviations as whole words ("MSc",
    /// "Ph.D."). The highest level mentioned wins.
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(*c, '.' | '\'' | '\u{2019}'))
            .collect();
        let words: Vec<&str> = normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let mentions = |prefixes: &[&str], abbreviations: &[&str]| {
            words.iter().any(|word| {
                prefixes.iter().any(|p| word.starts_with(p)) || abbreviations.contains(word)
            })
        };

        if mentions(&["doctor"], &["phd", "dphil", "edd"]) {
            DegreeLevel::Doctorate
        } else if mentions(&["master"], &["msc", "ma", "mba", "meng", "mphil", "mres"]) {
            DegreeLevel::Master
        } else if mentions(&["bachelor", "licence"], &["bsc", "ba", "beng", "bba"]) {
            DegreeLevel::Bachelor
        } else if mentions(&["associate"], &["bts", "dut"]) {
            DegreeLevel::Associate
        } else {
            DegreeLevel::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DegreeLevel::Doctorate => "doctorate",
            DegreeLevel::Master => "master",
            DegreeLevel::Bachelor => "bachelor",
            DegreeLevel::Associate => "associate",
            DegreeLevel::Other => "other",
        }
    }
}

impl Default for DegreeLevel {
    fn default() -> Self {
        DegreeLevel::Other
    }
}

impl From<String> for DegreeLevel {
    fn from(label: String) -> Self {
        DegreeLevel::from_label(&label)
    }
}

impl From<DegreeLevel> for String {
    fn from(level: DegreeLevel) -> Self {
        level.label().to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub company: Option<String>,

    #[serde(default, deserialize_with = "deserialize_loose_date")]
    pub start: Option<NaiveDate>,

    /// `None` while the position is ongoing
    #[serde(default, deserialize_with = "deserialize_loose_date")]
    pub end: Option<NaiveDate>,

    /// Explicit duration; takes precedence over the dates
    #[serde(default)]
    pub years: Option<f64>,
}

impl Experience {
    /// Years spent in this position as of `as_of`
    ///
    /// Missing or reversed date ranges count as zero.
    pub fn years_as_of(&self, as_of: NaiveDate) -> f64 {
        if let Some(years) = self.years {
            return non_negative_or_zero(years);
        }

        match self.start {
            Some(start) => {
                let end = self.end.unwrap_or(as_of);
                if end <= start {
                    0.0
                } else {
                    (end - start).num_days() as f64 / 365.25
                }
            }
            None => 0.0,
        }
    }
}

static DATE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})(?:[-/.](\d{1,2}))?(?:[-/.](\d{1,2}))?(?:[t ].*)?$")
        .expect("Valid date regex")
});

static MONTH_YEAR_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})[-/.](\d{4})$").expect("Valid month/year regex"));

/// Parse a CV date: `YYYY-MM-DD`, `YYYY-MM`, `YYYY` or `MM/YYYY`
///
/// Missing parts default to the first month or day. Anything else,
/// including "present", is `None`.
pub fn parse_date_label(label: &str) -> Option<NaiveDate> {
    let label = label.trim().to_lowercase();

    if let Some(caps) = DATE_LABEL.captures(&label) {
        let part = |i: usize| caps.get(i).map_or(Some(1), |m| m.as_str().parse().ok());
        return NaiveDate::from_ymd_opt(caps[1].parse().ok()?, part(2)?, part(3)?);
    }

    let caps = MONTH_YEAR_LABEL.captures(&label)?;
    NaiveDate::from_ymd_opt(caps[2].parse().ok()?, caps[1].parse().ok()?, 1)
}

fn deserialize_loose_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DateRepr {
        Year(i64),
        Label(String),
        Unknown(IgnoredAny),
    }

    Ok(match Option::<DateRepr>::deserialize(deserializer)? {
        Some(DateRepr::Year(year)) => i32::try_from(year)
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
        Some(DateRepr::Label(label)) => parse_date_label(&label),
        Some(DateRepr::Unknown(_)) | None => None,
    })
}

/// An education entry, given either as a degree label or as an object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "EducationRepr")]
pub struct Education {
    pub degree: DegreeLevel,
    pub field: Option<String>,
    pub institution: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EducationRepr {
    Label(String),
    Full {
        #[serde(default)]
        degree: Option<String>,
        #[serde(default)]
        field: Option<String>,
        #[serde(default)]
        institution: Option<String>,
    },
    Unknown(IgnoredAny),
}

impl From<EducationRepr> for Education {
    fn from(repr: EducationRepr) -> Self {
        match repr {
            EducationRepr::Label(label) => Education {
                degree: DegreeLevel::from_label(&label),
                ..Default::default()
            },
            EducationRepr::Full {
                degree,
                field,
                institution,
            } => Education {
                degree: degree.as_deref().map(DegreeLevel::from_label).unwrap_or_default(),
                field,
                institution,
            },
            EducationRepr::Unknown(_) => Education::default(),
        }
    }
}

/// A skill, given either as a bare name or as `{ name, high_demand }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SkillRepr")]
pub struct Skill {
    pub name: String,
    pub high_demand: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SkillRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        high_demand: bool,
    },
}

impl From<SkillRepr> for Skill {
    fn from(repr: SkillRepr) -> Self {
        match repr {
            SkillRepr::Name(name) => Skill {
                name,
                high_demand: false,
            },
            SkillRepr::Full { name, high_demand } => Skill { name, high_demand },
        }
    }
}

/// Certification or project, given either as a bare name or as an object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "NamedEntryRepr")]
pub struct NamedEntry {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NamedEntryRepr {
    Name(String),
    Full {
        #[serde(default)]
        name: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<NamedEntryRepr> for NamedEntry {
    fn from(repr: NamedEntryRepr) -> Self {
        match repr {
            NamedEntryRepr::Name(name) => NamedEntry {
                name,
                description: None,
            },
            NamedEntryRepr::Full { name, description } => NamedEntry { name, description },
        }
    }
}

/// A spoken language with a numeric level (CEFR A1 = 1 … C2 = 6)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Language {
    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "deserialize_language_level")]
    pub level: f64,
}

static CEFR_LEVEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([abc])\s*([12])$").expect("Valid CEFR regex"));

/// Parse a language level label: a number, a CEFR grade, or a common descriptor
pub fn parse_language_level(label: &str) -> f64 {
    let label = label.trim().to_lowercase();

    if let Ok(value) = label.parse::<f64>() {
        return non_negative_or_zero(value);
    }

    if let Some(caps) = CEFR_LEVEL.captures(&label) {
        let band = match &caps[1] {
            "a" => 0.0,
            "b" => 2.0,
            _ => 4.0,
        };
        let step: f64 = if &caps[2] == "1" { 1.0 } else { 2.0 };
        return band + step;
    }

    match label.as_str() {
        "native" | "bilingual" | "mother tongue" => 6.0,
        "fluent" | "advanced" => 5.0,
        "professional" | "upper intermediate" => 4.0,
        "intermediate" => 3.0,
        "elementary" => 2.0,
        "beginner" | "basic" => 1.0,
        _ => 0.0,
    }
}

fn deserialize_language_level<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Level {
        Number(f64),
        Label(String),
    }

    Ok(match Option::<Level>::deserialize(deserializer)? {
        Some(Level::Number(value)) => non_negative_or_zero(value),
        Some(Level::Label(label)) => parse_language_level(&label),
        None => 0.0,
    })
}

/// Structured CV as produced by the document-parsing step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvProfile {
    pub name: Option<String>,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
    pub certifications: Vec<NamedEntry>,
    pub languages: Vec<Language>,
    pub projects: Vec<NamedEntry>,
}

/// Per-component contributions to a capital score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvBreakdown {
    pub experience: f64,
    pub education: f64,
    pub skills: f64,
    pub certifications: f64,
    pub languages: f64,
    pub projects: f64,
}

impl CvBreakdown {
    pub fn total(&self) -> f64 {
        self.experience
            + self.education
            + self.skills
            + self.certifications
            + self.languages
            + self.projects
    }
}

/// Score, tier and initial capital of one CV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvAssessment {
    pub score: f64,
    pub level: CvLevel,
    pub initial_capital: f64,
    pub breakdown: CvBreakdown,
}

/// Component contributions of a CV as of a reference date
pub fn breakdown_as_of(profile: &CvProfile, cv: &CvCoefficients, as_of: NaiveDate) -> CvBreakdown {
    let years: f64 = profile
        .experiences
        .iter()
        .map(|e| e.years_as_of(as_of))
        .sum();

    let education: f64 = profile
        .education
        .iter()
        .map(|e| match e.degree {
            DegreeLevel::Doctorate => cv.education.doctorate,
            DegreeLevel::Master => cv.education.master,
            DegreeLevel::Bachelor => cv.education.bachelor,
            DegreeLevel::Associate => cv.education.associate,
            DegreeLevel::Other => cv.education.other,
        })
        .sum();

    let listed: HashSet<String> = cv
        .high_demand_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();
    let high_demand = profile
        .skills
        .iter()
        .filter(|s| s.high_demand || listed.contains(&s.name.trim().to_lowercase()))
        .count();

    let language_levels: f64 = profile
        .languages
        .iter()
        .map(|l| non_negative_or_zero(l.level))
        .sum();

    CvBreakdown {
        experience: years * cv.experience_year,
        education,
        skills: profile.skills.len() as f64 * cv.per_skill
            + high_demand as f64 * cv.high_demand_skill_bonus,
        certifications: profile.certifications.len() as f64 * cv.per_certification,
        languages: language_levels * cv.per_language_level,
        projects: profile.projects.len() as f64 * cv.per_project,
    }
}

/// Capital score as of a reference date, rounded to two decimals
pub fn score_as_of(profile: &CvProfile, cv: &CvCoefficients, as_of: NaiveDate) -> f64 {
    round_amount(breakdown_as_of(profile, cv, as_of).total())
}

/// Capital score as of today
pub fn score(profile: &CvProfile, cv: &CvCoefficients) -> f64 {
    score_as_of(profile, cv, Utc::now().date_naive())
}

/// Tier of a score; a value equal to a threshold belongs to the higher tier
pub fn level(score: f64, thresholds: &TierThresholds) -> CvLevel {
    if score >= thresholds.senior {
        CvLevel::Senior
    } else if score >= thresholds.middle {
        CvLevel::Middle
    } else {
        CvLevel::Junior
    }
}

pub fn initial_capital(score: f64, cv: &CvCoefficients) -> f64 {
    round_amount(non_negative_or_zero(score) * cv.capital_conversion)
}

/// Score, tier and initial capital as of a reference date
pub fn assess_as_of(profile: &CvProfile, table: &CoefficientTable, as_of: NaiveDate) -> CvAssessment {
    let breakdown = breakdown_as_of(profile, &table.cv, as_of);
    let score = round_amount(breakdown.total());

    CvAssessment {
        score,
        level: level(score, &table.cv.thresholds),
        initial_capital: initial_capital(score, &table.cv),
        breakdown,
    }
}

/// Score, tier and initial capital as of today
pub fn assess(profile: &CvProfile, table: &CoefficientTable) -> CvAssessment {
    assess_as_of(profile, table, Utc::now().date_naive())
}
