//! Common test utilities and helpers

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use utmi_core::cv::{Education, Experience, Language, NamedEntry, Skill};
use utmi_core::{
    CoefficientTable, CvProfile, InteractionRecord, ValuationEngine,
};

/// Engine over the reference coefficients
pub fn default_engine() -> ValuationEngine {
    ValuationEngine::new(CoefficientTable::default()).expect("Default table is valid")
}

/// Fixed timestamp on 2024-05-01 at the given hour
pub fn timestamp(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0)
        .single()
        .expect("Valid timestamp")
}

/// Day ongoing CV experiences are scored up to
pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).expect("Valid date")
}

/// A small, varied interaction log (unprocessed)
pub fn sample_log() -> Vec<InteractionRecord> {
    vec![
        InteractionRecord::new(
            "Debug this Rust function, it fails to compile",
            "The borrow ends too late; here is the fixed code. Hope this is helpful!",
            8.5,
            "claude-3-5-sonnet",
        )
        .at(timestamp(8)),
        InteractionRecord::new(
            "Translate my resume into English for a job interview",
            "Here is the translated resume.",
            5.0,
            "gpt-4o-mini",
        )
        .at(timestamp(9)),
        InteractionRecord::new(
            "Analyze our marketing campaign revenue",
            "The campaign performed poorly in Q2: wrong audience.",
            12.0,
            "gpt-4o",
        )
        .at(timestamp(10)),
        InteractionRecord::new(
            "Write a poem about the sea",
            "Waves of silver, endless blue...",
            2.0,
            "some-local-model",
        )
        .at(timestamp(11)),
        InteractionRecord::new("", "", 0.0, "").at(timestamp(12)),
    ]
}

/// A CV in the Middle tier under the reference coefficients
pub fn sample_cv() -> CvProfile {
    CvProfile {
        name: Some("Test Candidate".to_string()),
        experiences: vec![Experience {
            title: "Backend engineer".to_string(),
            years: Some(4.0),
            ..Default::default()
        }],
        education: vec![Education {
            degree: utmi_core::cv::DegreeLevel::Bachelor,
            ..Default::default()
        }],
        skills: vec![
            Skill {
                name: "Rust".to_string(),
                high_demand: false,
            },
            Skill {
                name: "SQL".to_string(),
                high_demand: false,
            },
        ],
        certifications: vec![NamedEntry {
            name: "CKA".to_string(),
            description: None,
        }],
        languages: vec![Language {
            name: "English".to_string(),
            level: 4.0,
        }],
        projects: vec![],
    }
}
