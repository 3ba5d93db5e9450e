//! Static reference tables consumed by the calculation engine.
//!
//! The immunization schedule, pregnancy guide (baby sizes, trimester symptoms
//! and tips, appointment milestones) and danger signs are data, not code. The
//! bundled copies are embedded at compile time; a deployment can point
//! `MAMATOTO_REFERENCE_DIR` at a directory holding localized replacements.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::enums::Urgency;

pub const SCHEDULE_FILE: &str = "immunization_schedule.json";
pub const PREGNANCY_GUIDE_FILE: &str = "pregnancy_guide.json";
pub const DANGER_SIGNS_FILE: &str = "danger_signs.json";

const BUNDLED_SCHEDULE: &str = include_str!("../resources/reference/immunization_schedule.json");
const BUNDLED_PREGNANCY_GUIDE: &str = include_str!("../resources/reference/pregnancy_guide.json");
const BUNDLED_DANGER_SIGNS: &str = include_str!("../resources/reference/danger_signs.json");

#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("Failed to load reference data from {0}: {1}")]
    Load(String, String),

    #[error("Failed to parse reference data {0}: {1}")]
    Parse(String, String),

    #[error("Invalid reference data: {0}")]
    Invalid(String),
}

/// One entry of the immunization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseDefinition {
    pub name: String,
    pub code: String,
    pub days_from_birth: u32,
    pub description: String,
}

/// Size comparison that applies from `from_week` onward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BabySize {
    pub from_week: u32,
    pub comparison: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrimesterGuide {
    pub trimester: u8,
    pub symptoms: Vec<String>,
    pub tips: Vec<String>,
}

/// An appointment recommended at specific weeks, or at every week from `from_week`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRule {
    pub name: String,
    #[serde(default)]
    pub weeks: Vec<u32>,
    #[serde(default)]
    pub from_week: Option<u32>,
}

impl AppointmentRule {
    pub fn applies_to(&self, week: u32) -> bool {
        self.weeks.contains(&week) || self.from_week.is_some_and(|from| week >= from)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PregnancyGuide {
    pub baby_sizes: Vec<BabySize>,
    pub smallest_baby_size: String,
    pub trimesters: Vec<TrimesterGuide>,
    pub appointments: Vec<AppointmentRule>,
}

impl PregnancyGuide {
    pub fn trimester(&self, trimester: u8) -> Option<&TrimesterGuide> {
        self.trimesters.iter().find(|t| t.trimester == trimester)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DangerSign {
    pub symptom: String,
    pub urgency: Urgency,
    pub action: String,
}

/// All reference tables, loaded once at startup and shared by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
    /// Ordered by ascending `days_from_birth`; order within a day is file order.
    pub immunization_schedule: Vec<DoseDefinition>,
    pub pregnancy_guide: PregnancyGuide,
    pub danger_signs: Vec<DangerSign>,
}

impl ReferenceData {
    /// Reference tables compiled into the binary.
    pub fn bundled() -> Result<Self, ReferenceError> {
        Self::from_json(BUNDLED_SCHEDULE, BUNDLED_PREGNANCY_GUIDE, BUNDLED_DANGER_SIGNS)
    }

    /// Load all three tables from `dir`. Every file must be present.
    pub fn load(dir: &Path) -> Result<Self, ReferenceError> {
        let schedule = read_file(dir, SCHEDULE_FILE)?;
        let guide = read_file(dir, PREGNANCY_GUIDE_FILE)?;
        let danger = read_file(dir, DANGER_SIGNS_FILE)?;
        let data = Self::from_json(&schedule, &guide, &danger)?;

        tracing::info!(
            dir = %dir.display(),
            doses = data.immunization_schedule.len(),
            "Loaded reference data"
        );
        Ok(data)
    }

    /// Load from `dir` when given, otherwise fall back to the bundled tables.
    pub fn load_or_bundled(dir: Option<&Path>) -> Result<Self, ReferenceError> {
        match dir {
            Some(dir) => Self::load(dir),
            None => Self::bundled(),
        }
    }

    fn from_json(schedule: &str, guide: &str, danger: &str) -> Result<Self, ReferenceError> {
        let immunization_schedule: Vec<DoseDefinition> = serde_json::from_str(schedule)
            .map_err(|e| ReferenceError::Parse(SCHEDULE_FILE.into(), e.to_string()))?;
        let pregnancy_guide: PregnancyGuide = serde_json::from_str(guide)
            .map_err(|e| ReferenceError::Parse(PREGNANCY_GUIDE_FILE.into(), e.to_string()))?;
        let danger_signs: Vec<DangerSign> = serde_json::from_str(danger)
            .map_err(|e| ReferenceError::Parse(DANGER_SIGNS_FILE.into(), e.to_string()))?;

        let mut data = Self {
            immunization_schedule,
            pregnancy_guide,
            danger_signs,
        };
        data.normalize()?;
        Ok(data)
    }

    fn normalize(&mut self) -> Result<(), ReferenceError> {
        if self.immunization_schedule.is_empty() {
            return Err(ReferenceError::Invalid("immunization schedule is empty".into()));
        }
        for trimester in 1..=3u8 {
            if self.pregnancy_guide.trimester(trimester).is_none() {
                return Err(ReferenceError::Invalid(format!(
                    "pregnancy guide has no entry for trimester {trimester}"
                )));
            }
        }
        let mut codes = HashSet::new();
        if let Some(dup) = self
            .immunization_schedule
            .iter()
            .find(|d| !codes.insert(d.code.as_str()))
        {
            return Err(ReferenceError::Invalid(format!(
                "immunization schedule repeats vaccine code {}",
                dup.code
            )));
        }

        // Stable: same-day doses keep their series order.
        self.immunization_schedule.sort_by_key(|d| d.days_from_birth);
        self.pregnancy_guide.baby_sizes.sort_by_key(|s| s.from_week);
        Ok(())
    }
}

fn read_file(dir: &Path, name: &str) -> Result<String, ReferenceError> {
    let path = dir.join(name);
    std::fs::read_to_string(&path)
        .map_err(|e| ReferenceError::Load(path.display().to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_bundled_to(dir: &Path) {
        std::fs::write(dir.join(SCHEDULE_FILE), BUNDLED_SCHEDULE).unwrap();
        std::fs::write(dir.join(PREGNANCY_GUIDE_FILE), BUNDLED_PREGNANCY_GUIDE).unwrap();
        std::fs::write(dir.join(DANGER_SIGNS_FILE), BUNDLED_DANGER_SIGNS).unwrap();
    }

    #[test]
    fn bundled_schedule_has_eighteen_ordered_doses() {
        let data = ReferenceData::bundled().unwrap();
        assert_eq!(data.immunization_schedule.len(), 18);
        assert!(data
            .immunization_schedule
            .windows(2)
            .all(|w| w[0].days_from_birth <= w[1].days_from_birth));
        assert_eq!(data.immunization_schedule[0].code, "BCG");
        assert_eq!(data.immunization_schedule[17].code, "DPT_BOOSTER");
    }

    #[test]
    fn bundled_danger_signs() {
        let data = ReferenceData::bundled().unwrap();
        assert_eq!(data.danger_signs.len(), 6);
        let medium: Vec<_> = data
            .danger_signs
            .iter()
            .filter(|d| d.urgency == Urgency::Medium)
            .collect();
        assert_eq!(medium.len(), 1);
        assert_eq!(medium[0].symptom, "Persistent vomiting");
    }

    #[test]
    fn bundled_guide_covers_three_trimesters() {
        let data = ReferenceData::bundled().unwrap();
        for t in 1..=3 {
            let guide = data.pregnancy_guide.trimester(t).unwrap();
            assert_eq!(guide.symptoms.len(), 4);
            assert_eq!(guide.tips.len(), 4);
        }
        assert!(data.pregnancy_guide.trimester(4).is_none());
    }

    #[test]
    fn appointment_rule_matching() {
        let listed = AppointmentRule {
            name: "Glucose screening test".into(),
            weeks: vec![24, 28],
            from_week: None,
        };
        assert!(listed.applies_to(24));
        assert!(!listed.applies_to(26));

        let open_ended = AppointmentRule {
            name: "Group B Strep test".into(),
            weeks: vec![],
            from_week: Some(36),
        };
        assert!(!open_ended.applies_to(35));
        assert!(open_ended.applies_to(36));
        assert!(open_ended.applies_to(42));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_bundled_to(dir.path());
        let loaded = ReferenceData::load(dir.path()).unwrap();
        assert_eq!(loaded, ReferenceData::bundled().unwrap());
    }

    #[test]
    fn load_or_bundled_without_dir() {
        let data = ReferenceData::load_or_bundled(None).unwrap();
        assert_eq!(data.immunization_schedule.len(), 18);
    }

    #[test]
    fn missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SCHEDULE_FILE), BUNDLED_SCHEDULE).unwrap();
        let err = ReferenceData::load(dir.path()).unwrap_err();
        assert!(matches!(err, ReferenceError::Load(_, _)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_bundled_to(dir.path());
        std::fs::write(dir.path().join(DANGER_SIGNS_FILE), "[{\"symptom\": 1}]").unwrap();
        let err = ReferenceData::load(dir.path()).unwrap_err();
        match err {
            ReferenceError::Parse(file, _) => assert_eq!(file, DANGER_SIGNS_FILE),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn empty_schedule_rejected() {
        let err =
            ReferenceData::from_json("[]", BUNDLED_PREGNANCY_GUIDE, BUNDLED_DANGER_SIGNS)
                .unwrap_err();
        assert!(matches!(err, ReferenceError::Invalid(_)));
    }

    #[test]
    fn repeated_vaccine_code_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_bundled_to(dir.path());
        let schedule = r#"[
            {"name": "BCG", "code": "BCG", "days_from_birth": 0, "description": ""},
            {"name": "BCG again", "code": "BCG", "days_from_birth": 42, "description": ""}
        ]"#;
        std::fs::write(dir.path().join(SCHEDULE_FILE), schedule).unwrap();
        match ReferenceData::load(dir.path()).unwrap_err() {
            ReferenceError::Invalid(msg) => assert!(msg.contains("BCG")),
            other => panic!("expected invalid data, got {other:?}"),
        }
    }

    #[test]
    fn unsorted_schedule_is_ordered_stably() {
        let schedule = r#"[
            {"name": "Late", "code": "L", "days_from_birth": 90, "description": ""},
            {"name": "First", "code": "A", "days_from_birth": 0, "description": ""},
            {"name": "Second", "code": "B", "days_from_birth": 0, "description": ""}
        ]"#;
        let data =
            ReferenceData::from_json(schedule, BUNDLED_PREGNANCY_GUIDE, BUNDLED_DANGER_SIGNS)
                .unwrap();
        let codes: Vec<_> = data
            .immunization_schedule
            .iter()
            .map(|d| d.code.as_str())
            .collect();
        assert_eq!(codes, vec!["A", "B", "L"]);
    }
}
