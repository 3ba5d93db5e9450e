use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored or submitted string that does not name any variant of a closed enum.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid enum value for {field}: {value}")]
pub struct InvalidEnumValue {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde uses the same literal so the wire value never drifts from `as_str`.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnumValue {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

str_enum!(VaccinationStatus {
    Pending => "pending",
    Due => "due",
    Completed => "completed",
    Overdue => "overdue",
    Skipped => "skipped",
});

str_enum!(AssessmentType {
    Epds => "epds",
    Gad7 => "gad7",
    Phq9 => "phq9",
});

str_enum!(RiskLevel {
    Minimal => "minimal",
    Low => "low",
    Moderate => "moderate",
    High => "high",
});

str_enum!(Urgency {
    High => "high",
    Medium => "medium",
});

str_enum!(ChatTopic {
    Pregnancy => "pregnancy",
    Vaccination => "vaccination",
    Growth => "growth",
    Nutrition => "nutrition",
    GeneralHealth => "general_health",
    MentalHealth => "mental_health",
    Other => "other",
});
