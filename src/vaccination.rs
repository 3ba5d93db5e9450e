//! Vaccination scheduler: instantiates the immunization schedule for a child
//! and classifies each dose against "today".
//!
//! Status is a pure function of dates. `pending -> due -> overdue` happens by
//! elapsed time alone and is recomputed on every read; `completed` follows the
//! administered date; `skipped` is set by the caller and is never reclassified
//! by elapsed time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{add_days, days_between};
use crate::models::enums::VaccinationStatus;
use crate::models::Vaccination;
use crate::reference::DoseDefinition;

/// Days past the scheduled date before a dose counts as overdue.
pub const OVERDUE_GRACE_DAYS: i64 = 30;

/// A concrete dose for one child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccinationDose {
    pub vaccine_name: String,
    pub vaccine_code: String,
    pub description: String,
    pub days_from_birth: u32,
    pub scheduled_date: NaiveDate,
    pub administered_date: Option<NaiveDate>,
    pub status: VaccinationStatus,
}

/// Date and status access shared by engine doses and stored vaccination rows.
pub trait DoseState {
    fn vaccine_name(&self) -> &str;
    fn vaccine_code(&self) -> &str;
    fn scheduled_date(&self) -> NaiveDate;
    fn administered_date(&self) -> Option<NaiveDate>;
    fn status(&self) -> VaccinationStatus;
    fn set_status(&mut self, status: VaccinationStatus);
}

impl DoseState for VaccinationDose {
    fn vaccine_name(&self) -> &str {
        &self.vaccine_name
    }
    fn vaccine_code(&self) -> &str {
        &self.vaccine_code
    }
    fn scheduled_date(&self) -> NaiveDate {
        self.scheduled_date
    }
    fn administered_date(&self) -> Option<NaiveDate> {
        self.administered_date
    }
    fn status(&self) -> VaccinationStatus {
        self.status
    }
    fn set_status(&mut self, status: VaccinationStatus) {
        self.status = status;
    }
}

impl DoseState for Vaccination {
    fn vaccine_name(&self) -> &str {
        &self.vaccine_name
    }
    fn vaccine_code(&self) -> &str {
        &self.vaccine_code
    }
    fn scheduled_date(&self) -> NaiveDate {
        self.scheduled_date
    }
    fn administered_date(&self) -> Option<NaiveDate> {
        self.administered_date
    }
    fn status(&self) -> VaccinationStatus {
        self.status
    }
    fn set_status(&mut self, status: VaccinationStatus) {
        self.status = status;
    }
}

/// Instantiate every schedule entry for a child born on `birth_date`.
/// Output order follows the schedule (ascending `days_from_birth`).
pub fn generate_schedule(schedule: &[DoseDefinition], birth_date: NaiveDate) -> Vec<VaccinationDose> {
    schedule
        .iter()
        .map(|def| VaccinationDose {
            vaccine_name: def.name.clone(),
            vaccine_code: def.code.clone(),
            description: def.description.clone(),
            days_from_birth: def.days_from_birth,
            scheduled_date: add_days(birth_date, def.days_from_birth as i64),
            administered_date: None,
            status: VaccinationStatus::Pending,
        })
        .collect()
}

pub fn classify_status(
    scheduled_date: NaiveDate,
    administered_date: Option<NaiveDate>,
    today: NaiveDate,
) -> VaccinationStatus {
    if administered_date.is_some() {
        return VaccinationStatus::Completed;
    }
    if today > scheduled_date {
        if days_between(scheduled_date, today) > OVERDUE_GRACE_DAYS {
            VaccinationStatus::Overdue
        } else {
            VaccinationStatus::Due
        }
    } else {
        VaccinationStatus::Pending
    }
}

/// Like [`classify_status`], but a skipped dose with no administered date stays skipped.
pub fn refresh_status(
    current: VaccinationStatus,
    scheduled_date: NaiveDate,
    administered_date: Option<NaiveDate>,
    today: NaiveDate,
) -> VaccinationStatus {
    if current == VaccinationStatus::Skipped && administered_date.is_none() {
        return VaccinationStatus::Skipped;
    }
    classify_status(scheduled_date, administered_date, today)
}

/// Reclassify every dose as of `today` and order by scheduled date.
/// Returns how many statuses changed.
pub fn refresh_schedule<D: DoseState>(doses: &mut [D], today: NaiveDate) -> usize {
    let mut changed = 0;
    for dose in doses.iter_mut() {
        let next = refresh_status(
            dose.status(),
            dose.scheduled_date(),
            dose.administered_date(),
            today,
        );
        if next != dose.status() {
            dose.set_status(next);
            changed += 1;
        }
    }
    doses.sort_by_key(|d| d.scheduled_date());
    changed
}

/// The earliest dose still waiting to be given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextDose {
    pub vaccine_name: String,
    pub vaccine_code: String,
    pub scheduled_date: NaiveDate,
    pub status: VaccinationStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaccinationSummary {
    pub total: usize,
    pub completed: usize,
    pub due: usize,
    pub overdue: usize,
    pub pending: usize,
    pub skipped: usize,
    pub next_dose: Option<NextDose>,
}

impl VaccinationSummary {
    pub fn is_up_to_date(&self) -> bool {
        self.due == 0 && self.overdue == 0
    }
}

/// Count statuses as they stand. Callers refresh first if they want "today".
pub fn summarize<D: DoseState>(doses: &[D]) -> VaccinationSummary {
    let mut summary = VaccinationSummary {
        total: doses.len(),
        ..Default::default()
    };

    for dose in doses {
        match dose.status() {
            VaccinationStatus::Completed => summary.completed += 1,
            VaccinationStatus::Due => summary.due += 1,
            VaccinationStatus::Overdue => summary.overdue += 1,
            VaccinationStatus::Pending => summary.pending += 1,
            VaccinationStatus::Skipped => summary.skipped += 1,
        }
    }

    summary.next_dose = doses
        .iter()
        .filter(|d| {
            matches!(
                d.status(),
                VaccinationStatus::Due | VaccinationStatus::Overdue | VaccinationStatus::Pending
            )
        })
        .min_by_key(|d| d.scheduled_date())
        .map(|d| NextDose {
            vaccine_name: d.vaccine_name().to_string(),
            vaccine_code: d.vaccine_code().to_string(),
            scheduled_date: d.scheduled_date(),
            status: d.status(),
        });

    summary
}
