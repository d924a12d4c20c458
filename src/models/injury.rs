// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Injury record model with rehabilitation tracking.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use super::{new_id, ItemInput, LineItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum InjuryStatus {
    Active,
    Recovering,
    Recovered,
}

/// Injury record stored in the `injuries` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Injury {
    /// UUID (also used as document ID)
    pub id: String,
    pub athlete_id: String,
    pub reported_by: String,
    pub injury_type: String,
    pub body_part: String,
    pub severity: Severity,
    pub status: InjuryStatus,
    pub date_of_injury: NaiveDate,
    pub expected_recovery_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub treatment: Option<String>,
    #[serde(default)]
    pub rehabilitation_phases: Vec<RehabPhase>,
    #[serde(default)]
    pub progress_notes: Vec<ProgressNote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Planned,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RehabPhase {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: PhaseStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl LineItem for RehabPhase {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_by(&self) -> &str {
        &self.created_by
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RehabPhaseInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<PhaseStatus>,
}

impl ItemInput<RehabPhase> for RehabPhaseInput {
    fn build(self, actor_id: &str, now: DateTime<Utc>) -> RehabPhase {
        RehabPhase {
            id: new_id(),
            name: self.name,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status.unwrap_or(PhaseStatus::Planned),
            created_by: actor_id.to_string(),
            created_at: now,
        }
    }

    fn apply(self, item: &mut RehabPhase, _now: DateTime<Utc>) {
        item.name = self.name;
        item.description = self.description;
        item.start_date = self.start_date;
        item.end_date = self.end_date;
        if let Some(status) = self.status {
            item.status = status;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressNote {
    pub id: String,
    pub note: String,
    /// 0 (none) ..= 10 (worst)
    pub pain_level: Option<u8>,
    /// 0 ..= 100
    pub mobility_percent: Option<u8>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl LineItem for ProgressNote {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_by(&self) -> &str {
        &self.created_by
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProgressNoteInput {
    #[validate(length(min = 1, max = 4000))]
    pub note: String,
    #[validate(range(max = 10))]
    pub pain_level: Option<u8>,
    #[validate(range(max = 100))]
    pub mobility_percent: Option<u8>,
}

impl ItemInput<ProgressNote> for ProgressNoteInput {
    fn build(self, actor_id: &str, now: DateTime<Utc>) -> ProgressNote {
        ProgressNote {
            id: new_id(),
            note: self.note,
            pain_level: self.pain_level,
            mobility_percent: self.mobility_percent,
            created_by: actor_id.to_string(),
            created_at: now,
        }
    }

    fn apply(self, item: &mut ProgressNote, _now: DateTime<Utc>) {
        item.note = self.note;
        item.pain_level = self.pain_level;
        item.mobility_percent = self.mobility_percent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Severe);
        assert!(Severity::Moderate > Severity::Minor);
    }

    #[test]
    fn test_phase_defaults_to_planned() {
        let phase = RehabPhaseInput {
            name: "Mobility".into(),
            description: None,
            start_date: None,
            end_date: None,
            status: None,
        }
        .build("physio-1", Utc::now());
        assert_eq!(phase.status, PhaseStatus::Planned);
        assert_eq!(phase.created_by(), "physio-1");
    }
}
