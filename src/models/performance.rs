// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Performance record model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{new_id, ItemInput, LineItem};

/// One recorded performance (training session, trial or competition).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Performance {
    /// UUID (also used as document ID)
    pub id: String,
    /// Owning athlete
    pub athlete_id: String,
    /// User who recorded it
    pub recorded_by: String,
    pub date: NaiveDate,
    pub sport: String,
    pub event: Option<String>,
    pub competition: Option<String>,
    /// Finishing position, 1 = winner
    pub placement: Option<u32>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    pub notes: Option<String>,
    #[serde(default)]
    pub skill_assessments: Vec<SkillAssessment>,
    #[serde(default)]
    pub video_annotations: Vec<VideoAnnotation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single measured value, e.g. `{ "name": "100m", "value": 10.9, "unit": "s" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Metric {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub value: f64,
    #[validate(length(max = 20))]
    pub unit: Option<String>,
}

/// Coach/scout rating of one skill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillAssessment {
    pub id: String,
    pub skill: String,
    /// 1..=10
    pub rating: u8,
    pub notes: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl LineItem for SkillAssessment {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_by(&self) -> &str {
        &self.created_by
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SkillAssessmentInput {
    #[validate(length(min = 1, max = 100))]
    pub skill: String,
    #[validate(range(min = 1, max = 10))]
    pub rating: u8,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

impl ItemInput<SkillAssessment> for SkillAssessmentInput {
    fn build(self, actor_id: &str, now: DateTime<Utc>) -> SkillAssessment {
        SkillAssessment {
            id: new_id(),
            skill: self.skill,
            rating: self.rating,
            notes: self.notes,
            created_by: actor_id.to_string(),
            created_at: now,
        }
    }

    fn apply(self, item: &mut SkillAssessment, _now: DateTime<Utc>) {
        item.skill = self.skill;
        item.rating = self.rating;
        item.notes = self.notes;
    }
}

/// Timestamped comment on a performance video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAnnotation {
    pub id: String,
    pub video_url: String,
    pub timestamp_seconds: f64,
    pub comment: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl LineItem for VideoAnnotation {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_by(&self) -> &str {
        &self.created_by
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct VideoAnnotationInput {
    #[validate(url)]
    pub video_url: String,
    #[validate(range(min = 0.0))]
    pub timestamp_seconds: f64,
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

impl ItemInput<VideoAnnotation> for VideoAnnotationInput {
    fn build(self, actor_id: &str, now: DateTime<Utc>) -> VideoAnnotation {
        VideoAnnotation {
            id: new_id(),
            video_url: self.video_url,
            timestamp_seconds: self.timestamp_seconds,
            comment: self.comment,
            created_by: actor_id.to_string(),
            created_at: now,
        }
    }

    fn apply(self, item: &mut VideoAnnotation, _now: DateTime<Utc>) {
        item.video_url = self.video_url;
        item.timestamp_seconds = self.timestamp_seconds;
        item.comment = self.comment;
    }
}
