// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Athlete profile model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{new_id, ItemInput, LineItem};

/// Athlete profile stored in the `athletes` collection.
///
/// Owned by exactly one user (`user_id`). Users listed in `coaches` get
/// elevated access to the athlete's performance, injury and career records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Athlete {
    /// UUID (also used as document ID)
    pub id: String,
    /// Owning user
    pub user_id: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub nationality: Option<String>,
    #[serde(default)]
    pub sports: Vec<String>,
    pub primary_sport: Option<String>,
    pub position: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub bio: Option<String>,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    #[serde(default)]
    pub documents: Vec<AthleteDocument>,
    /// User IDs of the athlete's coaches
    #[serde(default)]
    pub coaches: Vec<String>,
    #[serde(default)]
    pub verified: bool,
    pub verified_by: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Athlete {
    /// Empty profile for `user_id`.
    pub fn new(user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            user_id: user_id.to_string(),
            date_of_birth: None,
            gender: None,
            nationality: None,
            sports: Vec::new(),
            primary_sport: None,
            position: None,
            height_cm: None,
            weight_kg: None,
            bio: None,
            achievements: Vec::new(),
            documents: Vec::new(),
            coaches: Vec::new(),
            verified: false,
            verified_by: None,
            verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_coach(&self, user_id: &str) -> bool {
        self.coaches.iter().any(|c| c == user_id)
    }

    /// Add a coach; returns `false` if already present.
    pub fn add_coach(&mut self, user_id: &str) -> bool {
        if self.has_coach(user_id) {
            return false;
        }
        self.coaches.push(user_id.to_string());
        true
    }

    /// Remove a coach; returns `false` if not present.
    pub fn remove_coach(&mut self, user_id: &str) -> bool {
        let before = self.coaches.len();
        self.coaches.retain(|c| c != user_id);
        self.coaches.len() != before
    }
}

/// An achievement on the athlete's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    /// e.g. "national", "international"
    pub level: Option<String>,
    pub added_by: String,
    pub added_at: DateTime<Utc>,
}

impl LineItem for Achievement {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_by(&self) -> &str {
        &self.added_by
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AchievementInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub level: Option<String>,
}

impl ItemInput<Achievement> for AchievementInput {
    fn build(self, actor_id: &str, now: DateTime<Utc>) -> Achievement {
        Achievement {
            id: new_id(),
            title: self.title,
            description: self.description,
            date: self.date,
            level: self.level,
            added_by: actor_id.to_string(),
            added_at: now,
        }
    }

    fn apply(self, item: &mut Achievement, _now: DateTime<Utc>) {
        item.title = self.title;
        item.description = self.description;
        item.date = self.date;
        item.level = self.level;
    }
}

/// Uploaded file attached to the profile (certificates, medical clearances, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteDocument {
    pub id: String,
    pub name: String,
    pub kind: Option<String>,
    /// Public path under `/uploads`
    pub file_path: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

impl LineItem for AthleteDocument {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_by(&self) -> &str {
        &self.uploaded_by
    }
}
