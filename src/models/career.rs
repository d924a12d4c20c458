// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Career progression model (one document per athlete).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{new_id, ItemInput, LineItem};

/// Career document stored in the `careers` collection.
///
/// Created lazily the first time anything is added for an athlete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Career {
    /// UUID (also used as document ID)
    pub id: String,
    pub athlete_id: String,
    pub current_team: Option<String>,
    /// e.g. "youth", "amateur", "professional", "retired"
    pub career_stage: Option<String>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub competitions: Vec<Competition>,
    #[serde(default)]
    pub mentors: Vec<Mentor>,
    #[serde(default)]
    pub opportunities: Vec<Opportunity>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Career {
    pub fn new(athlete_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            athlete_id: athlete_id.to_string(),
            current_team: None,
            career_stage: None,
            goals: Vec::new(),
            competitions: Vec::new(),
            mentors: Vec::new(),
            opportunities: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ─── Goals ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Pending,
    InProgress,
    Achieved,
    Abandoned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub status: GoalStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LineItem for Goal {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_by(&self) -> &str {
        &self.created_by
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct GoalInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub target_date: Option<NaiveDate>,
    pub status: Option<GoalStatus>,
}

impl ItemInput<Goal> for GoalInput {
    fn build(self, actor_id: &str, now: DateTime<Utc>) -> Goal {
        Goal {
            id: new_id(),
            title: self.title,
            description: self.description,
            target_date: self.target_date,
            status: self.status.unwrap_or(GoalStatus::Pending),
            created_by: actor_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(self, item: &mut Goal, now: DateTime<Utc>) {
        item.title = self.title;
        item.description = self.description;
        item.target_date = self.target_date;
        if let Some(status) = self.status {
            item.status = status;
        }
        item.updated_at = now;
    }
}

// ─── Competitions ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competition {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub location: Option<String>,
    pub level: Option<String>,
    pub result: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl LineItem for Competition {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_by(&self) -> &str {
        &self.created_by
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompetitionInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub date: NaiveDate,
    pub location: Option<String>,
    pub level: Option<String>,
    pub result: Option<String>,
}

impl ItemInput<Competition> for CompetitionInput {
    fn build(self, actor_id: &str, now: DateTime<Utc>) -> Competition {
        Competition {
            id: new_id(),
            name: self.name,
            date: self.date,
            location: self.location,
            level: self.level,
            result: self.result,
            created_by: actor_id.to_string(),
            created_at: now,
        }
    }

    fn apply(self, item: &mut Competition, _now: DateTime<Utc>) {
        item.name = self.name;
        item.date = self.date;
        item.location = self.location;
        item.level = self.level;
        item.result = self.result;
    }
}

// ─── Mentors ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mentor {
    pub id: String,
    pub name: String,
    /// Set when the mentor has an account
    pub mentor_user_id: Option<String>,
    pub expertise: Option<String>,
    pub since: Option<NaiveDate>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl LineItem for Mentor {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_by(&self) -> &str {
        &self.created_by
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct MentorInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub mentor_user_id: Option<String>,
    pub expertise: Option<String>,
    pub since: Option<NaiveDate>,
}

impl ItemInput<Mentor> for MentorInput {
    fn build(self, actor_id: &str, now: DateTime<Utc>) -> Mentor {
        Mentor {
            id: new_id(),
            name: self.name,
            mentor_user_id: self.mentor_user_id,
            expertise: self.expertise,
            since: self.since,
            created_by: actor_id.to_string(),
            created_at: now,
        }
    }

    fn apply(self, item: &mut Mentor, _now: DateTime<Utc>) {
        item.name = self.name;
        item.mentor_user_id = self.mentor_user_id;
        item.expertise = self.expertise;
        item.since = self.since;
    }
}

// ─── Opportunities ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    Open,
    Applied,
    Accepted,
    Declined,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub title: String,
    pub organization: Option<String>,
    /// e.g. "trial", "scholarship", "contract"
    pub kind: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub status: OpportunityStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl LineItem for Opportunity {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_by(&self) -> &str {
        &self.created_by
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct OpportunityInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub organization: Option<String>,
    pub kind: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub status: Option<OpportunityStatus>,
}

impl ItemInput<Opportunity> for OpportunityInput {
    fn build(self, actor_id: &str, now: DateTime<Utc>) -> Opportunity {
        Opportunity {
            id: new_id(),
            title: self.title,
            organization: self.organization,
            kind: self.kind,
            deadline: self.deadline,
            status: self.status.unwrap_or(OpportunityStatus::Open),
            created_by: actor_id.to_string(),
            created_at: now,
        }
    }

    fn apply(self, item: &mut Opportunity, _now: DateTime<Utc>) {
        item.title = self.title;
        item.organization = self.organization;
        item.kind = self.kind;
        item.deadline = self.deadline;
        if let Some(status) = self.status {
            item.status = status;
        }
    }
}
