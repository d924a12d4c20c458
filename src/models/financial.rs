// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Financial profile model (one document per athlete).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{new_id, ItemInput, LineItem};

pub const DEFAULT_CURRENCY: &str = "USD";

/// Financial profile stored in the `financials` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialProfile {
    /// UUID (also used as document ID)
    pub id: String,
    pub athlete_id: String,
    /// ISO 4217 code
    pub currency: String,
    #[serde(default)]
    pub income: Vec<LedgerEntry>,
    #[serde(default)]
    pub expenses: Vec<LedgerEntry>,
    #[serde(default)]
    pub sponsorships: Vec<Sponsorship>,
    #[serde(default)]
    pub investments: Vec<Investment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinancialProfile {
    pub fn new(athlete_id: &str, currency: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            athlete_id: athlete_id.to_string(),
            currency: currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            income: Vec::new(),
            expenses: Vec::new(),
            sponsorships: Vec::new(),
            investments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One income or expense entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    /// Payer for income, payee for expenses
    pub source: String,
    /// e.g. "salary", "prize_money", "equipment", "travel"
    pub category: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub recorded_by: String,
    pub recorded_at: DateTime<Utc>,
}

impl LineItem for LedgerEntry {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_by(&self) -> &str {
        &self.recorded_by
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct LedgerEntryInput {
    #[validate(length(min = 1, max = 200))]
    pub source: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub date: NaiveDate,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

impl ItemInput<LedgerEntry> for LedgerEntryInput {
    fn build(self, actor_id: &str, now: DateTime<Utc>) -> LedgerEntry {
        LedgerEntry {
            id: new_id(),
            source: self.source,
            category: self.category,
            amount: self.amount,
            date: self.date,
            description: self.description,
            recorded_by: actor_id.to_string(),
            recorded_at: now,
        }
    }

    fn apply(self, item: &mut LedgerEntry, _now: DateTime<Utc>) {
        item.source = self.source;
        item.category = self.category;
        item.amount = self.amount;
        item.date = self.date;
        item.description = self.description;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SponsorshipStatus {
    Active,
    Pending,
    Ended,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sponsorship {
    pub id: String,
    pub sponsor: String,
    /// Contract value
    pub amount: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: SponsorshipStatus,
    pub recorded_by: String,
    pub recorded_at: DateTime<Utc>,
}

impl LineItem for Sponsorship {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_by(&self) -> &str {
        &self.recorded_by
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SponsorshipInput {
    #[validate(length(min = 1, max = 200))]
    pub sponsor: String,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: Option<SponsorshipStatus>,
}

impl ItemInput<Sponsorship> for SponsorshipInput {
    fn build(self, actor_id: &str, now: DateTime<Utc>) -> Sponsorship {
        Sponsorship {
            id: new_id(),
            sponsor: self.sponsor,
            amount: self.amount,
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status.unwrap_or(SponsorshipStatus::Active),
            recorded_by: actor_id.to_string(),
            recorded_at: now,
        }
    }

    fn apply(self, item: &mut Sponsorship, _now: DateTime<Utc>) {
        item.sponsor = self.sponsor;
        item.amount = self.amount;
        item.start_date = self.start_date;
        item.end_date = self.end_date;
        if let Some(status) = self.status {
            item.status = status;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    pub id: String,
    pub name: String,
    /// e.g. "stocks", "real_estate", "bonds"
    pub kind: Option<String>,
    pub amount_invested: f64,
    pub current_value: Option<f64>,
    pub date: NaiveDate,
    pub recorded_by: String,
    pub recorded_at: DateTime<Utc>,
}

impl LineItem for Investment {
    fn id(&self) -> &str {
        &self.id
    }
    fn created_by(&self) -> &str {
        &self.recorded_by
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct InvestmentInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub kind: Option<String>,
    #[validate(range(min = 0.0))]
    pub amount_invested: f64,
    #[validate(range(min = 0.0))]
    pub current_value: Option<f64>,
    pub date: NaiveDate,
}

impl ItemInput<Investment> for InvestmentInput {
    fn build(self, actor_id: &str, now: DateTime<Utc>) -> Investment {
        Investment {
            id: new_id(),
            name: self.name,
            kind: self.kind,
            amount_invested: self.amount_invested,
            current_value: self.current_value,
            date: self.date,
            recorded_by: actor_id.to_string(),
            recorded_at: now,
        }
    }

    fn apply(self, item: &mut Investment, _now: DateTime<Utc>) {
        item.name = self.name;
        item.kind = self.kind;
        item.amount_invested = self.amount_invested;
        item.current_value = self.current_value;
        item.date = self.date;
    }
}
