// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Aggregations over records that are already loaded.
//!
//! Everything here is synchronous and side-effect free; handlers load the
//! documents, authorize, then call into this module.

use crate::models::career::{Career, GoalStatus, OpportunityStatus};
use crate::models::financial::{FinancialProfile, LedgerEntry, SponsorshipStatus};
use crate::models::injury::{Injury, InjuryStatus, PhaseStatus, Severity};
use crate::models::performance::Performance;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Placements at or above this count as a podium finish.
const PODIUM_PLACEMENT: u32 = 3;

/// `part / whole * 100`, or `None` when `whole` is zero.
fn percent(part: f64, whole: f64) -> Option<f64> {
    (whole != 0.0).then(|| part / whole * 100.0)
}

// ─── Performance ─────────────────────────────────────────────────

/// Per-metric statistics across an athlete's records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MetricSummary {
    pub name: String,
    pub unit: Option<String>,
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Value from the earliest record
    pub first: f64,
    /// Value from the most recent record
    pub latest: f64,
    /// `(latest - first) / first * 100`; absent when `first` is zero
    pub change_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PerformanceAnalytics {
    pub record_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub metrics: Vec<MetricSummary>,
    pub average_placement: Option<f64>,
    /// Share of placed records with placement <= 3, as a percentage
    pub podium_rate: Option<f64>,
    /// Average assessment rating per skill
    pub skill_ratings: BTreeMap<String, f64>,
}

/// Summarize an athlete's performance history. Input order does not matter.
pub fn performance_analytics(records: &[Performance]) -> PerformanceAnalytics {
    let mut sorted: Vec<&Performance> = records.iter().collect();
    sorted.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.created_at.cmp(&b.created_at)));

    // name -> (unit, values in chronological order)
    let mut series: BTreeMap<&str, (Option<&str>, Vec<f64>)> = BTreeMap::new();
    for record in &sorted {
        for metric in &record.metrics {
            let entry = series
                .entry(metric.name.as_str())
                .or_insert((metric.unit.as_deref(), Vec::new()));
            entry.1.push(metric.value);
        }
    }

    let metrics = series
        .into_iter()
        .filter_map(|(name, (unit, values))| {
            let first = *values.first()?;
            let latest = *values.last()?;
            let count = values.len();
            Some(MetricSummary {
                name: name.to_string(),
                unit: unit.map(str::to_string),
                count,
                average: values.iter().sum::<f64>() / count as f64,
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                first,
                latest,
                change_percent: percent(latest - first, first),
            })
        })
        .collect();

    let placements: Vec<u32> = sorted.iter().filter_map(|r| r.placement).collect();
    let average_placement = (!placements.is_empty())
        .then(|| placements.iter().map(|&p| p as f64).sum::<f64>() / placements.len() as f64);
    let podiums = placements.iter().filter(|&&p| p <= PODIUM_PLACEMENT).count();
    let podium_rate = percent(podiums as f64, placements.len() as f64);

    let mut ratings: BTreeMap<&str, (u32, usize)> = BTreeMap::new();
    for assessment in sorted.iter().flat_map(|r| &r.skill_assessments) {
        let entry = ratings.entry(assessment.skill.as_str()).or_insert((0, 0));
        entry.0 += u32::from(assessment.rating);
        entry.1 += 1;
    }
    let skill_ratings = ratings
        .into_iter()
        .map(|(skill, (sum, n))| (skill.to_string(), sum as f64 / n as f64))
        .collect();

    PerformanceAnalytics {
        record_count: records.len(),
        first_date: sorted.first().map(|r| r.date),
        last_date: sorted.last().map(|r| r.date),
        metrics,
        average_placement,
        podium_rate,
        skill_ratings,
    }
}

// ─── Financial ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FinancialSummary {
    pub currency: String,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net: f64,
    /// `net / total_income` as a percentage
    pub savings_rate: Option<f64>,
    pub income_by_category: BTreeMap<String, f64>,
    pub expenses_by_category: BTreeMap<String, f64>,
    pub active_sponsorships: usize,
    pub active_sponsorship_value: f64,
    pub total_invested: f64,
    /// Investments without a current value count at their invested amount
    pub investment_value: f64,
    pub investment_return_percent: Option<f64>,
}

fn by_category(entries: &[LedgerEntry]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for entry in entries {
        *totals.entry(entry.category.clone()).or_insert(0.0) += entry.amount;
    }
    totals
}

pub fn financial_summary(profile: &FinancialProfile) -> FinancialSummary {
    let total_income: f64 = profile.income.iter().map(|e| e.amount).sum();
    let total_expenses: f64 = profile.expenses.iter().map(|e| e.amount).sum();
    let net = total_income - total_expenses;

    let active: Vec<_> = profile
        .sponsorships
        .iter()
        .filter(|s| s.status == SponsorshipStatus::Active)
        .collect();

    let total_invested: f64 = profile.investments.iter().map(|i| i.amount_invested).sum();
    let investment_value: f64 = profile
        .investments
        .iter()
        .map(|i| i.current_value.unwrap_or(i.amount_invested))
        .sum();

    FinancialSummary {
        currency: profile.currency.clone(),
        total_income,
        total_expenses,
        net,
        savings_rate: percent(net, total_income),
        income_by_category: by_category(&profile.income),
        expenses_by_category: by_category(&profile.expenses),
        active_sponsorships: active.len(),
        active_sponsorship_value: active.iter().map(|s| s.amount).sum(),
        total_invested,
        investment_value,
        investment_return_percent: percent(investment_value - total_invested, total_invested),
    }
}

// ─── Career ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CareerProgress {
    pub total_goals: usize,
    pub goals_pending: usize,
    pub goals_in_progress: usize,
    pub goals_achieved: usize,
    pub goals_abandoned: usize,
    /// Achieved goals as a percentage of all goals
    pub completion_rate: Option<f64>,
    /// Competitions dated today or later, soonest first
    pub upcoming_competitions: Vec<UpcomingCompetition>,
    pub open_opportunities: usize,
    pub mentor_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UpcomingCompetition {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub location: Option<String>,
}

pub fn career_progress(career: &Career, today: NaiveDate) -> CareerProgress {
    let count = |status: GoalStatus| career.goals.iter().filter(|g| g.status == status).count();
    let goals_achieved = count(GoalStatus::Achieved);

    let mut upcoming: Vec<UpcomingCompetition> = career
        .competitions
        .iter()
        .filter(|c| c.date >= today)
        .map(|c| UpcomingCompetition {
            id: c.id.clone(),
            name: c.name.clone(),
            date: c.date,
            location: c.location.clone(),
        })
        .collect();
    upcoming.sort_by_key(|c| c.date);

    CareerProgress {
        total_goals: career.goals.len(),
        goals_pending: count(GoalStatus::Pending),
        goals_in_progress: count(GoalStatus::InProgress),
        goals_achieved,
        goals_abandoned: count(GoalStatus::Abandoned),
        completion_rate: percent(goals_achieved as f64, career.goals.len() as f64),
        upcoming_competitions: upcoming,
        open_opportunities: career
            .opportunities
            .iter()
            .filter(|o| o.status == OpportunityStatus::Open)
            .count(),
        mentor_count: career.mentors.len(),
    }
}

// ─── Injury ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct InjuryRecommendations {
    pub injury_id: String,
    pub severity: Severity,
    pub status: InjuryStatus,
    pub latest_pain_level: Option<u8>,
    pub latest_mobility_percent: Option<u8>,
    pub phases_completed: usize,
    pub phases_total: usize,
    pub recommendations: Vec<String>,
}

/// Pain level at or above which training load should stop.
const HIGH_PAIN: u8 = 7;
/// Pain level at or below which light activity may resume.
const LOW_PAIN: u8 = 3;
const LOW_MOBILITY: u8 = 50;
const FULL_MOBILITY: u8 = 90;

/// Static rule-based guidance for one injury.
pub fn injury_recommendations(injury: &Injury) -> InjuryRecommendations {
    let latest_pain = injury
        .progress_notes
        .iter()
        .filter(|n| n.pain_level.is_some())
        .max_by_key(|n| n.created_at)
        .and_then(|n| n.pain_level);
    let latest_mobility = injury
        .progress_notes
        .iter()
        .filter(|n| n.mobility_percent.is_some())
        .max_by_key(|n| n.created_at)
        .and_then(|n| n.mobility_percent);

    let phases_total = injury.rehabilitation_phases.len();
    let phases_completed = injury
        .rehabilitation_phases
        .iter()
        .filter(|p| p.status == PhaseStatus::Completed)
        .count();

    let mut recs = Vec::new();

    match injury.severity {
        Severity::Critical => {
            recs.push("Seek immediate specialist medical assessment.".to_string());
            recs.push("Suspend all training until cleared by a physician.".to_string());
        }
        Severity::Severe => {
            recs.push("Follow a supervised rehabilitation program with a physiotherapist.".to_string());
            recs.push("Avoid load on the injured area until cleared.".to_string());
        }
        Severity::Moderate => {
            recs.push("Reduce training load and focus on pain-free movement.".to_string());
        }
        Severity::Minor => {
            recs.push("Rest, ice and monitor symptoms for 48-72 hours.".to_string());
        }
    }

    match injury.status {
        InjuryStatus::Active => {
            recs.push(format!(
                "Protect the {} and schedule a follow-up assessment.",
                injury.body_part
            ));
        }
        InjuryStatus::Recovering => {
            recs.push("Continue rehabilitation exercises and increase load gradually.".to_string());
        }
        InjuryStatus::Recovered => {
            recs.push("Maintain preventive strength and mobility work.".to_string());
        }
    }

    match latest_pain {
        Some(p) if p >= HIGH_PAIN => {
            recs.push("Pain is high: stop loading activities and consult medical staff.".to_string())
        }
        Some(p) if p <= LOW_PAIN && injury.status != InjuryStatus::Recovered => {
            recs.push("Pain is low: light sport-specific activity may be introduced.".to_string())
        }
        _ => {}
    }

    match latest_mobility {
        Some(m) if m < LOW_MOBILITY => {
            recs.push("Mobility is limited: prioritize range-of-motion work.".to_string())
        }
        Some(m) if m >= FULL_MOBILITY && injury.status != InjuryStatus::Recovered => recs
            .push("Mobility is near full: consider a return-to-play assessment.".to_string()),
        _ => {}
    }

    if phases_total == 0 {
        if injury.status != InjuryStatus::Recovered {
            recs.push("No rehabilitation plan recorded: define rehabilitation phases.".to_string());
        }
    } else if phases_completed == phases_total && injury.status != InjuryStatus::Recovered {
        recs.push(
            "All rehabilitation phases completed: evaluate for return to full training."
                .to_string(),
        );
    } else if let Some(next) = injury
        .rehabilitation_phases
        .iter()
        .find(|p| p.status != PhaseStatus::Completed)
    {
        recs.push(format!("Current rehabilitation focus: {}.", next.name));
    }

    InjuryRecommendations {
        injury_id: injury.id.clone(),
        severity: injury.severity,
        status: injury.status,
        latest_pain_level: latest_pain,
        latest_mobility_percent: latest_mobility,
        phases_completed,
        phases_total,
        recommendations: recs,
    }
}
