// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Financial profile routes.

use crate::error::{AppError, Result};
use crate::models::financial::{
    Investment, InvestmentInput, LedgerEntry, LedgerEntryInput, Sponsorship, SponsorshipInput,
};
use crate::models::FinancialProfile;
use crate::routes::extract::ValidJson;
use crate::routes::items::{collection_routes, Collection};
use crate::routes::{created_or_ok, ok, ok_message, ApiResponse};
use crate::services::analytics::{financial_summary, FinancialSummary};
use crate::services::authz::{Action, Actor, ResourceType};
use crate::services::ownership::{resolve, resolve_athlete};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const RESOURCE: ResourceType = ResourceType::Financial;

pub struct Income;
pub struct Expenses;
pub struct Sponsorships;
pub struct Investments;

impl Collection for Income {
    type Parent = FinancialProfile;
    type Item = LedgerEntry;
    type Input = LedgerEntryInput;
    const LABEL: &'static str = "Income entry";

    fn items(parent: &mut FinancialProfile) -> &mut Vec<LedgerEntry> {
        &mut parent.income
    }
}

impl Collection for Expenses {
    type Parent = FinancialProfile;
    type Item = LedgerEntry;
    type Input = LedgerEntryInput;
    const LABEL: &'static str = "Expense entry";

    fn items(parent: &mut FinancialProfile) -> &mut Vec<LedgerEntry> {
        &mut parent.expenses
    }
}

impl Collection for Sponsorships {
    type Parent = FinancialProfile;
    type Item = Sponsorship;
    type Input = SponsorshipInput;
    const LABEL: &'static str = "Sponsorship";

    fn items(parent: &mut FinancialProfile) -> &mut Vec<Sponsorship> {
        &mut parent.sponsorships
    }
}

impl Collection for Investments {
    type Parent = FinancialProfile;
    type Item = Investment;
    type Input = InvestmentInput;
    const LABEL: &'static str = "Investment";

    fn items(parent: &mut FinancialProfile) -> &mut Vec<Investment> {
        &mut parent.investments
    }
}

/// Financial routes, nested under `/api/financial`.
pub fn routes() -> Router<Arc<AppState>> {
    let router = Router::new()
        .route("/", post(create_profile))
        .route(
            "/{id}",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
        .route("/athlete/{athlete_id}", get(profile_for_athlete))
        .route("/athlete/{athlete_id}/summary", get(summary_for_athlete));

    let router = collection_routes::<Income>(router, "income");
    let router = collection_routes::<Expenses>(router, "expenses");
    let router = collection_routes::<Sponsorships>(router, "sponsorships");
    collection_routes::<Investments>(router, "investments")
}

#[derive(Serialize)]
pub struct FinancialEnvelope {
    pub financial: FinancialProfile,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFinancialRequest {
    #[validate(length(min = 1))]
    pub athlete_id: String,
    /// ISO 4217 code, applied only when the profile is created
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
}

async fn create_profile(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ValidJson(body): ValidJson<CreateFinancialRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FinancialEnvelope>>)> {
    let chain = resolve_athlete(&state.db, &body.athlete_id).await?;
    chain.ensure(&actor, RESOURCE, Action::Create)?;

    let currency = body.currency.map(|c| c.to_ascii_uppercase());
    let (financial, was_created) = state
        .db
        .get_or_create_financial(&chain.athlete.id, currency)
        .await?;

    Ok(created_or_ok(FinancialEnvelope { financial }, was_created))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<FinancialEnvelope>>> {
    let (financial, chain) = resolve::<FinancialProfile>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Read)?;
    Ok(ok(FinancialEnvelope { financial }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFinancialRequest {
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<UpdateFinancialRequest>,
) -> Result<Json<ApiResponse<FinancialEnvelope>>> {
    let (mut financial, chain) = resolve::<FinancialProfile>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Update)?;

    if let Some(currency) = body.currency {
        financial.currency = currency.to_ascii_uppercase();
    }
    financial.updated_at = Utc::now();
    state.db.put(&financial).await?;

    Ok(ok(FinancialEnvelope { financial }))
}

async fn delete_profile(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let (financial, chain) = resolve::<FinancialProfile>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Delete)?;

    state.db.delete::<FinancialProfile>(&financial.id).await?;
    tracing::info!(financial_id = %financial.id, by = %actor.id, "Financial profile deleted");
    Ok(ok_message("Financial profile deleted"))
}

async fn profile_for_athlete(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(athlete_id): Path<String>,
) -> Result<Json<ApiResponse<FinancialEnvelope>>> {
    let chain = resolve_athlete(&state.db, &athlete_id).await?;
    chain.ensure(&actor, RESOURCE, Action::Read)?;

    let financial = state
        .db
        .financial_for_athlete(&athlete_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Financial profile not found".to_string()))?;
    Ok(ok(FinancialEnvelope { financial }))
}

async fn summary_for_athlete(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(athlete_id): Path<String>,
) -> Result<Json<ApiResponse<FinancialSummary>>> {
    let chain = resolve_athlete(&state.db, &athlete_id).await?;
    chain.ensure(&actor, RESOURCE, Action::Read)?;

    let financial = state
        .db
        .financial_for_athlete(&athlete_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Financial profile not found".to_string()))?;
    Ok(ok(financial_summary(&financial)))
}
