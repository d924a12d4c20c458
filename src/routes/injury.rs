// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Injury, rehabilitation and recovery-progress routes.

use crate::error::Result;
use crate::models::injury::{
    InjuryStatus, ProgressNote, ProgressNoteInput, RehabPhase, RehabPhaseInput, Severity,
};
use crate::models::{new_id, Injury};
use crate::routes::extract::ValidJson;
use crate::routes::items::{push_item, ItemAccess};
use crate::routes::{created, ok, ok_message, ApiResponse};
use crate::services::analytics::{injury_recommendations, InjuryRecommendations};
use crate::services::authz::{Action, Actor, ResourceType};
use crate::services::ownership::{resolve, resolve_athlete, OwnerChain};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const RESOURCE: ResourceType = ResourceType::Injury;

/// Injury routes, nested under `/api/injury`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_injury))
        .route(
            "/{id}",
            get(get_injury).put(update_injury).delete(delete_injury),
        )
        .route("/athlete/{athlete_id}", get(list_for_athlete))
        .route("/{id}/recommendations", get(recommendations))
        .route("/{id}/rehabilitation", post(add_phase))
        .route(
            "/{id}/rehabilitation/{item_id}",
            put(update_phase).delete(remove_phase),
        )
        .route("/{id}/progress", post(add_progress))
        .route("/{id}/progress/{item_id}", delete(remove_progress))
}

#[derive(Serialize)]
pub struct InjuryEnvelope {
    pub injury: Injury,
}

#[derive(Serialize)]
pub struct InjuryList {
    pub injuries: Vec<Injury>,
    pub count: usize,
}

fn phase_access<'a>(chain: &'a OwnerChain, actor: &'a Actor) -> ItemAccess<'a> {
    ItemAccess {
        chain,
        actor,
        resource: RESOURCE,
        label: "Rehabilitation phase",
    }
}

// ─── Records ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInjuryRequest {
    #[validate(length(min = 1))]
    pub athlete_id: String,
    #[validate(length(min = 1, max = 100))]
    pub injury_type: String,
    #[validate(length(min = 1, max = 100))]
    pub body_part: String,
    pub severity: Severity,
    pub status: Option<InjuryStatus>,
    pub date_of_injury: NaiveDate,
    pub expected_recovery_date: Option<NaiveDate>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 5000))]
    pub treatment: Option<String>,
}

async fn create_injury(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ValidJson(body): ValidJson<CreateInjuryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InjuryEnvelope>>)> {
    let chain = resolve_athlete(&state.db, &body.athlete_id).await?;
    chain.ensure(&actor, RESOURCE, Action::Create)?;

    let now = Utc::now();
    let injury = Injury {
        id: new_id(),
        athlete_id: chain.athlete.id.clone(),
        reported_by: actor.id.clone(),
        injury_type: body.injury_type,
        body_part: body.body_part,
        severity: body.severity,
        status: body.status.unwrap_or(InjuryStatus::Active),
        date_of_injury: body.date_of_injury,
        expected_recovery_date: body.expected_recovery_date,
        description: body.description,
        treatment: body.treatment,
        rehabilitation_phases: Vec::new(),
        progress_notes: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    state.db.put(&injury).await?;

    tracing::info!(
        injury_id = %injury.id,
        athlete_id = %injury.athlete_id,
        severity = ?injury.severity,
        reported_by = %actor.id,
        "Injury recorded"
    );
    Ok(created(InjuryEnvelope { injury }))
}

async fn get_injury(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InjuryEnvelope>>> {
    let (injury, chain) = resolve::<Injury>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Read)?;
    Ok(ok(InjuryEnvelope { injury }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateInjuryRequest {
    #[validate(length(min = 1, max = 100))]
    pub injury_type: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub body_part: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<InjuryStatus>,
    pub date_of_injury: Option<NaiveDate>,
    pub expected_recovery_date: Option<NaiveDate>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 5000))]
    pub treatment: Option<String>,
}

async fn update_injury(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<UpdateInjuryRequest>,
) -> Result<Json<ApiResponse<InjuryEnvelope>>> {
    let (mut injury, chain) = resolve::<Injury>(&state.db, &id).await?;
    chain.ensure_item(&actor, RESOURCE, Action::Update, &injury.reported_by)?;

    if let Some(v) = body.injury_type {
        injury.injury_type = v;
    }
    if let Some(v) = body.body_part {
        injury.body_part = v;
    }
    if let Some(v) = body.severity {
        injury.severity = v;
    }
    if let Some(v) = body.status {
        injury.status = v;
    }
    if let Some(v) = body.date_of_injury {
        injury.date_of_injury = v;
    }
    if body.expected_recovery_date.is_some() {
        injury.expected_recovery_date = body.expected_recovery_date;
    }
    if body.description.is_some() {
        injury.description = body.description;
    }
    if body.treatment.is_some() {
        injury.treatment = body.treatment;
    }
    injury.updated_at = Utc::now();
    state.db.put(&injury).await?;

    Ok(ok(InjuryEnvelope { injury }))
}

async fn delete_injury(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let (injury, chain) = resolve::<Injury>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Delete)?;

    state.db.delete::<Injury>(&injury.id).await?;
    tracing::info!(injury_id = %injury.id, by = %actor.id, "Injury deleted");
    Ok(ok_message("Injury record deleted"))
}

async fn list_for_athlete(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(athlete_id): Path<String>,
) -> Result<Json<ApiResponse<InjuryList>>> {
    let chain = resolve_athlete(&state.db, &athlete_id).await?;
    chain.ensure(&actor, RESOURCE, Action::Read)?;

    let injuries = state.db.injuries_for_athlete(&athlete_id).await?;
    Ok(ok(InjuryList {
        count: injuries.len(),
        injuries,
    }))
}

async fn recommendations(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InjuryRecommendations>>> {
    let (injury, chain) = resolve::<Injury>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Read)?;
    Ok(ok(injury_recommendations(&injury)))
}

// ─── Rehabilitation Phases ───────────────────────────────────

async fn add_phase(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<RehabPhaseInput>,
) -> Result<(StatusCode, Json<ApiResponse<RehabPhase>>)> {
    let (mut injury, chain) = resolve::<Injury>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Create)?;

    let now = Utc::now();
    let phase = push_item(&mut injury.rehabilitation_phases, body, &actor, now);
    injury.updated_at = now;
    state.db.put(&injury).await?;

    Ok(created(phase))
}

async fn update_phase(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((id, item_id)): Path<(String, String)>,
    ValidJson(body): ValidJson<RehabPhaseInput>,
) -> Result<Json<ApiResponse<RehabPhase>>> {
    let (mut injury, chain) = resolve::<Injury>(&state.db, &id).await?;

    let now = Utc::now();
    let phase = phase_access(&chain, &actor).update(
        &mut injury.rehabilitation_phases,
        &item_id,
        body,
        now,
    )?;
    injury.updated_at = now;
    state.db.put(&injury).await?;

    Ok(ok(phase))
}

async fn remove_phase(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>> {
    let (mut injury, chain) = resolve::<Injury>(&state.db, &id).await?;
    phase_access(&chain, &actor).remove(&mut injury.rehabilitation_phases, &item_id)?;

    injury.updated_at = Utc::now();
    state.db.put(&injury).await?;
    Ok(ok_message("Rehabilitation phase removed"))
}

// ─── Progress Notes ──────────────────────────────────────────

async fn add_progress(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<ProgressNoteInput>,
) -> Result<(StatusCode, Json<ApiResponse<ProgressNote>>)> {
    let (mut injury, chain) = resolve::<Injury>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Create)?;

    let now = Utc::now();
    let note = push_item(&mut injury.progress_notes, body, &actor, now);
    injury.updated_at = now;
    state.db.put(&injury).await?;

    Ok(created(note))
}

async fn remove_progress(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>> {
    let (mut injury, chain) = resolve::<Injury>(&state.db, &id).await?;
    ItemAccess {
        chain: &chain,
        actor: &actor,
        resource: RESOURCE,
        label: "Progress note",
    }
    .remove(&mut injury.progress_notes, &item_id)?;

    injury.updated_at = Utc::now();
    state.db.put(&injury).await?;
    Ok(ok_message("Progress note removed"))
}
