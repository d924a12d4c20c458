// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Performance record routes.

use crate::error::Result;
use crate::models::performance::{
    Metric, SkillAssessment, SkillAssessmentInput, VideoAnnotation, VideoAnnotationInput,
};
use crate::models::{new_id, Performance};
use crate::routes::extract::ValidJson;
use crate::routes::items::{push_item, ItemAccess};
use crate::routes::{created, ok, ok_message, ApiResponse};
use crate::services::analytics::{performance_analytics, PerformanceAnalytics};
use crate::services::authz::{Action, Actor, ResourceType};
use crate::services::ownership::{resolve, resolve_athlete};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const RESOURCE: ResourceType = ResourceType::Performance;

/// Performance routes, nested under `/api/performance`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_performance))
        .route(
            "/{id}",
            get(get_performance)
                .put(update_performance)
                .delete(delete_performance),
        )
        .route("/athlete/{athlete_id}", get(list_for_athlete))
        .route("/athlete/{athlete_id}/analytics", get(analytics_for_athlete))
        .route("/{id}/assessments", post(add_assessment))
        .route("/{id}/assessments/{item_id}", delete(remove_assessment))
        .route("/{id}/annotations", post(add_annotation))
        .route("/{id}/annotations/{item_id}", delete(remove_annotation))
}

#[derive(Serialize)]
pub struct PerformanceEnvelope {
    pub performance: Performance,
}

#[derive(Serialize)]
pub struct PerformanceList {
    pub performances: Vec<Performance>,
    pub count: usize,
}

// ─── Records ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePerformanceRequest {
    #[validate(length(min = 1))]
    pub athlete_id: String,
    pub date: NaiveDate,
    #[validate(length(min = 1, max = 100))]
    pub sport: String,
    #[validate(length(max = 200))]
    pub event: Option<String>,
    #[validate(length(max = 200))]
    pub competition: Option<String>,
    #[validate(range(min = 1))]
    pub placement: Option<u32>,
    #[serde(default)]
    #[validate(nested)]
    pub metrics: Vec<Metric>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

async fn create_performance(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ValidJson(body): ValidJson<CreatePerformanceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PerformanceEnvelope>>)> {
    let chain = resolve_athlete(&state.db, &body.athlete_id).await?;
    chain.ensure(&actor, RESOURCE, Action::Create)?;

    let now = Utc::now();
    let performance = Performance {
        id: new_id(),
        athlete_id: chain.athlete.id.clone(),
        recorded_by: actor.id.clone(),
        date: body.date,
        sport: body.sport,
        event: body.event,
        competition: body.competition,
        placement: body.placement,
        metrics: body.metrics,
        notes: body.notes,
        skill_assessments: Vec::new(),
        video_annotations: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    state.db.put(&performance).await?;

    tracing::info!(
        performance_id = %performance.id,
        athlete_id = %performance.athlete_id,
        recorded_by = %actor.id,
        "Performance recorded"
    );
    Ok(created(PerformanceEnvelope { performance }))
}

async fn get_performance(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PerformanceEnvelope>>> {
    let (performance, chain) = resolve::<Performance>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Read)?;
    Ok(ok(PerformanceEnvelope { performance }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePerformanceRequest {
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 100))]
    pub sport: Option<String>,
    #[validate(length(max = 200))]
    pub event: Option<String>,
    #[validate(length(max = 200))]
    pub competition: Option<String>,
    #[validate(range(min = 1))]
    pub placement: Option<u32>,
    #[validate(nested)]
    pub metrics: Option<Vec<Metric>>,
    #[validate(length(max = 5000))]
    pub notes: Option<String>,
}

async fn update_performance(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<UpdatePerformanceRequest>,
) -> Result<Json<ApiResponse<PerformanceEnvelope>>> {
    let (mut performance, chain) = resolve::<Performance>(&state.db, &id).await?;
    chain.ensure_item(&actor, RESOURCE, Action::Update, &performance.recorded_by)?;

    if let Some(date) = body.date {
        performance.date = date;
    }
    if let Some(sport) = body.sport {
        performance.sport = sport;
    }
    if body.event.is_some() {
        performance.event = body.event;
    }
    if body.competition.is_some() {
        performance.competition = body.competition;
    }
    if body.placement.is_some() {
        performance.placement = body.placement;
    }
    if let Some(metrics) = body.metrics {
        performance.metrics = metrics;
    }
    if body.notes.is_some() {
        performance.notes = body.notes;
    }
    performance.updated_at = Utc::now();
    state.db.put(&performance).await?;

    Ok(ok(PerformanceEnvelope { performance }))
}

async fn delete_performance(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let (performance, chain) = resolve::<Performance>(&state.db, &id).await?;
    chain.ensure_item(&actor, RESOURCE, Action::Delete, &performance.recorded_by)?;

    state.db.delete::<Performance>(&performance.id).await?;
    tracing::info!(performance_id = %performance.id, by = %actor.id, "Performance deleted");
    Ok(ok_message("Performance record deleted"))
}

async fn list_for_athlete(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(athlete_id): Path<String>,
) -> Result<Json<ApiResponse<PerformanceList>>> {
    let chain = resolve_athlete(&state.db, &athlete_id).await?;
    chain.ensure(&actor, RESOURCE, Action::Read)?;

    let performances = state.db.performances_for_athlete(&athlete_id).await?;
    Ok(ok(PerformanceList {
        count: performances.len(),
        performances,
    }))
}

async fn analytics_for_athlete(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(athlete_id): Path<String>,
) -> Result<Json<ApiResponse<PerformanceAnalytics>>> {
    let chain = resolve_athlete(&state.db, &athlete_id).await?;
    chain.ensure(&actor, RESOURCE, Action::Read)?;

    let performances = state.db.performances_for_athlete(&athlete_id).await?;
    Ok(ok(performance_analytics(&performances)))
}

// ─── Skill Assessments ───────────────────────────────────────

async fn add_assessment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<SkillAssessmentInput>,
) -> Result<(StatusCode, Json<ApiResponse<SkillAssessment>>)> {
    let (mut performance, chain) = resolve::<Performance>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Create)?;

    let now = Utc::now();
    let item = push_item(&mut performance.skill_assessments, body, &actor, now);
    performance.updated_at = now;
    state.db.put(&performance).await?;

    Ok(created(item))
}

async fn remove_assessment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>> {
    let (mut performance, chain) = resolve::<Performance>(&state.db, &id).await?;
    ItemAccess {
        chain: &chain,
        actor: &actor,
        resource: RESOURCE,
        label: "Skill assessment",
    }
    .remove(&mut performance.skill_assessments, &item_id)?;

    performance.updated_at = Utc::now();
    state.db.put(&performance).await?;
    Ok(ok_message("Skill assessment removed"))
}

// ─── Video Annotations ───────────────────────────────────────

async fn add_annotation(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<VideoAnnotationInput>,
) -> Result<(StatusCode, Json<ApiResponse<VideoAnnotation>>)> {
    let (mut performance, chain) = resolve::<Performance>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Create)?;

    let now = Utc::now();
    let item = push_item(&mut performance.video_annotations, body, &actor, now);
    performance.updated_at = now;
    state.db.put(&performance).await?;

    Ok(created(item))
}

async fn remove_annotation(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>> {
    let (mut performance, chain) = resolve::<Performance>(&state.db, &id).await?;
    ItemAccess {
        chain: &chain,
        actor: &actor,
        resource: RESOURCE,
        label: "Video annotation",
    }
    .remove(&mut performance.video_annotations, &item_id)?;

    performance.updated_at = Utc::now();
    state.db.put(&performance).await?;
    Ok(ok_message("Video annotation removed"))
}
