// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Career routes: the per-athlete career document and its goals,
//! competitions, mentors and opportunities.

use crate::error::{AppError, Result};
use crate::models::career::{
    Competition, CompetitionInput, Goal, GoalInput, Mentor, MentorInput, Opportunity,
    OpportunityInput,
};
use crate::models::Career;
use crate::routes::extract::ValidJson;
use crate::routes::items::{collection_routes, Collection};
use crate::routes::{created_or_ok, ok, ok_message, ApiResponse};
use crate::services::analytics::{career_progress, CareerProgress};
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

const RESOURCE: ResourceType = ResourceType::Career;

pub struct Goals;
pub struct Competitions;
pub struct Mentors;
pub struct Opportunities;

impl Collection for Goals {
    type Parent = Career;
    type Item = Goal;
    type Input = GoalInput;
    const LABEL: &'static str = "Goal";

    fn items(parent: &mut Career) -> &mut Vec<Goal> {
        &mut parent.goals
    }
}

impl Collection for Competitions {
    type Parent = Career;
    type Item = Competition;
    type Input = CompetitionInput;
    const LABEL: &'static str = "Competition";

    fn items(parent: &mut Career) -> &mut Vec<Competition> {
        &mut parent.competitions
    }
}

impl Collection for Mentors {
    type Parent = Career;
    type Item = Mentor;
    type Input = MentorInput;
    const LABEL: &'static str = "Mentor";

    fn items(parent: &mut Career) -> &mut Vec<Mentor> {
        &mut parent.mentors
    }
}

impl Collection for Opportunities {
    type Parent = Career;
    type Item = Opportunity;
    type Input = OpportunityInput;
    const LABEL: &'static str = "Opportunity";

    fn items(parent: &mut Career) -> &mut Vec<Opportunity> {
        &mut parent.opportunities
    }
}

/// Career routes, nested under `/api/career`.
pub fn routes() -> Router<Arc<AppState>> {
    let router = Router::new()
        .route("/", post(create_career))
        .route(
            "/{id}",
            get(get_career).put(update_career).delete(delete_career),
        )
        .route("/athlete/{athlete_id}", get(career_for_athlete))
        .route("/athlete/{athlete_id}/progress", get(progress_for_athlete));

    let router = collection_routes::<Goals>(router, "goals");
    let router = collection_routes::<Competitions>(router, "competitions");
    let router = collection_routes::<Mentors>(router, "mentors");
    collection_routes::<Opportunities>(router, "opportunities")
}

#[derive(Serialize)]
pub struct CareerEnvelope {
    pub career: Career,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCareerRequest {
    #[validate(length(min = 1))]
    pub athlete_id: String,
    #[validate(length(max = 200))]
    pub current_team: Option<String>,
    #[validate(length(max = 100))]
    pub career_stage: Option<String>,
}

/// Returns the existing career untouched, or creates one from the body.
async fn create_career(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ValidJson(body): ValidJson<CreateCareerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CareerEnvelope>>)> {
    let chain = resolve_athlete(&state.db, &body.athlete_id).await?;
    chain.ensure(&actor, RESOURCE, Action::Create)?;

    let (career, was_created) = state
        .db
        .get_or_create_career(&chain.athlete.id, body.current_team, body.career_stage)
        .await?;

    Ok(created_or_ok(CareerEnvelope { career }, was_created))
}

async fn get_career(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CareerEnvelope>>> {
    let (career, chain) = resolve::<Career>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Read)?;
    Ok(ok(CareerEnvelope { career }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCareerRequest {
    #[validate(length(max = 200))]
    pub current_team: Option<String>,
    #[validate(length(max = 100))]
    pub career_stage: Option<String>,
}

async fn update_career(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<UpdateCareerRequest>,
) -> Result<Json<ApiResponse<CareerEnvelope>>> {
    let (mut career, chain) = resolve::<Career>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Update)?;

    if body.current_team.is_some() {
        career.current_team = body.current_team;
    }
    if body.career_stage.is_some() {
        career.career_stage = body.career_stage;
    }
    career.updated_at = Utc::now();
    state.db.put(&career).await?;

    Ok(ok(CareerEnvelope { career }))
}

async fn delete_career(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let (career, chain) = resolve::<Career>(&state.db, &id).await?;
    chain.ensure(&actor, RESOURCE, Action::Delete)?;

    state.db.delete::<Career>(&career.id).await?;
    tracing::info!(career_id = %career.id, by = %actor.id, "Career deleted");
    Ok(ok_message("Career record deleted"))
}

async fn career_for_athlete(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(athlete_id): Path<String>,
) -> Result<Json<ApiResponse<CareerEnvelope>>> {
    let chain = resolve_athlete(&state.db, &athlete_id).await?;
    chain.ensure(&actor, RESOURCE, Action::Read)?;

    let career = state
        .db
        .career_for_athlete(&athlete_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Career record not found".to_string()))?;
    Ok(ok(CareerEnvelope { career }))
}

/// Progress over the stored career; an athlete without one reports zeroes.
async fn progress_for_athlete(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(athlete_id): Path<String>,
) -> Result<Json<ApiResponse<CareerProgress>>> {
    let chain = resolve_athlete(&state.db, &athlete_id).await?;
    chain.ensure(&actor, RESOURCE, Action::Read)?;

    let career = state
        .db
        .career_for_athlete(&athlete_id)
        .await?
        .unwrap_or_else(|| Career::new(&athlete_id));
    Ok(ok(career_progress(&career, Utc::now().date_naive())))
}
