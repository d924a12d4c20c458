// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete profile routes, including achievements, documents and coaches.

use crate::config::MAX_UPLOAD_BYTES;
use crate::error::{AppError, Result};
use crate::middleware::security::UPLOADS_PREFIX;
use crate::models::athlete::AchievementInput;
use crate::models::{new_id, Achievement, Athlete, AthleteDocument, LineItem, Role, User};
use crate::routes::extract::ValidJson;
use crate::routes::items::{locate, push_item};
use crate::routes::{created, ok, ok_message, ApiResponse};
use crate::services::authz::{authorize, Action, Actor, ResourceType, Target};
use crate::services::ownership::{resolve_athlete, OwnerChain};
use crate::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

/// Athlete routes, nested under `/api/athletes`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_athletes).post(create_athlete))
        .route(
            "/{id}",
            get(get_athlete).put(update_athlete).delete(delete_athlete),
        )
        .route("/{id}/verify", put(verify_athlete))
        .route("/{id}/achievements", post(add_achievement))
        .route("/{id}/achievements/{item_id}", delete(remove_achievement))
        .route("/{id}/documents", post(upload_document))
        .route("/{id}/documents/{item_id}", delete(remove_document))
        .route("/{id}/coaches", post(add_coach))
        .route("/{id}/coaches/{coach_id}", delete(remove_coach))
}

#[derive(Serialize)]
pub struct AthleteEnvelope {
    pub athlete: Athlete,
}

fn athlete_response(athlete: Athlete) -> Json<ApiResponse<AthleteEnvelope>> {
    ok(AthleteEnvelope { athlete })
}

// ─── Listing ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub sport: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Serialize, PartialEq)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

#[derive(Serialize)]
pub struct AthleteList {
    pub athletes: Vec<Athlete>,
    pub pagination: Pagination,
}

fn plays(athlete: &Athlete, sport: &str) -> bool {
    athlete
        .primary_sport
        .iter()
        .chain(athlete.sports.iter())
        .any(|s| s.eq_ignore_ascii_case(sport))
}

/// Slice one page out of `items`. Pages start at 1; `per_page` is capped.
fn paginate<T>(items: Vec<T>, page: Option<usize>, per_page: Option<usize>) -> (Vec<T>, Pagination) {
    let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let page = page.unwrap_or(1).max(1);
    let total = items.len();

    let slice = items
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    (
        slice,
        Pagination {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        },
    )
}

async fn list_athletes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<AthleteList>>> {
    let mut athletes: Vec<Athlete> = state.db.list().await?;

    if let Some(sport) = query.sport.as_deref().filter(|s| !s.is_empty()) {
        athletes.retain(|a| plays(a, sport));
    }
    athletes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let (athletes, pagination) = paginate(athletes, query.page, query.per_page);
    Ok(ok(AthleteList {
        athletes,
        pagination,
    }))
}

// ─── Profile CRUD ────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AthleteFields {
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 50))]
    pub gender: Option<String>,
    #[validate(length(max = 100))]
    pub nationality: Option<String>,
    pub sports: Option<Vec<String>>,
    #[validate(length(min = 1, max = 100))]
    pub primary_sport: Option<String>,
    #[validate(length(max = 100))]
    pub position: Option<String>,
    #[validate(range(min = 0.0, max = 300.0))]
    pub height_cm: Option<f64>,
    #[validate(range(min = 0.0, max = 500.0))]
    pub weight_kg: Option<f64>,
    #[validate(length(max = 5000))]
    pub bio: Option<String>,
}

impl AthleteFields {
    /// Overwrite every field that was supplied.
    fn apply(self, athlete: &mut Athlete) {
        if let Some(v) = self.date_of_birth {
            athlete.date_of_birth = Some(v);
        }
        if let Some(v) = self.gender {
            athlete.gender = Some(v);
        }
        if let Some(v) = self.nationality {
            athlete.nationality = Some(v);
        }
        if let Some(v) = self.sports {
            athlete.sports = v;
        }
        if let Some(v) = self.primary_sport {
            athlete.primary_sport = Some(v);
        }
        if let Some(v) = self.position {
            athlete.position = Some(v);
        }
        if let Some(v) = self.height_cm {
            athlete.height_cm = Some(v);
        }
        if let Some(v) = self.weight_kg {
            athlete.weight_kg = Some(v);
        }
        if let Some(v) = self.bio {
            athlete.bio = Some(v);
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAthleteRequest {
    /// Admins may create a profile for another user
    pub user_id: Option<String>,
    #[serde(flatten)]
    #[validate(nested)]
    pub fields: AthleteFields,
}

async fn create_athlete(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    ValidJson(body): ValidJson<CreateAthleteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AthleteEnvelope>>)> {
    let user_id = body.user_id.clone().unwrap_or_else(|| actor.id.clone());

    if state.db.get::<User>(&user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let target = Target {
        owner_user_id: &user_id,
        coaches: &[],
        item_creator: None,
    };
    authorize(&actor, &target, ResourceType::AthleteProfile, Action::Create).into_result()?;

    if state.db.athlete_for_user(&user_id).await?.is_some() {
        return Err(AppError::BadRequest(
            "Athlete profile already exists for this user".to_string(),
        ));
    }

    let mut athlete = Athlete::new(&user_id);
    body.fields.apply(&mut athlete);
    state.db.put(&athlete).await?;

    tracing::info!(athlete_id = %athlete.id, user_id = %user_id, created_by = %actor.id, "Athlete profile created");
    Ok(created(AthleteEnvelope { athlete }))
}

async fn get_athlete(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AthleteEnvelope>>> {
    let chain = resolve_athlete(&state.db, &id).await?;
    chain.ensure(&actor, ResourceType::AthleteProfile, Action::Read)?;
    Ok(athlete_response(chain.athlete))
}

async fn update_athlete(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<AthleteFields>,
) -> Result<Json<ApiResponse<AthleteEnvelope>>> {
    let chain = resolve_athlete(&state.db, &id).await?;
    chain.ensure(&actor, ResourceType::AthleteProfile, Action::Update)?;

    let mut athlete = chain.athlete;
    body.apply(&mut athlete);
    athlete.updated_at = Utc::now();
    state.db.put(&athlete).await?;

    Ok(athlete_response(athlete))
}

async fn delete_athlete(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let chain = resolve_athlete(&state.db, &id).await?;
    chain.ensure(&actor, ResourceType::AthleteProfile, Action::Delete)?;

    let deleted = state.db.delete_athlete_cascade(&id).await?;
    for document in &chain.athlete.documents {
        remove_stored_file(&state, document).await;
    }

    tracing::info!(athlete_id = %id, deleted, by = %actor.id, "Athlete deleted");
    Ok(ok_message("Athlete profile deleted"))
}

async fn verify_athlete(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AthleteEnvelope>>> {
    let chain = resolve_athlete(&state.db, &id).await?;
    chain.ensure(&actor, ResourceType::AthleteProfile, Action::Verify)?;

    let now = Utc::now();
    let mut athlete = chain.athlete;
    athlete.verified = true;
    athlete.verified_by = Some(actor.id.clone());
    athlete.verified_at = Some(now);
    athlete.updated_at = now;
    state.db.put(&athlete).await?;

    tracing::info!(athlete_id = %athlete.id, verified_by = %actor.id, "Athlete verified");
    Ok(athlete_response(athlete))
}

// ─── Achievements ────────────────────────────────────────────

/// Load the athlete and require `action` on its embedded collections.
async fn collection_chain(
    state: &AppState,
    actor: &Actor,
    id: &str,
    action: Action,
) -> Result<OwnerChain> {
    let chain = resolve_athlete(&state.db, id).await?;
    chain.ensure(actor, ResourceType::AthleteCollection, action)?;
    Ok(chain)
}

async fn add_achievement(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<AchievementInput>,
) -> Result<(StatusCode, Json<ApiResponse<Achievement>>)> {
    let mut athlete = collection_chain(&state, &actor, &id, Action::Create)
        .await?
        .athlete;

    let now = Utc::now();
    let achievement = push_item(&mut athlete.achievements, body, &actor, now);
    athlete.updated_at = now;
    state.db.put(&athlete).await?;

    Ok(created(achievement))
}

async fn remove_achievement(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>> {
    let chain = resolve_athlete(&state.db, &id).await?;
    let index = locate(&chain.athlete.achievements, &item_id, "Achievement")?;
    chain.ensure(&actor, ResourceType::AthleteCollection, Action::Delete)?;

    let mut athlete = chain.athlete;
    athlete.achievements.remove(index);
    athlete.updated_at = Utc::now();
    state.db.put(&athlete).await?;

    Ok(ok_message("Achievement removed"))
}

// ─── Documents ───────────────────────────────────────────────

/// File extension for an accepted upload type.
pub fn extension_for(mime_type: &str) -> Option<&'static str> {
    match mime_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "application/pdf" => Some("pdf"),
        "video/mp4" => Some("mp4"),
        _ => None,
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("File exceeds the 10 MB limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

struct Upload {
    file_name: Option<String>,
    mime_type: String,
    bytes: axum::body::Bytes,
}

/// Read the multipart form: `file` is required, `name` and `kind` optional.
async fn read_upload(
    mut multipart: Multipart,
) -> Result<(Upload, Option<String>, Option<String>)> {
    let mut upload = None;
    let mut name = None;
    let mut kind = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                if extension_for(&mime_type).is_none() {
                    return Err(AppError::BadRequest(format!(
                        "Unsupported file type: {}",
                        mime_type
                    )));
                }
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                upload = Some(Upload {
                    file_name,
                    mime_type,
                    bytes,
                });
            }
            Some("name") => name = Some(field.text().await.map_err(multipart_error)?),
            Some("kind") => kind = Some(field.text().await.map_err(multipart_error)?),
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    if upload.bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }
    if upload.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::PayloadTooLarge(
            "File exceeds the 10 MB limit".to_string(),
        ));
    }
    Ok((upload, name, kind))
}

fn disk_path(state: &AppState, public_path: &str) -> Option<PathBuf> {
    let relative = public_path.strip_prefix(UPLOADS_PREFIX)?.trim_start_matches('/');
    Some(state.config.upload_dir.join(relative))
}

async fn remove_stored_file(state: &AppState, document: &AthleteDocument) {
    let Some(path) = disk_path(state, &document.file_path) else {
        return;
    };
    if let Err(e) = tokio::fs::remove_file(&path).await {
        tracing::warn!(error = %e, path = %path.display(), "Failed to remove uploaded file");
    }
}

/// Pass `result` through, deleting the stored file when it failed.
async fn discard_upload_on_error<T>(
    state: &AppState,
    document: &AthleteDocument,
    result: Result<T>,
) -> Result<T> {
    if result.is_err() {
        remove_stored_file(state, document).await;
    }
    result
}

async fn upload_document(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<AthleteDocument>>)> {
    let mut athlete = collection_chain(&state, &actor, &id, Action::Create)
        .await?
        .athlete;

    let (upload, name, kind) = read_upload(multipart).await?;

    let document_id = new_id();
    let extension = extension_for(&upload.mime_type).unwrap_or("bin");
    let stored_name = format!("{}.{}", document_id, extension);
    let public_path = format!("{}/athletes/{}/{}", UPLOADS_PREFIX, athlete.id, stored_name);

    let dir = state.config.upload_dir.join("athletes").join(&athlete.id);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create upload dir: {}", e)))?;
    tokio::fs::write(dir.join(&stored_name), &upload.bytes)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to store upload: {}", e)))?;

    let now = Utc::now();
    let document = AthleteDocument {
        id: document_id,
        name: name
            .filter(|n| !n.trim().is_empty())
            .or(upload.file_name)
            .unwrap_or_else(|| stored_name.clone()),
        kind,
        file_path: public_path,
        mime_type: upload.mime_type,
        size_bytes: upload.bytes.len() as u64,
        uploaded_by: actor.id.clone(),
        uploaded_at: now,
    };
    athlete.documents.push(document.clone());
    athlete.updated_at = now;
    let saved = state.db.put(&athlete).await;
    discard_upload_on_error(&state, &document, saved).await?;

    tracing::info!(
        athlete_id = %athlete.id,
        document_id = %document.id,
        size_bytes = document.size_bytes,
        mime_type = %document.mime_type,
        "Document uploaded"
    );
    Ok(created(document))
}

async fn remove_document(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>> {
    let chain = resolve_athlete(&state.db, &id).await?;
    let index = locate(&chain.athlete.documents, &item_id, "Document")?;
    chain.ensure(&actor, ResourceType::AthleteCollection, Action::Delete)?;

    let mut athlete = chain.athlete;
    let document = athlete.documents.remove(index);
    athlete.updated_at = Utc::now();
    state.db.put(&athlete).await?;
    remove_stored_file(&state, &document).await;

    tracing::info!(athlete_id = %athlete.id, document_id = %document.id(), by = %actor.id, "Document removed");
    Ok(ok_message("Document removed"))
}

// ─── Coaches ─────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct AddCoachRequest {
    #[validate(length(min = 1))]
    pub coach_id: String,
}

async fn add_coach(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<AddCoachRequest>,
) -> Result<Json<ApiResponse<AthleteEnvelope>>> {
    let mut athlete = collection_chain(&state, &actor, &id, Action::Create)
        .await?
        .athlete;

    let coach = state
        .db
        .get::<User>(&body.coach_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Coach not found".to_string()))?;
    if coach.role != Role::Coach {
        return Err(AppError::BadRequest("User is not a coach".to_string()));
    }
    if !athlete.add_coach(&coach.id) {
        return Err(AppError::BadRequest(
            "Coach already assigned to this athlete".to_string(),
        ));
    }

    athlete.updated_at = Utc::now();
    state.db.put(&athlete).await?;

    tracing::info!(athlete_id = %athlete.id, coach_id = %coach.id, by = %actor.id, "Coach assigned");
    Ok(athlete_response(athlete))
}

async fn remove_coach(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((id, coach_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<AthleteEnvelope>>> {
    let chain = resolve_athlete(&state.db, &id).await?;
    if !chain.athlete.has_coach(&coach_id) {
        return Err(AppError::NotFound(
            "Coach not assigned to this athlete".to_string(),
        ));
    }
    chain.ensure(&actor, ResourceType::AthleteCollection, Action::Delete)?;

    let mut athlete = chain.athlete;
    athlete.remove_coach(&coach_id);
    athlete.updated_at = Utc::now();
    state.db.put(&athlete).await?;

    tracing::info!(athlete_id = %athlete.id, coach_id = %coach_id, by = %actor.id, "Coach removed");
    Ok(athlete_response(athlete))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_caps_page_size() {
        let items: Vec<u32> = (0..250).collect();
        let (page, meta) = paginate(items, Some(2), Some(500));
        assert_eq!(meta.per_page, MAX_PAGE_SIZE);
        assert_eq!(meta.total, 250);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(page.first(), Some(&100));
        assert_eq!(page.len(), 100);
    }

    #[test]
    fn test_paginate_past_end_is_empty() {
        let items: Vec<u32> = (0..5).collect();
        let (page, meta) = paginate(items, Some(9), None);
        assert!(page.is_empty());
        assert_eq!(meta.per_page, DEFAULT_PAGE_SIZE);
        assert_eq!(meta.total_pages, 1);
    }

    #[test]
    fn test_paginate_zero_values_clamped() {
        let (page, meta) = paginate(vec![1, 2, 3], Some(0), Some(0));
        assert_eq!(meta.page, 1);
        assert_eq!(meta.per_page, 1);
        assert_eq!(page, vec![1]);
    }

    fn stored_document(state: &AppState) -> (AthleteDocument, PathBuf) {
        let dir = state.config.upload_dir.join("athletes").join("a1");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("doc.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        let document = AthleteDocument {
            id: "doc".into(),
            name: "Medical".into(),
            kind: None,
            file_path: format!("{}/athletes/a1/doc.pdf", UPLOADS_PREFIX),
            mime_type: "application/pdf".into(),
            size_bytes: 4,
            uploaded_by: "u1".into(),
            uploaded_at: Utc::now(),
        };
        (document, path)
    }

    fn upload_state() -> AppState {
        let config = crate::config::Config {
            upload_dir: std::env::temp_dir().join(format!("athlete-hub-test-{}", new_id())),
            ..crate::config::Config::test_default()
        };
        AppState::new(
            config,
            crate::db::Db::in_memory(),
            crate::db::RelationalStore::disabled(),
        )
    }

    #[tokio::test]
    async fn test_failed_save_removes_uploaded_file() {
        let state = upload_state();
        let (document, path) = stored_document(&state);

        let result: Result<()> = Err(AppError::Internal(anyhow::anyhow!("store down")));
        let result = discard_upload_on_error(&state, &document, result).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_successful_save_keeps_uploaded_file() {
        let state = upload_state();
        let (document, path) = stored_document(&state);

        discard_upload_on_error(&state, &document, Ok(())).await.unwrap();
        assert!(path.exists());
        std::fs::remove_dir_all(&state.config.upload_dir).unwrap();
    }

    #[test]
    fn test_sport_filter_checks_primary_and_list() {
        let mut athlete = Athlete::new("u1");
        athlete.primary_sport = Some("Football".into());
        athlete.sports = vec!["Athletics".into()];
        assert!(plays(&athlete, "football"));
        assert!(plays(&athlete, "ATHLETICS"));
        assert!(!plays(&athlete, "tennis"));
    }

    #[test]
    fn test_upload_allow_list() {
        assert_eq!(extension_for("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for("application/pdf"), Some("pdf"));
        assert_eq!(extension_for("video/mp4"), Some("mp4"));
        assert_eq!(extension_for("image/gif"), None);
        assert_eq!(extension_for("application/x-msdownload"), None);
    }
}
