// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Embedded line-item editing shared by the resource routers.
//!
//! The parent document is loaded and its owner chain resolved by the
//! caller; these helpers locate the item, run the item-level policy check
//! against its creator and mutate the list in place. The caller persists.

use crate::db::Document;
use crate::error::{AppError, Result};
use crate::models::{position_of, Career, FinancialProfile, ItemInput, LineItem};
use crate::routes::extract::ValidJson;
use crate::routes::{created, ok, ok_message, ApiResponse};
use crate::services::authz::{Action, Actor, ResourceType};
use crate::services::ownership::{resolve_athlete, AthleteOwned, OwnerChain};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Append an item built from `input` and return a copy of it.
pub fn push_item<T, I>(items: &mut Vec<T>, input: I, actor: &Actor, now: DateTime<Utc>) -> T
where
    T: LineItem + Clone,
    I: ItemInput<T>,
{
    let item = input.build(&actor.id, now);
    items.push(item.clone());
    item
}

/// Index of `item_id` in `items`, or 404 naming `label`.
pub fn locate<T: LineItem>(items: &[T], item_id: &str, label: &str) -> Result<usize> {
    position_of(items, item_id).ok_or_else(|| AppError::NotFound(format!("{} not found", label)))
}

/// Where an item lives and who is asking.
pub struct ItemAccess<'a> {
    pub chain: &'a OwnerChain,
    pub actor: &'a Actor,
    pub resource: ResourceType,
    pub label: &'a str,
}

impl ItemAccess<'_> {
    /// Overwrite an existing item after checking `Update` against its creator.
    pub fn update<T, I>(
        &self,
        items: &mut [T],
        item_id: &str,
        input: I,
        now: DateTime<Utc>,
    ) -> Result<T>
    where
        T: LineItem + Clone,
        I: ItemInput<T>,
    {
        let index = locate(items, item_id, self.label)?;
        self.chain.ensure_item(
            self.actor,
            self.resource,
            Action::Update,
            items[index].created_by(),
        )?;
        input.apply(&mut items[index], now);
        Ok(items[index].clone())
    }

    /// Remove an item after checking `Delete` against its creator.
    pub fn remove<T: LineItem>(&self, items: &mut Vec<T>, item_id: &str) -> Result<T> {
        let index = locate(items, item_id, self.label)?;
        self.chain.ensure_item(
            self.actor,
            self.resource,
            Action::Delete,
            items[index].created_by(),
        )?;
        Ok(items.remove(index))
    }
}

// ─── Per-Athlete Collections ─────────────────────────────────

/// A document kept once per athlete and created on first write.
pub trait PerAthlete: AthleteOwned + Clone {
    const RESOURCE: ResourceType;

    fn new_for(athlete_id: &str) -> Self;
    fn touch(&mut self, now: DateTime<Utc>);
}

impl PerAthlete for Career {
    const RESOURCE: ResourceType = ResourceType::Career;

    fn new_for(athlete_id: &str) -> Self {
        Career::new(athlete_id)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl PerAthlete for FinancialProfile {
    const RESOURCE: ResourceType = ResourceType::Financial;

    fn new_for(athlete_id: &str) -> Self {
        FinancialProfile::new(athlete_id, None)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// One embedded list of a [`PerAthlete`] document, addressed by athlete id.
pub trait Collection: Send + Sync + 'static {
    type Parent: PerAthlete;
    type Item: LineItem + Clone + Serialize + Send;
    type Input: ItemInput<Self::Item> + DeserializeOwned + Validate + Send;

    /// Item name used in messages
    const LABEL: &'static str;

    fn items(parent: &mut Self::Parent) -> &mut Vec<Self::Item>;
}

/// Existing parent document for the athlete, or 404.
async fn existing_parent<P: PerAthlete>(state: &AppState, athlete_id: &str) -> Result<P> {
    state
        .db
        .find_one_by::<P>("athlete_id", athlete_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", P::LABEL)))
}

/// `POST .../athlete/{athlete_id}/<collection>`
pub async fn add_item<C: Collection>(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(athlete_id): Path<String>,
    ValidJson(body): ValidJson<C::Input>,
) -> Result<(StatusCode, Json<ApiResponse<C::Item>>)> {
    let chain = resolve_athlete(&state.db, &athlete_id).await?;
    chain.ensure(&actor, <C::Parent as PerAthlete>::RESOURCE, Action::Create)?;

    let (mut parent, _) = state
        .db
        .get_or_create_for_athlete(&athlete_id, || <C::Parent as PerAthlete>::new_for(&athlete_id))
        .await?;

    let now = Utc::now();
    let item = push_item(C::items(&mut parent), body, &actor, now);
    parent.touch(now);
    state.db.put(&parent).await?;

    tracing::info!(
        athlete_id = %athlete_id,
        collection = <C::Parent as Document>::COLLECTION,
        item_id = item.id(),
        by = %actor.id,
        "{} added",
        C::LABEL
    );
    Ok(created(item))
}

/// `PUT .../athlete/{athlete_id}/<collection>/{item_id}`
pub async fn update_item<C: Collection>(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((athlete_id, item_id)): Path<(String, String)>,
    ValidJson(body): ValidJson<C::Input>,
) -> Result<Json<ApiResponse<C::Item>>> {
    let chain = resolve_athlete(&state.db, &athlete_id).await?;
    let mut parent: C::Parent = existing_parent(&state, &athlete_id).await?;

    let now = Utc::now();
    let item = ItemAccess {
        chain: &chain,
        actor: &actor,
        resource: <C::Parent as PerAthlete>::RESOURCE,
        label: C::LABEL,
    }
    .update(C::items(&mut parent), &item_id, body, now)?;
    parent.touch(now);
    state.db.put(&parent).await?;

    Ok(ok(item))
}

/// `DELETE .../athlete/{athlete_id}/<collection>/{item_id}`
pub async fn remove_item<C: Collection>(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path((athlete_id, item_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>> {
    let chain = resolve_athlete(&state.db, &athlete_id).await?;
    let mut parent: C::Parent = existing_parent(&state, &athlete_id).await?;

    ItemAccess {
        chain: &chain,
        actor: &actor,
        resource: <C::Parent as PerAthlete>::RESOURCE,
        label: C::LABEL,
    }
    .remove(C::items(&mut parent), &item_id)?;
    parent.touch(Utc::now());
    state.db.put(&parent).await?;

    tracing::info!(athlete_id = %athlete_id, item_id = %item_id, by = %actor.id, "{} removed", C::LABEL);
    Ok(ok_message(format!("{} removed", C::LABEL)))
}

/// Mount `POST .../athlete/{athlete_id}/<name>` and `PUT`/`DELETE` on its items.
pub fn collection_routes<C: Collection>(
    router: Router<Arc<AppState>>,
    name: &str,
) -> Router<Arc<AppState>> {
    router
        .route(&format!("/athlete/{{athlete_id}}/{name}"), post(add_item::<C>))
        .route(
            &format!("/athlete/{{athlete_id}}/{name}/{{item_id}}"),
            put(update_item::<C>).delete(remove_item::<C>),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::career::{Goal, GoalInput, GoalStatus};
    use crate::models::{Athlete, Role};

    fn goal_input(title: &str) -> GoalInput {
        GoalInput {
            title: title.to_string(),
            description: None,
            target_date: None,
            status: None,
        }
    }

    fn chain() -> OwnerChain {
        let mut athlete = Athlete::new("owner");
        athlete.add_coach("coach");
        OwnerChain { athlete }
    }

    #[test]
    fn test_creator_may_edit_own_item() {
        let chain = chain();
        let coach = Actor::new("coach", Role::Coach);
        let mut goals: Vec<Goal> = Vec::new();
        let goal = push_item(&mut goals, goal_input("Qualify"), &coach, Utc::now());

        let access = ItemAccess {
            chain: &chain,
            actor: &coach,
            resource: ResourceType::Career,
            label: "Goal",
        };
        let updated = access
            .update(
                &mut goals,
                &goal.id,
                GoalInput {
                    status: Some(GoalStatus::Achieved),
                    ..goal_input("Qualify for nationals")
                },
                Utc::now(),
            )
            .unwrap();
        assert_eq!(updated.status, GoalStatus::Achieved);
        assert_eq!(updated.created_by, "coach");

        access.remove(&mut goals, &goal.id).unwrap();
        assert!(goals.is_empty());
    }

    #[test]
    fn test_missing_item_is_not_found_before_policy() {
        let chain = chain();
        let stranger = Actor::new("stranger", Role::Scout);
        let mut goals: Vec<Goal> = Vec::new();
        let access = ItemAccess {
            chain: &chain,
            actor: &stranger,
            resource: ResourceType::Career,
            label: "Goal",
        };

        let err = access.remove(&mut goals, "nope").unwrap_err();
        assert!(matches!(err, AppError::NotFound(m) if m == "Goal not found"));
    }

    #[test]
    fn test_stranger_cannot_remove_item() {
        let chain = chain();
        let owner = Actor::new("owner", Role::Athlete);
        let stranger = Actor::new("stranger", Role::Scout);
        let mut goals: Vec<Goal> = Vec::new();
        let goal = push_item(&mut goals, goal_input("Podium"), &owner, Utc::now());

        let access = ItemAccess {
            chain: &chain,
            actor: &stranger,
            resource: ResourceType::Career,
            label: "Goal",
        };
        assert!(matches!(
            access.remove(&mut goals, &goal.id),
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(goals.len(), 1);
    }
}
