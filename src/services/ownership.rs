// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resource ownership resolution.
//!
//! Resolves a record to its owning athlete (and through it the owning user
//! and coach set) in one place, so every handler checks existence and
//! ownership the same way: 404 for a missing record or athlete, then the
//! policy decision.

use crate::db::{Db, Document};
use crate::error::{AppError, Result};
use crate::models::{Athlete, Career, FinancialProfile, Injury, Performance};
use crate::services::authz::{authorize, Action, Actor, ResourceType, Target};

/// A document that belongs to exactly one athlete.
pub trait AthleteOwned: Document {
    /// Label used in "not found" messages.
    const LABEL: &'static str;

    fn athlete_id(&self) -> &str;
}

impl AthleteOwned for Performance {
    const LABEL: &'static str = "Performance record";

    fn athlete_id(&self) -> &str {
        &self.athlete_id
    }
}

impl AthleteOwned for Injury {
    const LABEL: &'static str = "Injury record";

    fn athlete_id(&self) -> &str {
        &self.athlete_id
    }
}

impl AthleteOwned for Career {
    const LABEL: &'static str = "Career record";

    fn athlete_id(&self) -> &str {
        &self.athlete_id
    }
}

impl AthleteOwned for FinancialProfile {
    const LABEL: &'static str = "Financial profile";

    fn athlete_id(&self) -> &str {
        &self.athlete_id
    }
}

/// The athlete at the top of a resource's ownership chain.
#[derive(Debug, Clone)]
pub struct OwnerChain {
    pub athlete: Athlete,
}

impl OwnerChain {
    pub fn owner_user_id(&self) -> &str {
        &self.athlete.user_id
    }

    pub fn coaches(&self) -> &[String] {
        &self.athlete.coaches
    }

    /// Policy target for the resource as a whole.
    pub fn target(&self) -> Target<'_> {
        Target {
            owner_user_id: &self.athlete.user_id,
            coaches: &self.athlete.coaches,
            item_creator: None,
        }
    }

    /// Policy target for one record or line item created by `creator`.
    pub fn item_target<'a>(&'a self, creator: &'a str) -> Target<'a> {
        Target {
            item_creator: Some(creator),
            ..self.target()
        }
    }

    /// Require `action` on the resource as a whole.
    pub fn ensure(&self, actor: &Actor, resource: ResourceType, action: Action) -> Result<()> {
        self.check(actor, &self.target(), resource, action)
    }

    /// Require `action` on a record or line item created by `creator`.
    pub fn ensure_item(
        &self,
        actor: &Actor,
        resource: ResourceType,
        action: Action,
        creator: &str,
    ) -> Result<()> {
        self.check(actor, &self.item_target(creator), resource, action)
    }

    fn check(
        &self,
        actor: &Actor,
        target: &Target<'_>,
        resource: ResourceType,
        action: Action,
    ) -> Result<()> {
        let decision = authorize(actor, target, resource, action);
        if !decision.is_allowed() {
            tracing::warn!(
                actor_id = %actor.id,
                role = %actor.role,
                athlete_id = %self.athlete.id,
                ?resource,
                ?action,
                "Authorization denied"
            );
        }
        decision.into_result()
    }
}

/// Load an athlete and wrap it as an ownership chain.
pub async fn resolve_athlete(db: &Db, athlete_id: &str) -> Result<OwnerChain> {
    let athlete = db
        .get::<Athlete>(athlete_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Athlete not found".to_string()))?;

    Ok(OwnerChain { athlete })
}

/// Load a record and its owning athlete.
///
/// A record whose athlete no longer exists is reported as "Athlete not
/// found" rather than being silently authorized.
pub async fn resolve<T: AthleteOwned>(db: &Db, id: &str) -> Result<(T, OwnerChain)> {
    let record = db
        .get::<T>(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", T::LABEL)))?;

    let chain = resolve_athlete(db, record.athlete_id()).await?;
    Ok((record, chain))
}
