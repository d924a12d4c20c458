// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authorization policy engine.
//!
//! Access decisions come from one declarative table keyed by
//! (resource type, action). Each rule lists the actor predicates that
//! grant access; any matching predicate allows the request and no match
//! denies it. [`authorize`] is a pure function of its inputs.

use crate::error::AppError;
use crate::models::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated identity performing a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// The athlete document itself
    AthleteProfile,
    /// Achievements, documents and coaches embedded in the athlete
    AthleteCollection,
    Performance,
    Financial,
    Injury,
    Career,
}

impl ResourceType {
    pub const ALL: [ResourceType; 6] = [
        ResourceType::AthleteProfile,
        ResourceType::AthleteCollection,
        ResourceType::Performance,
        ResourceType::Financial,
        ResourceType::Injury,
        ResourceType::Career,
    ];
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceType::AthleteProfile => "athlete profile",
            ResourceType::AthleteCollection => "athlete profile details",
            ResourceType::Performance => "performance record",
            ResourceType::Financial => "financial record",
            ResourceType::Injury => "injury record",
            ResourceType::Career => "career record",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Verify,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Verify,
    ];
}

/// What the engine needs to know about the resource being touched.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    /// User that owns the athlete at the top of the ownership chain
    pub owner_user_id: &'a str,
    /// The athlete's coaches
    pub coaches: &'a [String],
    /// Creator of the specific record or line item, when one is addressed
    pub item_creator: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(String),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Map a denial to a 403.
    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AppError::Forbidden(reason)),
        }
    }
}

/// A single actor predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// Every authenticated actor
    AnyAuthenticated,
    /// The user owning the athlete
    Owner,
    /// A member of the athlete's coach set
    AthleteCoach,
    /// Whoever created the addressed record or line item
    Creator,
    /// Any actor holding this role
    Role(Role),
}

impl Grant {
    fn matches(&self, actor: &Actor, target: &Target<'_>) -> bool {
        match self {
            Grant::AnyAuthenticated => true,
            Grant::Owner => actor.id == target.owner_user_id,
            Grant::AthleteCoach => target.coaches.iter().any(|c| *c == actor.id),
            Grant::Creator => target.item_creator == Some(actor.id.as_str()),
            Grant::Role(role) => actor.role == *role,
        }
    }
}

#[derive(Debug)]
pub struct Rule {
    pub resource: ResourceType,
    pub actions: &'static [Action],
    pub grants: &'static [Grant],
    /// Roles denied before any grant is considered
    pub excluded_roles: &'static [Role],
    pub deny_reason: &'static str,
}

use Action::*;
use Grant::*;

const ADMIN: Grant = Grant::Role(Role::Admin);

/// The policy table.
pub static POLICY: &[Rule] = &[
    // ─── Athlete Profile ─────────────────────────────────────────
    Rule {
        resource: ResourceType::AthleteProfile,
        actions: &[Read],
        grants: &[AnyAuthenticated],
        excluded_roles: &[],
        deny_reason: "Not authorized to view this athlete profile",
    },
    Rule {
        resource: ResourceType::AthleteProfile,
        actions: &[Create, Update, Delete],
        grants: &[Owner, ADMIN],
        excluded_roles: &[],
        deny_reason: "Not authorized to modify this athlete profile",
    },
    Rule {
        resource: ResourceType::AthleteProfile,
        actions: &[Verify],
        grants: &[Owner, ADMIN, Grant::Role(Role::Organization)],
        excluded_roles: &[],
        deny_reason: "Not authorized to verify this athlete",
    },
    // ─── Athlete Sub-Collections ─────────────────────────────────
    Rule {
        resource: ResourceType::AthleteCollection,
        actions: &[Read],
        grants: &[AnyAuthenticated],
        excluded_roles: &[],
        deny_reason: "Not authorized to view this athlete's profile details",
    },
    Rule {
        resource: ResourceType::AthleteCollection,
        actions: &[Create, Update, Delete],
        grants: &[Owner, ADMIN, Grant::Role(Role::Coach)],
        excluded_roles: &[],
        deny_reason: "Not authorized to modify this athlete's profile details",
    },
    // ─── Performance ─────────────────────────────────────────────
    Rule {
        resource: ResourceType::Performance,
        actions: &[Read],
        grants: &[AnyAuthenticated],
        excluded_roles: &[],
        deny_reason: "Not authorized to view performance records",
    },
    Rule {
        resource: ResourceType::Performance,
        actions: &[Create],
        grants: &[Owner, AthleteCoach, ADMIN],
        excluded_roles: &[],
        deny_reason: "Not authorized to add performance records for this athlete",
    },
    Rule {
        resource: ResourceType::Performance,
        actions: &[Update, Delete],
        grants: &[Creator, Owner, AthleteCoach, ADMIN],
        excluded_roles: &[],
        deny_reason: "Not authorized to modify this performance record",
    },
    // ─── Financial ───────────────────────────────────────────────
    Rule {
        resource: ResourceType::Financial,
        actions: &[Read],
        grants: &[Owner, Grant::Role(Role::FinancialAdvisor), ADMIN],
        excluded_roles: &[Role::Coach],
        deny_reason: "Not authorized to view this athlete's financial records",
    },
    Rule {
        resource: ResourceType::Financial,
        actions: &[Create],
        grants: &[Owner, Grant::Role(Role::FinancialAdvisor), ADMIN],
        excluded_roles: &[Role::Coach],
        deny_reason: "Not authorized to modify this athlete's financial records",
    },
    Rule {
        resource: ResourceType::Financial,
        actions: &[Update, Delete],
        grants: &[Creator, Owner, Grant::Role(Role::FinancialAdvisor), ADMIN],
        excluded_roles: &[Role::Coach],
        deny_reason: "Not authorized to modify this athlete's financial records",
    },
    // ─── Injury ──────────────────────────────────────────────────
    Rule {
        resource: ResourceType::Injury,
        actions: &[Read],
        grants: &[
            Owner,
            AthleteCoach,
            Grant::Role(Role::Physiotherapist),
            ADMIN,
        ],
        excluded_roles: &[],
        deny_reason: "Not authorized to view this athlete's injury records",
    },
    Rule {
        resource: ResourceType::Injury,
        actions: &[Create, Update],
        grants: &[Grant::Role(Role::Physiotherapist), AthleteCoach, ADMIN],
        excluded_roles: &[],
        deny_reason: "Not authorized to record injuries for this athlete",
    },
    Rule {
        resource: ResourceType::Injury,
        actions: &[Delete],
        grants: &[ADMIN, Grant::Role(Role::Physiotherapist)],
        excluded_roles: &[],
        deny_reason: "Only admins and physiotherapists can delete injury records",
    },
    // ─── Career ──────────────────────────────────────────────────
    Rule {
        resource: ResourceType::Career,
        actions: &[Read],
        grants: &[AnyAuthenticated],
        excluded_roles: &[],
        deny_reason: "Not authorized to view career records",
    },
    Rule {
        resource: ResourceType::Career,
        actions: &[Create],
        grants: &[Owner, AthleteCoach, ADMIN],
        excluded_roles: &[],
        deny_reason: "Not authorized to modify this athlete's career records",
    },
    Rule {
        resource: ResourceType::Career,
        actions: &[Update, Delete],
        grants: &[Creator, Owner, AthleteCoach, ADMIN],
        excluded_roles: &[],
        deny_reason: "Not authorized to modify this athlete's career records",
    },
];

/// The rule governing `(resource, action)`, if the action exists for it.
pub fn rule_for(resource: ResourceType, action: Action) -> Option<&'static Rule> {
    POLICY
        .iter()
        .find(|rule| rule.resource == resource && rule.actions.contains(&action))
}

/// Actions the table defines for a resource type.
pub fn defined_actions(resource: ResourceType) -> Vec<Action> {
    Action::ALL
        .into_iter()
        .filter(|action| rule_for(resource, *action).is_some())
        .collect()
}

/// Decide whether `actor` may perform `action` on `target`.
pub fn authorize(
    actor: &Actor,
    target: &Target<'_>,
    resource: ResourceType,
    action: Action,
) -> Decision {
    let Some(rule) = rule_for(resource, action) else {
        return Decision::Deny(format!("Action not permitted on {}", resource));
    };

    if rule.excluded_roles.contains(&actor.role) {
        return Decision::Deny(rule.deny_reason.to_string());
    }

    if rule.grants.iter().any(|grant| grant.matches(actor, target)) {
        Decision::Allow
    } else {
        Decision::Deny(rule.deny_reason.to_string())
    }
}
