// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Properties of the access policy over every role, resource and action.

use athlete_hub::models::Role;
use athlete_hub::services::authz::{defined_actions, rule_for};
use athlete_hub::services::{authorize, Action, Actor, ResourceType, Target};
use proptest::prelude::*;

fn role() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

fn resource() -> impl Strategy<Value = ResourceType> {
    prop::sample::select(ResourceType::ALL.to_vec())
}

fn action() -> impl Strategy<Value = Action> {
    prop::sample::select(Action::ALL.to_vec())
}

/// Arbitrary target: coach list and item creator drawn from a small id pool
/// so that collisions with the actor happen often.
fn target_parts() -> impl Strategy<Value = (String, Vec<String>, Option<String>)> {
    let id = prop::sample::select(vec!["u1", "u2", "u3", "u4"]).prop_map(str::to_string);
    (
        id.clone(),
        prop::collection::vec(id.clone(), 0..3),
        prop::option::of(id),
    )
}

fn target<'a>(parts: &'a (String, Vec<String>, Option<String>)) -> Target<'a> {
    Target {
        owner_user_id: &parts.0,
        coaches: &parts.1,
        item_creator: parts.2.as_deref(),
    }
}

proptest! {
    #[test]
    fn admin_is_allowed_every_defined_action(
        resource in resource(),
        parts in target_parts(),
    ) {
        let admin = Actor::new("admin", Role::Admin);
        for action in defined_actions(resource) {
            prop_assert!(authorize(&admin, &target(&parts), resource, action).is_allowed());
        }
    }

    #[test]
    fn owner_is_allowed_except_injury_writes_and_coach_finances(
        role in role(),
        resource in resource(),
        parts in target_parts(),
    ) {
        let owner = Actor::new(parts.0.clone(), role);
        for action in defined_actions(resource) {
            let allowed = authorize(&owner, &target(&parts), resource, action).is_allowed();

            if resource == ResourceType::Financial && role == Role::Coach {
                prop_assert!(!allowed, "{} {:?}", resource, action);
            } else if resource == ResourceType::Injury && action != Action::Read {
                // Depends on the owner's role, not on ownership
                continue;
            } else {
                prop_assert!(allowed, "{} {:?} {}", resource, action, role);
            }
        }
    }

    #[test]
    fn coach_role_never_touches_finances(
        action in action(),
        parts in target_parts(),
        actor_id in prop::sample::select(vec!["u1", "u2", "u3", "u4"]),
    ) {
        let coach = Actor::new(actor_id, Role::Coach);
        let decision = authorize(&coach, &target(&parts), ResourceType::Financial, action);
        prop_assert!(!decision.is_allowed());
    }

    #[test]
    fn authorize_is_deterministic(
        role in role(),
        resource in resource(),
        action in action(),
        parts in target_parts(),
        actor_id in prop::sample::select(vec!["u1", "u2", "u3", "u4"]),
    ) {
        let actor = Actor::new(actor_id, role);
        let first = authorize(&actor, &target(&parts), resource, action);
        let second = authorize(&actor, &target(&parts), resource, action);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn undefined_actions_are_denied(
        role in role(),
        resource in resource(),
        action in action(),
        parts in target_parts(),
    ) {
        prop_assume!(rule_for(resource, action).is_none());
        let actor = Actor::new(parts.0.clone(), role);
        prop_assert!(!authorize(&actor, &target(&parts), resource, action).is_allowed());
    }
}
