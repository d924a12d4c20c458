// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod analytics;
pub mod authz;
pub mod email;
pub mod ownership;
pub mod password;
pub mod session;

pub use authz::{authorize, Action, Actor, Decision, ResourceType, Target};
pub use email::EmailService;
pub use ownership::{resolve, resolve_athlete, AthleteOwned, OwnerChain};
pub use session::{Registration, SessionService, TokenPair};
