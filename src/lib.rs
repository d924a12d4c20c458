// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Athlete Hub: athlete profiles, performance, careers, injuries and finances
//!
//! This crate provides the backend API. Every protected request is
//! authenticated, resolved to the owning athlete and checked against one
//! declarative policy table before any business logic runs.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::{Db, RelationalStore};
use services::{EmailService, SessionService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub relational: RelationalStore,
    pub sessions: SessionService,
    pub email: EmailService,
}

impl AppState {
    /// Wire services from config around the given stores.
    pub fn new(config: Config, db: Db, relational: RelationalStore) -> Self {
        Self {
            sessions: SessionService::new(&config),
            email: EmailService::new(&config),
            config,
            db,
            relational,
        }
    }
}
