// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Optional PostgreSQL pool.
//!
//! No entity is stored here and nothing writes to it together with the
//! document store; the application only reports its connectivity.

use super::StoreStatus;
use crate::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone, Default)]
pub struct RelationalStore {
    pool: Option<PgPool>,
}

impl RelationalStore {
    /// Build a lazily-connecting pool; `None` disables the store.
    pub fn connect_lazy(database_url: Option<&str>) -> Result<Self, AppError> {
        let Some(url) = database_url else {
            tracing::info!("DATABASE_URL not set, relational store disabled");
            return Ok(Self::disabled());
        };

        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_lazy(url)
            .map_err(|e| AppError::Database(format!("Invalid DATABASE_URL: {}", e)))?;

        Ok(Self { pool: Some(pool) })
    }

    pub fn disabled() -> Self {
        Self { pool: None }
    }

    pub async fn status(&self) -> StoreStatus {
        let Some(pool) = &self.pool else {
            return StoreStatus::Disabled;
        };

        match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => StoreStatus::Connected,
            Err(e) => {
                tracing::warn!(error = %e, "Relational store ping failed");
                StoreStatus::Disconnected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_store_reports_disabled() {
        let store = RelationalStore::connect_lazy(None).unwrap();
        assert_eq!(store.status().await, StoreStatus::Disabled);
    }
}
