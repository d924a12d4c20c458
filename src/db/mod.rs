//! Database layer.
//!
//! Documents live in a document store (Firestore in production, an
//! in-process map for tests and local development). A relational store may
//! be configured alongside it; the two are never written transactionally
//! together.

pub mod firestore;
pub mod memory;
pub mod relational;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;
pub use relational::RelationalStore;

use crate::error::AppError;
use crate::models::{Athlete, Career, FinancialProfile, Injury, Performance, User};
use futures_util::{stream, StreamExt};
use serde::{de::DeserializeOwned, Serialize};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const ATHLETES: &str = "athletes";
    pub const PERFORMANCES: &str = "performances";
    pub const INJURIES: &str = "injuries";
    pub const CAREERS: &str = "careers";
    pub const FINANCIALS: &str = "financials";
}

const MAX_CONCURRENT_DB_OPS: usize = 16;

/// A type stored as one document in a named collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn doc_id(&self) -> &str;
}

macro_rules! impl_document {
    ($ty:ty, $collection:expr) => {
        impl Document for $ty {
            const COLLECTION: &'static str = $collection;

            fn doc_id(&self) -> &str {
                &self.id
            }
        }
    };
}

impl_document!(User, collections::USERS);
impl_document!(Athlete, collections::ATHLETES);
impl_document!(Performance, collections::PERFORMANCES);
impl_document!(Injury, collections::INJURIES);
impl_document!(Career, collections::CAREERS);
impl_document!(FinancialProfile, collections::FINANCIALS);

/// Connectivity of a backing store, as reported by the health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    Connected,
    Disconnected,
    Disabled,
}

/// Document store handle shared by all handlers.
#[derive(Clone)]
pub enum Db {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

impl Db {
    /// Fresh in-memory store.
    pub fn in_memory() -> Self {
        Db::Memory(MemoryDb::default())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Db::Firestore(_) => "firestore",
            Db::Memory(_) => "memory",
        }
    }

    // ─── Generic Document Operations ─────────────────────────────

    /// Fetch a document by ID.
    pub async fn get<T: Document>(&self, id: &str) -> Result<Option<T>, AppError> {
        match self {
            Db::Firestore(db) => db.get(id).await,
            Db::Memory(db) => db.get(id),
        }
    }

    /// Create or replace a document.
    pub async fn put<T: Document>(&self, doc: &T) -> Result<(), AppError> {
        match self {
            Db::Firestore(db) => db.put(doc).await,
            Db::Memory(db) => db.put(doc),
        }
    }

    /// Delete a document (no-op if absent).
    pub async fn delete<T: Document>(&self, id: &str) -> Result<(), AppError> {
        match self {
            Db::Firestore(db) => db.delete::<T>(id).await,
            Db::Memory(db) => db.delete::<T>(id),
        }
    }

    /// All documents whose top-level string `field` equals `value`.
    pub async fn find_by<T: Document>(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<Vec<T>, AppError> {
        match self {
            Db::Firestore(db) => db.find_by(field, value).await,
            Db::Memory(db) => db.find_by(field, value),
        }
    }

    /// First document whose `field` equals `value`.
    pub async fn find_one_by<T: Document>(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<Option<T>, AppError> {
        Ok(self.find_by(field, value).await?.into_iter().next())
    }

    /// Every document in the collection.
    pub async fn list<T: Document>(&self) -> Result<Vec<T>, AppError> {
        match self {
            Db::Firestore(db) => db.list().await,
            Db::Memory(db) => db.list(),
        }
    }

    /// Probe connectivity.
    pub async fn status(&self) -> StoreStatus {
        let result = match self {
            Db::Firestore(db) => db.ping().await,
            Db::Memory(_) => Ok(()),
        };

        match result {
            Ok(()) => StoreStatus::Connected,
            Err(e) => {
                tracing::warn!(error = %e, backend = self.backend_name(), "Document store ping failed");
                StoreStatus::Disconnected
            }
        }
    }

    // ─── Identity Lookups ────────────────────────────────────────

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_one_by("email", &crate::models::user::normalize_email(email))
            .await
    }

    pub async fn find_user_by_refresh_digest(&self, digest: &str) -> Result<Option<User>, AppError> {
        self.find_one_by("refresh_token_hash", digest).await
    }

    pub async fn find_user_by_verification_digest(
        &self,
        digest: &str,
    ) -> Result<Option<User>, AppError> {
        self.find_one_by("verification_token_hash", digest).await
    }

    pub async fn find_user_by_reset_digest(&self, digest: &str) -> Result<Option<User>, AppError> {
        self.find_one_by("reset_token_hash", digest).await
    }

    // ─── Athlete-Scoped Lookups ──────────────────────────────────

    pub async fn athlete_for_user(&self, user_id: &str) -> Result<Option<Athlete>, AppError> {
        self.find_one_by("user_id", user_id).await
    }

    /// Performance records for an athlete, newest first.
    pub async fn performances_for_athlete(
        &self,
        athlete_id: &str,
    ) -> Result<Vec<Performance>, AppError> {
        let mut records: Vec<Performance> = self.find_by("athlete_id", athlete_id).await?;
        records.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.created_at.cmp(&a.created_at)));
        Ok(records)
    }

    /// Injury records for an athlete, most recent injury first.
    pub async fn injuries_for_athlete(&self, athlete_id: &str) -> Result<Vec<Injury>, AppError> {
        let mut records: Vec<Injury> = self.find_by("athlete_id", athlete_id).await?;
        records.sort_by(|a, b| b.date_of_injury.cmp(&a.date_of_injury));
        Ok(records)
    }

    pub async fn career_for_athlete(&self, athlete_id: &str) -> Result<Option<Career>, AppError> {
        self.find_one_by("athlete_id", athlete_id).await
    }

    pub async fn financial_for_athlete(
        &self,
        athlete_id: &str,
    ) -> Result<Option<FinancialProfile>, AppError> {
        self.find_one_by("athlete_id", athlete_id).await
    }

    /// The athlete's single document of type `T`, created with `make` on first use.
    ///
    /// The flag is true when the document was created by this call.
    pub async fn get_or_create_for_athlete<T: Document>(
        &self,
        athlete_id: &str,
        make: impl FnOnce() -> T,
    ) -> Result<(T, bool), AppError> {
        if let Some(doc) = self.find_one_by::<T>("athlete_id", athlete_id).await? {
            return Ok((doc, false));
        }

        let doc = make();
        self.put(&doc).await?;
        tracing::info!(
            athlete_id,
            collection = T::COLLECTION,
            doc_id = doc.doc_id(),
            "Created per-athlete document"
        );
        Ok((doc, true))
    }

    /// Team and stage are only applied when the career is created.
    pub async fn get_or_create_career(
        &self,
        athlete_id: &str,
        current_team: Option<String>,
        career_stage: Option<String>,
    ) -> Result<(Career, bool), AppError> {
        self.get_or_create_for_athlete(athlete_id, || Career {
            current_team,
            career_stage,
            ..Career::new(athlete_id)
        })
        .await
    }

    pub async fn get_or_create_financial(
        &self,
        athlete_id: &str,
        currency: Option<String>,
    ) -> Result<(FinancialProfile, bool), AppError> {
        self.get_or_create_for_athlete(athlete_id, || FinancialProfile::new(athlete_id, currency))
            .await
    }

    // ─── Cascading Deletion ──────────────────────────────────────

    /// Delete an athlete and every document that belongs to it.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_athlete_cascade(&self, athlete_id: &str) -> Result<usize, AppError> {
        let performances: Vec<Performance> = self.find_by("athlete_id", athlete_id).await?;
        let injuries: Vec<Injury> = self.find_by("athlete_id", athlete_id).await?;
        let careers: Vec<Career> = self.find_by("athlete_id", athlete_id).await?;
        let financials: Vec<FinancialProfile> = self.find_by("athlete_id", athlete_id).await?;

        let mut deleted_count = 0;
        deleted_count += self.delete_all(&performances).await?;
        deleted_count += self.delete_all(&injuries).await?;
        deleted_count += self.delete_all(&careers).await?;
        deleted_count += self.delete_all(&financials).await?;

        self.delete::<Athlete>(athlete_id).await?;
        deleted_count += 1;

        tracing::info!(athlete_id, deleted_count, "Athlete deletion complete");
        Ok(deleted_count)
    }

    /// Delete documents with bounded concurrency.
    async fn delete_all<T: Document>(&self, docs: &[T]) -> Result<usize, AppError> {
        let ids: Vec<String> = docs.iter().map(|doc| doc.doc_id().to_string()).collect();
        stream::iter(ids)
            .map(|id| async move { self.delete::<T>(&id).await })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(docs.len())
    }
}
