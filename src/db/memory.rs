// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process document store used by tests and local development.
//!
//! Documents are kept as JSON values so field lookups behave like the
//! top-level equality filters used against Firestore.

use super::Document;
use crate::error::AppError;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// In-memory document store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    collections: Arc<DashMap<&'static str, BTreeMap<String, Value>>>,
}

fn decode<T: Document>(value: &Value) -> Result<T, AppError> {
    serde_json::from_value(value.clone())
        .map_err(|e| AppError::Database(format!("Corrupt {} document: {}", T::COLLECTION, e)))
}

impl MemoryDb {
    pub fn get<T: Document>(&self, id: &str) -> Result<Option<T>, AppError> {
        self.collections
            .get(T::COLLECTION)
            .and_then(|docs| docs.get(id).cloned())
            .map(|value| decode(&value))
            .transpose()
    }

    pub fn put<T: Document>(&self, doc: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(doc).map_err(|e| {
            AppError::Database(format!("Failed to encode {} document: {}", T::COLLECTION, e))
        })?;

        self.collections
            .entry(T::COLLECTION)
            .or_default()
            .insert(doc.doc_id().to_string(), value);
        Ok(())
    }

    pub fn delete<T: Document>(&self, id: &str) -> Result<(), AppError> {
        if let Some(mut docs) = self.collections.get_mut(T::COLLECTION) {
            docs.remove(id);
        }
        Ok(())
    }

    pub fn find_by<T: Document>(&self, field: &str, value: &str) -> Result<Vec<T>, AppError> {
        let Some(docs) = self.collections.get(T::COLLECTION) else {
            return Ok(Vec::new());
        };

        docs.values()
            .filter(|doc| doc.get(field).and_then(Value::as_str) == Some(value))
            .map(decode)
            .collect()
    }

    pub fn list<T: Document>(&self) -> Result<Vec<T>, AppError> {
        let Some(docs) = self.collections.get(T::COLLECTION) else {
            return Ok(Vec::new());
        };

        docs.values().map(decode).collect()
    }
}
