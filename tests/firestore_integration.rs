// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and
//! `FIRESTORE_EMULATOR_HOST` pointing at it; otherwise they are skipped.
//!
//! Every test uses fresh UUIDs, so runs do not interfere.

use athlete_hub::db::{Db, FirestoreDb, StoreStatus};
use athlete_hub::models::career::GoalInput;
use athlete_hub::models::{Athlete, Career, FinancialProfile, ItemInput, Performance, Role, User};

mod common;
use common::test_firestore;

fn test_user(email: &str) -> User {
    User::new(
        email,
        "$argon2id$placeholder".to_string(),
        "Test".to_string(),
        "User".to_string(),
        Role::Athlete,
    )
}

fn test_performance(athlete_id: &str, date: &str) -> Performance {
    let now = chrono::Utc::now();
    Performance {
        id: athlete_hub::models::new_id(),
        athlete_id: athlete_id.to_string(),
        recorded_by: "coach".to_string(),
        date: date.parse().unwrap(),
        sport: "athletics".to_string(),
        event: None,
        competition: None,
        placement: None,
        metrics: Vec::new(),
        notes: None,
        skill_assessments: Vec::new(),
        video_annotations: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// DOCUMENT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_round_trip_and_email_lookup() {
    require_emulator!();

    let db = test_firestore().await;
    let email = format!("{}@example.com", uuid::Uuid::new_v4());
    let user = test_user(&email);

    assert!(db.get::<User>(&user.id).await.unwrap().is_none());
    db.put(&user).await.unwrap();

    let fetched = db.get::<User>(&user.id).await.unwrap().unwrap();
    assert_eq!(fetched.email, email);
    assert!(fetched.is_active);
    assert!(!fetched.is_verified);

    let by_email = db
        .find_user_by_email(&email.to_uppercase())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, user.id);

    db.delete::<User>(&user.id).await.unwrap();
    assert!(db.get::<User>(&user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_embedded_items_survive_round_trip() {
    require_emulator!();

    let db = test_firestore().await;
    let athlete_id = uuid::Uuid::new_v4().to_string();

    let (mut career, created) = db
        .get_or_create_career(&athlete_id, None, None)
        .await
        .unwrap();
    assert!(created);
    let goal = GoalInput {
        title: "Olympic final".to_string(),
        description: None,
        target_date: Some("2028-07-20".parse().unwrap()),
        status: None,
    }
    .build("coach", chrono::Utc::now());
    career.goals.push(goal.clone());
    db.put(&career).await.unwrap();

    let (again, created) = db
        .get_or_create_career(&athlete_id, None, None)
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(again.id, career.id);
    assert_eq!(again.goals.len(), 1);
    assert_eq!(again.goals[0].id, goal.id);
    assert_eq!(again.goals[0].created_by, "coach");
}

#[tokio::test]
async fn test_performances_sorted_newest_first() {
    require_emulator!();

    let db = test_firestore().await;
    let athlete_id = uuid::Uuid::new_v4().to_string();

    for date in ["2026-01-10", "2026-03-05", "2026-02-20"] {
        db.put(&test_performance(&athlete_id, date)).await.unwrap();
    }

    let records = db.performances_for_athlete(&athlete_id).await.unwrap();
    let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
    assert_eq!(dates, vec!["2026-03-05", "2026-02-20", "2026-01-10"]);
}

#[tokio::test]
async fn test_athlete_cascade_delete() {
    require_emulator!();

    let db = test_firestore().await;
    let user = test_user(&format!("{}@example.com", uuid::Uuid::new_v4()));
    let athlete = Athlete::new(&user.id);
    db.put(&athlete).await.unwrap();

    db.put(&test_performance(&athlete.id, "2026-04-01"))
        .await
        .unwrap();
    db.get_or_create_career(&athlete.id, None, None)
        .await
        .unwrap();
    db.get_or_create_financial(&athlete.id, Some("GBP".to_string()))
        .await
        .unwrap();

    let deleted = db.delete_athlete_cascade(&athlete.id).await.unwrap();
    assert_eq!(deleted, 4);

    assert!(db.get::<Athlete>(&athlete.id).await.unwrap().is_none());
    assert!(db.performances_for_athlete(&athlete.id).await.unwrap().is_empty());
    assert!(db
        .find_by::<Career>("athlete_id", &athlete.id)
        .await
        .unwrap()
        .is_empty());
    assert!(db
        .find_by::<FinancialProfile>("athlete_id", &athlete.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_emulator_reports_connected() {
    require_emulator!();

    let db = test_firestore().await;
    assert_eq!(db.status().await, StoreStatus::Connected);
}

#[tokio::test]
async fn test_offline_client_reports_disconnected() {
    let db = Db::Firestore(FirestoreDb::new_mock());
    assert_eq!(db.status().await, StoreStatus::Disconnected);
    assert!(db.get::<User>("anyone").await.is_err());
}
