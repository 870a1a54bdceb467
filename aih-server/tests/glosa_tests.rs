//! Integration tests for the glosa tracker

use aih_common::db::init_memory_database;
use aih_common::{Error, Money};
use aih_server::accounts;
use aih_server::catalog::Catalog;
use aih_server::glosas::{self, NewGlosa};
use aih_server::lifecycle::{self, NewAih};
use sqlx::SqlitePool;

struct Fixture {
    db: SqlitePool,
    catalog: Catalog,
    aih_id: i64,
}

async fn setup() -> Fixture {
    let db = init_memory_database().await.unwrap();
    let user = accounts::create_user(&db, "ana", "secret").await.unwrap();
    let aih_id = lifecycle::register(
        &db,
        user.id,
        NewAih {
            number: "12345678901".into(),
            initial_value: Money::from_cents(100_000),
            competency: "05/2024".into(),
            attendances: vec!["A1".into()],
        },
    )
    .await
    .unwrap();
    Fixture {
        catalog: Catalog::with_default_ttls(db.clone()),
        db,
        aih_id,
    }
}

fn glosa(line_ref: &str, glosa_type: &str) -> NewGlosa {
    NewGlosa {
        line_ref: line_ref.into(),
        glosa_type: glosa_type.into(),
        professional: "Dra. Silva".into(),
        quantity: 1,
    }
}

#[tokio::test]
async fn test_add_and_list_in_insertion_order() {
    let f = setup().await;
    f.catalog.add_glosa_type("Missing signature").await.unwrap();

    let first = glosas::add_glosa(&f.db, &f.catalog, f.aih_id, glosa("Line 1", "Missing signature"))
        .await
        .unwrap();
    let second = glosas::add_glosa(&f.db, &f.catalog, f.aih_id, glosa("Line 2", "Missing signature"))
        .await
        .unwrap();

    assert!(first.active);
    assert_eq!(first.aih_id, f.aih_id);

    let active = glosas::list_active(&f.db, f.aih_id).await.unwrap();
    let ids: Vec<i64> = active.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert!(glosas::has_pending(&f.db, f.aih_id).await.unwrap());
}

#[tokio::test]
async fn test_duplicates_accumulate() {
    let f = setup().await;
    for _ in 0..2 {
        glosas::add_glosa(&f.db, &f.catalog, f.aih_id, glosa("Line 1", "Missing signature"))
            .await
            .unwrap();
    }
    assert_eq!(glosas::list_active(&f.db, f.aih_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_uncatalogued_type_accepted() {
    let f = setup().await;
    let added = glosas::add_glosa(&f.db, &f.catalog, f.aih_id, glosa("Line 9", "Not in catalog"))
        .await
        .unwrap();
    assert_eq!(added.glosa_type, "Not in catalog");
}

#[tokio::test]
async fn test_remove_twice_is_idempotent() {
    let f = setup().await;
    let added = glosas::add_glosa(&f.db, &f.catalog, f.aih_id, glosa("Line 1", "Missing signature"))
        .await
        .unwrap();

    glosas::remove_glosa(&f.db, added.id).await.unwrap();
    glosas::remove_glosa(&f.db, added.id).await.unwrap();

    assert!(glosas::list_active(&f.db, f.aih_id).await.unwrap().is_empty());
    assert!(!glosas::has_pending(&f.db, f.aih_id).await.unwrap());

    // Soft delete keeps the row
    let active: i64 = sqlx::query_scalar("SELECT active FROM glosas WHERE id = ?")
        .bind(added.id)
        .fetch_one(&f.db)
        .await
        .unwrap();
    assert_eq!(active, 0);
}

#[tokio::test]
async fn test_remove_unknown_id_is_noop() {
    let f = setup().await;
    glosas::remove_glosa(&f.db, 4242).await.unwrap();
}

#[tokio::test]
async fn test_add_to_unknown_record() {
    let f = setup().await;
    let result = glosas::add_glosa(&f.db, &f.catalog, 999, glosa("Line 1", "x")).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_add_validation() {
    let f = setup().await;

    let mut zero = glosa("Line 1", "Missing signature");
    zero.quantity = 0;
    assert!(matches!(
        glosas::add_glosa(&f.db, &f.catalog, f.aih_id, zero).await,
        Err(Error::Validation(_))
    ));

    assert!(matches!(
        glosas::add_glosa(&f.db, &f.catalog, f.aih_id, glosa("  ", "Missing signature")).await,
        Err(Error::Validation(_))
    ));

    assert!(!glosas::has_pending(&f.db, f.aih_id).await.unwrap());
}

#[tokio::test]
async fn test_quantity_defaults_to_one() {
    let new: NewGlosa = serde_json::from_str(
        r#"{"line_ref": "Line 1", "glosa_type": "Missing signature", "professional": "Dra. Silva"}"#,
    )
    .unwrap();
    assert_eq!(new.quantity, 1);
}
