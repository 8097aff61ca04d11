use std::collections::HashSet;

use axum::http::StatusCode;
use chrono::{Local, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, Set};

use dockeriq_core::error::DUPLICATE_VALUE;
use dockeriq_core::models::shipment::{self, AddShipment, BasicInformation, STATUS_CREATED};
use dockeriq_core::services::ShipmentService;
use dockeriq_core::tracking::{TrackingError, extract_date, validate_format};
use dockeriq_core::{ApiError, TestApp, TrackingNumberGenerator};

fn shipment(title: &str) -> AddShipment {
    AddShipment {
        basic_information: BasicInformation {
            shipment_title: title.to_string(),
            destination: "Hamburg".to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

// ═══ Generation against the database ═══

#[tokio::test]
async fn test_sequential_creations_count_up_from_one() {
    let app = TestApp::new().await;
    let today = Local::now().date_naive().format("%Y%m%d").to_string();

    for n in 1..=5 {
        let created = app
            .state
            .shipments
            .create(shipment(&format!("Crate {}", n)), "worker@dockeriq.io")
            .await
            .unwrap();
        assert_eq!(
            created.tracking_number,
            format!("DKIQ{}{:06}", today, n)
        );
    }
}

#[tokio::test]
async fn test_generator_reads_persisted_numbers() {
    let app = TestApp::new().await;
    let generator = TrackingNumberGenerator::new("DKIQ");
    let today = Local::now().date_naive();

    let first = generator.generate_for(&app.db, today).await.unwrap();
    assert!(first.ends_with("000001"));

    app.state
        .shipments
        .create(shipment("Pallet"), "worker@dockeriq.io")
        .await
        .unwrap();

    let next = generator.generate_for(&app.db, today).await.unwrap();
    assert!(next.ends_with("000002"), "got {}", next);
}

#[tokio::test]
async fn test_other_day_starts_fresh() {
    let app = TestApp::new().await;
    app.state
        .shipments
        .create(shipment("Pallet"), "worker@dockeriq.io")
        .await
        .unwrap();

    let generator = TrackingNumberGenerator::new("DKIQ");
    let long_ago = NaiveDate::from_ymd_opt(2001, 2, 3).unwrap();
    assert_eq!(
        generator.generate_for(&app.db, long_ago).await.unwrap(),
        "DKIQ20010203000001"
    );
}

#[tokio::test]
async fn test_extract_date_of_generated_is_today() {
    let app = TestApp::new().await;
    let id = app
        .state
        .shipments
        .create(shipment("Pallet"), "worker@dockeriq.io")
        .await
        .unwrap()
        .tracking_number;

    assert!(validate_format(&id));
    assert_eq!(
        extract_date(&id).unwrap(),
        Local::now().date_naive().format("%Y-%m-%d").to_string()
    );
}

// ═══ Concurrency ═══

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creations_get_distinct_numbers() {
    let app = TestApp::new().await;

    let handles: Vec<_> = (0..20)
        .map(|n| {
            let shipments = app.state.shipments.clone();
            tokio::spawn(async move {
                shipments
                    .create(shipment(&format!("Parallel {}", n)), "worker@dockeriq.io")
                    .await
                    .map(|s| s.tracking_number)
            })
        })
        .collect();

    let mut numbers = HashSet::new();
    for handle in handles {
        let number = handle.await.unwrap().unwrap();
        assert!(numbers.insert(number.clone()), "duplicate {}", number);
    }

    let mut suffixes: Vec<u32> = numbers
        .iter()
        .map(|n| n[12..].parse().unwrap())
        .collect();
    suffixes.sort_unstable();
    assert_eq!(suffixes, (1..=20).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_http_creations_get_distinct_numbers() {
    let app = TestApp::new().await;
    let token = app.worker_token().await;

    let mut tasks = Vec::new();
    for n in 0..8 {
        let client = app.client.clone();
        let url = app.url("/shipments");
        let token = token.clone();
        tasks.push(tokio::spawn(async move {
            let body = serde_json::json!({
                "basicInformation": { "shipmentTitle": format!("Box {}", n), "destination": "Oslo" }
            });
            client.post_with_auth(&url, &token, &body.to_string()).await
        }));
    }

    let mut numbers = HashSet::new();
    for task in tasks {
        let res = task.await.unwrap();
        assert_eq!(res.status, 201, "body: {}", res.body);
        let number = res.json()["trackingNumber"].as_str().unwrap().to_string();
        assert!(numbers.insert(number));
    }
    assert_eq!(numbers.len(), 8);
}

// ═══ Writers that do not share the lock ═══

/// A row written straight to the table, as another service instance would.
fn foreign_row(tracking_number: &str) -> shipment::ActiveModel {
    let now = Utc::now().naive_utc();
    shipment::ActiveModel {
        tracking_number: Set(tracking_number.to_string()),
        shipment_title: Set("Foreign".to_string()),
        destination: Set("Bergen".to_string()),
        customer_fields: Set(serde_json::json!({})),
        tags: Set(serde_json::json!([])),
        status: Set(STATUS_CREATED.to_string()),
        created_by: Set("node-b@dockeriq.io".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_number_taken_between_read_and_insert_is_conflict() {
    let app = TestApp::new().await;
    let today = Local::now().date_naive();

    // Node A reads the next number but has not inserted yet.
    let generator = TrackingNumberGenerator::new("DKIQ");
    let pending = generator.generate_for(&app.db, today).await.unwrap();

    // Node B has its own lock and wins the race.
    let node_b = ShipmentService::new(app.db.clone(), TrackingNumberGenerator::new("DKIQ"));
    let taken = node_b
        .create(shipment("Node B"), "node-b@dockeriq.io")
        .await
        .unwrap();
    assert_eq!(taken.tracking_number, pending);

    let err: ApiError = foreign_row(&pending)
        .insert(&app.db)
        .await
        .unwrap_err()
        .into();

    assert_eq!(err.status_code(), StatusCode::CONFLICT);
    assert!(matches!(&err, ApiError::Conflict(m) if m == DUPLICATE_VALUE));
    // driver text stays out of the response
    assert!(!err.message().contains("UNIQUE"));
}

#[tokio::test]
async fn test_separate_services_continue_each_others_sequence() {
    let app = TestApp::new().await;
    let node_a = ShipmentService::new(app.db.clone(), TrackingNumberGenerator::new("DKIQ"));
    let node_b = ShipmentService::new(app.db.clone(), TrackingNumberGenerator::new("DKIQ"));

    let first = node_a.create(shipment("A"), "a@dockeriq.io").await.unwrap();
    let second = node_b.create(shipment("B"), "b@dockeriq.io").await.unwrap();

    assert!(first.tracking_number.ends_with("000001"));
    assert!(second.tracking_number.ends_with("000002"));
}

#[tokio::test]
async fn test_duplicate_after_existing_row_is_conflict() {
    let app = TestApp::new().await;
    foreign_row("DKIQ20240115000001")
        .insert(&app.db)
        .await
        .unwrap();

    let err = foreign_row("DKIQ20240115000001")
        .insert(&app.db)
        .await
        .unwrap_err();
    assert!(matches!(ApiError::from(err), ApiError::Conflict(_)));
}

// ═══ Format helpers ═══

#[test]
fn test_validate_format_rejects_short_input() {
    for input in ["", "DKIQ", "DKIQ20240115", "DKIQ2024011500001"] {
        assert!(!validate_format(input), "{:?}", input);
    }
}

#[test]
fn test_validate_format_rejects_wrong_shape() {
    for input in [
        "DKIQ2024011500000A",
        "1234202401150000001",
        "DKIQ20240115000001 ",
        "DKIQ_20240115000001",
        "DKIQ20240115-000001",
        "DKIQ2024011500000100",
    ] {
        assert!(!validate_format(input), "{:?}", input);
    }
}

#[test]
fn test_extract_date_invalid_format() {
    assert!(matches!(
        extract_date("XX20240115000001"),
        Err(TrackingError::InvalidFormat(_))
    ));
}
