use dockeriq_core::TestApp;

fn crate_body(title: &str) -> String {
    serde_json::json!({
        "basicInformation": {
            "shipmentTitle": title,
            "destination": "Rotterdam",
            "carrier": "DHL",
            "weight": 12.5,
            "weightUnit": "kg"
        },
        "customerFields": { "po": "PO-1234" },
        "notes": "Handle with care",
        "tags": ["fragile", "priority"]
    })
    .to_string()
}

// ═══ Create ═══

#[tokio::test]
async fn test_create_shipment() {
    let app = TestApp::new().await;
    let token = app.worker_token().await;

    let res = app
        .client
        .post_with_auth(&app.url("/shipments"), &token, &crate_body("Bearings"))
        .await;

    assert_eq!(res.status, 201, "body: {}", res.body);
    let json = res.json();
    assert!(json["trackingNumber"].as_str().unwrap().starts_with("DKIQ"));
    assert_eq!(json["status"], "CREATED");
    assert_eq!(json["createdBy"], "worker@dockeriq.io");
    assert_eq!(json["lastModifiedBy"], "worker@dockeriq.io");
    assert_eq!(json["basicInformation"]["shipmentTitle"], "Bearings");
    assert_eq!(json["basicInformation"]["weight"], 12.5);
    assert_eq!(json["customerFields"]["po"], "PO-1234");
    assert_eq!(json["tags"], serde_json::json!(["fragile", "priority"]));
}

#[tokio::test]
async fn test_create_ignores_client_created_by() {
    let app = TestApp::new().await;
    let token = app.worker_token().await;

    let body = serde_json::json!({
        "basicInformation": { "shipmentTitle": "Box", "destination": "Oslo" },
        "createdBy": "someone-else@dockeriq.io"
    });
    let res = app
        .client
        .post_with_auth(&app.url("/shipments"), &token, &body.to_string())
        .await;
    assert_eq!(res.status, 201);
    assert_eq!(res.json()["createdBy"], "worker@dockeriq.io");
}

#[tokio::test]
async fn test_create_rejects_blank_title() {
    let app = TestApp::new().await;
    let token = app.worker_token().await;

    let body = serde_json::json!({
        "basicInformation": { "shipmentTitle": "", "destination": "Oslo" }
    });
    let res = app
        .client
        .post_with_auth(&app.url("/shipments"), &token, &body.to_string())
        .await;

    assert_eq!(res.status, 422, "body: {}", res.body);
    let fields = res.json()["fields"].as_array().unwrap().clone();
    assert!(
        fields
            .iter()
            .any(|f| f["field"] == "basic_information.shipment_title")
    );
}

#[tokio::test]
async fn test_create_rejects_long_device_information() {
    let app = TestApp::new().await;
    let token = app.worker_token().await;

    let body = serde_json::json!({
        "basicInformation": { "shipmentTitle": "Box", "destination": "Oslo" },
        "deviceInformation": "x".repeat(501)
    });
    let res = app
        .client
        .post_with_auth(&app.url("/shipments"), &token, &body.to_string())
        .await;
    assert_eq!(res.status, 422);
}

#[tokio::test]
async fn test_create_requires_authentication() {
    let app = TestApp::new().await;
    let res = app
        .client
        .post(&app.url("/shipments"), &crate_body("Anon"))
        .await;
    assert_eq!(res.status, 401);
}

// ═══ Read ═══

#[tokio::test]
async fn test_get_by_id_and_tracking_number() {
    let app = TestApp::new().await;
    let token = app.worker_token().await;
    let created = app
        .client
        .post_with_auth(&app.url("/shipments"), &token, &crate_body("Pumps"))
        .await
        .json();
    let id = created["id"].as_i64().unwrap();
    let tracking = created["trackingNumber"].as_str().unwrap();

    let res = app
        .client
        .get_with_auth(&app.url(&format!("/shipments/{}", id)), &token)
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["trackingNumber"], tracking);

    let res = app
        .client
        .get_with_auth(
            &app.url(&format!("/shipments/tracking/{}", tracking)),
            &token,
        )
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["id"], id);
}

#[tokio::test]
async fn test_unknown_tracking_number_is_404() {
    let app = TestApp::new().await;
    let token = app.worker_token().await;
    let res = app
        .client
        .get_with_auth(&app.url("/shipments/tracking/DKIQ19990101000001"), &token)
        .await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn test_malformed_tracking_number_is_400() {
    let app = TestApp::new().await;
    let token = app.worker_token().await;
    let res = app
        .client
        .get_with_auth(&app.url("/shipments/tracking/not-a-number"), &token)
        .await;
    assert_eq!(res.status, 400);
    assert!(res.message().contains("Invalid tracking number format"));
}

#[tokio::test]
async fn test_list_returns_in_creation_order() {
    let app = TestApp::new().await;
    let token = app.worker_token().await;
    for title in ["A", "B", "C"] {
        app.client
            .post_with_auth(&app.url("/shipments"), &token, &crate_body(title))
            .await;
    }

    let res = app
        .client
        .get_with_auth(&app.url("/shipments"), &token)
        .await;
    let titles: Vec<String> = res
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["basicInformation"]["shipmentTitle"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["A", "B", "C"]);
}

#[tokio::test]
async fn test_get_missing_id_is_404() {
    let app = TestApp::new().await;
    let token = app.worker_token().await;
    let res = app
        .client
        .get_with_auth(&app.url("/shipments/9999"), &token)
        .await;
    assert_eq!(res.status, 404);
    assert_eq!(res.json()["error"], "Not Found");
}

// ═══ Update / delete ═══

#[tokio::test]
async fn test_update_status_records_modifier() {
    let app = TestApp::new().await;
    let worker = app.worker_token().await;
    let supervisor = app.supervisor_token().await;
    let id = app
        .client
        .post_with_auth(&app.url("/shipments"), &worker, &crate_body("Valves"))
        .await
        .json()["id"]
        .as_i64()
        .unwrap();

    let res = app
        .client
        .put_with_auth(
            &app.url(&format!("/shipments/{}/status", id)),
            &supervisor,
            r#"{"status":"in_transit"}"#,
        )
        .await;

    assert_eq!(res.status, 200, "body: {}", res.body);
    let json = res.json();
    assert_eq!(json["status"], "IN_TRANSIT");
    assert_eq!(json["lastModifiedBy"], "supervisor@dockeriq.io");
    assert_eq!(json["createdBy"], "worker@dockeriq.io");
}

#[tokio::test]
async fn test_update_status_rejects_empty() {
    let app = TestApp::new().await;
    let token = app.worker_token().await;
    let id = app
        .client
        .post_with_auth(&app.url("/shipments"), &token, &crate_body("Valves"))
        .await
        .json()["id"]
        .as_i64()
        .unwrap();

    let res = app
        .client
        .put_with_auth(
            &app.url(&format!("/shipments/{}/status", id)),
            &token,
            r#"{"status":""}"#,
        )
        .await;
    assert_eq!(res.status, 422);
}

#[tokio::test]
async fn test_delete_shipment() {
    let app = TestApp::new().await;
    let token = app.worker_token().await;
    let id = app
        .client
        .post_with_auth(&app.url("/shipments"), &token, &crate_body("Gone"))
        .await
        .json()["id"]
        .as_i64()
        .unwrap();

    let url = app.url(&format!("/shipments/{}", id));
    let res = app.client.delete_with_auth(&url, &token).await;
    assert_eq!(res.status, 204);

    let res = app.client.get_with_auth(&url, &token).await;
    assert_eq!(res.status, 404);

    let res = app.client.delete_with_auth(&url, &token).await;
    assert_eq!(res.status, 404);
}
