use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use dockeriq_core::TestApp;
use dockeriq_core::app::build_router;

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new().await;
    let res = app.client.get(&app.url("/does-not-exist")).await;
    assert_eq!(res.status, 404);
    let json = res.json();
    assert_eq!(json["status"], 404);
    assert_eq!(json["error"], "Not Found");
    assert_eq!(json["message"], "No route for /does-not-exist");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_unparseable_path_param_is_json_400() {
    let app = TestApp::new().await;
    let token = app.worker_token().await;

    for path in ["/shipments/abc", "/shipments/abc/status"] {
        let res = if path.ends_with("status") {
            app.client
                .put_with_auth(&app.url(path), &token, r#"{"status":"DONE"}"#)
                .await
        } else {
            app.client.get_with_auth(&app.url(path), &token).await
        };
        assert_eq!(res.status, 400, "{}: {}", path, res.body);
        let json = res.json();
        assert_eq!(json["error"], "Bad Request");
        assert!(json["message"].as_str().unwrap().contains("abc"));
    }
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new().await;
    let res = app.client.get(&app.url("/auth/validate")).await;
    assert!(res.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_router_oneshot_without_server() {
    let app = TestApp::new().await;
    let router = build_router(app.state.clone());

    let res = router
        .oneshot(
            Request::builder()
                .uri("/shipments")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_method_is_405() {
    let app = TestApp::new().await;
    let res = app.client.get(&app.url("/auth/login")).await;
    assert_eq!(res.status, 405);
}
