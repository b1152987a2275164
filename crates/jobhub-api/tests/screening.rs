//! Screening lifecycle: lazy creation, in-place update, the status mirror,
//! and the left-joined reads.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{server, TestServer};

/// employer token, seeker token, job id, application id
async fn screening_fixture(server: &TestServer) -> (String, String, String, String) {
    let (employer, _) = server.register_employer("erin@corp.example").await;
    let (seeker, _) = server.register_seeker("sam@example.com").await;
    let job_id = server.create_job(&employer, "Engineer", "engineering").await;
    let application = server
        .apply_with_url(&seeker, &job_id, "Hi", "https://cv.example/sam.pdf")
        .await;
    let app_id = application["id"].as_str().unwrap().to_string();
    (employer, seeker, job_id, app_id)
}

#[tokio::test]
async fn test_upsert_creates_then_updates_one_record() {
    let server = server().await;
    let (employer, _, _, app_id) = screening_fixture(&server).await;
    let uri = format!("/api/screening/applications/{app_id}/screening");

    let (status, first) = server
        .put(
            &uri,
            Some(&employer),
            json!({ "status": "approved", "notes": "Looks great" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["status"], "approved");
    assert_eq!(first["notes"], "Looks great");

    // Same payload again: still one record, same id, same fields.
    let (status, second) = server
        .put(
            &uri,
            Some(&employer),
            json!({ "status": "approved", "notes": "Looks great" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["status"], "approved");
    assert_eq!(second["notes"], "Looks great");

    assert_eq!(server.state.store.screenings.count().await, 1);
}

#[tokio::test]
async fn test_partial_upsert_keeps_unsent_fields() {
    let server = server().await;
    let (employer, _, _, app_id) = screening_fixture(&server).await;
    let uri = format!("/api/screening/applications/{app_id}/screening");

    server
        .put(
            &uri,
            Some(&employer),
            json!({ "status": "approved", "notes": "Round one" }),
        )
        .await;

    // Only notes this time; the verdict stays.
    let (status, body) = server
        .put(&uri, Some(&employer), json!({ "notes": "Round two" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["notes"], "Round two");
}

#[tokio::test]
async fn test_upsert_mirrors_status_onto_application() {
    let server = server().await;
    let (employer, _, _, app_id) = screening_fixture(&server).await;

    server
        .put(
            &format!("/api/screening/applications/{app_id}/screening"),
            Some(&employer),
            json!({ "status": "approved" }),
        )
        .await;

    let application = server.state.store.applications.get(&app_id).await.unwrap();
    assert_eq!(application.screening_status.as_str(), "approved");
    // The overall review status is a separate field and is untouched.
    assert_eq!(application.status.as_str(), "pending");
}

#[tokio::test]
async fn test_delete_leaves_application_untouched() {
    let server = server().await;
    let (employer, _, _, app_id) = screening_fixture(&server).await;
    let uri = format!("/api/screening/applications/{app_id}/screening");

    server
        .put(&uri, Some(&employer), json!({ "status": "approved" }))
        .await;
    let before = server.state.store.applications.get(&app_id).await.unwrap();

    let (status, _) = server.delete(&uri, Some(&employer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(server.state.store.screenings.count().await, 0);

    // The application document is byte-for-byte what it was, including the
    // now-stale mirror field.
    let after = server.state.store.applications.get(&app_id).await.unwrap();
    assert_eq!(
        serde_json::to_value(&after).unwrap(),
        serde_json::to_value(&before).unwrap()
    );
    assert_eq!(after.screening_status.as_str(), "approved");

    // Reads fall back to the pending stub.
    let (_, body) = server.get(&uri, Some(&employer)).await;
    assert_eq!(body["screening"]["status"], "pending");
    assert!(body["screening"]["screenedAt"].is_null());
}

#[tokio::test]
async fn test_job_screenings_left_join_with_stub() {
    let server = server().await;
    let (employer, _, job_id, app_id) = screening_fixture(&server).await;

    // A second applicant who has not been screened.
    let (other_seeker, _) = server.register_seeker("lee@example.com").await;
    server
        .apply_with_url(&other_seeker, &job_id, "Hello", "https://cv.example/lee.pdf")
        .await;

    server
        .put(
            &format!("/api/screening/applications/{app_id}/screening"),
            Some(&employer),
            json!({ "status": "rejected", "notes": "Not a fit" }),
        )
        .await;

    let (status, body) = server
        .get(&format!("/api/screening/jobs/{job_id}/screenings"), Some(&employer))
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);

    let screened = rows.iter().find(|r| r["id"] == app_id.as_str()).unwrap();
    assert_eq!(screened["screening"]["status"], "rejected");
    assert!(screened["screening"]["screenedAt"].is_string());
    assert_eq!(screened["screening"]["screenedBy"]["name"], "Erin Employer");

    let unscreened = rows.iter().find(|r| r["id"] != app_id.as_str()).unwrap();
    assert_eq!(unscreened["screening"]["status"], "pending");
    assert_eq!(unscreened["screening"]["notes"], "");
    assert!(unscreened["screening"]["screenedAt"].is_null());
}

#[tokio::test]
async fn test_screening_visibility_rules() {
    let server = server().await;
    let (employer, seeker, job_id, app_id) = screening_fixture(&server).await;
    let uri = format!("/api/screening/applications/{app_id}/screening");

    // Applicant and owning employer can read.
    let (status, _) = server.get(&uri, Some(&seeker)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server.get(&uri, Some(&employer)).await;
    assert_eq!(status, StatusCode::OK);

    // Anyone else cannot.
    let (stranger, _) = server.register_seeker("stranger@example.com").await;
    let (status, _) = server.get(&uri, Some(&stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Only the owning employer may write or list.
    let (other_employer, _) = server.register_employer("other@corp.example").await;
    let (status, _) = server
        .put(&uri, Some(&other_employer), json!({ "status": "approved" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = server
        .get(&format!("/api/screening/jobs/{job_id}/screenings"), Some(&other_employer))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_upsert_rejects_unknown_status() {
    let server = server().await;
    let (employer, _, _, app_id) = screening_fixture(&server).await;

    let (status, body) = server
        .put(
            &format!("/api/screening/applications/{app_id}/screening"),
            Some(&employer),
            json!({ "status": "maybe" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid screening status");
}
