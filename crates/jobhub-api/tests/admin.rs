//! The admin surface: role gate, dashboard aggregation, and unrestricted
//! CRUD over users, jobs, and applications.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{server, TestServer};

async fn admin_token(server: &TestServer) -> String {
    let (token, user_id) = server.register("Ada Admin", "ada@example.com", "employer").await;
    let (status, _) = server
        .put(&format!("/api/users/make-admin/{user_id}"), None, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    token
}

#[tokio::test]
async fn test_admin_routes_require_admin_role() {
    let server = server().await;
    let (seeker, _) = server.register_seeker("sam@example.com").await;
    let (employer, _) = server.register_employer("erin@corp.example").await;

    for token in [&seeker, &employer] {
        let (status, _) = server.get("/api/admin/dashboard", Some(token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = server.get("/api/admin/users", Some(token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (status, _) = server.get("/api/admin/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dashboard_aggregates_counts_and_recents() {
    let server = server().await;
    let admin = admin_token(&server).await;

    let (employer, _) = server.register_employer("erin@corp.example").await;
    let (seeker, _) = server.register_seeker("sam@example.com").await;
    let job_id = server.create_job(&employer, "Engineer", "engineering").await;
    server
        .apply_with_url(&seeker, &job_id, "Hi", "https://cv.example/sam.pdf")
        .await;

    let (status, body) = server.get("/api/admin/dashboard", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalUsers"], 3);
    assert_eq!(body["stats"]["totalJobs"], 1);
    assert_eq!(body["stats"]["totalApplications"], 1);

    assert!(body["recentUsers"].as_array().unwrap().len() <= 5);
    assert_eq!(body["recentJobs"][0]["title"], "Engineer");

    let recent = &body["recentApplications"][0];
    assert_eq!(recent["applicant"]["name"], "Sam Seeker");
    assert_eq!(recent["job"]["title"], "Engineer");
}

#[tokio::test]
async fn test_user_list_excludes_credential_hashes() {
    let server = server().await;
    let admin = admin_token(&server).await;
    server.register_seeker("sam@example.com").await;

    let (status, body) = server.get("/api/admin/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    for user in body.as_array().unwrap() {
        assert!(user.get("passwordHash").is_none());
        assert!(user.get("password").is_none());
    }
}

#[tokio::test]
async fn test_user_update_cannot_grant_admin() {
    let server = server().await;
    let admin = admin_token(&server).await;
    let (_, seeker_id) = server.register_seeker("sam@example.com").await;

    let (status, body) = server
        .put(
            &format!("/api/admin/users/{seeker_id}"),
            Some(&admin),
            json!({ "role": "admin" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Cannot assign admin role"));

    // Other fields update fine.
    let (status, body) = server
        .put(
            &format!("/api/admin/users/{seeker_id}"),
            Some(&admin),
            json!({ "name": "Sam Renamed", "role": "employer" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Sam Renamed");
    assert_eq!(body["role"], "employer");
}

#[tokio::test]
async fn test_deactivated_account_loses_access() {
    let server = server().await;
    let admin = admin_token(&server).await;
    let (seeker, seeker_id) = server.register_seeker("sam@example.com").await;

    let (status, _) = server
        .put(
            &format!("/api/admin/users/{seeker_id}"),
            Some(&admin),
            json!({ "isActive": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The live token stops working and login is refused.
    let (status, _) = server.get("/api/users/profile", Some(&seeker)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server
        .post(
            "/api/users/login",
            None,
            json!({ "email": "sam@example.com", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_updates_any_job_including_salary() {
    let server = server().await;
    let admin = admin_token(&server).await;
    let (employer, _) = server.register_employer("erin@corp.example").await;
    let job_id = server.create_job(&employer, "Engineer", "engineering").await;

    let (status, body) = server
        .put(
            &format!("/api/admin/jobs/{job_id}"),
            Some(&admin),
            json!({
                "title": "Senior Engineer",
                "salary": { "min": 70000, "max": 90000, "currency": "EUR" },
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Senior Engineer");
    assert_eq!(body["salary"]["min"], 70000);
    assert_eq!(body["salary"]["currency"], "EUR");

    // Nested fields merge rather than wipe each other.
    let (status, body) = server
        .put(
            &format!("/api/admin/jobs/{job_id}"),
            Some(&admin),
            json!({ "salary": { "max": 95000 } }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["salary"]["min"], 70000);
    assert_eq!(body["salary"]["max"], 95000);
}

#[tokio::test]
async fn test_admin_application_update_validates_status() {
    let server = server().await;
    let admin = admin_token(&server).await;
    let (employer, _) = server.register_employer("erin@corp.example").await;
    let (seeker, _) = server.register_seeker("sam@example.com").await;
    let job_id = server.create_job(&employer, "Engineer", "engineering").await;
    let application = server
        .apply_with_url(&seeker, &job_id, "Hi", "https://cv.example/sam.pdf")
        .await;
    let app_id = application["id"].as_str().unwrap();

    let (status, _) = server
        .put(
            &format!("/api/admin/applications/{app_id}"),
            Some(&admin),
            json!({ "status": "on-hold" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .put(
            &format!("/api/admin/applications/{app_id}"),
            Some(&admin),
            json!({ "status": "hired", "adminNotes": "Flagged for audit" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "hired");
    assert_eq!(body["adminNotes"], "Flagged for audit");
}

#[tokio::test]
async fn test_admin_deletes_across_ownership() {
    let server = server().await;
    let admin = admin_token(&server).await;
    let (employer, _) = server.register_employer("erin@corp.example").await;
    let (seeker, _) = server.register_seeker("sam@example.com").await;
    let job_id = server.create_job(&employer, "Engineer", "engineering").await;
    let application = server
        .apply_with_url(&seeker, &job_id, "Hi", "https://cv.example/sam.pdf")
        .await;
    let app_id = application["id"].as_str().unwrap();

    let (status, _) = server
        .delete(&format!("/api/admin/applications/{app_id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = server
        .get(&format!("/api/admin/applications/{app_id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server
        .delete(&format!("/api/admin/jobs/{job_id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, users) = server.get("/api/admin/users", Some(&admin)).await;
    let seeker_id = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == "sam@example.com")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    let (status, _) = server
        .delete(&format!("/api/admin/users/{seeker_id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);

    // The deleted account's token no longer authenticates.
    let (status, _) = server.get("/api/users/profile", Some(&seeker)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
