//! Registration, login, profile, and promotion flows.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::server;

#[tokio::test]
async fn test_register_then_login_round_trip() {
    let server = server().await;

    let (_, user_id) = server.register_seeker("sam@example.com").await;

    let (status, body) = server
        .post(
            "/api/users/login",
            None,
            json!({ "email": "sam@example.com", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user_id.as_str());
    assert_eq!(body["user"]["role"], "job_seeker");
    assert!(body["user"].get("passwordHash").is_none());

    let token = body["token"].as_str().unwrap();
    let (status, profile) = server.get("/api/users/profile", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "sam@example.com");
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let server = server().await;
    server.register_seeker("dup@example.com").await;

    let (status, body) = server
        .post(
            "/api/users/register",
            None,
            json!({
                "name": "Second",
                "email": "Dup@Example.com",
                "password": "secret123",
                "role": "employer",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_register_rejects_admin_role() {
    let server = server().await;
    let (status, _) = server
        .post(
            "/api/users/register",
            None,
            json!({
                "name": "Mallory",
                "email": "mallory@example.com",
                "password": "secret123",
                "role": "admin",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let server = server().await;
    server.register_seeker("sam@example.com").await;

    let (status, _) = server
        .post(
            "/api/users/login",
            None,
            json!({ "email": "sam@example.com", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server
        .post(
            "/api/users/login",
            None,
            json!({ "email": "nobody@example.com", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let server = server().await;

    let (status, _) = server.get("/api/users/profile", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server.get("/api/users/profile", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_update_covers_role_fields() {
    let server = server().await;
    let (token, _) = server.register_seeker("sam@example.com").await;

    let (status, body) = server
        .put(
            "/api/users/profile",
            Some(&token),
            json!({
                "name": "Sam S.",
                "skills": ["rust", "sql"],
                "education": [{ "degree": "BSc", "institution": "TU", "year": "2020" }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Sam S.");
    assert_eq!(body["skills"], json!(["rust", "sql"]));
    assert_eq!(body["education"][0]["degree"], "BSc");
}

#[tokio::test]
async fn test_password_change_requires_current_password() {
    let server = server().await;
    let (token, _) = server.register_seeker("sam@example.com").await;

    let (status, _) = server
        .put(
            "/api/users/password",
            Some(&token),
            json!({ "currentPassword": "wrong", "newPassword": "next-secret" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server
        .put(
            "/api/users/password",
            Some(&token),
            json!({ "currentPassword": "secret123", "newPassword": "next-secret" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Old password is gone, new one logs in.
    let (status, _) = server
        .post(
            "/api/users/login",
            None,
            json!({ "email": "sam@example.com", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = server
        .post(
            "/api/users/login",
            None,
            json!({ "email": "sam@example.com", "password": "next-secret" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_make_admin_promotes_without_authorization() {
    let server = server().await;
    let (token, user_id) = server.register_seeker("sam@example.com").await;

    // No Authorization header at all.
    let (status, body) = server
        .put(&format!("/api/users/make-admin/{user_id}"), None, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");

    // The existing session picks up the new role immediately.
    let (status, _) = server.get("/api/admin/users", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_make_admin_unknown_user_is_not_found() {
    let server = server().await;
    let (status, _) = server
        .put("/api/users/make-admin/missing-id", None, json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
