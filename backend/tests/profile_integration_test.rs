//! Integration tests for the user/profile one-to-one relationship

mod common;

use axum::http::StatusCode;
use common::TestApp;
use edunova_backend::repositories::{NewUser, ProfileRepository, UserRepository};

#[tokio::test]
#[ignore = "requires database"]
async fn test_repository_creates_profile_with_user() {
    let app = TestApp::new().await;
    let username = common::unique_username("repo");
    let email = format!("{}@example.com", username);

    let user = UserRepository::create(
        &app.pool,
        &NewUser {
            username: &username,
            email: &email,
            password_hash: "$argon2id$placeholder",
            full_name: "Repo User",
        },
    )
    .await
    .unwrap();

    assert!(user.is_active);
    assert_eq!(user.first_name, "");

    let profile = ProfileRepository::find_by_user_id(&app.pool, user.id)
        .await
        .unwrap()
        .expect("profile created with user");
    assert_eq!(profile.full_name, "Repo User");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_failed_user_insert_leaves_no_profile() {
    let app = TestApp::new().await;
    let existing = app.create_test_user().await;

    let result = UserRepository::create(
        &app.pool,
        &NewUser {
            username: &existing.username,
            email: "unused@example.com",
            password_hash: "$argon2id$placeholder",
            full_name: "",
        },
    )
    .await;

    let err = result.unwrap_err();
    assert_eq!(
        edunova_backend::repositories::violated_unique_constraint(&err).as_deref(),
        Some(edunova_backend::repositories::USERNAME_UNIQUE_CONSTRAINT)
    );
    assert_eq!(app.profile_count(&existing.id).await, 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_deleting_user_deletes_profile() {
    let app = TestApp::new().await;
    let user = app.create_test_user().await;
    let user_id = uuid::Uuid::parse_str(&user.id).unwrap();

    assert!(UserRepository::delete(&app.pool, user_id).await.unwrap());

    assert_eq!(app.profile_count(&user.id).await, 0);
    assert!(ProfileRepository::find_by_user_id(&app.pool, user_id)
        .await
        .unwrap()
        .is_none());

    // Tokens of a deleted user no longer authenticate
    let (status, _) = app.get_auth("/api/auth/me/", &user.access).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_user_without_profile_is_an_internal_error() {
    let app = TestApp::new().await;
    let user = app.create_test_user().await;
    let user_id = uuid::Uuid::parse_str(&user.id).unwrap();

    sqlx::query("DELETE FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, _) = app.get_auth("/api/auth/me/", &user.access).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
