//! Authentication API Tests

use chirp_server::application::services::{AuthService, PostService};
use chirp_server::shared::error::AppError;

use crate::common::{unique_email, unique_username, TestApp};

/// Signup creates the account and issues a bearer token that validates
/// back to the new user's ID.
#[tokio::test]
async fn test_signup_issues_usable_token() {
    let app = TestApp::new();
    let auth = app.auth_service();
    let email = unique_email();
    let username = unique_username();

    let (user, tokens) = auth
        .signup(&username, &email, "CorrectHorse9!", Some("Test User"))
        .await
        .expect("signup failed");

    assert_eq!(user.username, username);
    assert_eq!(user.email, email);
    assert_eq!(user.name.as_deref(), Some("Test User"));
    assert!(!user.is_private);
    assert_eq!(tokens.token_type, "Bearer");
    assert!(tokens.expires_in > 0);

    let validated = auth
        .validate_token(&tokens.access_token)
        .await
        .expect("token validation failed");
    assert_eq!(validated, user.id);
}

/// The stored credential is an Argon2 hash, never the raw password.
#[tokio::test]
async fn test_signup_stores_hashed_password() {
    let app = TestApp::new();
    let auth = app.auth_service();

    let (user, _) = auth
        .signup(&unique_username(), &unique_email(), "CorrectHorse9!", None)
        .await
        .expect("signup failed");

    let stored = app
        .db
        .users
        .lock()
        .unwrap()
        .iter()
        .find(|u| u.id == user.id)
        .cloned()
        .expect("user row missing");
    assert_ne!(stored.password_hash, "CorrectHorse9!");
    assert!(stored.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn test_signup_rejects_duplicate_email() {
    let app = TestApp::new();
    let auth = app.auth_service();
    let email = unique_email();

    auth.signup(&unique_username(), &email, "CorrectHorse9!", None)
        .await
        .expect("first signup failed");

    let err = auth
        .signup(&unique_username(), &email, "CorrectHorse9!", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_signup_rejects_duplicate_username() {
    let app = TestApp::new();
    let auth = app.auth_service();
    let username = unique_username();

    auth.signup(&username, &unique_email(), "CorrectHorse9!", None)
        .await
        .expect("first signup failed");

    let err = auth
        .signup(&username, &unique_email(), "CorrectHorse9!", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_login_with_email() {
    let app = TestApp::new();
    let auth = app.auth_service();
    let email = unique_email();

    let (created, _) = auth
        .signup(&unique_username(), &email, "CorrectHorse9!", None)
        .await
        .expect("signup failed");

    let (user, tokens) = auth
        .login(Some(&email), None, "CorrectHorse9!")
        .await
        .expect("login failed");
    assert_eq!(user.id, created.id);
    assert!(!tokens.access_token.is_empty());
}

#[tokio::test]
async fn test_login_with_username() {
    let app = TestApp::new();
    let auth = app.auth_service();
    let username = unique_username();

    let (created, _) = auth
        .signup(&username, &unique_email(), "CorrectHorse9!", None)
        .await
        .expect("signup failed");

    let (user, _) = auth
        .login(None, Some(&username), "CorrectHorse9!")
        .await
        .expect("login failed");
    assert_eq!(user.id, created.id);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = TestApp::new();
    let auth = app.auth_service();
    let email = unique_email();

    auth.signup(&unique_username(), &email, "CorrectHorse9!", None)
        .await
        .expect("signup failed");

    let err = auth
        .login(Some(&email), None, "WrongHorse9!")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

/// Unknown accounts fail the same way as wrong passwords, so login
/// errors cannot be used to enumerate accounts.
#[tokio::test]
async fn test_login_rejects_unknown_account() {
    let app = TestApp::new();
    let auth = app.auth_service();

    let err = auth
        .login(Some("nobody@example.com"), None, "CorrectHorse9!")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn test_login_requires_email_or_username() {
    let app = TestApp::new();
    let auth = app.auth_service();

    let err = auth.login(None, None, "CorrectHorse9!").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_validate_token_rejects_garbage() {
    let app = TestApp::new();
    let auth = app.auth_service();

    let err = auth.validate_token("not-a-jwt").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

/// Full account flow: sign up, log back in, post, read it back.
#[tokio::test]
async fn test_signup_login_post_read_flow() {
    let app = TestApp::new();
    let auth = app.auth_service();
    let posts = app.post_service();
    let email = unique_email();

    let (created, _) = auth
        .signup(&unique_username(), &email, "CorrectHorse9!", None)
        .await
        .expect("signup failed");

    let (user, tokens) = auth
        .login(Some(&email), None, "CorrectHorse9!")
        .await
        .expect("login failed");
    assert_eq!(user.id, created.id);

    let caller_id = auth
        .validate_token(&tokens.access_token)
        .await
        .expect("token validation failed");

    let post = posts
        .create_post(caller_id, "hello".to_string(), vec![])
        .await
        .expect("create_post failed");

    let fetched = posts
        .get_post(caller_id, post.id)
        .await
        .expect("get_post failed");
    assert_eq!(fetched.content, "hello");
    assert_eq!(fetched.author_id, user.id);
}
