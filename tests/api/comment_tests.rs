//! Comment API Tests

use chirp_server::application::services::CommentService;
use chirp_server::shared::error::AppError;
use chirp_server::shared::pagination::CursorPagination;
use pretty_assertions::assert_eq;

use crate::common::TestApp;

#[tokio::test]
async fn test_create_comment_increments_parent_counter() {
    let app = TestApp::new();
    let comments = app.comment_service();
    let alice = app.seed_user("alice");
    let bob = app.seed_user("bob");
    let post = app.seed_post(alice.id, "parent");

    let comment = comments
        .create_comment(bob.id, post.id, "nice one".to_string(), Vec::new())
        .await
        .expect("create_comment failed");

    assert!(comment.is_comment);
    assert_eq!(comment.parent_id, Some(post.id));
    assert_eq!(app.post_row(post.id).qty_comments, 1);
}

#[tokio::test]
async fn test_delete_comment_restores_parent_counter() {
    let app = TestApp::new();
    let comments = app.comment_service();
    let alice = app.seed_user("alice");
    let bob = app.seed_user("bob");
    let post = app.seed_post(alice.id, "parent");

    let comment = comments
        .create_comment(bob.id, post.id, "hot take".to_string(), Vec::new())
        .await
        .expect("create_comment failed");
    assert_eq!(app.post_row(post.id).qty_comments, 1);

    comments
        .delete_comment(bob.id, comment.id)
        .await
        .expect("delete_comment failed");

    assert_eq!(app.post_row(post.id).qty_comments, 0);
    assert!(app.db.posts.lock().unwrap().iter().all(|p| p.id != comment.id));
}

/// Commenting is gated by the parent post's visibility, with the same
/// obscured not-found as reading it.
#[tokio::test]
async fn test_comment_on_private_author_post_not_found() {
    let app = TestApp::new();
    let comments = app.comment_service();
    let recluse = app.seed_private_user("recluse");
    let stranger = app.seed_user("stranger");
    let post = app.seed_post(recluse.id, "gated");

    let err = comments
        .create_comment(stranger.id, post.id, "hello?".to_string(), Vec::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(msg) if msg == "Post not found"));
}

#[tokio::test]
async fn test_comment_on_missing_post_not_found() {
    let app = TestApp::new();
    let comments = app.comment_service();
    let alice = app.seed_user("alice");

    let err = comments
        .create_comment(alice.id, 42, "into the void".to_string(), Vec::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

/// Thread listings rank by likes, then retweets, then ID, regardless of
/// insertion order.
#[tokio::test]
async fn test_comments_ordered_by_engagement() {
    let app = TestApp::new();
    let comments = app.comment_service();
    let alice = app.seed_user("alice");
    let viewer = app.seed_user("viewer");
    let post = app.seed_post(alice.id, "parent");

    let middling = app.seed_comment_with_engagement(alice.id, post.id, 2, 1);
    let top = app.seed_comment_with_engagement(alice.id, post.id, 5, 0);
    let quiet = app.seed_comment_with_engagement(alice.id, post.id, 0, 0);
    let shared = app.seed_comment_with_engagement(alice.id, post.id, 2, 9);

    let ids: Vec<i64> = comments
        .comments_by_post(viewer.id, post.id, CursorPagination::first_page(10))
        .await
        .expect("comments_by_post failed")
        .iter()
        .map(|c| c.id)
        .collect();

    assert_eq!(ids, vec![top.id, shared.id, middling.id, quiet.id]);
}

#[tokio::test]
async fn test_comments_by_post_pages_with_after_cursor() {
    let app = TestApp::new();
    let comments = app.comment_service();
    let alice = app.seed_user("alice");
    let viewer = app.seed_user("viewer");
    let post = app.seed_post(alice.id, "parent");

    let top = app.seed_comment_with_engagement(alice.id, post.id, 5, 0);
    let shared = app.seed_comment_with_engagement(alice.id, post.id, 2, 9);
    let middling = app.seed_comment_with_engagement(alice.id, post.id, 2, 1);
    let quiet = app.seed_comment_with_engagement(alice.id, post.id, 0, 0);

    let head: Vec<i64> = comments
        .comments_by_post(viewer.id, post.id, CursorPagination::first_page(2))
        .await
        .expect("comments_by_post failed")
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(head, vec![top.id, shared.id]);

    let tail: Vec<i64> = comments
        .comments_by_post(viewer.id, post.id, CursorPagination::after(shared.id, 2))
        .await
        .expect("comments_by_post failed")
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(tail, vec![middling.id, quiet.id]);
}

/// A cursor row from a different thread does not anchor this one.
#[tokio::test]
async fn test_comment_cursor_from_another_thread_not_found() {
    let app = TestApp::new();
    let comments = app.comment_service();
    let alice = app.seed_user("alice");
    let viewer = app.seed_user("viewer");
    let thread_a = app.seed_post(alice.id, "thread a");
    let thread_b = app.seed_post(alice.id, "thread b");

    app.seed_comment_with_engagement(alice.id, thread_a.id, 0, 0);
    let stray = app.seed_comment_with_engagement(alice.id, thread_b.id, 0, 0);

    let err = comments
        .comments_by_post(viewer.id, thread_a.id, CursorPagination::after(stray.id, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(msg) if msg.contains("Cursor")));
}

#[tokio::test]
async fn test_comments_by_user_latest_first() {
    let app = TestApp::new();
    let comments = app.comment_service();
    let alice = app.seed_user("alice");
    let bob = app.seed_user("bob");
    let viewer = app.seed_user("viewer");
    let first_post = app.seed_post(alice.id, "one");
    let second_post = app.seed_post(alice.id, "two");

    let older = app.seed_comment_with_engagement(bob.id, first_post.id, 0, 0);
    let newer = app.seed_comment_with_engagement(bob.id, second_post.id, 0, 0);

    let ids: Vec<i64> = comments
        .comments_by_user(viewer.id, bob.id, CursorPagination::first_page(10))
        .await
        .expect("comments_by_user failed")
        .iter()
        .map(|c| c.id)
        .collect();

    assert_eq!(ids, vec![newer.id, older.id]);
}

#[tokio::test]
async fn test_comments_by_user_gated_by_visibility() {
    let app = TestApp::new();
    let comments = app.comment_service();
    let alice = app.seed_user("alice");
    let recluse = app.seed_private_user("recluse");
    let follower = app.seed_user("follower");
    let stranger = app.seed_user("stranger");
    app.seed_follow(follower.id, recluse.id);
    let post = app.seed_post(alice.id, "parent");
    let comment = app.seed_comment_with_engagement(recluse.id, post.id, 0, 0);

    let err = comments
        .comments_by_user(stranger.id, recluse.id, CursorPagination::first_page(10))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(msg) if msg == "User not found"));

    let ids: Vec<i64> = comments
        .comments_by_user(follower.id, recluse.id, CursorPagination::first_page(10))
        .await
        .expect("comments_by_user failed")
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![comment.id]);
}

#[tokio::test]
async fn test_delete_comment_requires_ownership() {
    let app = TestApp::new();
    let comments = app.comment_service();
    let alice = app.seed_user("alice");
    let bob = app.seed_user("bob");
    let post = app.seed_post(alice.id, "parent");
    let comment = app.seed_comment_with_engagement(alice.id, post.id, 0, 0);

    let err = comments.delete_comment(bob.id, comment.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

/// The comment deletion path only sees comment rows; a top-level post ID
/// is missing as far as it is concerned.
#[tokio::test]
async fn test_delete_comment_rejects_post_id() {
    let app = TestApp::new();
    let comments = app.comment_service();
    let alice = app.seed_user("alice");
    let post = app.seed_post(alice.id, "not a comment");

    let err = comments.delete_comment(alice.id, post.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
