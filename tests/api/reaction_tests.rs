//! Reaction API Tests

use chirp_server::application::services::ReactionService;
use chirp_server::domain::ReactionType;
use chirp_server::shared::error::AppError;
use pretty_assertions::assert_eq;
use test_case::test_case;

use crate::common::TestApp;

#[tokio::test]
async fn test_like_increments_post_counter() {
    let app = TestApp::new();
    let reactions = app.reaction_service();
    let alice = app.seed_user("alice");
    let bob = app.seed_user("bob");
    let post = app.seed_post(alice.id, "likeable");

    let reaction = reactions
        .add_reaction(bob.id, post.id, "LIKE")
        .await
        .expect("add_reaction failed");

    assert_eq!(reaction.user_id, bob.id);
    assert_eq!(reaction.post_id, post.id);
    assert_eq!(reaction.reaction_type, ReactionType::Like);

    let row = app.post_row(post.id);
    assert_eq!(row.qty_likes, 1);
    assert_eq!(row.qty_retweets, 0);
}

#[tokio::test]
async fn test_duplicate_like_conflicts_without_double_counting() {
    let app = TestApp::new();
    let reactions = app.reaction_service();
    let alice = app.seed_user("alice");
    let bob = app.seed_user("bob");
    let post = app.seed_post(alice.id, "likeable");

    reactions
        .add_reaction(bob.id, post.id, "LIKE")
        .await
        .expect("add_reaction failed");
    let err = reactions.add_reaction(bob.id, post.id, "LIKE").await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(app.post_row(post.id).qty_likes, 1);
}

#[tokio::test]
async fn test_like_then_unlike_round_trip() {
    let app = TestApp::new();
    let reactions = app.reaction_service();
    let alice = app.seed_user("alice");
    let bob = app.seed_user("bob");
    let post = app.seed_post(alice.id, "fleeting");

    reactions
        .add_reaction(bob.id, post.id, "LIKE")
        .await
        .expect("add_reaction failed");

    let removed = reactions
        .remove_reaction(bob.id, post.id, "LIKE")
        .await
        .expect("remove_reaction failed");
    assert!(removed);
    assert_eq!(app.post_row(post.id).qty_likes, 0);

    let removed_again = reactions
        .remove_reaction(bob.id, post.id, "LIKE")
        .await
        .expect("remove_reaction failed");
    assert!(!removed_again);
}

/// Removing a reaction that was never added reports false and leaves the
/// counter alone.
#[tokio::test]
async fn test_remove_missing_reaction_reports_false() {
    let app = TestApp::new();
    let reactions = app.reaction_service();
    let alice = app.seed_user("alice");
    let bob = app.seed_user("bob");
    let post = app.seed_post(alice.id, "untouched");

    let removed = reactions
        .remove_reaction(bob.id, post.id, "RETWEET")
        .await
        .expect("remove_reaction failed");

    assert!(!removed);
    assert_eq!(app.post_row(post.id).qty_retweets, 0);
}

#[tokio::test]
async fn test_like_and_retweet_counters_independent() {
    let app = TestApp::new();
    let reactions = app.reaction_service();
    let alice = app.seed_user("alice");
    let bob = app.seed_user("bob");
    let post = app.seed_post(alice.id, "double duty");

    reactions
        .add_reaction(bob.id, post.id, "LIKE")
        .await
        .expect("add_reaction failed");
    reactions
        .add_reaction(bob.id, post.id, "RETWEET")
        .await
        .expect("add_reaction failed");

    let row = app.post_row(post.id);
    assert_eq!(row.qty_likes, 1);
    assert_eq!(row.qty_retweets, 1);

    reactions
        .remove_reaction(bob.id, post.id, "RETWEET")
        .await
        .expect("remove_reaction failed");

    let row = app.post_row(post.id);
    assert_eq!(row.qty_likes, 1);
    assert_eq!(row.qty_retweets, 0);
}

#[tokio::test]
async fn test_reaction_type_parsed_case_insensitively() {
    let app = TestApp::new();
    let reactions = app.reaction_service();
    let alice = app.seed_user("alice");
    let bob = app.seed_user("bob");
    let post = app.seed_post(alice.id, "casual");

    let reaction = reactions
        .add_reaction(bob.id, post.id, "like")
        .await
        .expect("add_reaction failed");

    assert_eq!(reaction.reaction_type, ReactionType::Like);
    assert_eq!(app.post_row(post.id).qty_likes, 1);
}

#[test_case("FAVORITE" ; "unknown keyword")]
#[test_case("" ; "empty string")]
#[tokio::test]
async fn test_rejects_unknown_reaction_type(reaction_type: &str) {
    let app = TestApp::new();
    let reactions = app.reaction_service();
    let alice = app.seed_user("alice");
    let bob = app.seed_user("bob");
    let post = app.seed_post(alice.id, "picky");

    let err = reactions
        .add_reaction(bob.id, post.id, reaction_type)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(app.post_row(post.id).qty_likes, 0);
}

#[tokio::test]
async fn test_react_to_private_author_post_not_found() {
    let app = TestApp::new();
    let reactions = app.reaction_service();
    let recluse = app.seed_private_user("recluse");
    let stranger = app.seed_user("stranger");
    let post = app.seed_post(recluse.id, "gated");

    let err = reactions
        .add_reaction(stranger.id, post.id, "LIKE")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(msg) if msg == "Post not found"));
}

#[tokio::test]
async fn test_react_to_missing_post_not_found() {
    let app = TestApp::new();
    let reactions = app.reaction_service();
    let bob = app.seed_user("bob");

    let err = reactions.add_reaction(bob.id, 42, "LIKE").await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}
