//! Common Test Utilities
//!
//! In-memory repository implementations plus a `TestApp` fixture that
//! wires the real application services to them. The fakes mirror the
//! SQL semantics the Postgres repositories rely on: unique indexes map
//! to conflicts, counter updates ride along with row changes, listings
//! use the same orderings, and unknown cursors are reported as
//! not-found.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use chirp_server::application::services::{
    AuthService, AuthServiceImpl, CommentService, CommentServiceImpl, FollowService,
    FollowServiceImpl, MessageService, MessageServiceImpl, PostService, PostServiceImpl,
    ReactionService, ReactionServiceImpl, UserService, UserServiceImpl,
};
use chirp_server::config::JwtSettings;
use chirp_server::domain::{
    CommentRepository, Follow, FollowRepository, Message, MessageRepository, Post, PostRepository,
    Reaction, ReactionRepository, ReactionType, User, UserRepository,
};
use chirp_server::shared::error::AppError;
use chirp_server::shared::pagination::{Cursor, CursorPagination, OffsetPagination};
use chirp_server::shared::snowflake::{SnowflakeGenerator, DEFAULT_EPOCH};

/// Shared in-memory tables. Plays the role the connection pool plays in
/// production: every repository holds a handle to the same state.
pub struct TestDb {
    pub users: Mutex<Vec<User>>,
    pub posts: Mutex<Vec<Post>>,
    pub follows: Mutex<Vec<Follow>>,
    pub reactions: Mutex<Vec<Reaction>>,
    pub messages: Mutex<Vec<Message>>,
    base_time: DateTime<Utc>,
    ticks: AtomicI64,
}

impl TestDb {
    fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            posts: Mutex::new(Vec::new()),
            follows: Mutex::new(Vec::new()),
            reactions: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            base_time: Utc::now() - Duration::hours(1),
            ticks: AtomicI64::new(0),
        }
    }

    /// Strictly increasing timestamps for seeded rows, anchored an hour
    /// in the past so rows created through the services sort newer.
    fn next_time(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed);
        self.base_time + Duration::seconds(tick)
    }
}

/// Sort key ascending in display order for (created_at DESC, id ASC).
type TimeKey = (Reverse<DateTime<Utc>>, i64);

/// Sort key ascending in display order for
/// (qty_likes DESC, qty_retweets DESC, id ASC).
type EngagementKey = (Reverse<i32>, Reverse<i32>, i64);

/// Page position, with the cursor already resolved to its sort key.
enum PageAt<K> {
    Start,
    After(K),
    Before(K),
}

/// Keyset pagination over rows whose key sorts ascending in display
/// order. `Before` takes the page immediately preceding the cursor row.
fn keyset_page<T, K, F>(mut rows: Vec<T>, key_of: F, at: PageAt<K>, limit: usize) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    rows.sort_by_key(|row| key_of(row));

    match at {
        PageAt::Start => {
            rows.truncate(limit);
            rows
        }
        PageAt::After(key) => rows
            .into_iter()
            .filter(move |row| key_of(row) > key)
            .take(limit)
            .collect(),
        PageAt::Before(key) => {
            let earlier: Vec<T> = rows
                .into_iter()
                .filter(move |row| key_of(row) < key)
                .collect();
            let skip = earlier.len().saturating_sub(limit);
            earlier.into_iter().skip(skip).collect()
        }
    }
}

/// In-memory stand-in for the Postgres user repository.
pub struct InMemoryUserRepository {
    db: Arc<TestDb>,
}

impl InMemoryUserRepository {
    pub fn new(db: Arc<TestDb>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self
            .db
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .db
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .db
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        let mut users = self.db.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(AppError::Conflict(
                "User with this email or username already exists".to_string(),
            ));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut users = self.db.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        drop(users);

        // FK cascades: owned posts (with their comments and reactions),
        // follow edges, and messages all go with the account.
        let mut posts = self.db.posts.lock().unwrap();
        let mut removed_posts: Vec<i64> =
            posts.iter().filter(|p| p.author_id == id).map(|p| p.id).collect();
        posts.retain(|p| p.author_id != id);
        let orphaned: Vec<i64> = posts
            .iter()
            .filter(|p| p.parent_id.is_some_and(|pid| removed_posts.contains(&pid)))
            .map(|p| p.id)
            .collect();
        posts.retain(|p| !orphaned.contains(&p.id));
        removed_posts.extend(orphaned);
        drop(posts);

        self.db
            .follows
            .lock()
            .unwrap()
            .retain(|f| f.follower_id != id && f.followed_id != id);
        self.db
            .reactions
            .lock()
            .unwrap()
            .retain(|r| r.user_id != id && !removed_posts.contains(&r.post_id));
        self.db.messages.lock().unwrap().retain(|m| !m.involves(id));

        Ok(())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self
            .db
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.email == email))
    }

    async fn username_exists(&self, username: &str) -> Result<bool, AppError> {
        Ok(self
            .db
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.username == username))
    }

    async fn set_private(&self, id: i64, is_private: bool) -> Result<User, AppError> {
        let mut users = self.db.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;
        user.is_private = is_private;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn set_profile_picture(&self, id: i64, url: &str) -> Result<User, AppError> {
        let mut users = self.db.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;
        user.profile_picture = Some(url.to_string());
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn search_by_username(
        &self,
        term: &str,
        page: OffsetPagination,
    ) -> Result<Vec<User>, AppError> {
        let term = term.to_lowercase();
        let mut hits: Vec<User> = self
            .db
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.username.to_lowercase().contains(&term))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.username.cmp(&b.username).then(a.id.cmp(&b.id)));

        Ok(hits
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect())
    }

    async fn recommendations(
        &self,
        user_id: i64,
        page: OffsetPagination,
    ) -> Result<Vec<User>, AppError> {
        let users = self.db.users.lock().unwrap();
        let follows = self.db.follows.lock().unwrap();

        let mut candidates: Vec<i64> = Vec::new();
        for first_hop in follows.iter().filter(|f| f.follower_id == user_id) {
            for second_hop in follows.iter().filter(|f| f.follower_id == first_hop.followed_id) {
                if !candidates.contains(&second_hop.followed_id) {
                    candidates.push(second_hop.followed_id);
                }
            }
        }
        candidates.retain(|&candidate| {
            candidate != user_id
                && !follows
                    .iter()
                    .any(|f| f.follower_id == user_id && f.followed_id == candidate)
        });

        // Most-followed first, matching the SQL ranking.
        let mut ranked: Vec<(usize, i64)> = candidates
            .into_iter()
            .map(|candidate| {
                let follower_count = follows.iter().filter(|f| f.followed_id == candidate).count();
                (follower_count, candidate)
            })
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        Ok(ranked
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .filter_map(|(_, candidate)| users.iter().find(|u| u.id == candidate).cloned())
            .collect())
    }
}

/// In-memory stand-in for the Postgres post repository.
pub struct InMemoryPostRepository {
    db: Arc<TestDb>,
}

impl InMemoryPostRepository {
    pub fn new(db: Arc<TestDb>) -> Self {
        Self { db }
    }

    /// Resolve a cursor against the posts table like the SQL probe does,
    /// failing with not-found for IDs with no backing row.
    fn time_page_at(&self, page: CursorPagination) -> Result<PageAt<TimeKey>, AppError> {
        let posts = self.db.posts.lock().unwrap();
        let key_of = |cursor_id: i64| {
            posts
                .iter()
                .find(|p| p.id == cursor_id)
                .map(|p| (Reverse(p.created_at), p.id))
                .ok_or_else(|| AppError::NotFound(format!("Cursor {} not found", cursor_id)))
        };

        Ok(match page.cursor() {
            None => PageAt::Start,
            Some(Cursor::After(cursor_id)) => PageAt::After(key_of(cursor_id)?),
            Some(Cursor::Before(cursor_id)) => PageAt::Before(key_of(cursor_id)?),
        })
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        Ok(self
            .db
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn create(&self, post: &Post) -> Result<Post, AppError> {
        let row = Post {
            is_comment: false,
            parent_id: None,
            ..post.clone()
        };
        self.db.posts.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut posts = self.db.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(AppError::NotFound(format!("Post with id {} not found", id)));
        }

        // FK cascades: comments under the post and reactions on either.
        let mut removed = vec![id];
        removed.extend(posts.iter().filter(|p| p.parent_id == Some(id)).map(|p| p.id));
        posts.retain(|p| p.parent_id != Some(id));
        drop(posts);

        self.db
            .reactions
            .lock()
            .unwrap()
            .retain(|r| !removed.contains(&r.post_id));

        Ok(())
    }

    async fn feed(
        &self,
        requester_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        let at = self.time_page_at(page)?;

        let visible: Vec<Post> = {
            let users = self.db.users.lock().unwrap();
            let posts = self.db.posts.lock().unwrap();
            let follows = self.db.follows.lock().unwrap();

            posts
                .iter()
                .filter(|p| !p.is_comment)
                .filter(|p| {
                    users.iter().find(|u| u.id == p.author_id).is_some_and(|author| {
                        !author.is_private
                            || author.id == requester_id
                            || follows.iter().any(|f| {
                                f.follower_id == requester_id && f.followed_id == author.id
                            })
                    })
                })
                .cloned()
                .collect()
        };

        Ok(keyset_page(
            visible,
            |p| (Reverse(p.created_at), p.id),
            at,
            page.limit() as usize,
        ))
    }

    async fn following_feed(
        &self,
        requester_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        let at = self.time_page_at(page)?;

        let followed: Vec<Post> = {
            let posts = self.db.posts.lock().unwrap();
            let follows = self.db.follows.lock().unwrap();

            posts
                .iter()
                .filter(|p| !p.is_comment)
                .filter(|p| {
                    follows
                        .iter()
                        .any(|f| f.follower_id == requester_id && f.followed_id == p.author_id)
                })
                .cloned()
                .collect()
        };

        Ok(keyset_page(
            followed,
            |p| (Reverse(p.created_at), p.id),
            at,
            page.limit() as usize,
        ))
    }

    async fn by_author(
        &self,
        author_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        let at = self.time_page_at(page)?;

        let authored: Vec<Post> = self
            .db
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| !p.is_comment && p.author_id == author_id)
            .cloned()
            .collect();

        Ok(keyset_page(
            authored,
            |p| (Reverse(p.created_at), p.id),
            at,
            page.limit() as usize,
        ))
    }
}

/// In-memory stand-in for the Postgres comment repository.
pub struct InMemoryCommentRepository {
    db: Arc<TestDb>,
}

impl InMemoryCommentRepository {
    pub fn new(db: Arc<TestDb>) -> Self {
        Self { db }
    }

    /// Resolve a cursor inside one comment thread; a cursor from another
    /// thread is reported as not-found.
    fn engagement_page_at(
        &self,
        page: CursorPagination,
        parent_id: i64,
    ) -> Result<PageAt<EngagementKey>, AppError> {
        let posts = self.db.posts.lock().unwrap();
        let key_of = |cursor_id: i64| {
            posts
                .iter()
                .find(|p| p.id == cursor_id && p.parent_id == Some(parent_id))
                .map(|p| (Reverse(p.qty_likes), Reverse(p.qty_retweets), p.id))
                .ok_or_else(|| AppError::NotFound(format!("Cursor {} not found", cursor_id)))
        };

        Ok(match page.cursor() {
            None => PageAt::Start,
            Some(Cursor::After(cursor_id)) => PageAt::After(key_of(cursor_id)?),
            Some(Cursor::Before(cursor_id)) => PageAt::Before(key_of(cursor_id)?),
        })
    }

    fn time_page_at(&self, page: CursorPagination) -> Result<PageAt<TimeKey>, AppError> {
        let posts = self.db.posts.lock().unwrap();
        let key_of = |cursor_id: i64| {
            posts
                .iter()
                .find(|p| p.id == cursor_id && p.is_comment)
                .map(|p| (Reverse(p.created_at), p.id))
                .ok_or_else(|| AppError::NotFound(format!("Cursor {} not found", cursor_id)))
        };

        Ok(match page.cursor() {
            None => PageAt::Start,
            Some(Cursor::After(cursor_id)) => PageAt::After(key_of(cursor_id)?),
            Some(Cursor::Before(cursor_id)) => PageAt::Before(key_of(cursor_id)?),
        })
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, AppError> {
        Ok(self
            .db
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id && p.is_comment)
            .cloned())
    }

    async fn create(&self, comment: &Post) -> Result<Post, AppError> {
        let row = Post {
            is_comment: true,
            ..comment.clone()
        };

        let mut posts = self.db.posts.lock().unwrap();
        posts.push(row.clone());
        if let Some(parent_id) = row.parent_id {
            if let Some(parent) = posts.iter_mut().find(|p| p.id == parent_id) {
                parent.qty_comments += 1;
            }
        }

        Ok(row)
    }

    async fn delete(&self, comment_id: i64, parent_id: i64) -> Result<(), AppError> {
        let mut posts = self.db.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| !(p.id == comment_id && p.is_comment));
        if posts.len() == before {
            return Err(AppError::NotFound(format!(
                "Comment with id {} not found",
                comment_id
            )));
        }
        if let Some(parent) = posts.iter_mut().find(|p| p.id == parent_id) {
            parent.qty_comments -= 1;
        }
        drop(posts);

        self.db
            .reactions
            .lock()
            .unwrap()
            .retain(|r| r.post_id != comment_id);

        Ok(())
    }

    async fn by_post(
        &self,
        post_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        let at = self.engagement_page_at(page, post_id)?;

        let thread: Vec<Post> = self
            .db
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.parent_id == Some(post_id))
            .cloned()
            .collect();

        Ok(keyset_page(
            thread,
            |p| (Reverse(p.qty_likes), Reverse(p.qty_retweets), p.id),
            at,
            page.limit() as usize,
        ))
    }

    async fn by_author(
        &self,
        author_id: i64,
        page: CursorPagination,
    ) -> Result<Vec<Post>, AppError> {
        let at = self.time_page_at(page)?;

        let authored: Vec<Post> = self
            .db
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_comment && p.author_id == author_id)
            .cloned()
            .collect();

        Ok(keyset_page(
            authored,
            |p| (Reverse(p.created_at), p.id),
            at,
            page.limit() as usize,
        ))
    }
}

/// In-memory stand-in for the Postgres follow repository.
pub struct InMemoryFollowRepository {
    db: Arc<TestDb>,
}

impl InMemoryFollowRepository {
    pub fn new(db: Arc<TestDb>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FollowRepository for InMemoryFollowRepository {
    async fn create(&self, follow: &Follow) -> Result<Follow, AppError> {
        let mut follows = self.db.follows.lock().unwrap();
        if follows
            .iter()
            .any(|f| f.follower_id == follow.follower_id && f.followed_id == follow.followed_id)
        {
            return Err(AppError::Conflict("Already following this user".to_string()));
        }
        follows.push(follow.clone());
        Ok(follow.clone())
    }

    async fn delete(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        let mut follows = self.db.follows.lock().unwrap();
        let before = follows.len();
        follows.retain(|f| !(f.follower_id == follower_id && f.followed_id == followed_id));
        Ok(follows.len() != before)
    }

    async fn is_following(&self, follower_id: i64, followed_id: i64) -> Result<bool, AppError> {
        Ok(self
            .db
            .follows
            .lock()
            .unwrap()
            .iter()
            .any(|f| f.follower_id == follower_id && f.followed_id == followed_id))
    }

    async fn is_mutual(&self, user_a: i64, user_b: i64) -> Result<bool, AppError> {
        let follows = self.db.follows.lock().unwrap();
        let forward = follows
            .iter()
            .any(|f| f.follower_id == user_a && f.followed_id == user_b);
        let backward = follows
            .iter()
            .any(|f| f.follower_id == user_b && f.followed_id == user_a);
        Ok(forward && backward)
    }

    async fn followers_of(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        let users = self.db.users.lock().unwrap();
        let follows = self.db.follows.lock().unwrap();

        let mut rows: Vec<(DateTime<Utc>, User)> = follows
            .iter()
            .filter(|f| f.followed_id == user_id)
            .filter_map(|f| {
                users
                    .iter()
                    .find(|u| u.id == f.follower_id)
                    .map(|u| (f.created_at, u.clone()))
            })
            .collect();
        rows.sort_by_key(|(edge_at, user)| (Reverse(*edge_at), user.id));

        Ok(rows.into_iter().map(|(_, user)| user).collect())
    }

    async fn following_of(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        let users = self.db.users.lock().unwrap();
        let follows = self.db.follows.lock().unwrap();

        let mut rows: Vec<(DateTime<Utc>, User)> = follows
            .iter()
            .filter(|f| f.follower_id == user_id)
            .filter_map(|f| {
                users
                    .iter()
                    .find(|u| u.id == f.followed_id)
                    .map(|u| (f.created_at, u.clone()))
            })
            .collect();
        rows.sort_by_key(|(edge_at, user)| (Reverse(*edge_at), user.id));

        Ok(rows.into_iter().map(|(_, user)| user).collect())
    }

    async fn mutuals_of(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        let users = self.db.users.lock().unwrap();
        let follows = self.db.follows.lock().unwrap();

        let mut mutuals: Vec<User> = users
            .iter()
            .filter(|u| {
                follows
                    .iter()
                    .any(|f| f.follower_id == user_id && f.followed_id == u.id)
                    && follows
                        .iter()
                        .any(|f| f.follower_id == u.id && f.followed_id == user_id)
            })
            .cloned()
            .collect();
        mutuals.sort_by(|a, b| a.username.cmp(&b.username).then(a.id.cmp(&b.id)));

        Ok(mutuals)
    }
}

/// In-memory stand-in for the Postgres reaction repository.
pub struct InMemoryReactionRepository {
    db: Arc<TestDb>,
}

impl InMemoryReactionRepository {
    pub fn new(db: Arc<TestDb>) -> Self {
        Self { db }
    }

    fn adjust_counter(&self, post_id: i64, reaction_type: ReactionType, delta: i32) {
        let mut posts = self.db.posts.lock().unwrap();
        if let Some(post) = posts.iter_mut().find(|p| p.id == post_id) {
            match reaction_type {
                ReactionType::Like => post.qty_likes += delta,
                ReactionType::Retweet => post.qty_retweets += delta,
            }
        }
    }
}

#[async_trait]
impl ReactionRepository for InMemoryReactionRepository {
    async fn create(&self, reaction: &Reaction) -> Result<Reaction, AppError> {
        let mut reactions = self.db.reactions.lock().unwrap();
        if reactions.iter().any(|r| {
            r.user_id == reaction.user_id
                && r.post_id == reaction.post_id
                && r.reaction_type == reaction.reaction_type
        }) {
            return Err(AppError::Conflict("Reaction already exists".to_string()));
        }
        reactions.push(reaction.clone());
        drop(reactions);

        self.adjust_counter(reaction.post_id, reaction.reaction_type, 1);

        Ok(reaction.clone())
    }

    async fn delete(
        &self,
        user_id: i64,
        post_id: i64,
        reaction_type: ReactionType,
    ) -> Result<bool, AppError> {
        let mut reactions = self.db.reactions.lock().unwrap();
        let before = reactions.len();
        reactions.retain(|r| {
            !(r.user_id == user_id && r.post_id == post_id && r.reaction_type == reaction_type)
        });
        let removed = reactions.len() != before;
        drop(reactions);

        if removed {
            self.adjust_counter(post_id, reaction_type, -1);
        }

        Ok(removed)
    }

    async fn exists(
        &self,
        user_id: i64,
        post_id: i64,
        reaction_type: ReactionType,
    ) -> Result<bool, AppError> {
        Ok(self.db.reactions.lock().unwrap().iter().any(|r| {
            r.user_id == user_id && r.post_id == post_id && r.reaction_type == reaction_type
        }))
    }
}

/// In-memory stand-in for the Postgres message repository.
pub struct InMemoryMessageRepository {
    db: Arc<TestDb>,
}

impl InMemoryMessageRepository {
    pub fn new(db: Arc<TestDb>) -> Self {
        Self { db }
    }
}

fn check_in_conversation(rows: &[Message], cursor_id: i64) -> Result<(), AppError> {
    if rows.iter().any(|m| m.id == cursor_id) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Cursor {} not found", cursor_id)))
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: &Message) -> Result<Message, AppError> {
        self.db.messages.lock().unwrap().push(message.clone());
        Ok(message.clone())
    }

    async fn conversation(
        &self,
        user_a: i64,
        user_b: i64,
        page: CursorPagination,
    ) -> Result<Vec<Message>, AppError> {
        let rows: Vec<Message> = self
            .db
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| {
                (m.from_id == user_a && m.to_id == user_b)
                    || (m.from_id == user_b && m.to_id == user_a)
            })
            .cloned()
            .collect();

        let at = match page.cursor() {
            None => PageAt::Start,
            Some(Cursor::After(cursor_id)) => {
                check_in_conversation(&rows, cursor_id)?;
                PageAt::After(Reverse(cursor_id))
            }
            Some(Cursor::Before(cursor_id)) => {
                check_in_conversation(&rows, cursor_id)?;
                PageAt::Before(Reverse(cursor_id))
            }
        };

        Ok(keyset_page(rows, |m| Reverse(m.id), at, page.limit() as usize))
    }

    async fn conversation_partners(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        let users = self.db.users.lock().unwrap();
        let messages = self.db.messages.lock().unwrap();

        let mut last_by_partner: HashMap<i64, i64> = HashMap::new();
        for message in messages.iter().filter(|m| m.involves(user_id)) {
            let partner = if message.from_id == user_id {
                message.to_id
            } else {
                message.from_id
            };
            let last = last_by_partner.entry(partner).or_insert(message.id);
            if message.id > *last {
                *last = message.id;
            }
        }

        let mut partners: Vec<(i64, i64)> = last_by_partner.into_iter().collect();
        partners.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(partners
            .into_iter()
            .filter_map(|(partner_id, _)| users.iter().find(|u| u.id == partner_id).cloned())
            .collect())
    }
}

/// JWT settings for token-issuing tests.
pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "test-secret-key-with-enough-length-for-hmac".to_string(),
        access_token_expiry_minutes: 15,
    }
}

/// Generate a unique test email
pub fn unique_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4())
}

/// Generate a unique test username
pub fn unique_username() -> String {
    format!("user_{}", &uuid::Uuid::new_v4().to_string()[..8])
}

/// Test application wiring the real services to in-memory repositories.
pub struct TestApp {
    pub db: Arc<TestDb>,
    pub ids: Arc<SnowflakeGenerator>,
    pub user_repo: Arc<InMemoryUserRepository>,
    pub post_repo: Arc<InMemoryPostRepository>,
    pub comment_repo: Arc<InMemoryCommentRepository>,
    pub follow_repo: Arc<InMemoryFollowRepository>,
    pub reaction_repo: Arc<InMemoryReactionRepository>,
    pub message_repo: Arc<InMemoryMessageRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        let db = Arc::new(TestDb::new());
        Self {
            ids: Arc::new(SnowflakeGenerator::new(1, DEFAULT_EPOCH)),
            user_repo: Arc::new(InMemoryUserRepository::new(db.clone())),
            post_repo: Arc::new(InMemoryPostRepository::new(db.clone())),
            comment_repo: Arc::new(InMemoryCommentRepository::new(db.clone())),
            follow_repo: Arc::new(InMemoryFollowRepository::new(db.clone())),
            reaction_repo: Arc::new(InMemoryReactionRepository::new(db.clone())),
            message_repo: Arc::new(InMemoryMessageRepository::new(db.clone())),
            db,
        }
    }

    pub fn auth_service(&self) -> impl AuthService {
        AuthServiceImpl::new(self.user_repo.clone(), self.ids.clone(), jwt_settings())
    }

    pub fn user_service(&self) -> impl UserService {
        UserServiceImpl::new(self.user_repo.clone(), self.follow_repo.clone())
    }

    pub fn post_service(&self) -> impl PostService {
        PostServiceImpl::new(
            self.post_repo.clone(),
            self.user_repo.clone(),
            self.follow_repo.clone(),
            self.ids.clone(),
        )
    }

    pub fn comment_service(&self) -> impl CommentService {
        CommentServiceImpl::new(
            self.comment_repo.clone(),
            self.post_repo.clone(),
            self.user_repo.clone(),
            self.follow_repo.clone(),
            self.ids.clone(),
        )
    }

    pub fn reaction_service(&self) -> impl ReactionService {
        ReactionServiceImpl::new(
            self.reaction_repo.clone(),
            self.post_repo.clone(),
            self.user_repo.clone(),
            self.follow_repo.clone(),
            self.ids.clone(),
        )
    }

    pub fn follow_service(&self) -> impl FollowService {
        FollowServiceImpl::new(self.follow_repo.clone(), self.user_repo.clone(), self.ids.clone())
    }

    pub fn message_service(&self) -> impl MessageService {
        MessageServiceImpl::new(
            self.message_repo.clone(),
            self.user_repo.clone(),
            self.follow_repo.clone(),
            self.ids.clone(),
        )
    }

    fn insert_user(&self, username: &str, is_private: bool) -> User {
        let now = Utc::now();
        let user = User {
            id: self.ids.generate(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "not-a-real-hash".to_string(),
            name: None,
            profile_picture: None,
            is_private,
            created_at: now,
            updated_at: now,
        };
        self.db.users.lock().unwrap().push(user.clone());
        user
    }

    /// Insert a public-account user directly, skipping signup.
    pub fn seed_user(&self, username: &str) -> User {
        self.insert_user(username, false)
    }

    /// Insert a private-account user directly.
    pub fn seed_private_user(&self, username: &str) -> User {
        self.insert_user(username, true)
    }

    /// Insert a follow edge directly.
    pub fn seed_follow(&self, follower_id: i64, followed_id: i64) -> Follow {
        let mut follow = Follow::new(self.ids.generate(), follower_id, followed_id);
        follow.created_at = self.db.next_time();
        self.db.follows.lock().unwrap().push(follow.clone());
        follow
    }

    /// Insert both directions of a follow edge.
    pub fn seed_mutual_follow(&self, user_a: i64, user_b: i64) {
        self.seed_follow(user_a, user_b);
        self.seed_follow(user_b, user_a);
    }

    /// Insert a top-level post directly.
    pub fn seed_post(&self, author_id: i64, content: &str) -> Post {
        let mut post = Post::new(self.ids.generate(), author_id, content.to_string(), Vec::new());
        post.created_at = self.db.next_time();
        self.db.posts.lock().unwrap().push(post.clone());
        post
    }

    /// Insert a comment row directly with fixed engagement counters,
    /// bumping the parent's comment count like the repository would.
    pub fn seed_comment_with_engagement(
        &self,
        author_id: i64,
        parent_id: i64,
        likes: i32,
        retweets: i32,
    ) -> Post {
        let mut comment = Post::new_comment(
            self.ids.generate(),
            author_id,
            "reply".to_string(),
            Vec::new(),
            parent_id,
        );
        comment.created_at = self.db.next_time();
        comment.qty_likes = likes;
        comment.qty_retweets = retweets;

        let mut posts = self.db.posts.lock().unwrap();
        posts.push(comment.clone());
        if let Some(parent) = posts.iter_mut().find(|p| p.id == parent_id) {
            parent.qty_comments += 1;
        }

        comment
    }

    /// Fetch a post row straight from the backing table.
    pub fn post_row(&self, id: i64) -> Post {
        self.db
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .expect("post row missing")
    }
}
